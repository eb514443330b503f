mod error;
mod motif;
mod raw;
mod parameter_set;

pub use error::*;
pub use motif::{motif_index, motif_len};
pub use raw::{ParameterFile, RawArrays, RawMotifArray};
pub use parameter_set::*;
