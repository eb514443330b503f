mod dogleg;
mod error;
mod linalg;
mod nnls;
mod options;
mod solve;

pub use error::ConcentrationError;
pub use options::{InitialGuess, Method, Options};
pub use solve::{equilibrate, ConcentrationResult};
