mod error;
mod scalar;
mod semiring;
mod config;
mod cached_model;
mod energy_model;
mod coaxial;
pub mod loop_decomposition;

pub use error::*;
pub use scalar::Scalar;
pub use semiring::{LogSumExpValue, MfeValue, PfValue, Semiring};
pub use config::{EnsembleConfig, Ensemble, ModelConditions};
pub use cached_model::{CachedModel, GAS_CONSTANT};
pub use energy_model::{EnergyModel, NearestNeighborModel};
pub use coaxial::flush_coaxial_bonus;
pub use loop_decomposition::{LoopDecomposition, NearestNeighborLoop};
