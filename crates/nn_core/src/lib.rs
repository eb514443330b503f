mod driver;
mod error;

pub use driver::{Driver, Parallelism};
pub use error::CoreError;

// Re-exported so a caller only needs to depend on `nn_core` for the whole
// pipeline: structure/sequence types, the energy model and its
// configuration, DP result types, backtracking result types, and the
// concentration solver.
pub use nn_backtrack::{BacktrackError, PairMfeCost, PairProbabilities, SampleResult, SuboptResult};
pub use nn_concentration::{equilibrate, ConcentrationError, ConcentrationResult, InitialGuess, Method as ConcentrationMethod, Options as ConcentrationOptions};
pub use nn_energy::{CachedModel, EnsembleConfig, ModelConditions, NearestNeighborModel};
pub use nn_params::ParameterSet;
pub use nn_structure::{Base, Complex, Strand};
