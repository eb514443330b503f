mod error;
mod pair_probability;
mod sample;
mod subopt;

pub use error::BacktrackError;
pub use pair_probability::{
    pair_mfe_cost, pair_mfe_cost_with_nicks, pair_probabilities, pair_probabilities_with_nicks, PairMfeCost,
    PairProbabilities,
};
pub use sample::{sample, sample_with_nicks, SampleResult};
pub use subopt::{subopt, subopt_with_nicks, SuboptResult};
