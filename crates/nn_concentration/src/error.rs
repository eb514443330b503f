use std::fmt;

#[derive(Debug)]
pub enum ConcentrationError {
    DimensionMismatch { complexes: usize, x0_len: usize, q_len: usize },
    NonFinite(String),
    SingularHessian,
}

impl fmt::Display for ConcentrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConcentrationError::DimensionMismatch { complexes, x0_len, q_len } => write!(
                f,
                "inconsistent dimensions: A has {complexes} rows, x0 has {x0_len} entries, q has {q_len} entries"
            ),
            ConcentrationError::NonFinite(what) => write!(f, "non-finite value encountered: {what}"),
            ConcentrationError::SingularHessian => write!(f, "Hessian solve failed to produce a usable direction"),
        }
    }
}

impl std::error::Error for ConcentrationError {}
