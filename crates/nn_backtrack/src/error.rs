use std::fmt;

#[derive(Debug)]
pub enum BacktrackError {
    InvalidGap(i32),
    EmptyQueue,
    Dp(nn_dp::DpError),
}

impl fmt::Display for BacktrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BacktrackError::InvalidGap(gap) => write!(f, "energy gap must be non-negative, got {gap}"),
            BacktrackError::EmptyQueue => write!(f, "backtracking queue emptied without completing a structure"),
            BacktrackError::Dp(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for BacktrackError {}

impl From<nn_dp::DpError> for BacktrackError {
    fn from(e: nn_dp::DpError) -> Self {
        BacktrackError::Dp(e)
    }
}
