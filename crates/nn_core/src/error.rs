use std::fmt;

/// The union of every sub-crate's error type, surfaced at the facade
/// boundary. Kept as a plain enum rather than a boxed trait object so
/// callers can match on the originating layer.
#[derive(Debug)]
pub enum CoreError {
    Structure(nn_structure::StructureError),
    Params(nn_params::ParamError),
    Energy(nn_energy::EnergyError),
    Dp(nn_dp::DpError),
    Backtrack(nn_backtrack::BacktrackError),
    Concentration(nn_concentration::ConcentrationError),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Structure(e) => write!(f, "{e}"),
            CoreError::Params(e) => write!(f, "{e}"),
            CoreError::Energy(e) => write!(f, "{e}"),
            CoreError::Dp(e) => write!(f, "{e}"),
            CoreError::Backtrack(e) => write!(f, "{e}"),
            CoreError::Concentration(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoreError::Structure(e) => Some(e),
            CoreError::Params(e) => Some(e),
            CoreError::Energy(e) => Some(e),
            CoreError::Dp(e) => Some(e),
            CoreError::Backtrack(e) => Some(e),
            CoreError::Concentration(e) => Some(e),
        }
    }
}

impl From<nn_structure::StructureError> for CoreError {
    fn from(e: nn_structure::StructureError) -> Self {
        CoreError::Structure(e)
    }
}

impl From<nn_params::ParamError> for CoreError {
    fn from(e: nn_params::ParamError) -> Self {
        CoreError::Params(e)
    }
}

impl From<nn_energy::EnergyError> for CoreError {
    fn from(e: nn_energy::EnergyError) -> Self {
        CoreError::Energy(e)
    }
}

impl From<nn_dp::DpError> for CoreError {
    fn from(e: nn_dp::DpError) -> Self {
        CoreError::Dp(e)
    }
}

impl From<nn_backtrack::BacktrackError> for CoreError {
    fn from(e: nn_backtrack::BacktrackError) -> Self {
        CoreError::Backtrack(e)
    }
}

impl From<nn_concentration::ConcentrationError> for CoreError {
    fn from(e: nn_concentration::ConcentrationError) -> Self {
        CoreError::Concentration(e)
    }
}
