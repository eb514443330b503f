use std::fmt;

#[derive(Debug)]
pub enum EnergyError {
    Params(nn_params::ParamError),
    Structure(nn_structure::StructureError),
}

impl fmt::Display for EnergyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnergyError::Params(e) => write!(f, "parameter error: {e}"),
            EnergyError::Structure(e) => write!(f, "structure error: {e}"),
        }
    }
}

impl std::error::Error for EnergyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EnergyError::Params(e) => Some(e),
            EnergyError::Structure(e) => Some(e),
        }
    }
}

impl From<nn_params::ParamError> for EnergyError {
    fn from(e: nn_params::ParamError) -> Self {
        EnergyError::Params(e)
    }
}

impl From<nn_structure::StructureError> for EnergyError {
    fn from(e: nn_structure::StructureError) -> Self {
        EnergyError::Structure(e)
    }
}
