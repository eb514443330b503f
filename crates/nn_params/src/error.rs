use std::fmt;

#[derive(Debug)]
pub enum ParamError {
    Json(serde_json::Error),
    WrongArity { field: &'static str, rank: usize, key: String },
    UnknownBase { field: &'static str, key: String, ch: char },
    WrongLength { field: &'static str, expected: usize, found: usize },
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamError::Json(e) => write!(f, "malformed parameter JSON: {e}"),
            ParamError::WrongArity { field, rank, key } => {
                write!(f, "field '{field}' expects {rank}-letter keys, got '{key}'")
            }
            ParamError::UnknownBase { field, key, ch } => {
                write!(f, "field '{field}' key '{key}' has non-ACGU letter '{ch}'")
            }
            ParamError::WrongLength { field, expected, found } => {
                write!(f, "field '{field}' expects length {expected}, found {found}")
            }
        }
    }
}

impl std::error::Error for ParamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParamError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ParamError {
    fn from(e: serde_json::Error) -> Self {
        ParamError::Json(e)
    }
}
