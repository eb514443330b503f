use std::fmt;

#[derive(Debug)]
pub enum DpError {
    TooShort { len: usize, min_hairpin: usize },
    Unpairable(usize, usize),
    /// A cell's value ran past what the current scalar width can
    /// represent safely (spec's "capacity error"). `diagonal` is the
    /// anti-diagonal (`j - i`) that failed; the caller is expected to
    /// retry with a wider scalar type, and to surface this error only
    /// once no wider type remains.
    Overflow { diagonal: usize },
}

impl fmt::Display for DpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DpError::TooShort { len, min_hairpin } => {
                write!(f, "sequence of length {len} too short for minimum hairpin size {min_hairpin}")
            }
            DpError::Unpairable(i, j) => write!(f, "positions {i} and {j} cannot pair"),
            DpError::Overflow { diagonal } => {
                write!(f, "partition function overflowed the scalar representation at anti-diagonal {diagonal}")
            }
        }
    }
}

impl std::error::Error for DpError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflow_display_names_the_diagonal() {
        let err = DpError::Overflow { diagonal: 12 };
        assert!(err.to_string().contains("12"));
    }
}
