use std::fmt;
use std::ops::Deref;

use log::warn;
use colored::*;

use crate::Base;
use crate::StructureError;

/// An ordered, non-empty sequence of canonical bases. No wildcards, no
/// gap symbols -- those are only valid at the sequence-parsing boundary
/// or inside a `Complex`'s concatenated view.
#[derive(Clone, Hash, Debug, Eq, PartialEq)]
pub struct Strand(pub Vec<Base>);

impl Deref for Strand {
    type Target = [Base];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<&str> for Strand {
    type Error = StructureError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if s.is_empty() {
            return Err(StructureError::EmptyStrand(0));
        }
        let mut vec = Vec::with_capacity(s.len());
        for (i, c) in s.chars().enumerate() {
            let b = Base::try_from(c).map_err(|_| {
                StructureError::InvalidToken(format!("character '{c}'"), "strand".into(), i)
            })?;
            if !b.is_canonical() {
                return Err(StructureError::InvalidToken("wildcard base".into(), "strand".into(), i));
            }
            vec.push(b);
        }
        Ok(Strand(vec))
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for base in &self.0 {
            write!(f, "{base}")?;
        }
        Ok(())
    }
}

impl Strand {
    pub fn from_lossy(s: &str) -> Self {
        let vec = s.chars().filter_map(|c| {
            match Base::try_from(c) {
                Ok(b) if b.is_canonical() => Some(b),
                Ok(_) => {
                    warn!("{} wildcard base in strand '{}' dropped", "WARNING:".red(), s);
                    None
                }
                Err(e) => {
                    warn!("{} {} -> dropped", "WARNING:".red(), e);
                    None
                }
            }
        }).collect();
        Strand(vec)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strand_parse() {
        let s = Strand::try_from("ACGU").unwrap();
        assert_eq!(s.len(), 4);
        assert_eq!(format!("{s}"), "ACGU");
    }

    #[test]
    fn test_strand_rejects_empty() {
        assert!(matches!(Strand::try_from(""), Err(StructureError::EmptyStrand(_))));
    }

    #[test]
    fn test_strand_rejects_wildcard() {
        assert!(Strand::try_from("ACGN").is_err());
    }
}
