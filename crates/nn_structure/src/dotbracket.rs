use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::MultiPairTable;
use crate::PairTable;
use crate::StructureError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DotBracket {
    Unpaired, // '.'
    Open,     // '('
    Close,    // ')'
    Break,    // '+' or '&'
}

impl TryFrom<char> for DotBracket {
    type Error = StructureError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '.' => Ok(DotBracket::Unpaired),
            '(' => Ok(DotBracket::Open),
            ')' => Ok(DotBracket::Close),
            '+' | '&' => Ok(DotBracket::Break),
            _ => Err(StructureError::InvalidToken(c.to_string(), "dot-bracket".into(), 0)),
        }
    }
}

impl From<DotBracket> for char {
    fn from(db: DotBracket) -> Self {
        match db {
            DotBracket::Open => '(',
            DotBracket::Close => ')',
            DotBracket::Unpaired => '.',
            DotBracket::Break => '+',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DotBracketVec(pub Vec<DotBracket>);

impl Deref for DotBracketVec {
    type Target = [DotBracket];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DotBracketVec {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl TryFrom<&str> for DotBracketVec {
    type Error = StructureError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let mut vec = Vec::with_capacity(s.len());
        for (i, c) in s.chars().enumerate() {
            match DotBracket::try_from(c) {
                Ok(db) => vec.push(db),
                Err(StructureError::InvalidToken(tok, src, _)) => {
                    return Err(StructureError::InvalidToken(tok, src, i));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(DotBracketVec(vec))
    }
}

impl fmt::Display for DotBracketVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for db in &self.0 {
            write!(f, "{}", char::from(*db))?;
        }
        Ok(())
    }
}

impl From<&PairTable> for DotBracketVec {
    fn from(pt: &PairTable) -> Self {
        let mut result = Vec::with_capacity(pt.len());
        for (i, &j_opt) in pt.iter().enumerate() {
            match j_opt {
                None => result.push(DotBracket::Unpaired),
                Some(j) if j > i => result.push(DotBracket::Open),
                Some(j) if j < i => result.push(DotBracket::Close),
                Some(_) => unreachable!("PairTable construction prevents self-pairing at {i}"),
            }
        }
        DotBracketVec(result)
    }
}

impl From<&MultiPairTable> for DotBracketVec {
    fn from(pt: &MultiPairTable) -> Self {
        let strands = pt.strands();
        let mut result = Vec::with_capacity(pt.len() + pt.num_strands());
        for (si, strand) in strands.iter().enumerate() {
            for (di, &pair) in strand.iter().enumerate() {
                match pair {
                    None => result.push(DotBracket::Unpaired),
                    Some((sj, dj)) => {
                        let (sj, dj) = (sj as usize, dj as usize);
                        if (sj, dj) > (si, di) {
                            result.push(DotBracket::Open);
                        } else if (sj, dj) < (si, di) {
                            result.push(DotBracket::Close);
                        } else {
                            unreachable!("MultiPairTable::new prevents self-pairing at strand {si}, domain {di}");
                        }
                    }
                }
            }
            if si + 1 < strands.len() {
                result.push(DotBracket::Break);
            }
        }
        DotBracketVec(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let db = DotBracketVec::try_from("((..))+.").unwrap();
        assert_eq!(format!("{db}"), "((..))+.");
    }

    #[test]
    fn test_invalid_char_reports_position() {
        let err = DotBracketVec::try_from("((x))").unwrap_err();
        assert!(matches!(err, StructureError::InvalidToken(_, _, 2)));
    }

    #[test]
    fn test_pair_table_round_trip() {
        let pt = PairTable::try_from("(.(.).)").unwrap();
        let db = DotBracketVec::from(&pt);
        assert_eq!(format!("{db}"), "(.(.).)");
    }
}
