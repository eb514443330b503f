use std::convert::TryFrom;
use std::ops::{Deref, DerefMut};

use crate::{Base, Pairability, StructureError};
use crate::{DotBracket, DotBracketVec};

/// A single-strand pair list: `0[i] == None` means unpaired, otherwise
/// `table[table[i]] == Some(i)` (involutive) and `table[i] != Some(i)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairTable(pub Vec<Option<usize>>);

impl PairTable {
    /// True iff the substructure over `i..j` is well-formed: every pair
    /// with an endpoint in the interval has both endpoints in it.
    pub fn is_well_formed(&self, i: usize, j: usize) -> bool {
        assert!(j <= self.len(), "invalid interval: j must be <= length");
        for k in i..j {
            if let Some(l) = self[k] {
                if l < i || l >= j {
                    return false;
                }
            }
        }
        true
    }

    /// Check the invariants required of a DP-produced structure:
    /// involutive, non-crossing, and pair-able under `rule`.
    pub fn validate(&self, sequence: &[Base], rule: &Pairability) -> Result<(), StructureError> {
        for (i, &j) in self.0.iter().enumerate() {
            let Some(j) = j else { continue };
            if j == i {
                return Err(StructureError::SelfPaired(i));
            }
            if self.0[j] != Some(i) {
                return Err(StructureError::NotInvolutive(i, j));
            }
            if i < j && !rule.can_pair(sequence[i], sequence[j]) {
                return Err(StructureError::PairabilityViolation(i, j));
            }
        }
        for (i, &pi) in self.0.iter().enumerate() {
            let Some(j) = pi else { continue };
            if j <= i { continue }
            for (p, &pp) in self.0.iter().enumerate().skip(i + 1).take(j - i - 1) {
                let Some(q) = pp else { continue };
                if q > j || q < i {
                    return Err(StructureError::Crossing((i, j), (p.min(q), p.max(q))));
                }
            }
        }
        Ok(())
    }
}

impl Deref for PairTable {
    type Target = [Option<usize>];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PairTable {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl TryFrom<&str> for PairTable {
    type Error = StructureError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let mut stack = Vec::new();
        let mut table = vec![None; s.len()];

        for (i, c) in s.chars().enumerate() {
            match c {
                '(' => stack.push(i),
                ')' => {
                    let j = stack.pop().ok_or(StructureError::UnmatchedClose(i))?;
                    table[i] = Some(j);
                    table[j] = Some(i);
                }
                '.' => (),
                _ => return Err(StructureError::InvalidToken(format!("character '{c}'"), "structure".into(), i)),
            }
        }
        if let Some(i) = stack.pop() {
            return Err(StructureError::UnmatchedOpen(i));
        }
        Ok(PairTable(table))
    }
}

impl TryFrom<&DotBracketVec> for PairTable {
    type Error = StructureError;

    fn try_from(db: &DotBracketVec) -> Result<Self, Self::Error> {
        let mut stack: Vec<usize> = Vec::new();
        let mut table = vec![None; db.len()];

        for (i, dot) in db.iter().enumerate() {
            match dot {
                DotBracket::Open => stack.push(i),
                DotBracket::Close => {
                    let j = stack.pop().ok_or(StructureError::UnmatchedClose(i))?;
                    table[i] = Some(j);
                    table[j] = Some(i);
                }
                DotBracket::Unpaired => {}
                DotBracket::Break => unreachable!("unexpected strand break in single-strand structure"),
            }
        }
        if let Some(i) = stack.pop() {
            return Err(StructureError::UnmatchedOpen(i));
        }
        Ok(PairTable(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_pair_table() {
        let pt = PairTable::try_from("((..))").unwrap();
        assert_eq!(pt.len(), 6);
        assert_eq!(pt[0], Some(5));
        assert_eq!(pt[4], Some(1));
    }

    #[test]
    fn test_unmatched_open() {
        let err = PairTable::try_from("(()").unwrap_err();
        assert!(matches!(err, StructureError::UnmatchedOpen(0)));
    }

    #[test]
    fn test_well_formed() {
        let pt = PairTable::try_from(".(.).").unwrap();
        assert!(pt.is_well_formed(0, 5));
        assert!(pt.is_well_formed(1, 4));
        assert!(!pt.is_well_formed(0, 3));
    }

    #[test]
    fn test_validate_detects_crossing() {
        let pt = PairTable(vec![Some(2), Some(3), Some(0), Some(1)]);
        let seq = [Base::A, Base::C, Base::U, Base::G];
        let rule = Pairability::default();
        assert!(matches!(pt.validate(&seq, &rule), Err(StructureError::Crossing(..))));
    }

    #[test]
    fn test_validate_accepts_nested() {
        let pt = PairTable::try_from("(())").unwrap();
        let seq = [Base::A, Base::C, Base::G, Base::U];
        let rule = Pairability::default();
        assert!(pt.validate(&seq, &rule).is_ok());
    }

    #[test]
    fn test_validate_rejects_unpairable_bases() {
        let pt = PairTable::try_from("(.)").unwrap();
        let seq = [Base::A, Base::A, Base::A];
        let rule = Pairability::default();
        assert!(matches!(pt.validate(&seq, &rule), Err(StructureError::PairabilityViolation(0, 2))));
    }
}
