use std::convert::TryFrom;

use crate::NAIDX;
use crate::StructureError;
use crate::DotBracket;
use crate::DotBracketVec;

/// A multi-strand pair table: `self.data[si][di]` is `None` if unpaired,
/// otherwise `Some((sj, dj))` pointing at the partner domain. The field is
/// private so that every table in existence has already passed `new`'s
/// involution / non-self-pairing checks -- downstream code (e.g.
/// `DotBracketVec`'s conversion) can then rely on that invariant instead
/// of re-checking it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiPairTable {
    data: Vec<Vec<Option<(NAIDX, NAIDX)>>>,
}

impl MultiPairTable {
    /// Builds a table from raw per-strand pair data, rejecting
    /// self-pairing and any pair list that isn't involutive.
    pub fn new(data: Vec<Vec<Option<(NAIDX, NAIDX)>>>) -> Result<Self, StructureError> {
        for (si, strand) in data.iter().enumerate() {
            for (di, pair) in strand.iter().enumerate() {
                let Some((sj, dj)) = *pair else { continue };
                let (sj, dj) = (sj as usize, dj as usize);
                if (sj, dj) == (si, di) {
                    return Err(StructureError::MultiSelfPaired((si, di)));
                }
                let reverse = data.get(sj).and_then(|s| s.get(dj)).copied().flatten();
                if reverse != Some((si as NAIDX, di as NAIDX)) {
                    return Err(StructureError::MultiNotInvolutive((si, di), (sj, dj)));
                }
            }
        }
        Ok(MultiPairTable { data })
    }

    /// Total number of nucleotides across all strands.
    pub fn len(&self) -> usize {
        self.data.iter().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn num_strands(&self) -> usize {
        self.data.len()
    }

    pub fn get_pair(&self, loc: (usize, usize)) -> &Option<(NAIDX, NAIDX)> {
        &self.data[loc.0][loc.1]
    }

    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &Option<(NAIDX, NAIDX)>)> {
        self.data.iter().enumerate().flat_map(|(si, strand)| {
            strand.iter().enumerate().map(move |(ni, pair)| ((si, ni), pair))
        })
    }

    /// Per-strand pair data, for callers (e.g. `DotBracketVec`'s
    /// conversion) that need to walk strands in order.
    pub fn strands(&self) -> &[Vec<Option<(NAIDX, NAIDX)>>] {
        &self.data
    }
}

impl TryFrom<&str> for MultiPairTable {
    type Error = StructureError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let mut strand_idx = 0;
        let mut domain_idx = 0;
        let mut stack: Vec<(usize, usize)> = Vec::new();
        let mut pair_table: Vec<Vec<Option<(NAIDX, NAIDX)>>> = vec![vec![]];

        for (i, ch) in s.chars().enumerate() {
            match ch {
                '+' | '&' => {
                    if strand_idx == 0 && domain_idx == 0 {
                        return Err(StructureError::InvalidToken("strand break".into(), "complex".into(), 0));
                    }
                    if i < s.len() - 1 {
                        pair_table.push(vec![]);
                    }
                    strand_idx += 1;
                    domain_idx = 0;
                }
                '(' => {
                    stack.push((strand_idx, domain_idx));
                    pair_table[strand_idx].push(None);
                    domain_idx += 1;
                }
                ')' => {
                    let (si, di) = stack.pop()
                        .ok_or(StructureError::UnmatchedMultiClose((strand_idx, domain_idx)))?;
                    pair_table[si][di] = Some((strand_idx as NAIDX, domain_idx as NAIDX));
                    pair_table[strand_idx].push(Some((si as NAIDX, di as NAIDX)));
                    domain_idx += 1;
                }
                '.' => {
                    pair_table[strand_idx].push(None);
                    domain_idx += 1;
                }
                _ => {
                    return Err(StructureError::InvalidToken(format!("character '{ch}'"), "complex".into(), i));
                }
            }
        }
        if let Some((si, di)) = stack.pop() {
            return Err(StructureError::UnmatchedMultiOpen((si, di)));
        }
        MultiPairTable::new(pair_table)
    }
}

impl TryFrom<&DotBracketVec> for MultiPairTable {
    type Error = StructureError;

    fn try_from(db: &DotBracketVec) -> Result<Self, Self::Error> {
        let mut strand_idx = 0;
        let mut domain_idx = 0;
        let mut stack: Vec<(usize, usize)> = Vec::new();
        let mut pair_table: Vec<Vec<Option<(NAIDX, NAIDX)>>> = vec![vec![]];

        for dot in db.iter() {
            match dot {
                DotBracket::Break => {
                    if strand_idx == 0 && domain_idx == 0 {
                        return Err(StructureError::InvalidToken("strand break".into(), "complex".into(), 0));
                    }
                    pair_table.push(vec![]);
                    strand_idx += 1;
                    domain_idx = 0;
                }
                DotBracket::Open => {
                    stack.push((strand_idx, domain_idx));
                    pair_table[strand_idx].push(None);
                    domain_idx += 1;
                }
                DotBracket::Close => {
                    let (si, di) = stack.pop()
                        .ok_or(StructureError::UnmatchedMultiClose((strand_idx, domain_idx)))?;
                    pair_table[si][di] = Some((strand_idx as NAIDX, domain_idx as NAIDX));
                    pair_table[strand_idx].push(Some((si as NAIDX, di as NAIDX)));
                    domain_idx += 1;
                }
                DotBracket::Unpaired => {
                    pair_table[strand_idx].push(None);
                    domain_idx += 1;
                }
            }
        }
        if let Some((si, di)) = stack.pop() {
            return Err(StructureError::UnmatchedMultiOpen((si, di)));
        }
        MultiPairTable::new(pair_table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_pair_table() {
        let pt = MultiPairTable::try_from("((.+.))").unwrap();
        assert_eq!(pt.len(), 6);
        assert_eq!(*pt.get_pair((0, 0)), Some((1, 2)));
        assert_eq!(*pt.get_pair((0, 1)), Some((1, 1)));
        assert_eq!(*pt.get_pair((0, 2)), None);
        assert_eq!(*pt.get_pair((1, 1)), Some((0, 1)));
    }

    #[test]
    fn test_multi_pair_table_trailing_break() {
        let pt = MultiPairTable::try_from("((..))+").unwrap();
        assert_eq!(pt.num_strands(), 1);
        assert_eq!(pt.len(), 6);
    }

    #[test]
    fn test_new_rejects_self_pairing() {
        let data = vec![vec![Some((0, 0))]];
        let err = MultiPairTable::new(data).unwrap_err();
        assert!(matches!(err, StructureError::MultiSelfPaired((0, 0))));
    }

    #[test]
    fn test_new_rejects_non_involutive_table() {
        // domain (0,0) claims to pair with (0,1), but (0,1) doesn't point back.
        let data = vec![vec![Some((0, 1)), None]];
        let err = MultiPairTable::new(data).unwrap_err();
        assert!(matches!(err, StructureError::MultiNotInvolutive((0, 0), (0, 1))));
    }
}
