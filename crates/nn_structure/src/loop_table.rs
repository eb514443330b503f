use std::convert::TryFrom;
use std::fmt;
use std::ops::Deref;

use crate::StructureError;
use crate::PairTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopInfo {
    Unpaired { l: usize },
    Paired { o: usize, i: usize }, // outer, inner loop ids
}

/// Per-position loop membership, used to derive the loop arena
/// (`loop_decomposition::NearestNeighborLoop`) without back-pointers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopTable(pub Vec<LoopInfo>);

impl Deref for LoopTable {
    type Target = [LoopInfo];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<&PairTable> for LoopTable {
    type Error = StructureError;

    fn try_from(pt: &PairTable) -> Result<Self, Self::Error> {
        let n = pt.len();
        let mut table = vec![LoopInfo::Unpaired { l: 0 }; n];
        let mut loop_index = 0;
        let mut stack: Vec<(usize, usize)> = Vec::new();
        let mut mloop = 0;

        for i in 0..n {
            match pt[i] {
                None => {
                    table[i] = LoopInfo::Unpaired { l: loop_index };
                }
                Some(j) if j > i => {
                    let outer_loop = loop_index;
                    mloop += 1;
                    loop_index = mloop;
                    table[i] = LoopInfo::Paired { o: outer_loop, i: loop_index };
                    stack.push((j, loop_index));
                }
                Some(j) if j < i => {
                    if let Some((_, inner_loop)) = stack.pop() {
                        loop_index = stack.last().map(|&(_, l)| l).unwrap_or(0);
                        table[i] = LoopInfo::Paired { o: loop_index, i: inner_loop };
                    } else {
                        return Err(StructureError::UnmatchedClose(i));
                    }
                }
                Some(_) => {
                    return Err(StructureError::SelfPaired(i));
                }
            }
        }

        if let Some((unclosed, _)) = stack.last() {
            return Err(StructureError::UnmatchedOpen(*unclosed));
        }

        Ok(LoopTable(table))
    }
}

impl fmt::Display for LoopTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let out: Vec<String> = self.0.iter().map(|info| match info {
            LoopInfo::Unpaired { l } => format!("{l}"),
            LoopInfo::Paired { o, i } => format!("{o}/{i}"),
        }).collect();
        write!(f, "[{}]", out.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_table_valid_structure() {
        let pt = PairTable::try_from("((..))").unwrap();
        let lt = LoopTable::try_from(&pt).unwrap();
        let expected = [
            LoopInfo::Paired { o: 0, i: 1 },
            LoopInfo::Paired { o: 1, i: 2 },
            LoopInfo::Unpaired { l: 2 },
            LoopInfo::Unpaired { l: 2 },
            LoopInfo::Paired { o: 1, i: 2 },
            LoopInfo::Paired { o: 0, i: 1 },
        ];
        assert_eq!(&lt[..], &expected[..]);
    }

    #[test]
    fn test_loop_table_unpaired_structure() {
        let pt = PairTable::try_from("......").unwrap();
        let lt = LoopTable::try_from(&pt).unwrap();
        for info in lt.iter() {
            assert!(matches!(info, LoopInfo::Unpaired { .. }));
        }
    }

    #[test]
    fn test_loop_table_display() {
        let lt = LoopTable(vec![
            LoopInfo::Unpaired { l: 0 },
            LoopInfo::Paired { o: 0, i: 1 },
            LoopInfo::Paired { o: 1, i: 2 },
            LoopInfo::Unpaired { l: 2 },
            LoopInfo::Paired { o: 1, i: 2 },
            LoopInfo::Paired { o: 0, i: 1 },
        ]);
        assert_eq!(format!("{lt}"), "[0, 0/1, 1/2, 2, 1/2, 0/1]");
    }
}
