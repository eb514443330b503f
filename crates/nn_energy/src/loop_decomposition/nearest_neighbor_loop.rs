use std::fmt;
use std::ops::Range;
use colored::*;

/// A single nearest-neighbor loop: the unit of energy decomposition for a
/// secondary structure. `closing` and `inner`/`branches` pairs are always
/// `(i, j)` with `i < j`; branch lists are always in 5'->3' order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NearestNeighborLoop {
    Hairpin {
        closing: (usize, usize),
    },
    Interior {
        closing: (usize, usize),
        inner: (usize, usize),
    },
    Multibranch {
        closing: (usize, usize),
        branches: Vec<(usize, usize)>,
    },
    Exterior {
        branches: Vec<(usize, usize)>,
    },
}

impl fmt::Display for NearestNeighborLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NearestNeighborLoop::Hairpin { closing: (i, j) } => {
                write!(f, "{:<8} ({:>3}, {:>3})", "Hairpin".cyan(), i, j)
            }
            NearestNeighborLoop::Interior { closing: (i, j), inner: (p, q) } => {
                write!(f, "{:<8} ({:>3}, {:>3}), ({:>3}, {:>3})", "Interior".cyan(), i, j, p, q)
            }
            NearestNeighborLoop::Multibranch { closing: (i, j), branches } => {
                write!(f, "{:<8} ({:>3}, {:>3}), {}",
                    "Multibr.".cyan().bold(), i, j,
                    branches.iter()
                        .map(|(i, j)| format!("[{:>3}, {:>3}]", i, j))
                        .collect::<Vec<_>>()
                        .join(", "))
            }
            NearestNeighborLoop::Exterior { branches } => {
                write!(f, "{:<8}             {}",
                    "Exterior".cyan().bold(),
                    branches.iter()
                        .map(|(i, j)| format!("[{:>3}, {:>3}]", i, j))
                        .collect::<Vec<_>>()
                        .join(", "))
            }
        }
    }
}

impl NearestNeighborLoop {
    /// All base pairs (closing, inner, and/or branches) contained in this loop.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        match self {
            NearestNeighborLoop::Hairpin { closing } => vec![*closing],
            NearestNeighborLoop::Interior { closing, inner } => vec![*closing, *inner],
            NearestNeighborLoop::Multibranch { closing, branches } => {
                let mut pairs = Vec::with_capacity(1 + branches.len());
                pairs.push(*closing);
                pairs.extend(branches.iter().cloned());
                pairs
            }
            NearestNeighborLoop::Exterior { branches } => branches.clone(),
        }
    }

    pub fn classify(closing: Option<(usize, usize)>, branches: Vec<(usize, usize)>) -> Self {
        match closing {
            None => Self::Exterior { branches },
            Some((i, j)) => match branches.len() {
                0 => Self::Hairpin { closing: (i, j) },
                1 => Self::Interior { closing: (i, j), inner: branches[0] },
                _ => Self::Multibranch { closing: (i, j), branches },
            },
        }
    }

    pub fn closing(&self) -> Option<(usize, usize)> {
        match self {
            Self::Hairpin { closing } | Self::Interior { closing, .. } | Self::Multibranch { closing, .. } => Some(*closing),
            Self::Exterior { .. } => None,
        }
    }

    pub fn branch_count(&self) -> usize {
        match self {
            Self::Hairpin { .. } => 0,
            Self::Interior { .. } => 1,
            Self::Multibranch { branches, .. } => branches.len(),
            Self::Exterior { branches } => branches.len(),
        }
    }

    fn unpaired_ranges(&self, len: usize) -> Vec<Range<usize>> {
        match self {
            Self::Hairpin { closing: (i, j) } => vec![(*i + 1)..*j],
            Self::Interior { closing: (i, j), inner: (p, q) } => vec![(*i + 1)..*p, (*q + 1)..*j],
            Self::Multibranch { closing: (i, j), branches } => {
                let mut result = vec![];
                let mut start = *i;
                for &(p, q) in branches {
                    result.push((start + 1)..p);
                    start = q;
                }
                result.push((start + 1)..*j);
                result
            }
            Self::Exterior { branches } => {
                let mut result = Vec::new();
                let mut start = 0;
                for &(p, q) in branches {
                    result.push(start..p);
                    start = q + 1;
                }
                result.push(start..len);
                result
            }
        }
    }

    pub fn unpaired_indices(&self, len: usize) -> Vec<usize> {
        self.unpaired_ranges(len).into_iter().flat_map(|r| r.collect::<Vec<_>>()).collect()
    }

    /// Total number of unpaired bases enclosed directly by this loop.
    pub fn unpaired_count(&self, len: usize) -> usize {
        self.unpaired_ranges(len).into_iter().map(|r| r.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_hairpin() {
        let l = NearestNeighborLoop::classify(Some((1, 5)), vec![]);
        assert_eq!(l, NearestNeighborLoop::Hairpin { closing: (1, 5) });
    }

    #[test]
    fn test_classify_interior() {
        let l = NearestNeighborLoop::classify(Some((1, 9)), vec![(3, 6)]);
        assert_eq!(l, NearestNeighborLoop::Interior { closing: (1, 9), inner: (3, 6) });
    }

    #[test]
    fn test_unpaired_indices_hairpin() {
        let l = NearestNeighborLoop::Hairpin { closing: (1, 5) };
        assert_eq!(l.unpaired_indices(10), vec![2, 3, 4]);
    }

    #[test]
    fn test_unpaired_indices_exterior() {
        let l = NearestNeighborLoop::Exterior { branches: vec![(1, 5), (6, 8)] };
        assert_eq!(l.unpaired_indices(10), vec![0, 5, 9]);
    }
}
