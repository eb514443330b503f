//! Errors for nn_structure.
//!
//! NOTE: we communicate errors based on usize indexing, because errors
//! typically occur when we have to cast between u16 <-> usize anyway.

use std::fmt;

#[derive(Debug)]
pub enum StructureError {
    InvalidToken(String, String, usize),
    UnmatchedOpen(usize),
    UnmatchedClose(usize),
    UnmatchedMultiOpen((usize, usize)),
    UnmatchedMultiClose((usize, usize)),
    EmptyStrand(usize),
    Crossing((usize, usize), (usize, usize)),
    NotInvolutive(usize, usize),
    SelfPaired(usize),
    PairabilityViolation(usize, usize),
    MultiSelfPaired((usize, usize)),
    MultiNotInvolutive((usize, usize), (usize, usize)),
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureError::UnmatchedOpen(i) => {
                write!(f, "Unmatched '(' at position {i}")
            }
            StructureError::UnmatchedMultiOpen((si, di)) => {
                write!(f, "Unmatched '(' at strand {si}, domain {di}")
            }
            StructureError::UnmatchedClose(i) => {
                write!(f, "Unmatched ')' at position {i}")
            }
            StructureError::UnmatchedMultiClose((si, di)) => {
                write!(f, "Unmatched ')' at strand {si}, domain {di}")
            }
            StructureError::InvalidToken(tok, src, i) => {
                write!(f, "Invalid {tok} in {src} at position {i}")
            }
            StructureError::EmptyStrand(i) => {
                write!(f, "Strand {i} is empty; strands must be non-empty")
            }
            StructureError::Crossing((i, j), (p, q)) => {
                write!(f, "Pair ({i}, {j}) crosses pair ({p}, {q})")
            }
            StructureError::NotInvolutive(i, j) => {
                write!(f, "Pair list is not involutive at {i} -> {j}")
            }
            StructureError::SelfPaired(i) => {
                write!(f, "Position {i} is paired with itself")
            }
            StructureError::PairabilityViolation(i, j) => {
                write!(f, "Positions {i} and {j} cannot pair under the effective pair-ability rules")
            }
            StructureError::MultiSelfPaired((si, di)) => {
                write!(f, "Strand {si}, domain {di} is paired with itself")
            }
            StructureError::MultiNotInvolutive((si, di), (sj, dj)) => {
                write!(f, "Pair table is not involutive: ({si}, {di}) -> ({sj}, {dj}) but not the reverse")
            }
        }
    }
}

impl std::error::Error for StructureError {}
