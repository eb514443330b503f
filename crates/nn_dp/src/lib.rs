mod error;

/// The per-complex DP matrices (`q`, `qb`, `qm`, `qms`).
mod block;

/// How the cells of one anti-diagonal get evaluated: parallel or sequential.
mod environment;

/// LRU cache of evaluated blocks, keyed by a complex's canonical form.
mod cache;

/// The semiring-generic fill recursion over loop decompositions.
mod recursion;

pub use error::DpError;
pub use block::Block;
pub use environment::{Environment, RayonEnvironment, SequentialEnvironment};
pub use cache::{BlockCache, StorageMode};
pub use recursion::{
    fill, fill_with_nicks, flank_blocks_nick, q_terms, qb_terms, qm_terms, terminal_penalty_energy, EnergyAdapter,
    ExteriorRule, PairRule, QmRule, MAX_INTERIOR_UNPAIRED,
};
