use nn_energy::{CachedModel, EnergyModel, MfeValue, NearestNeighborLoop, NearestNeighborModel, PfValue, Semiring};
use nn_structure::Base;

use crate::block::Block;
use crate::environment::Environment;
use crate::error::DpError;

/// Total unpaired bases (both sides) beyond which an interior loop is no
/// longer enumerated exactly; matches the size table's tabulated cap.
pub const MAX_INTERIOR_UNPAIRED: usize = 30;

/// Converts a free-energy term (kcal/mol) into the ring's native value:
/// a Boltzmann weight for `PfValue`, a centi-kcal integer for `MfeValue`.
pub trait EnergyAdapter<R: Semiring> {
    fn term(&self, dg_kcal: f64) -> R;
}

impl EnergyAdapter<PfValue> for CachedModel {
    fn term(&self, dg_kcal: f64) -> PfValue {
        PfValue::from_boltzmann(self.boltz(dg_kcal))
    }
}

impl EnergyAdapter<MfeValue> for CachedModel {
    fn term(&self, dg_kcal: f64) -> MfeValue {
        MfeValue((dg_kcal * 100.0).round() as i32)
    }
}

/// `R::one()` for an empty (i > j) range, the stored value otherwise.
/// Lets the exterior/multiloop recursions treat "nothing left to the
/// right" uniformly instead of special-casing the range boundary.
fn q_or_empty<R: Semiring>(block: &Block<R>, i: usize, j: usize) -> R {
    if i > j {
        R::one()
    } else {
        block.get_q(i, j)
    }
}

fn qm_or_empty<R: Semiring>(block: &Block<R>, i: usize, j: usize) -> R {
    if i > j {
        R::zero()
    } else {
        block.get_qm(i, j)
    }
}

struct Cell<R: Semiring> {
    q: R,
    qb: R,
    qm: R,
    qms: R,
}

/// The ways a pair `(i, j)` can close a structure, i.e. one term of the
/// `plus` that builds `QB(i, j)`. Forward evaluation folds these with
/// `Semiring::plus`; backtracking (`nn_backtrack`) walks the same list to
/// recover which closure a sampled or enumerated structure took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairRule {
    Hairpin,
    Interior { inner: (usize, usize) },
    MultiClose,
    /// `(i, j) = (i, i + 1)` pair directly across a strand break: two
    /// bases from different strands stacking with nothing enclosed
    /// between them, valid only because there is no backbone requiring
    /// continuity there. Contributes no additional loop energy beyond
    /// whatever stack term the enclosing interior loop already charges.
    NickAdjacent,
}

/// True iff the backbone path from `a` to `b` (`a < b`) crosses one of
/// `nicks`, invalidating a hairpin/bulge/interior loop that would need
/// that stretch to be one continuous, covalently-linked strand. A path
/// with nothing enclosed (`b == a + 1`) is never invalidated: two
/// directly stacked bases need no backbone between them, nicked or not.
pub fn flank_blocks_nick(nicks: &[usize], a: usize, b: usize) -> bool {
    if b <= a + 1 {
        return false;
    }
    nicks.iter().any(|&p| p > a && p <= b)
}

/// One term of the `plus` that builds `QM(i, j)`: either no branch starts
/// at `i` (carry `QM(i+1, j)`), or a branch starts exactly at `i` and ends
/// at `k` (`QMS(i, k)` times whatever follows).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QmRule {
    Carry,
    Branch { k: usize },
}

/// One term of the `plus` that builds `Q(i, j)`: either position `i` is
/// unpaired (carry `Q(i+1, j)`), or a stem occupies `(i, k)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExteriorRule {
    Carry,
    Stem { k: usize },
}

/// Every term contributing to `QB(i, j)`, paired with its ring value.
/// Shared by the forward fill (which folds them with `plus`) and by
/// backtracking (which enumerates them directly).
pub fn qb_terms<R: Semiring>(
    seq: &[Base],
    model: &NearestNeighborModel,
    min_hairpin: usize,
    i: usize,
    j: usize,
    block: &Block<R>,
    nicks: &[usize],
) -> Vec<(PairRule, R)>
where
    CachedModel: EnergyAdapter<R>,
{
    let mut terms = Vec::new();
    if !model.can_pair(seq[i], seq[j]) {
        return terms;
    }

    if j == i + 1 {
        if nicks.contains(&j) {
            terms.push((PairRule::NickAdjacent, R::one()));
        }
        return terms;
    }

    let hairpin_size = j - i - 1;
    if hairpin_size >= min_hairpin && !flank_blocks_nick(nicks, i, j) {
        let e = model.energy_of_loop(seq, &NearestNeighborLoop::Hairpin { closing: (i, j) });
        terms.push((PairRule::Hairpin, model.model.term(e)));
    }

    let max_p = (i + 1 + MAX_INTERIOR_UNPAIRED).min(j.saturating_sub(2));
    for p in (i + 1)..=max_p {
        if flank_blocks_nick(nicks, i, p) {
            continue;
        }
        let n1 = p - i - 1;
        let max_n2 = MAX_INTERIOR_UNPAIRED - n1;
        let q_upper = (p + 1 + max_n2).min(j - 1);
        for q in (p + 1)..=q_upper {
            if !model.can_pair(seq[p], seq[q]) || flank_blocks_nick(nicks, q, j) {
                continue;
            }
            let e = model.energy_of_loop(seq, &NearestNeighborLoop::Interior { closing: (i, j), inner: (p, q) });
            let term = model.model.term(e).times(block.get_qb(p, q));
            terms.push((PairRule::Interior { inner: (p, q) }, term));
        }
    }

    let multi_init = model.model.term(model.model.params().multi_init);
    let term = multi_init.times(qm_or_empty(block, i + 1, j.saturating_sub(1)));
    terms.push((PairRule::MultiClose, term));

    terms
}

/// Every term contributing to `QM(i, j)`.
pub fn qm_terms<R: Semiring>(model: &NearestNeighborModel, i: usize, j: usize, block: &Block<R>) -> Vec<(QmRule, R)>
where
    CachedModel: EnergyAdapter<R>,
{
    let mut terms = vec![(QmRule::Carry, qm_or_empty(block, i + 1, j).times(model.model.term(model.model.params().multi_base)))];
    for k in i..=j {
        let stem = qms_at(block, i, k);
        let rest = if k == j { R::one() } else { qm_or_empty(block, k + 1, j) };
        terms.push((QmRule::Branch { k }, stem.times(rest)));
    }
    terms
}

/// Every term contributing to `Q(i, j)`, the exterior-loop recursion.
pub fn q_terms<R: Semiring>(seq: &[Base], model: &NearestNeighborModel, i: usize, j: usize, block: &Block<R>) -> Vec<(ExteriorRule, R)>
where
    CachedModel: EnergyAdapter<R>,
{
    let mut terms = vec![(ExteriorRule::Carry, q_or_empty(block, i + 1, j))];
    for k in i..=j {
        let stem_qb = block.get_qb(i, k);
        let stem = stem_qb.times(model.model.term(terminal_penalty_energy(model, seq, i, k) + model.model.params().join_penalty));
        let rest = if k == j { R::one() } else { q_or_empty(block, k + 1, j) };
        terms.push((ExteriorRule::Stem { k }, stem.times(rest)));
    }
    terms
}

fn fold_terms<T, R: Semiring>(terms: &[(T, R)]) -> R {
    terms.iter().fold(R::zero(), |acc, (_, v)| acc.plus(*v))
}

fn compute_cell<R: Semiring>(
    seq: &[Base],
    model: &NearestNeighborModel,
    min_hairpin: usize,
    i: usize,
    j: usize,
    block: &Block<R>,
    nicks: &[usize],
) -> Cell<R>
where
    CachedModel: EnergyAdapter<R>,
{
    let qb = fold_terms(&qb_terms(seq, model, min_hairpin, i, j, block, nicks));
    let qms = qb.times(model.model.term(model.model.params().multi_pair + terminal_penalty_energy(model, seq, i, j)));
    let qm = fold_terms(&qm_terms(model, i, j, block));
    let q = fold_terms(&q_terms(seq, model, i, j, block));

    Cell { q, qb, qm, qms }
}

fn qms_at<R: Semiring>(block: &Block<R>, i: usize, k: usize) -> R {
    if k < i {
        R::zero()
    } else {
        block.get_qms(i, k)
    }
}

pub fn terminal_penalty_energy(model: &NearestNeighborModel, seq: &[Base], i: usize, j: usize) -> f64 {
    model.model.params().terminal_penalty[nn_params::motif_index(&[seq[i].index(), seq[j].index()])]
}

/// Fill every matrix of `block` by increasing span length, parallelizing
/// each anti-diagonal's cells via `env`. Equivalent to `fill_with_nicks`
/// with an empty nick set, for the (common) single-strand case.
pub fn fill<R, E>(seq: &[Base], model: &NearestNeighborModel, min_hairpin: usize, env: &E) -> Result<Block<R>, DpError>
where
    R: Semiring + Send + Sync,
    CachedModel: EnergyAdapter<R>,
    E: Environment,
{
    fill_with_nicks(seq, &[], model, min_hairpin, env)
}

/// Fill every matrix of `block` over `seq`, a strand break immediately
/// before each index in `nicks` (see `nn_structure::Complex::nick_positions`):
/// hairpin/bulge/interior loops may not enclose a nick, but the
/// multiloop and exterior recursions are otherwise unchanged -- the same
/// algorithm single-strand folding uses, just with some `QB` closures
/// disallowed (Dirks & Pierce's nick-augmented recursion for interacting
/// multi-strand complexes).
pub fn fill_with_nicks<R, E>(
    seq: &[Base],
    nicks: &[usize],
    model: &NearestNeighborModel,
    min_hairpin: usize,
    env: &E,
) -> Result<Block<R>, DpError>
where
    R: Semiring + Send + Sync,
    CachedModel: EnergyAdapter<R>,
    E: Environment,
{
    let n = seq.len();
    if n < min_hairpin + 2 {
        return Err(DpError::TooShort { len: n, min_hairpin });
    }

    let mut block: Block<R> = Block::new(n);
    model.model.reserve(n);

    for d in 0..n {
        let indices: Vec<usize> = (0..n - d).collect();
        let results = env.map(&indices, |i| {
            let j = i + d;
            compute_cell(seq, model, min_hairpin, i, j, &block, nicks)
        });
        // An anti-diagonal is finalized as a unit: every cell is checked for
        // overflow before any of them is written into `block`, so a failing
        // diagonal never leaves partially-written state for the scheduler to
        // retry from (spec 4.5 "the entire anti-diagonal is considered
        // failed"). There is only one scalar width here, so "retry with a
        // wider type" degenerates to propagating the capacity error — see
        // DESIGN.md for why a second width was not implemented.
        if results.iter().any(|c| c.q.is_overflow() || c.qb.is_overflow() || c.qm.is_overflow() || c.qms.is_overflow()) {
            return Err(DpError::Overflow { diagonal: d });
        }
        for (k, &i) in indices.iter().enumerate() {
            let j = i + d;
            block.set_q(i, j, results[k].q);
            block.set_qb(i, j, results[k].qb);
            block.set_qm(i, j, results[k].qm);
            block.set_qms(i, j, results[k].qms);
        }
    }
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::SequentialEnvironment;
    use nn_energy::{CachedModel, ModelConditions};
    use nn_params::ParameterSet;
    use nn_structure::Base::*;

    fn model() -> NearestNeighborModel {
        let json = r#"{
            "dG": {
                "stack": {"CGCG": -2.36, "GCGC": -3.26},
                "hairpin_size": [5.4,5.4,5.4,5.4,5.4,4.4,4.3,4.1,4.1,4.2,
                    4.3,4.4,4.5,4.6,4.6,4.7,4.8,4.8,4.9,4.9,5.0,5.0,5.0,5.1,5.1,5.1,5.2,5.2,5.2,5.3,5.3],
                "multi_init": 3.4, "multi_pair": -0.1, "multi_base": 0.2, "join_penalty": 0.0
            },
            "dH": {},
            "material": "rna"
        }"#;
        let ps = ParameterSet::from_json(json).unwrap();
        let cached = CachedModel::new(&ps, ModelConditions::default());
        NearestNeighborModel::new(cached, 3)
    }

    #[test]
    fn test_fill_produces_nonzero_pf_for_hairpin() {
        let seq = vec![C, G, A, A, A, C, G];
        let m = model();
        let block: Block<PfValue> = fill(&seq, &m, 3, &SequentialEnvironment).unwrap();
        assert!(block.get_q(0, 6).weight() >= 1.0);
        assert!(block.get_qb(0, 6).weight() > 0.0);
    }

    #[test]
    fn test_fill_mfe_ring_is_finite() {
        let seq = vec![C, G, A, A, A, C, G];
        let m = model();
        let block: Block<MfeValue> = fill(&seq, &m, 3, &SequentialEnvironment).unwrap();
        assert!(block.get_qb(0, 6).0 < MfeValue::INFEASIBLE);
    }

    #[test]
    fn test_qb_terms_sum_matches_filled_qb() {
        let seq = vec![C, G, A, A, A, C, G];
        let m = model();
        let block: Block<PfValue> = fill(&seq, &m, 3, &SequentialEnvironment).unwrap();
        let terms = qb_terms(&seq, &m, 3, 0, 6, &block, &[]);
        let summed = fold_terms(&terms);
        assert_eq!(summed.weight(), block.get_qb(0, 6).weight());
        assert!(terms.iter().any(|(rule, _)| matches!(rule, PairRule::Hairpin)));
    }

    #[test]
    fn test_fill_does_not_overflow_on_ordinary_sequences() {
        // Every Q/QB/QM/QMS cell stays finite and non-overflowing for a
        // sequence well within the scalar's dynamic range; `fill` should
        // never take the `DpError::Overflow` branch here.
        let seq = vec![C, G, A, A, A, C, G];
        let m = model();
        let block: Block<PfValue> = fill(&seq, &m, 3, &SequentialEnvironment).unwrap();
        assert!(!block.get_q(0, 6).is_overflow());
    }

    #[test]
    fn test_fill_rejects_too_short_sequence() {
        let seq = vec![C, G];
        let m = model();
        let err = fill::<PfValue, _>(&seq, &m, 3, &SequentialEnvironment).unwrap_err();
        assert!(matches!(err, DpError::TooShort { .. }));
    }

    #[test]
    fn test_nick_adjacent_pair_needs_no_enclosed_loop() {
        // A-C-G-U / A-C-G-U: two complementary strands that duplex with no
        // enclosed hairpin loop at all, stacking straight through the nick
        // between position 3 and 4.
        let seq = vec![A, C, G, U, A, C, G, U];
        let m = model();
        let terms = qb_terms(&seq, &m, 3, 3, 4, &Block::<PfValue>::new(8), &[4]);
        assert!(terms.iter().any(|(rule, _)| matches!(rule, PairRule::NickAdjacent)));
    }

    #[test]
    fn test_nick_without_adjacency_still_blocks_hairpin() {
        // A pair enclosing a real gap between unpaired bases on either
        // side of a nick cannot form a hairpin: there is no continuous
        // backbone for the loop.
        let seq = vec![C, G, A, A, A, C, G];
        let m = model();
        let block = Block::<PfValue>::new(7);
        let with_nick = qb_terms(&seq, &m, 3, 0, 6, &block, &[3]);
        assert!(!with_nick.iter().any(|(rule, _)| matches!(rule, PairRule::Hairpin)));
        let without_nick = qb_terms(&seq, &m, 3, 0, 6, &block, &[]);
        assert!(without_nick.iter().any(|(rule, _)| matches!(rule, PairRule::Hairpin)));
    }

    #[test]
    fn test_fill_with_nicks_folds_a_duplex() {
        let seq = vec![A, C, G, U, A, C, G, U];
        let m = model();
        let block: Block<PfValue> = fill_with_nicks(&seq, &[4], &m, 3, &SequentialEnvironment).unwrap();
        assert!(block.get_q(0, 7).weight() > 1.0);
        assert!(block.get_qb(0, 7).weight() > 0.0);
    }
}
