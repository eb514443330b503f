use nn_dp::{flank_blocks_nick, terminal_penalty_energy, Block, EnergyAdapter, MAX_INTERIOR_UNPAIRED};
use nn_energy::{CachedModel, EnergyModel, MfeValue, NearestNeighborLoop, NearestNeighborModel, PfValue, Semiring};
use nn_structure::Base;

/// Outside-algorithm accumulator, one entry per matrix per `(i, j)` cell.
/// Mirrors `nn_dp::Block`'s shape; computed by propagating outside mass
/// from long spans to the shorter spans their recursion terms reference.
///
/// NUPACK computes pair probabilities via a duplicated-sequence `QB`
/// construction (fold a second copy of the sequence through the same
/// recursion and read specific cross-copy cells); that trick depends on an
/// index convention defined by its tensor layer that isn't reproducible
/// from the distilled description alone. This module computes the same
/// marginal probabilities with a textbook inside-outside pass over the
/// existing `qb`/`qm`/`q` term lists instead — same result, self-contained
/// derivation.
struct OutsideBlock<R: Semiring> {
    n: usize,
    q: Vec<R>,
    qb: Vec<R>,
    qm: Vec<R>,
    qms: Vec<R>,
}

impl<R: Semiring> OutsideBlock<R> {
    fn new(n: usize) -> Self {
        let cells = n * n;
        OutsideBlock { n, q: vec![R::zero(); cells], qb: vec![R::zero(); cells], qm: vec![R::zero(); cells], qms: vec![R::zero(); cells] }
    }
    #[inline]
    fn idx(&self, i: usize, j: usize) -> usize {
        i * self.n + j
    }
    fn get_q(&self, i: usize, j: usize) -> R {
        self.q[self.idx(i, j)]
    }
    fn get_qb(&self, i: usize, j: usize) -> R {
        self.qb[self.idx(i, j)]
    }
    fn get_qm(&self, i: usize, j: usize) -> R {
        self.qm[self.idx(i, j)]
    }
    fn get_qms(&self, i: usize, j: usize) -> R {
        self.qms[self.idx(i, j)]
    }
    fn add_q(&mut self, i: usize, j: usize, v: R) {
        let k = self.idx(i, j);
        self.q[k] = self.q[k].plus(v);
    }
    fn add_qb(&mut self, i: usize, j: usize, v: R) {
        let k = self.idx(i, j);
        self.qb[k] = self.qb[k].plus(v);
    }
    fn add_qm(&mut self, i: usize, j: usize, v: R) {
        let k = self.idx(i, j);
        self.qm[k] = self.qm[k].plus(v);
    }
    fn add_qms(&mut self, i: usize, j: usize, v: R) {
        let k = self.idx(i, j);
        self.qms[k] = self.qms[k].plus(v);
    }
}

/// For each `(i, j)`, returns the outside value of `QB(i, j)` including
/// the pass-through contribution from `QMS(i, j)` (which is just `QB(i,
/// j)` scaled by a constant, so any consumer of `QMS` is equally a
/// consumer of `QB`).
fn outside_pass<R: Semiring>(seq: &[Base], nicks: &[usize], model: &NearestNeighborModel, inside: &Block<R>) -> OutsideBlock<R>
where
    CachedModel: EnergyAdapter<R>,
{
    let n = inside.n;
    let mut outside = OutsideBlock::new(n);
    if n == 0 {
        return outside;
    }
    outside.add_q(0, n - 1, R::one());

    for d in (0..n).rev() {
        for i in 0..(n - d) {
            let j = i + d;

            let oq = outside.get_q(i, j);
            if i + 1 <= j {
                outside.add_q(i + 1, j, oq);
            }
            for k in i..=j {
                let term = model.model.term(terminal_penalty_energy(model, seq, i, k) + model.model.params().join_penalty);
                let qb_ik = inside.get_qb(i, k);
                let rest = if k == j { R::one() } else { inside.get_q(k + 1, j) };
                outside.add_qb(i, k, oq.times(term).times(rest));
                if k < j {
                    outside.add_q(k + 1, j, oq.times(term).times(qb_ik));
                }
            }

            let oqm = outside.get_qm(i, j);
            if i + 1 <= j {
                outside.add_qm(i + 1, j, oqm.times(model.model.term(model.model.params().multi_base)));
            }
            for k in i..=j {
                let stem = inside.get_qms(i, k);
                let rest = if k == j { R::one() } else { inside.get_qm(k + 1, j) };
                outside.add_qms(i, k, oqm.times(rest));
                if k < j {
                    outside.add_qm(k + 1, j, oqm.times(stem));
                }
            }

            if model.can_pair(seq[i], seq[j]) {
                let term_ms = model.model.term(model.model.params().multi_pair + terminal_penalty_energy(model, seq, i, j));
                let oqb_total = outside.get_qb(i, j).plus(outside.get_qms(i, j).times(term_ms));

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
                        outside.add_qb(p, q, oqb_total.times(model.model.term(e)));
                    }
                }
                if i + 1 <= j.saturating_sub(1) {
                    let multi_init = model.model.term(model.model.params().multi_init);
                    outside.add_qm(i + 1, j - 1, oqb_total.times(multi_init));
                }

                // Store the completed total back so the caller can read it
                // once the whole pass is done (this cell's span will never
                // be visited again).
                let k = outside.idx(i, j);
                outside.qb[k] = oqb_total;
            }
        }
    }
    outside
}

/// Dense pair-probability matrix: `matrix[i*n+j]` for `i != j` is `P(i,
/// j)`, `matrix[i*n+i]` is the probability base `i` is unpaired.
pub struct PairProbabilities {
    pub n: usize,
    matrix: Vec<f64>,
}

impl PairProbabilities {
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.matrix[i * self.n + j]
    }

    /// The trivial matrix for a sequence too short to form any pair:
    /// every base unpaired with certainty.
    pub fn identity(n: usize) -> PairProbabilities {
        let mut matrix = vec![0.0; n * n];
        for i in 0..n {
            matrix[i * n + i] = 1.0;
        }
        PairProbabilities { n, matrix }
    }
}

pub fn pair_probabilities(seq: &[Base], model: &NearestNeighborModel, inside: &Block<PfValue>) -> PairProbabilities {
    pair_probabilities_with_nicks(seq, &[], model, inside)
}

/// As `pair_probabilities`, but over a multi-strand complex's concatenated
/// sequence, with `nicks` marking each strand break (see
/// `nn_structure::Complex::nick_positions`).
pub fn pair_probabilities_with_nicks(
    seq: &[Base],
    nicks: &[usize],
    model: &NearestNeighborModel,
    inside: &Block<PfValue>,
) -> PairProbabilities {
    let n = inside.n;
    let outside = outside_pass(seq, nicks, model, inside);
    let q_total = inside.get_q(0, n.max(1) - 1).weight().max(f64::MIN_POSITIVE);

    let mut matrix = vec![0.0; n * n];
    for i in 0..n {
        for j in (i + 1)..n {
            if !model.can_pair(seq[i], seq[j]) {
                continue;
            }
            let oqb = outside.get_qb(i, j);
            let p = inside.get_qb(i, j).times(oqb).weight() / q_total;
            matrix[i * n + j] = p;
            matrix[j * n + i] = p;
        }
    }
    for i in 0..n {
        let unpaired = 1.0 - (0..n).map(|j| matrix[i * n + j]).sum::<f64>();
        matrix[i * n + i] = unpaired.max(0.0);
    }
    PairProbabilities { n, matrix }
}

/// The MFE-ring analogue: `cost(i, j) = mfe(given i, j paired) - mfe`, in
/// kcal/mol. `f64::INFINITY` where `(i, j)` cannot pair in any structure.
pub struct PairMfeCost {
    pub n: usize,
    matrix: Vec<f64>,
}

impl PairMfeCost {
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.matrix[i * self.n + j]
    }

    /// The trivial cost table for a sequence too short to form any pair.
    pub fn unpairable(n: usize) -> PairMfeCost {
        let mut matrix = vec![f64::INFINITY; n * n];
        for i in 0..n {
            matrix[i * n + i] = 0.0;
        }
        PairMfeCost { n, matrix }
    }
}

pub fn pair_mfe_cost(seq: &[Base], model: &NearestNeighborModel, inside: &Block<MfeValue>) -> PairMfeCost {
    pair_mfe_cost_with_nicks(seq, &[], model, inside)
}

/// As `pair_mfe_cost`, but over a multi-strand complex's concatenated
/// sequence, with `nicks` marking each strand break (see
/// `nn_structure::Complex::nick_positions`).
pub fn pair_mfe_cost_with_nicks(seq: &[Base], nicks: &[usize], model: &NearestNeighborModel, inside: &Block<MfeValue>) -> PairMfeCost {
    let n = inside.n;
    let outside = outside_pass(seq, nicks, model, inside);
    let mfe = inside.get_q(0, n.max(1) - 1).0;

    let mut matrix = vec![f64::INFINITY; n * n];
    for i in 0..n {
        for j in (i + 1)..n {
            if !model.can_pair(seq[i], seq[j]) {
                continue;
            }
            let oqb = outside.get_qb(i, j);
            let cost = (inside.get_qb(i, j).times(oqb).0 - mfe) as f64 / 100.0;
            matrix[i * n + j] = cost;
            matrix[j * n + i] = cost;
        }
        matrix[i * n + i] = 0.0;
    }
    PairMfeCost { n, matrix }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nn_dp::{fill, SequentialEnvironment};
    use nn_energy::ModelConditions;
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
    fn test_pair_probability_rows_sum_to_one() {
        let seq = vec![C, G, A, A, A, C, G];
        let m = model();
        let block = fill::<PfValue, _>(&seq, &m, 3, &SequentialEnvironment).unwrap();
        let pp = pair_probabilities(&seq, &m, &block);
        for i in 0..seq.len() {
            let row_sum: f64 = (0..seq.len()).map(|j| pp.get(i, j)).sum();
            assert!((row_sum - 1.0).abs() < 1e-6, "row {i} sums to {row_sum}");
        }
    }

    #[test]
    fn test_pair_probability_symmetric() {
        let seq = vec![C, G, A, A, A, C, G];
        let m = model();
        let block = fill::<PfValue, _>(&seq, &m, 3, &SequentialEnvironment).unwrap();
        let pp = pair_probabilities(&seq, &m, &block);
        assert_eq!(pp.get(0, 6), pp.get(6, 0));
    }

    #[test]
    fn test_mfe_cost_zero_for_the_mfe_pair() {
        let seq = vec![C, G, A, A, A, C, G];
        let m = model();
        let block = fill::<MfeValue, _>(&seq, &m, 3, &SequentialEnvironment).unwrap();
        let cost = pair_mfe_cost(&seq, &m, &block);
        assert!(cost.get(0, 6) <= 1e-6);
        assert!(cost.get(0, 6) >= -1e-6);
    }
}
