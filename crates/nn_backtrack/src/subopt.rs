use std::cmp::Reverse;
use std::collections::BinaryHeap;

use nn_dp::{q_terms, qb_terms, qm_terms, Block, ExteriorRule, PairRule, QmRule};
use nn_energy::{MfeValue, NearestNeighborModel, Semiring};
use nn_structure::Base;

use crate::error::BacktrackError;

/// An outstanding piece of the structure still to be resolved into a
/// concrete choice of pairs, mirroring one of the three DP matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Obligation {
    Pair(usize, usize),
    Multi(usize, usize),
    Exterior(usize, usize),
}

fn bound<R: Semiring>(block: &Block<R>, ob: Obligation) -> R {
    match ob {
        Obligation::Pair(i, j) => block.get_qb(i, j),
        Obligation::Multi(i, j) => block.get_qm(i, j),
        Obligation::Exterior(i, j) => block.get_q(i, j),
    }
}

#[derive(Debug, Clone)]
struct Partial {
    obligations: Vec<Obligation>,
    pairs: Vec<(usize, usize)>,
    energy: i32,
    sequence: u64,
}

impl PartialEq for Partial {
    fn eq(&self, other: &Self) -> bool {
        self.energy == other.energy && self.sequence == other.sequence
    }
}
impl Eq for Partial {}
impl PartialOrd for Partial {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Partial {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.energy
            .cmp(&other.energy)
            .then_with(|| self.obligations.len().cmp(&other.obligations.len()))
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

/// A suboptimal structure, energy in kcal/mol.
#[derive(Debug, Clone, PartialEq)]
pub struct SuboptResult {
    pub pairs: Vec<(usize, usize)>,
    pub energy_kcal: f64,
}

/// Enumerate every non-crossing structure whose free energy lies in
/// `[mfe, mfe + gap_kcal]`, where `mfe = block.get_q(0, n-1)`. Walks the
/// same term lists the forward fill folds with `plus`, replacing one
/// outstanding obligation at a time so that a partial's `energy` field is
/// always the exact completion cost achievable from its current choices —
/// an admissible, in fact exact, priority, so results pop in non-decreasing
/// energy order and the gap cutoff is a safe early exit.
pub fn subopt(
    seq: &[Base],
    model: &NearestNeighborModel,
    min_hairpin: usize,
    block: &Block<MfeValue>,
    gap_kcal: f64,
) -> Result<Vec<SuboptResult>, BacktrackError> {
    subopt_with_nicks(seq, &[], model, min_hairpin, block, gap_kcal)
}

/// As `subopt`, but over a multi-strand complex's concatenated sequence:
/// `nicks` marks each strand break (see `nn_structure::Complex::nick_positions`)
/// so that `qb_terms` forbids a hairpin/interior loop from enclosing one.
pub fn subopt_with_nicks(
    seq: &[Base],
    nicks: &[usize],
    model: &NearestNeighborModel,
    min_hairpin: usize,
    block: &Block<MfeValue>,
    gap_kcal: f64,
) -> Result<Vec<SuboptResult>, BacktrackError> {
    let gap = (gap_kcal * 100.0).round() as i32;
    if gap < 0 {
        return Err(BacktrackError::InvalidGap(gap));
    }
    let n = seq.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    let mfe = block.get_q(0, n - 1).0;
    let ceiling = mfe + gap;

    let mut heap = BinaryHeap::new();
    let mut counter: u64 = 0;
    heap.push(Reverse(Partial {
        obligations: vec![Obligation::Exterior(0, n - 1)],
        pairs: Vec::new(),
        energy: mfe,
        sequence: counter,
    }));

    let mut results = Vec::new();
    while let Some(Reverse(partial)) = heap.pop() {
        if partial.energy > ceiling {
            continue;
        }
        let Some((&ob, rest)) = partial.obligations.split_first() else {
            results.push(SuboptResult {
                pairs: partial.pairs.clone(),
                energy_kcal: partial.energy as f64 / 100.0,
            });
            continue;
        };

        let base_energy = partial.energy - bound(block, ob).0;
        for (new_pairs, new_obligations, term_value) in expand(seq, nicks, model, min_hairpin, block, ob) {
            let energy = base_energy + term_value;
            if energy > ceiling {
                continue;
            }
            let mut obligations = new_obligations;
            obligations.extend_from_slice(rest);
            let mut pairs = partial.pairs.clone();
            pairs.extend(new_pairs);
            counter += 1;
            heap.push(Reverse(Partial { obligations, pairs, energy, sequence: counter }));
        }
    }

    if results.is_empty() {
        return Err(BacktrackError::EmptyQueue);
    }
    results.sort_by(|a, b| a.energy_kcal.partial_cmp(&b.energy_kcal).unwrap());
    Ok(results)
}

/// Every way to resolve `ob` into a concrete choice: the pairs it fixes,
/// the new obligations it leaves outstanding, and the total centi-kcal
/// cost of this choice (already including every sub-obligation's bound).
fn expand(
    seq: &[Base],
    nicks: &[usize],
    model: &NearestNeighborModel,
    min_hairpin: usize,
    block: &Block<MfeValue>,
    ob: Obligation,
) -> Vec<(Vec<(usize, usize)>, Vec<Obligation>, i32)> {
    match ob {
        Obligation::Pair(i, j) => qb_terms(seq, model, min_hairpin, i, j, block, nicks)
            .into_iter()
            .map(|(rule, value)| {
                let obligations = match rule {
                    PairRule::Hairpin | PairRule::NickAdjacent => vec![],
                    PairRule::Interior { inner } => vec![Obligation::Pair(inner.0, inner.1)],
                    PairRule::MultiClose => {
                        if i + 1 <= j.saturating_sub(1) {
                            vec![Obligation::Multi(i + 1, j - 1)]
                        } else {
                            vec![]
                        }
                    }
                };
                (vec![(i, j)], obligations, value.0)
            })
            .collect(),
        Obligation::Multi(i, j) => qm_terms(model, i, j, block)
            .into_iter()
            .map(|(rule, value)| {
                let obligations = match rule {
                    QmRule::Carry => {
                        if i + 1 <= j {
                            vec![Obligation::Multi(i + 1, j)]
                        } else {
                            vec![]
                        }
                    }
                    QmRule::Branch { k } => {
                        let mut obs = vec![Obligation::Pair(i, k)];
                        if k < j {
                            obs.push(Obligation::Multi(k + 1, j));
                        }
                        obs
                    }
                };
                (vec![], obligations, value.0)
            })
            .collect(),
        Obligation::Exterior(i, j) => q_terms(seq, model, i, j, block)
            .into_iter()
            .map(|(rule, value)| {
                let obligations = match rule {
                    ExteriorRule::Carry => {
                        if i + 1 <= j {
                            vec![Obligation::Exterior(i + 1, j)]
                        } else {
                            vec![]
                        }
                    }
                    ExteriorRule::Stem { k } => {
                        let mut obs = vec![Obligation::Pair(i, k)];
                        if k < j {
                            obs.push(Obligation::Exterior(k + 1, j));
                        }
                        obs
                    }
                };
                (vec![], obligations, value.0)
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nn_dp::{fill, SequentialEnvironment};
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
    fn test_subopt_includes_mfe_structure() {
        let seq = vec![C, G, A, A, A, C, G];
        let m = model();
        let block = fill::<MfeValue, _>(&seq, &m, 3, &SequentialEnvironment).unwrap();
        let results = subopt(&seq, &m, 3, &block, 0.0).unwrap();
        assert!(!results.is_empty());
        let mfe = block.get_q(0, 6).0 as f64 / 100.0;
        assert!((results[0].energy_kcal - mfe).abs() < 1e-6);
    }

    #[test]
    fn test_subopt_results_sorted_and_within_gap() {
        let seq = vec![C, G, A, A, A, C, G];
        let m = model();
        let block = fill::<MfeValue, _>(&seq, &m, 3, &SequentialEnvironment).unwrap();
        let mfe = block.get_q(0, 6).0 as f64 / 100.0;
        let results = subopt(&seq, &m, 3, &block, 2.0).unwrap();
        for pair in results.windows(2) {
            assert!(pair[0].energy_kcal <= pair[1].energy_kcal);
        }
        for r in &results {
            assert!(r.energy_kcal <= mfe + 2.0 + 1e-6);
        }
    }

    #[test]
    fn test_subopt_rejects_negative_gap() {
        let seq = vec![C, G, A, A, A, C, G];
        let m = model();
        let block = fill::<MfeValue, _>(&seq, &m, 3, &SequentialEnvironment).unwrap();
        assert!(matches!(subopt(&seq, &m, 3, &block, -1.0), Err(BacktrackError::InvalidGap(_))));
    }
}
