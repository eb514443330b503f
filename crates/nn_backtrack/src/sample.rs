use rand::Rng;

use nn_dp::{q_terms, qb_terms, qm_terms, Block, ExteriorRule, PairRule, QmRule};
use nn_energy::{NearestNeighborModel, PfValue, Semiring};
use nn_structure::Base;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Obligation {
    Pair(usize, usize),
    Multi(usize, usize),
    Exterior(usize, usize),
}

/// `n_samples` independent Boltzmann-weighted structures plus a diagnostic
/// count of how many obligations were resolved across all of them (the
/// per-sample analogue of the shared priority-queue's "marks" bookkeeping:
/// each sample here replays the recursion on its own rather than sharing
/// partial traversal with its siblings, a simplification noted in
/// DESIGN.md).
pub struct SampleResult {
    pub samples: Vec<Vec<(usize, usize)>>,
    pub operations: usize,
}

pub fn sample(
    seq: &[Base],
    model: &NearestNeighborModel,
    min_hairpin: usize,
    block: &Block<PfValue>,
    n_samples: usize,
    rng: &mut impl Rng,
) -> SampleResult {
    sample_with_nicks(seq, &[], model, min_hairpin, block, n_samples, rng)
}

/// As `sample`, but over a multi-strand complex's concatenated sequence,
/// with `nicks` marking each strand break (see
/// `nn_structure::Complex::nick_positions`) so `qb_terms` forbids a
/// hairpin/interior loop from enclosing one.
pub fn sample_with_nicks(
    seq: &[Base],
    nicks: &[usize],
    model: &NearestNeighborModel,
    min_hairpin: usize,
    block: &Block<PfValue>,
    n_samples: usize,
    rng: &mut impl Rng,
) -> SampleResult {
    let n = seq.len();
    let mut samples = Vec::with_capacity(n_samples);
    let mut operations = 0usize;

    for _ in 0..n_samples {
        if n == 0 {
            samples.push(Vec::new());
            continue;
        }
        let mut pairs = Vec::new();
        let mut stack = vec![Obligation::Exterior(0, n - 1)];
        while let Some(ob) = stack.pop() {
            operations += 1;
            let choices = match ob {
                Obligation::Pair(i, j) => qb_terms(seq, model, min_hairpin, i, j, block, nicks)
                    .into_iter()
                    .map(|(rule, w)| {
                        let obs = match rule {
                            PairRule::Hairpin | PairRule::NickAdjacent => vec![],
                            PairRule::Interior { inner } => vec![Obligation::Pair(inner.0, inner.1)],
                            PairRule::MultiClose if i + 1 <= j.saturating_sub(1) => vec![Obligation::Multi(i + 1, j - 1)],
                            PairRule::MultiClose => vec![],
                        };
                        (vec![(i, j)], obs, w.weight())
                    })
                    .collect::<Vec<_>>(),
                Obligation::Multi(i, j) => qm_terms(model, i, j, block)
                    .into_iter()
                    .map(|(rule, w)| {
                        let obs = match rule {
                            QmRule::Carry if i + 1 <= j => vec![Obligation::Multi(i + 1, j)],
                            QmRule::Carry => vec![],
                            QmRule::Branch { k } => {
                                let mut o = vec![Obligation::Pair(i, k)];
                                if k < j {
                                    o.push(Obligation::Multi(k + 1, j));
                                }
                                o
                            }
                        };
                        (vec![], obs, w.weight())
                    })
                    .collect::<Vec<_>>(),
                Obligation::Exterior(i, j) => q_terms(seq, model, i, j, block)
                    .into_iter()
                    .map(|(rule, w)| {
                        let obs = match rule {
                            ExteriorRule::Carry if i + 1 <= j => vec![Obligation::Exterior(i + 1, j)],
                            ExteriorRule::Carry => vec![],
                            ExteriorRule::Stem { k } => {
                                let mut o = vec![Obligation::Pair(i, k)];
                                if k < j {
                                    o.push(Obligation::Exterior(k + 1, j));
                                }
                                o
                            }
                        };
                        (vec![], obs, w.weight())
                    })
                    .collect::<Vec<_>>(),
            };

            let total: f64 = choices.iter().map(|(_, _, w)| w).sum();
            if total <= 0.0 {
                continue;
            }
            let draw = rng.random_range(0.0..total);
            let mut cumulative = 0.0;
            let mut chosen = choices.len() - 1;
            for (idx, (_, _, w)) in choices.iter().enumerate() {
                cumulative += w;
                if draw < cumulative {
                    chosen = idx;
                    break;
                }
            }
            let (new_pairs, new_obs, _) = choices.into_iter().nth(chosen).unwrap();
            pairs.extend(new_pairs);
            stack.extend(new_obs);
        }
        samples.push(pairs);
    }

    SampleResult { samples, operations }
}
