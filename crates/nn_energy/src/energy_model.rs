use nn_params::motif_index;
use nn_structure::Base;

use crate::cached_model::CachedModel;
use crate::config::ModelConditions;
use crate::loop_decomposition::{LoopDecomposition, NearestNeighborLoop};

/// Per-loop and whole-structure free energy evaluation. `nn_dp` computes
/// the ensemble over all structures by recursion; this trait evaluates a
/// single, already-decided structure, which is what backtracking and
/// integration tests check their answers against.
pub trait EnergyModel {
    fn can_pair(&self, b1: Base, b2: Base) -> bool;

    /// Whether `(b1, b2)` may close a loop (hairpin, interior, or
    /// multiloop) -- distinct from `can_pair` when `wobble_closing` is
    /// false but `wobble_pairing` is true, since NUPACK's default tables
    /// allow a G-U pair internally but not as the pair that closes a loop.
    fn can_close(&self, b1: Base, b2: Base) -> bool;

    fn min_hairpin_size(&self) -> usize;

    fn temperature(&self) -> f64;

    fn energy_of_structure<T: LoopDecomposition>(&self, sequence: &[Base], structure: &T) -> f64 {
        let mut total = 0.0;
        structure.for_each_loop(|l| total += self.energy_of_loop(sequence, l));
        total
    }

    fn energy_of_loop(&self, sequence: &[Base], nn_loop: &NearestNeighborLoop) -> f64;
}

fn idx(bases: &[Base]) -> usize {
    motif_index(&bases.iter().map(|b| b.index()).collect::<Vec<_>>())
}

/// The nearest-neighbor model: loop energies drawn from an
/// `nn_params::ParameterSet`, interpolated and cached via `CachedModel`.
pub struct NearestNeighborModel {
    pub model: CachedModel,
    pub min_hairpin: usize,
}

impl NearestNeighborModel {
    pub fn new(model: CachedModel, min_hairpin: usize) -> Self {
        NearestNeighborModel { model, min_hairpin }
    }

    fn hairpin_energy(&self, seq: &[Base], i: usize, j: usize) -> f64 {
        let params = self.model.params();
        let size = j - i - 1;
        let base = self.model.hairpin_penalty(size);
        let special = match size {
            3 => params.hairpin_triloop[idx(&[seq[i], seq[j], seq[i + 1], seq[i + 2], seq[j - 1]])],
            4 => params.hairpin_tetraloop[idx(&[seq[i], seq[j], seq[i + 1], seq[i + 2], seq[i + 3], seq[j - 1]])],
            _ => 0.0,
        };
        let mismatch = if size >= 3 {
            params.hairpin_mismatch[idx(&[seq[i], seq[j], seq[i + 1], seq[j - 1]])]
        } else {
            0.0
        };
        base + special + mismatch
    }

    fn interior_energy(&self, seq: &[Base], (i, j): (usize, usize), (p, q): (usize, usize)) -> f64 {
        let n1 = p - i - 1;
        let n2 = j - q - 1;
        let params = self.model.params();
        match (n1, n2) {
            (0, 0) => params.stack[idx(&[seq[i], seq[j], seq[p], seq[q]])],
            (1, 1) => params.interior_1x1[idx(&[seq[i], seq[j], seq[i + 1], seq[j - 1], seq[p], seq[q]])],
            (1, 2) | (2, 1) => {
                let (n1, n2) = (n1.min(n2), n1.max(n2));
                let _ = (n1, n2);
                params.interior_1x2[idx(&[seq[i], seq[j], seq[i + 1], seq[i + 2], seq[j - 1], seq[p], seq[q]])]
            }
            (2, 2) => params.interior_2x2[idx(&[
                seq[i], seq[j], seq[i + 1], seq[i + 2], seq[j - 2], seq[j - 1], seq[p], seq[q],
            ])],
            _ => {
                let generic = self.model.interior_size_penalty(n1, n2);
                let outer_mismatch = params.interior_mismatch[idx(&[seq[i], seq[j], seq[i + 1], seq[j - 1]])];
                let inner_mismatch = params.interior_mismatch[idx(&[seq[q], seq[p], seq[q + 1], seq[p - 1]])];
                generic + outer_mismatch + inner_mismatch
            }
        }
    }

    fn terminal_penalty(&self, seq: &[Base], (i, j): (usize, usize)) -> f64 {
        self.model.params().terminal_penalty[idx(&[seq[i], seq[j]])]
    }

    fn pairability(&self) -> nn_structure::Pairability {
        nn_structure::Pairability {
            wobble_pairing: self.model.conditions.wobble_pairing,
            wobble_closing: self.model.conditions.wobble_closing,
        }
    }
}

impl EnergyModel for NearestNeighborModel {
    fn can_pair(&self, b1: Base, b2: Base) -> bool {
        self.pairability().can_pair(b1, b2)
    }

    fn can_close(&self, b1: Base, b2: Base) -> bool {
        self.pairability().can_close(b1, b2)
    }

    fn min_hairpin_size(&self) -> usize {
        self.min_hairpin
    }

    fn temperature(&self) -> f64 {
        self.model.conditions.temperature_kelvin()
    }

    fn energy_of_loop(&self, sequence: &[Base], nn_loop: &NearestNeighborLoop) -> f64 {
        match nn_loop {
            NearestNeighborLoop::Hairpin { closing: (i, j) } => self.hairpin_energy(sequence, *i, *j),
            NearestNeighborLoop::Interior { closing, inner } => self.interior_energy(sequence, *closing, *inner),
            NearestNeighborLoop::Multibranch { closing, branches } => {
                let params = self.model.params();
                let unpaired = nn_loop.unpaired_count(sequence.len());
                let mut e = params.multi_init + params.multi_pair * (branches.len() + 1) as f64
                    + params.multi_base * unpaired as f64;
                e += self.terminal_penalty(sequence, (closing.1, closing.0));
                for &branch in branches {
                    e += self.terminal_penalty(sequence, branch);
                }
                e
            }
            NearestNeighborLoop::Exterior { branches } => {
                let params = self.model.params();
                branches.iter().map(|&b| self.terminal_penalty(sequence, b) + params.join_penalty).sum()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nn_params::ParameterSet;
    use nn_structure::Base::*;

    fn model() -> NearestNeighborModel {
        let json = r#"{
            "dG": {
                "stack": {"AUAU": -1.1, "CGCG": -2.36},
                "hairpin_size": [5.4,5.4,5.4,5.4,5.4,4.4,4.3,4.1,4.1,4.2,
                    4.3,4.4,4.5,4.6,4.6,4.7,4.8,4.8,4.9,4.9,5.0,5.0,5.0,5.1,5.1,5.1,5.2,5.2,5.2,5.3,5.3]
            },
            "dH": {},
            "material": "rna"
        }"#;
        let ps = ParameterSet::from_json(json).unwrap();
        let cached = CachedModel::new(&ps, ModelConditions::default());
        NearestNeighborModel::new(cached, 3)
    }

    #[test]
    fn test_can_pair() {
        let m = model();
        assert!(m.can_pair(A, U));
        assert!(!m.can_pair(A, A));
    }

    #[test]
    fn test_hairpin_energy_uses_size_table() {
        let m = model();
        let seq = vec![C, G, A, A, A, C, G];
        let e = m.hairpin_energy(&seq, 1, 5);
        assert!(e > 0.0);
    }

    #[test]
    fn test_stack_energy_matches_table() {
        let m = model();
        let seq = vec![A, A, U, U];
        let e = m.interior_energy(&seq, (0, 3), (1, 2));
        assert_eq!(e, -1.1);
    }
}
