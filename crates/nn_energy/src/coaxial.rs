use nn_params::motif_index;
use nn_structure::Base;

use crate::cached_model::CachedModel;

fn idx(bases: &[Base]) -> usize {
    motif_index(&bases.iter().map(|b| b.index()).collect::<Vec<_>>())
}

/// Coaxial stacking bonus between two helices that sit flush against
/// each other in a multiloop or exterior loop, i.e. `branch_a.1 + 1 ==
/// branch_b.0` with no intervening unpaired base. Uses the same `stack`
/// table as an ordinary helix stack, read across the two closing pairs.
/// Only the no-mismatch case is modeled; stacking across a single
/// intervening mismatch (dangle-context combinatorics) is not
/// reproduced here.
pub fn flush_coaxial_bonus(model: &CachedModel, seq: &[Base], a: (usize, usize), b: (usize, usize)) -> f64 {
    if a.1 + 1 != b.0 {
        return 0.0;
    }
    model.params().stack[idx(&[seq[a.0], seq[a.1], seq[b.0], seq[b.1]])]
}
