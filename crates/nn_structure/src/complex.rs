use crate::Base;
use crate::Strand;
use crate::StructureError;

/// An ordered, non-empty list of strands. Two complexes are equivalent
/// iff their strand lists are rotations of each other; `canonical_form`
/// rotates to the lexicographically smallest rotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Complex {
    strands: Vec<Strand>,
}

/// The concatenated, gap-separated view of a complex's sequence that the
/// DP recursions index into: two consecutive gap slots mark each nick,
/// fixing the loop geometry across a strand break.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConcatenatedSequence {
    /// `None` marks a gap (strand-break) slot.
    pub bases: Vec<Option<Base>>,
    /// Index of the *last* gap slot at each internal strand junction
    /// (i.e. the second of the two gap symbols bracketing the nick).
    pub nicks: Vec<usize>,
}

impl Complex {
    pub fn new(strands: Vec<Strand>) -> Result<Self, StructureError> {
        if strands.is_empty() {
            return Err(StructureError::EmptyStrand(0));
        }
        for (i, s) in strands.iter().enumerate() {
            if s.is_empty() {
                return Err(StructureError::EmptyStrand(i));
            }
        }
        Ok(Complex { strands })
    }

    pub fn strands(&self) -> &[Strand] {
        &self.strands
    }

    pub fn num_strands(&self) -> usize {
        self.strands.len()
    }

    /// Total nucleotide count, excluding gap symbols.
    pub fn len(&self) -> usize {
        self.strands.iter().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        false // strands are guaranteed non-empty by construction
    }

    /// Prefix sums of strand lengths: `prefix[0] == 0`,
    /// `prefix[k] == sum of strands[0..k].len()`.
    pub fn prefix_sums(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.strands.len() + 1);
        let mut acc = 0;
        out.push(0);
        for s in &self.strands {
            acc += s.len();
            out.push(acc);
        }
        out
    }

    /// The concatenated, gap-free base sequence the DP engine folds: every
    /// strand's bases in order, with no separators.
    pub fn concatenated_bases(&self) -> Vec<Base> {
        self.strands.iter().flat_map(|s| s.iter().copied()).collect()
    }

    /// Positions, in `concatenated_bases` coordinates, of every internal
    /// strand break: `p` in the result means the backbone is broken
    /// between position `p - 1` and `p`. Used by the DP engine to forbid a
    /// hairpin, bulge, or interior loop from enclosing a nick (the
    /// enclosed bases would no longer share a continuous backbone) while
    /// leaving multiloop and exterior-loop splits, which don't assume
    /// backbone continuity between branches, unrestricted.
    pub fn nick_positions(&self) -> Vec<usize> {
        let sums = self.prefix_sums();
        sums[1..sums.len() - 1].to_vec()
    }

    /// How many of the complex's own rotations reproduce the same
    /// (ordered) strand list -- 1 for a complex with no repeated strand
    /// cycle, `num_strands()` for one built from a single strand repeated
    /// end to end. Divides a `noninteracting_partition_function`-style
    /// product to avoid overcounting indistinguishable rotations of a
    /// self-symmetric complex.
    pub fn symmetry_order(&self) -> usize {
        let n = self.strands.len();
        (1..=n).filter(|&k| self.rotated(k).strands == self.strands).count()
    }

    /// Build the gap-separated concatenated view used by the DP engine.
    pub fn concatenated(&self) -> ConcatenatedSequence {
        let mut bases = Vec::new();
        let mut nicks = Vec::new();
        for (k, strand) in self.strands.iter().enumerate() {
            bases.extend(strand.iter().copied().map(Some));
            if k + 1 < self.strands.len() {
                bases.push(None);
                bases.push(None);
                nicks.push(bases.len() - 1);
            }
        }
        ConcatenatedSequence { bases, nicks }
    }

    /// Rotate the strand list by `k` positions.
    fn rotated(&self, k: usize) -> Complex {
        let n = self.strands.len();
        let k = k % n;
        let mut strands = self.strands[k..].to_vec();
        strands.extend_from_slice(&self.strands[..k]);
        Complex { strands }
    }

    fn rotation_key(&self) -> Vec<String> {
        self.strands.iter().map(|s| s.to_string()).collect()
    }

    /// Rotate to the lexicographically smallest rotation of the strand
    /// list; the result is independent of the starting rotation.
    pub fn canonical_form(&self) -> Complex {
        let n = self.strands.len();
        (0..n)
            .map(|k| self.rotated(k))
            .min_by(|a, b| a.rotation_key().cmp(&b.rotation_key()))
            .expect("complex has at least one strand")
    }

    /// True iff `self` and `other` are rotations of the same strand list.
    pub fn is_equivalent(&self, other: &Complex) -> bool {
        self.canonical_form() == other.canonical_form()
    }
}
