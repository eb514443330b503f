use std::fmt;

use log::warn;
use colored::*;

use crate::StructureError;

/// Canonical nucleotide code. Indexes as `0..4`, matching the
/// column-major motif-class layout of the parameter tables (A=0, C=1,
/// G=2, U=3). `N` is an IUPAC wildcard accepted at the sequence-parsing
/// boundary but never produced by, or indexed into, the DP tensors.
#[derive(Clone, Hash, Copy, Debug, Eq, PartialEq)]
pub enum Base { A, C, G, U, N }

pub const BCOUNT: usize = 4; // canonical DP alphabet size

impl TryFrom<char> for Base {
    type Error = StructureError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_uppercase() {
            'A' => Ok(Base::A),
            'C' => Ok(Base::C),
            'G' => Ok(Base::G),
            'U' | 'T' => Ok(Base::U),
            'N' => Ok(Base::N),
            '&' | '+' => Err(StructureError::InvalidToken("strand break".into(), "sequence".into(), 0)),
            other => Err(StructureError::InvalidToken(format!("character '{other}'"), "sequence".into(), 0)),
        }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Base::A => 'A',
            Base::C => 'C',
            Base::G => 'G',
            Base::U => 'U',
            Base::N => 'N',
        };
        write!(f, "{c}")
    }
}

impl Base {
    /// Canonical index `0..4` into the DP alphabet. Panics on `N`
    /// (wildcard bases never reach the DP layer).
    pub fn index(&self) -> usize {
        match self {
            Base::A => 0,
            Base::C => 1,
            Base::G => 2,
            Base::U => 3,
            Base::N => unreachable!("wildcard base reached the DP indexing boundary"),
        }
    }

    pub fn is_canonical(&self) -> bool {
        !matches!(self, Base::N)
    }
}

/// Pairing predicate configuration.
///
/// `can_pair(b, c)` is true if `b + c == 3` under canonical indexing
/// (Watson-Crick complement), or (`wobble_pairing` and `b + c == 5`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pairability {
    pub wobble_pairing: bool,
    pub wobble_closing: bool,
}

impl Default for Pairability {
    fn default() -> Self {
        Pairability { wobble_pairing: true, wobble_closing: true }
    }
}

impl Pairability {
    pub fn new(wobble_pairing: bool, wobble_closing: bool) -> Self {
        Pairability { wobble_pairing, wobble_closing }
    }

    /// True if `b` and `c` may form an internal base pair.
    pub fn can_pair(&self, b: Base, c: Base) -> bool {
        if !b.is_canonical() || !c.is_canonical() {
            return false;
        }
        let (bi, ci) = (b.index(), c.index());
        bi + ci == 3 || (self.wobble_pairing && bi + ci == 5)
    }

    /// True if `b`-`c` may *close* a loop (stricter than `can_pair` when
    /// `wobble_closing` is false: a G-U pair at a loop closure is then
    /// forbidden even though G-U may still pair internally).
    pub fn can_close(&self, b: Base, c: Base) -> bool {
        if !self.can_pair(b, c) {
            return false;
        }
        if self.wobble_closing {
            return true;
        }
        let (bi, ci) = (b.index(), c.index());
        bi + ci != 5
    }
}

const PAIR_LOOKUP: [[PairType; BCOUNT]; BCOUNT] = {
    use PairType::*;
    let mut table = [[NN; BCOUNT]; BCOUNT];
    table[0][3] = AU; // A-U
    table[3][0] = UA; // U-A
    table[1][2] = CG; // C-G
    table[2][1] = GC; // G-C
    table[2][3] = GU; // G-U
    table[3][2] = UG; // U-G
    table
};

/// The seven pair-type classes used to index stack/mismatch/dangle
/// motif tables (6 canonical orientations plus a sentinel "no pair").
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PairType { AU, UA, CG, GC, GU, UG, NN }

pub const PCOUNT: usize = 7;

impl From<(Base, Base)> for PairType {
    fn from(pair: (Base, Base)) -> Self {
        if !pair.0.is_canonical() || !pair.1.is_canonical() {
            return PairType::NN;
        }
        PAIR_LOOKUP[pair.0.index()][pair.1.index()]
    }
}

impl fmt::Display for PairType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PairType::AU => "A-U",
            PairType::UA => "U-A",
            PairType::CG => "C-G",
            PairType::GC => "G-C",
            PairType::GU => "G-U",
            PairType::UG => "U-G",
            PairType::NN => "N-N",
        };
        write!(f, "{s}")
    }
}

impl PairType {
    pub fn new(pair: (Base, Base)) -> Self {
        let pt = PairType::from(pair);
        if pt == PairType::NN {
            warn!("{} invalid base pair: {}-{} -> treated as non-pairing", "WARNING:".red(), pair.0, pair.1);
        }
        pt
    }

    pub fn is_wobble(&self) -> bool {
        matches!(self, PairType::GU | PairType::UG)
    }

    pub fn is_watson_crick(&self) -> bool {
        matches!(self, PairType::GC | PairType::CG | PairType::AU | PairType::UA)
    }

    pub fn can_pair(&self) -> bool {
        self != &PairType::NN
    }

    pub fn invert(&self) -> PairType {
        use PairType::*;
        match self {
            AU => UA, UA => AU,
            CG => GC, GC => CG,
            GU => UG, UG => GU,
            NN => NN,
        }
    }
}
