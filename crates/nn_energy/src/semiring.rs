use crate::scalar::Scalar;

/// The algebraic structure the DP engine is evaluated over. Every
/// recursion in `nn_dp` is written once against `Semiring` and
/// monomorphized per ring at compile time, so the hot loop never pays for
/// dynamic dispatch.
pub trait Semiring: Copy + Clone + std::fmt::Debug + PartialEq {
    fn zero() -> Self;
    fn one() -> Self;
    fn plus(self, other: Self) -> Self;
    fn times(self, other: Self) -> Self;

    /// The multiplicative inverse: `1/a` in the PF ring, `-a` in the
    /// (additive, min-plus) MFE ring.
    fn invert(self) -> Self;

    /// Builds a ring value from a mantissa/exponent pair the way
    /// `Scalar::ldexp` does for the PF ring (`m * 2^e`); the MFE ring
    /// ignores `e` and passes `m` straight through.
    fn ldexp(m: f64, e: i32) -> Self;

    /// Whether this ring's native representation is itself logarithmic
    /// (additive energies) rather than multiplicative (Boltzmann weights).
    fn logarithmic() -> bool {
        false
    }

    /// True once a value has run past the range further `plus`/`times`
    /// calls can still represent safely; `fill` uses this to detect
    /// capacity overflow per anti-diagonal. Rings with no overflow
    /// concept (MFE's bounded integers, the log-space auxiliary ring)
    /// simply never report it.
    fn is_overflow(self) -> bool {
        false
    }

    fn sum<I: IntoIterator<Item = Self>>(terms: I) -> Self {
        terms.into_iter().fold(Self::zero(), Self::plus)
    }
}

/// Partition-function ring: `(Scalar, +, x, 0, 1)`. Used for the
/// Boltzmann-weighted ensemble sums (`Q`, `QB`, pair probabilities).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PfValue(pub Scalar);

impl Semiring for PfValue {
    fn zero() -> Self {
        PfValue(Scalar::ZERO)
    }
    fn one() -> Self {
        PfValue(Scalar::ONE)
    }
    fn plus(self, other: Self) -> Self {
        PfValue(self.0.add(other.0))
    }
    fn times(self, other: Self) -> Self {
        PfValue(self.0.mul(other.0))
    }
    fn invert(self) -> Self {
        PfValue(self.0.recip())
    }
    fn ldexp(m: f64, e: i32) -> Self {
        PfValue(Scalar::ldexp(m, e))
    }
    fn is_overflow(self) -> bool {
        self.0.is_overflow()
    }
}

impl PfValue {
    pub fn from_boltzmann(w: f64) -> Self {
        PfValue(Scalar::from_f64(w))
    }

    pub fn weight(self) -> f64 {
        self.0.to_f64()
    }
}

/// Min-plus (tropical) ring: `(i32, min, +, +inf, 0)`. Used for MFE
/// recursions; energies are represented in integer centi-kcal/mol so the
/// ring has no rounding drift across additions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MfeValue(pub i32);

impl MfeValue {
    pub const INFEASIBLE: i32 = i32::MAX / 2;
}

impl Semiring for MfeValue {
    fn zero() -> Self {
        MfeValue(MfeValue::INFEASIBLE)
    }
    fn one() -> Self {
        MfeValue(0)
    }
    fn plus(self, other: Self) -> Self {
        MfeValue(self.0.min(other.0))
    }
    fn times(self, other: Self) -> Self {
        MfeValue(self.0.saturating_add(other.0))
    }
    fn invert(self) -> Self {
        MfeValue(self.0.saturating_neg())
    }
    fn ldexp(m: f64, _e: i32) -> Self {
        MfeValue(m as i32)
    }
}

/// Log-space sum-product ring: `(f64, logsumexp, +, -inf, 0)`. Algebraically
/// equivalent to the PF ring but without the scalar-width bookkeeping;
/// not used by the default engine (log-sum-exp is slower per op than the
/// normalized-mantissa `Scalar`), kept for numerical cross-checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogSumExpValue(pub f64);

impl Semiring for LogSumExpValue {
    fn zero() -> Self {
        LogSumExpValue(f64::NEG_INFINITY)
    }
    fn one() -> Self {
        LogSumExpValue(0.0)
    }
    fn plus(self, other: Self) -> Self {
        let (a, b) = (self.0, other.0);
        if a == f64::NEG_INFINITY {
            return LogSumExpValue(b);
        }
        if b == f64::NEG_INFINITY {
            return LogSumExpValue(a);
        }
        let m = a.max(b);
        LogSumExpValue(m + ((a - m).exp() + (b - m).exp()).ln())
    }
    fn times(self, other: Self) -> Self {
        LogSumExpValue(self.0 + other.0)
    }
    fn invert(self) -> Self {
        LogSumExpValue(-self.0)
    }
    fn ldexp(m: f64, e: i32) -> Self {
        LogSumExpValue(m.ln() + (e as f64) * std::f64::consts::LN_2)
    }
    fn logarithmic() -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pf_ring_identities() {
        let a = PfValue::from_boltzmann(2.0);
        assert_eq!(PfValue::plus(a, PfValue::zero()).weight(), a.weight());
        assert_eq!(PfValue::times(a, PfValue::one()).weight(), a.weight());
    }

    #[test]
    fn test_mfe_ring_is_min_plus() {
        let a = MfeValue(100);
        let b = MfeValue(50);
        assert_eq!(a.plus(b), MfeValue(50));
        assert_eq!(a.times(b), MfeValue(150));
        assert_eq!(MfeValue::zero().plus(a), a);
        assert_eq!(MfeValue::one().times(a), a);
    }

    #[test]
    fn test_logsumexp_ring_matches_pf() {
        let a = LogSumExpValue((2.0f64).ln());
        let b = LogSumExpValue((3.0f64).ln());
        let sum = a.plus(b);
        assert!((sum.0.exp() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_mfe_invert_negates() {
        assert_eq!(MfeValue(150).invert(), MfeValue(-150));
        assert_eq!(MfeValue::ldexp(42.0, 7), MfeValue(42));
    }

    #[test]
    fn test_logsumexp_invert_and_ldexp() {
        let a = LogSumExpValue((4.0f64).ln());
        assert!((a.invert().0.exp() - 0.25).abs() < 1e-9);
        let v = LogSumExpValue::ldexp(1.0, 3);
        assert!((v.0.exp() - 8.0).abs() < 1e-9);
    }
}
