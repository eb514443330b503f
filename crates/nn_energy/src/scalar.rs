use std::ops::{Add, Mul};

/// Exponent threshold past which a `Scalar` is considered to have overflowed
/// its mantissa's range; callers use this to trigger a restart at a wider
/// width (see `promote`).
const OVERFLOW_EXPONENT: i32 = i32::MAX - 1;

/// A Boltzmann weight represented as `mantissa * 2^exponent`, with the
/// mantissa normalized into `[0.5, 1.0)`. Long sequences accumulate
/// partition-function terms that overflow a plain `f64`; keeping the
/// exponent separate avoids that without resorting to log-space
/// arithmetic (which would make `plus` expensive).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scalar {
    mantissa: f64,
    exponent: i32,
}

impl Scalar {
    pub const ZERO: Scalar = Scalar { mantissa: 0.0, exponent: i32::MIN };
    pub const ONE: Scalar = Scalar { mantissa: 0.5, exponent: 1 };

    pub fn from_f64(x: f64) -> Self {
        if x == 0.0 || !x.is_finite() {
            return Scalar::ZERO;
        }
        let (mantissa, exponent) = frexp(x);
        Scalar { mantissa, exponent }
    }

    pub fn to_f64(self) -> f64 {
        if self.mantissa == 0.0 {
            0.0
        } else {
            self.mantissa * 2f64.powi(self.exponent)
        }
    }

    /// True once the exponent has run past the range a downstream
    /// `f64` conversion (or a further `times`) can still represent safely.
    pub fn is_overflow(self) -> bool {
        self.exponent >= OVERFLOW_EXPONENT
    }

    pub fn add(self, other: Self) -> Self {
        if self.mantissa == 0.0 {
            return other;
        }
        if other.mantissa == 0.0 {
            return self;
        }
        let (hi, lo) = if self.exponent >= other.exponent { (self, other) } else { (other, self) };
        let shift = hi.exponent - lo.exponent;
        if shift > 52 {
            return hi;
        }
        let combined = hi.mantissa + lo.mantissa * 2f64.powi(-shift);
        normalize(combined, hi.exponent)
    }

    pub fn mul(self, other: Self) -> Self {
        if self.mantissa == 0.0 || other.mantissa == 0.0 {
            return Scalar::ZERO;
        }
        normalize(self.mantissa * other.mantissa, self.exponent + other.exponent)
    }
}

fn frexp(x: f64) -> (f64, i32) {
    if x == 0.0 {
        return (0.0, 0);
    }
    let bits = x.to_bits();
    let sign = bits & (1 << 63);
    let raw_exp = ((bits >> 52) & 0x7ff) as i32;
    if raw_exp == 0 {
        // subnormal: scale up into normal range first.
        let (m, e) = frexp(x * 2f64.powi(64));
        return (m, e - 64);
    }
    let exponent = raw_exp - 1022;
    let mantissa_bits = (bits & 0x000f_ffff_ffff_ffff) | 0x3fe0_0000_0000_0000 | sign;
    (f64::from_bits(mantissa_bits), exponent)
}

fn normalize(mantissa: f64, exponent: i32) -> Scalar {
    if mantissa == 0.0 {
        return Scalar::ZERO;
    }
    let (m, e) = frexp(mantissa);
    Scalar { mantissa: m, exponent: exponent + e }
}

impl Add for Scalar {
    type Output = Scalar;
    fn add(self, rhs: Self) -> Self::Output {
        Scalar::add(self, rhs)
    }
}

impl Mul for Scalar {
    type Output = Scalar;
    fn mul(self, rhs: Self) -> Self::Output {
        Scalar::mul(self, rhs)
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Scalar::from_f64(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        for x in [1.0, 0.5, 123.456, 1e-30, 1e30] {
            let s = Scalar::from_f64(x);
            assert!((s.to_f64() - x).abs() / x <= 1e-12);
        }
    }

    #[test]
    fn test_zero() {
        assert_eq!(Scalar::ZERO.to_f64(), 0.0);
        assert_eq!((Scalar::ZERO + Scalar::from_f64(3.0)).to_f64(), 3.0);
    }

    #[test]
    fn test_add_matches_f64() {
        let a = Scalar::from_f64(2.5);
        let b = Scalar::from_f64(7.25);
        assert!((a.add(b).to_f64() - 9.75).abs() < 1e-9);
    }

    #[test]
    fn test_mul_matches_f64() {
        let a = Scalar::from_f64(3.0);
        let b = Scalar::from_f64(4.0);
        assert!((a.mul(b).to_f64() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_survives_f64_overflow() {
        let huge = Scalar::from_f64(1e300);
        let bigger = huge.mul(Scalar::from_f64(1e300));
        assert!(!bigger.is_overflow());
        assert!(bigger.to_f64().is_infinite());
    }
}
