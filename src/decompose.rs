//! Exact decomposition and reconstruction of `f64` values.
//!
//! A [`FloatDecomposition`] holds `(-1)^sign · significand · 2^exponent`,
//! where `exponent` is the weight of the least significant bit. Normal floats
//! carry the implicit leading bit explicitly (the *guard bit*, 2^52);
//! subnormals sit at the minimum exponent without it.
//!
//! This is the single place where scaling by a power of two happens
//! ([`FloatDecomposition::shift`]) and where an adjusted representation is
//! checked for overflow or underflow on its way back to `f64`. Reconstruction
//! rounds half to even through [`RoundingAccumulator`].
//!
//! # Layout
//!
//! | field | normal | subnormal | inf / NaN |
//! |---|---|---|---|
//! | `exponent` | biased − 1075 | −1074 | reserved sentinel |
//! | `significand` | 2^52 + mantissa | mantissa | 2^52 + mantissa |

use crate::error::{Result, VarError};
use crate::rounding::RoundingAccumulator;

/// The implicit leading bit of a normal `f64`, made explicit.
pub const GUARD_BIT: u64 = 1 << 52;

/// First significand value that needs more than 53 bits.
pub const SIGNIFICAND_LIMIT: u64 = 1 << 53;

/// Exponent of the least significant bit of subnormals and of the smallest
/// normal.
pub const MIN_EXPONENT: i32 = -1074;

/// Exponent of the least significant bit of the largest finite normal.
pub const MAX_EXPONENT: i32 = 971;

/// Sentinel marking the reserved infinity/NaN pattern.
pub const RESERVED_EXPONENT: i32 = i32::MAX;

const MANTISSA_MASK: u64 = GUARD_BIT - 1;
const EXPONENT_BIAS: i64 = 1075;
const BIASED_EXPONENT_MAX: i64 = 0x7FF;
const PRECISION: i64 = 53;

/// Sign, exponent and guarded significand of a floating-point value.
///
/// # Examples
/// ```
/// use u_vararith::decompose::FloatDecomposition;
/// let d = FloatDecomposition::from_f64(-6.0);
/// assert!(d.sign());
/// assert_eq!(d.significand() as f64 * 2f64.powi(d.exponent()), 6.0);
/// assert_eq!(d.shift(-1).unwrap().to_f64(), -3.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FloatDecomposition {
    sign: bool,
    exponent: i32,
    significand: u64,
}

impl FloatDecomposition {
    /// Builds a decomposition from explicit fields. Any significand is
    /// accepted; [`to_f64`](Self::to_f64) normalises and rounds it.
    pub fn new(sign: bool, exponent: i32, significand: u64) -> Self {
        Self {
            sign,
            exponent,
            significand,
        }
    }

    /// Decomposes a float per the IEEE-754 binary64 layout.
    pub fn from_f64(value: f64) -> Self {
        let bits = value.to_bits();
        let sign = bits >> 63 == 1;
        let biased = ((bits >> 52) as i64) & BIASED_EXPONENT_MAX;
        let mantissa = bits & MANTISSA_MASK;
        match biased {
            0 => Self::new(sign, MIN_EXPONENT, mantissa),
            BIASED_EXPONENT_MAX => Self::new(sign, RESERVED_EXPONENT, mantissa | GUARD_BIT),
            _ => Self::new(sign, (biased - EXPONENT_BIAS) as i32, mantissa | GUARD_BIT),
        }
    }

    /// Builds a decomposition from a 128-bit magnitude.
    ///
    /// Bits beyond the top 64 are folded into a sticky least significant bit,
    /// which lies well below the rounding position of a 53-bit result, so
    /// [`to_f64`](Self::to_f64) still rounds the full-width value correctly.
    pub fn from_wide(sign: bool, exponent: i32, significand: u128) -> Self {
        let width = 128 - significand.leading_zeros();
        if width <= 64 {
            return Self::new(sign, exponent, significand as u64);
        }
        let drop = width - 64;
        let sticky = significand & ((1u128 << drop) - 1) != 0;
        let kept = (significand >> drop) as u64 | u64::from(sticky);
        Self::new(sign, exponent.saturating_add(drop as i32), kept)
    }

    pub fn sign(&self) -> bool {
        self.sign
    }

    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    pub fn significand(&self) -> u64 {
        self.significand
    }

    pub fn is_finite(&self) -> bool {
        self.to_f64().is_finite()
    }

    pub fn is_infinite(&self) -> bool {
        self.to_f64().is_infinite()
    }

    pub fn is_nan(&self) -> bool {
        self.to_f64().is_nan()
    }

    /// Scales by `2^bits` by adjusting the exponent only.
    ///
    /// The result is exact unless it falls into the subnormal range, where
    /// reconstruction rounds.
    ///
    /// # Errors
    /// [`VarError::Value`] if `self` is not finite or the shifted value
    /// overflows.
    pub fn shift(&self, bits: i32) -> Result<Self> {
        if !self.is_finite() {
            return Err(VarError::value(
                self.to_f64(),
                format!("cannot shift a non-finite value by {bits} bits"),
            ));
        }
        let exponent = self
            .exponent
            .checked_add(bits)
            .filter(|&e| e != RESERVED_EXPONENT)
            .ok_or_else(|| {
                VarError::value(self.to_f64(), format!("exponent overflow shifting by {bits} bits"))
            })?;
        let shifted = Self::new(self.sign, exponent, self.significand);
        let value = shifted.to_f64();
        if !value.is_finite() {
            return Err(VarError::value(
                value,
                format!("shifting {} by {bits} bits overflows", self.to_f64()),
            ));
        }
        Ok(shifted)
    }

    /// Unit in the last place of this representation, as a decomposition.
    pub fn ulp(&self) -> Self {
        let normalised = Self::from_f64(self.to_f64());
        Self::new(false, normalised.exponent, 1)
    }

    /// Reconstructs the nearest `f64`, rounding half to even.
    pub fn to_f64(&self) -> f64 {
        self.to_f64_exact().0
    }

    /// Reconstructs the nearest `f64` and reports whether rounding discarded
    /// any nonzero bit. Overflow yields a signed infinity, underflow a signed
    /// zero; both count as inexact.
    pub fn to_f64_exact(&self) -> (f64, bool) {
        let sign_bits = u64::from(self.sign) << 63;
        if self.exponent == RESERVED_EXPONENT
            && (GUARD_BIT..SIGNIFICAND_LIMIT).contains(&self.significand)
        {
            let bits = sign_bits | ((BIASED_EXPONENT_MAX as u64) << 52) | (self.significand & MANTISSA_MASK);
            return (f64::from_bits(bits), false);
        }
        if self.significand == 0 {
            return (f64::from_bits(sign_bits), false);
        }

        let mut exponent = self.exponent as i64;
        let width = 64 - self.significand.leading_zeros() as i64;
        let mut acc = RoundingAccumulator::new(self.significand);
        let right = (width - PRECISION).max(MIN_EXPONENT as i64 - exponent);
        let mut inexact = false;
        if right > 0 {
            inexact = acc.up_by(right.min(65) as i32);
            exponent += right;
        } else if width < PRECISION && exponent > MIN_EXPONENT as i64 {
            let left = (PRECISION - width).min(exponent - MIN_EXPONENT as i64);
            acc.up_by(-(left as i32));
            exponent -= left;
        }

        let mut significand = acc.rounded();
        if significand == SIGNIFICAND_LIMIT {
            significand >>= 1;
            exponent += 1;
        }
        if significand == 0 {
            return (f64::from_bits(sign_bits), inexact);
        }

        let mut biased = exponent + EXPONENT_BIAS;
        if significand & GUARD_BIT == 0 {
            // subnormal: same scale as biased exponent 1, encoded as 0
            biased -= 1;
        }
        if biased >= BIASED_EXPONENT_MAX {
            return (f64::from_bits(sign_bits | ((BIASED_EXPONENT_MAX as u64) << 52)), true);
        }
        let bits = sign_bits | ((biased as u64) << 52) | (significand & MANTISSA_MASK);
        (f64::from_bits(bits), inexact)
    }
}

impl From<f64> for FloatDecomposition {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

/// Unit in the last place of `value`: the gap to the next float away from
/// zero. Non-finite inputs return NaN.
///
/// # Examples
/// ```
/// use u_vararith::decompose::ulp;
/// assert_eq!(ulp(1.0), f64::EPSILON);
/// assert_eq!(ulp(0.0), f64::from_bits(1));
/// ```
pub fn ulp(value: f64) -> f64 {
    if !value.is_finite() {
        return f64::NAN;
    }
    FloatDecomposition::from_f64(value).ulp().to_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompose_normal() {
        let d = FloatDecomposition::from_f64(1.0);
        assert!(!d.sign());
        assert_eq!(d.significand(), GUARD_BIT);
        assert_eq!(d.exponent(), -52);
    }

    #[test]
    fn test_decompose_subnormal() {
        let tiny = f64::from_bits(3);
        let d = FloatDecomposition::from_f64(tiny);
        assert_eq!(d.exponent(), MIN_EXPONENT);
        assert_eq!(d.significand(), 3);
        assert_eq!(d.to_f64().to_bits(), 3);
    }

    #[test]
    fn test_classification() {
        assert!(FloatDecomposition::from_f64(f64::INFINITY).is_infinite());
        assert!(FloatDecomposition::from_f64(f64::NEG_INFINITY).is_infinite());
        assert!(FloatDecomposition::from_f64(f64::NAN).is_nan());
        assert!(FloatDecomposition::from_f64(f64::MAX).is_finite());
        assert!(FloatDecomposition::from_f64(-0.0).is_finite());
    }

    #[test]
    fn test_specials_roundtrip() {
        for x in [f64::INFINITY, f64::NEG_INFINITY, -0.0, 0.0] {
            assert_eq!(FloatDecomposition::from_f64(x).to_f64().to_bits(), x.to_bits());
        }
        assert!(FloatDecomposition::from_f64(f64::NAN).to_f64().is_nan());
    }

    #[test]
    fn test_shift_exact() {
        let d = FloatDecomposition::from_f64(3.0);
        assert_eq!(d.shift(10).unwrap().to_f64(), 3072.0);
        assert_eq!(d.shift(-3).unwrap().to_f64(), 0.375);
    }

    #[test]
    fn test_shift_overflow_fails() {
        let d = FloatDecomposition::from_f64(f64::MAX);
        assert!(matches!(d.shift(1), Err(VarError::Value { .. })));
        let d = FloatDecomposition::from_f64(1.0);
        assert!(d.shift(1024).is_err());
        assert_eq!(d.shift(1023).unwrap().to_f64(), 2f64.powi(1023));
    }

    #[test]
    fn test_shift_non_finite_fails() {
        let d = FloatDecomposition::from_f64(f64::INFINITY);
        assert!(d.shift(-1).is_err());
    }

    #[test]
    fn test_shift_into_subnormal_rounds() {
        // smallest normal, halved: exactly representable subnormal
        let d = FloatDecomposition::from_f64(f64::MIN_POSITIVE);
        assert_eq!(d.shift(-1).unwrap().to_f64(), f64::MIN_POSITIVE / 2.0);
        // 3·2^-1074 halved is 1.5 ulp: ties to even gives 2·2^-1074
        let d = FloatDecomposition::from_f64(f64::from_bits(3));
        let (value, inexact) = d.shift(-1).unwrap().to_f64_exact();
        assert_eq!(value.to_bits(), 2);
        assert!(inexact);
    }

    #[test]
    fn test_underflow_to_zero() {
        let d = FloatDecomposition::from_f64(f64::from_bits(1));
        let (value, inexact) = d.shift(-2).unwrap().to_f64_exact();
        assert_eq!(value, 0.0);
        assert!(inexact);
    }

    #[test]
    fn test_reconstruct_rounds_wide_significand() {
        // 2^53 + 1 needs 54 bits: ties to even gives 2^53
        let d = FloatDecomposition::new(false, 0, (1 << 53) + 1);
        assert_eq!(d.to_f64_exact(), (9007199254740992.0, true));
        // 2^53 + 3: ties to even gives 2^53 + 4
        let d = FloatDecomposition::new(false, 0, (1 << 53) + 3);
        assert_eq!(d.to_f64_exact(), (9007199254740996.0, true));
        // 2^53 + 2 is exact
        let d = FloatDecomposition::new(false, 0, (1 << 53) + 2);
        assert_eq!(d.to_f64_exact(), (9007199254740994.0, false));
    }

    #[test]
    fn test_reconstruct_small_significand_normalises() {
        let d = FloatDecomposition::new(true, 4, 5);
        assert_eq!(d.to_f64_exact(), (-80.0, false));
    }

    #[test]
    fn test_rounding_carry_bumps_exponent() {
        // 54 one-bits round up to 2^54
        let d = FloatDecomposition::new(false, 0, (1 << 54) - 1);
        assert_eq!(d.to_f64(), 2f64.powi(54));
    }

    #[test]
    fn test_overflow_reconstructs_infinite() {
        let d = FloatDecomposition::new(true, MAX_EXPONENT + 1, GUARD_BIT);
        assert_eq!(d.to_f64_exact(), (f64::NEG_INFINITY, true));
    }

    #[test]
    fn test_from_wide_keeps_sticky() {
        // (2^53 + 1)·2^70 + 1: the trailing 1 breaks the tie upward
        let wide = (((1u128 << 53) + 1) << 70) + 1;
        let d = FloatDecomposition::from_wide(false, 0, wide);
        let expected = ((1u64 << 53) + 2) as f64 * 2f64.powi(70);
        assert_eq!(d.to_f64_exact(), (expected, true));
        // without the trailing 1 it is a tie and goes to even
        let wide = ((1u128 << 53) + 1) << 70;
        let d = FloatDecomposition::from_wide(false, 0, wide);
        assert_eq!(d.to_f64(), 2f64.powi(123));
    }

    #[test]
    fn test_ulp() {
        assert_eq!(ulp(1.0), f64::EPSILON);
        assert_eq!(ulp(-2.0), 2.0 * f64::EPSILON);
        assert_eq!(ulp(f64::MIN_POSITIVE), f64::from_bits(1));
        assert_eq!(ulp(0.0), f64::from_bits(1));
        assert!(ulp(f64::NAN).is_nan());
        assert_eq!(ulp(9007199254740992.0), 2.0);
    }
}
