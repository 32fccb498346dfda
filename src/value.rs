//! The uncertain value type and its elementary operations.
//!
//! An [`UncertainValue`] is a point value, the variance of the error around
//! it, and the leakage: the probability mass excluded by the truncations its
//! history went through. Every operation returns a new value or a typed
//! error; nothing is ever clamped.
//!
//! Elementary operations (negation, power-of-two shift, sum, product) use
//! closed forms. The product variance `σ₁²v₂² + σ₂²v₁² + σ₁²σ₂²` is exact
//! for independent operands, not a first-order approximation. Everything
//! else goes through the Taylor engine in [`crate::taylor`].
//!
//! # Exact integers
//!
//! When both operands of a sum or product are uncertainty-free integers and
//! the naive result reaches 2^53, the operation is redone exactly in 128-bit
//! arithmetic. Rounding is monotone, so any exact result beyond 2^53 rounds
//! to at least 2^53 and is caught. The result then
//! carries only the uncertainty of storing that exact integer as an `f64`,
//! the same rule [`UncertainValue::from_i64`] applies.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Neg;

use crate::decompose::{ulp, FloatDecomposition};
use crate::error::{Result, VarError};
use crate::taylor::Expander;
use crate::wide;

/// Default `binding` of [`UncertainValue::compare`]: the half-width, in
/// standard deviations, of the central 50% of a normal distribution.
pub const DEFAULT_COMPARE_BINDING: f64 = 0.674;

/// 2^53: every integer up to this magnitude is an exact `f64`. A naive
/// result of exactly 2^53 may be a rounded 2^53 + 1.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Significand bits that must all be zero for an `f64` to count as exact.
const F64_LOW_BITS: u64 = (1 << 26) - 1;

/// Mantissa bits that must all be zero for an `f32` to count as exact.
const F32_LOW_BITS: u32 = (1 << 12) - 1;

/// A value with a propagated variance.
///
/// # Examples
/// ```
/// use u_vararith::UncertainValue;
///
/// let x = UncertainValue::new(1.0, 0.1).unwrap();
/// let y = UncertainValue::new(2.0, 0.2).unwrap();
/// let sum = x.add(&y).unwrap();
/// assert_eq!(sum.value(), 3.0);
/// assert!((sum.variance() - 0.05).abs() < 1e-15);
/// assert_eq!(x.to_string(), "1.00~0.1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UncertainValue {
    value: f64,
    variance: f64,
    leakage: f64,
}

impl UncertainValue {
    /// A value with the given standard deviation. The sign of
    /// `uncertainty` is ignored.
    ///
    /// # Errors
    /// [`VarError::Value`] for a non-finite value, [`VarError::Uncertainty`]
    /// for a non-finite uncertainty or one that makes `value ± uncertainty`
    /// overflow.
    pub fn new(value: f64, uncertainty: f64) -> Result<Self> {
        let dev = uncertainty.abs();
        Self::checked(value, dev * dev, 0.0)
    }

    /// A value with the given variance.
    ///
    /// # Errors
    /// As [`new`](Self::new); a negative variance is an uncertainty error.
    pub fn with_variance(value: f64, variance: f64) -> Result<Self> {
        Self::checked(value, variance, 0.0)
    }

    /// A value known without error.
    pub fn exact(value: f64) -> Result<Self> {
        Self::checked(value, 0.0, 0.0)
    }

    /// A raw `f64` carrying its representation error: a uniform rounding
    /// error of ±½ ULP, i.e. `ulp/√3`, unless the low 26 bits of the
    /// significand are all zero, which marks the value as exact.
    ///
    /// # Examples
    /// ```
    /// use u_vararith::UncertainValue;
    /// assert_eq!(UncertainValue::from_f64(0.75).unwrap().variance(), 0.0);
    /// assert!(UncertainValue::from_f64(0.1).unwrap().uncertainty() > 0.0);
    /// ```
    pub fn from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(VarError::value(value, "cannot represent a non-finite value"));
        }
        Self::checked(value, representation_variance(value), 0.0)
    }

    /// A raw `f32`, by the same rule as [`from_f64`](Self::from_f64) on the
    /// `f32` layout: `ulp/√3` unless the low 12 mantissa bits are zero.
    pub fn from_f32(value: f32) -> Result<Self> {
        if !value.is_finite() {
            return Err(VarError::value(
                f64::from(value),
                "cannot represent a non-finite value",
            ));
        }
        let bits = value.to_bits();
        let variance = if bits & F32_LOW_BITS == 0 {
            0.0
        } else {
            let biased = ((bits >> 23) & 0xFF) as i32;
            let ulp = 2f64.powi(biased.max(1) - 150);
            ulp * ulp / 3.0
        };
        Self::checked(f64::from(value), variance, 0.0)
    }

    /// An integer. Exact up to 2^53 in magnitude; beyond that it is rounded
    /// to the nearest `f64` and carries `ulp/√3` if the rounding lost bits or
    /// the stored significand has nonzero low bits.
    pub fn from_i64(n: i64) -> Self {
        if n.unsigned_abs() <= 1 << 53 {
            return Self {
                value: n as f64,
                variance: 0.0,
                leakage: 0.0,
            };
        }
        let stored = FloatDecomposition::from_wide(n < 0, 0, u128::from(n.unsigned_abs()));
        let (value, inexact) = stored.to_f64_exact();
        Self {
            value,
            variance: integer_variance(value, inexact),
            leakage: 0.0,
        }
    }

    /// Validates a result before it escapes an operation.
    pub(crate) fn checked(value: f64, variance: f64, leakage: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(VarError::value(value, "value is not finite"));
        }
        if !variance.is_finite() || variance < 0.0 {
            return Err(VarError::uncertainty(
                value,
                variance,
                "variance must be finite and non-negative",
            ));
        }
        let dev = variance.sqrt();
        if !(value + dev).is_finite() || !(value - dev).is_finite() {
            return Err(VarError::uncertainty(
                value,
                variance,
                "value ± uncertainty overflows",
            ));
        }
        Ok(Self {
            value,
            variance,
            leakage,
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// Standard deviation.
    pub fn uncertainty(&self) -> f64 {
        self.variance.sqrt()
    }

    /// Probability mass excluded by truncation, in `[0, 1]`.
    pub fn leakage(&self) -> f64 {
        self.leakage
    }

    pub fn negate(&self) -> Self {
        Self {
            value: -self.value,
            ..*self
        }
    }

    /// Multiplies by `2^bits`, exactly unless the result is subnormal.
    ///
    /// # Errors
    /// [`VarError::Value`] if the value overflows,
    /// [`VarError::Uncertainty`] if the variance does.
    pub fn shift(&self, bits: i32) -> Result<Self> {
        let value = FloatDecomposition::from_f64(self.value).shift(bits)?.to_f64();
        let variance = bits
            .checked_mul(2)
            .and_then(|twice| FloatDecomposition::from_f64(self.variance).shift(twice).ok())
            .ok_or_else(|| {
                VarError::uncertainty(
                    value,
                    self.variance,
                    format!("variance overflows shifting by {bits} bits"),
                )
            })?
            .to_f64();
        Self::checked(value, variance, self.leakage)
    }

    /// Adds a constant known without error.
    pub fn add_offset(&self, offset: f64) -> Result<Self> {
        self.add(&Self::exact(offset)?)
    }

    /// Multiplies by a constant known without error.
    pub fn scale(&self, factor: f64) -> Result<Self> {
        self.multiply(&Self::exact(factor)?)
    }

    /// Sum of independent values.
    pub fn add(&self, other: &Self) -> Result<Self> {
        let value = self.value + other.value;
        let leakage = combine_leakage(self.leakage, other.leakage);
        if self.is_exact_integer() && other.is_exact_integer() && value.abs() >= EXACT_INTEGER_LIMIT {
            return exact_integer_result("add", wide::exact_sum(self.value, other.value), leakage);
        }
        Self::checked(value, self.variance + other.variance, leakage)
    }

    pub fn subtract(&self, other: &Self) -> Result<Self> {
        self.add(&other.negate())
    }

    /// Product of independent values.
    pub fn multiply(&self, other: &Self) -> Result<Self> {
        let (a, b) = (self.value, other.value);
        let value = a * b;
        let leakage = combine_leakage(self.leakage, other.leakage);
        if self.is_exact_integer() && other.is_exact_integer() && value.abs() >= EXACT_INTEGER_LIMIT {
            return exact_integer_result("multiply", wide::exact_product(a, b), leakage);
        }
        let variance =
            self.variance * (b * b) + other.variance * (a * a) + self.variance * other.variance;
        Self::checked(value, variance, leakage)
    }

    pub fn divide(&self, other: &Self) -> Result<Self> {
        self.multiply(&other.recip()?)
    }

    pub fn recip(&self) -> Result<Self> {
        self.pow(-1.0)
    }

    pub fn sqrt(&self) -> Result<Self> {
        self.pow(0.5)
    }

    /// See [`Expander::pow`].
    pub fn pow(&self, exponent: f64) -> Result<Self> {
        Expander::standard().pow(self, exponent)
    }

    /// See [`Expander::polynomial`].
    pub fn polynomial(&self, coefficients: &[f64]) -> Result<Self> {
        Expander::standard().polynomial(self, coefficients)
    }

    pub fn sin(&self) -> Result<Self> {
        Expander::standard().sin(self)
    }

    pub fn cos(&self) -> Result<Self> {
        Expander::standard().cos(self)
    }

    pub fn exp(&self) -> Result<Self> {
        Expander::standard().exp(self)
    }

    pub fn ln(&self) -> Result<Self> {
        Expander::standard().ln(self)
    }

    /// [`compare_with`](Self::compare_with) at [`DEFAULT_COMPARE_BINDING`].
    pub fn compare(&self, other: &Self) -> Result<Ordering> {
        self.compare_with(other, DEFAULT_COMPARE_BINDING)
    }

    /// Equal when the difference lies within `binding` standard deviations
    /// of zero, otherwise the sign of the difference.
    ///
    /// # Examples
    /// ```
    /// use std::cmp::Ordering;
    /// use u_vararith::UncertainValue;
    ///
    /// let a = UncertainValue::new(1.0, 0.1).unwrap();
    /// let b = UncertainValue::new(1.05, 0.1).unwrap();
    /// assert_eq!(a.compare(&b).unwrap(), Ordering::Equal);
    /// assert_eq!(a.compare_with(&b, 0.1).unwrap(), Ordering::Less);
    /// ```
    pub fn compare_with(&self, other: &Self, binding: f64) -> Result<Ordering> {
        if !binding.is_finite() || binding < 0.0 {
            return Err(VarError::invalid_parameter(format!(
                "binding must be finite and >= 0, got {binding}"
            )));
        }
        let diff = self.subtract(other)?;
        if diff.value.abs() <= binding * diff.uncertainty() {
            Ok(Ordering::Equal)
        } else if diff.value > 0.0 {
            Ok(Ordering::Greater)
        } else {
            Ok(Ordering::Less)
        }
    }

    fn is_exact_integer(&self) -> bool {
        self.variance == 0.0 && self.value.fract() == 0.0
    }
}

/// `1 − (1 − a)(1 − b)`: mass excluded by either of two independent
/// truncations.
pub(crate) fn combine_leakage(a: f64, b: f64) -> f64 {
    a + b - a * b
}

fn representation_variance(value: f64) -> f64 {
    if FloatDecomposition::from_f64(value).significand() & F64_LOW_BITS == 0 {
        return 0.0;
    }
    let u = ulp(value);
    u * u / 3.0
}

fn integer_variance(value: f64, inexact: bool) -> f64 {
    if inexact {
        let u = ulp(value);
        u * u / 3.0
    } else {
        representation_variance(value)
    }
}

fn exact_integer_result(op: &str, exact: FloatDecomposition, leakage: f64) -> Result<UncertainValue> {
    let (value, inexact) = exact.to_f64_exact();
    tracing::debug!(op, value, inexact, "large integer operands, recomputed exactly");
    UncertainValue::checked(value, integer_variance(value, inexact), leakage)
}

impl Neg for UncertainValue {
    type Output = Self;

    fn neg(self) -> Self {
        self.negate()
    }
}

impl TryFrom<f64> for UncertainValue {
    type Error = VarError;

    fn try_from(value: f64) -> Result<Self> {
        Self::from_f64(value)
    }
}

impl TryFrom<f32> for UncertainValue {
    type Error = VarError;

    fn try_from(value: f32) -> Result<Self> {
        Self::from_f32(value)
    }
}

impl From<i64> for UncertainValue {
    fn from(n: i64) -> Self {
        Self::from_i64(n)
    }
}

impl From<i32> for UncertainValue {
    fn from(n: i32) -> Self {
        Self::from_i64(i64::from(n))
    }
}

impl fmt::Display for UncertainValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.variance == 0.0 && self.value.fract() == 0.0 && self.value.abs() < 1e6 {
            if self.value == 0.0 {
                return f.write_str("0");
            }
            return write!(f, "{}", self.value);
        }
        write!(
            f,
            "{}~{}",
            significant(self.value, 3),
            significant(self.uncertainty(), 1)
        )
    }
}

/// `x` rounded to `digits` significant digits: fixed notation for
/// magnitudes in `[1e-3, 1e6)`, scientific otherwise.
fn significant(x: f64, digits: usize) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    if x == 0.0 {
        return "0".to_string();
    }
    let magnitude = x.abs();
    if (1e-3..1e6).contains(&magnitude) {
        let exponent = magnitude.log10().floor() as i64;
        let excess = exponent + 1 - digits as i64;
        if excess > 0 {
            // integral digits past the precision become zeros
            let unit = 10f64.powi(excess as i32);
            return format!("{:.0}", (x / unit).round() * unit);
        }
        let decimals = (-excess) as usize;
        format!("{x:.decimals$}")
    } else {
        format!("{x:.prec$e}", prec = digits - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::moments::MomentTable;

    fn value(v: f64, dev: f64) -> UncertainValue {
        UncertainValue::new(v, dev).unwrap()
    }

    #[test]
    fn test_default_is_exact_zero() {
        let zero = UncertainValue::default();
        assert_eq!(zero.value(), 0.0);
        assert_eq!(zero.variance(), 0.0);
        assert_eq!(zero.leakage(), 0.0);
        assert_eq!(zero.to_string(), "0");
    }

    #[test]
    fn test_construction_errors() {
        assert!(matches!(UncertainValue::new(f64::NAN, 0.1), Err(VarError::Value { .. })));
        assert!(matches!(UncertainValue::exact(f64::INFINITY), Err(VarError::Value { .. })));
        assert!(matches!(
            UncertainValue::new(1.0, f64::INFINITY),
            Err(VarError::Uncertainty { .. })
        ));
        assert!(matches!(
            UncertainValue::with_variance(1.0, -1.0),
            Err(VarError::Uncertainty { .. })
        ));
        assert!(matches!(
            UncertainValue::new(f64::MAX, 1e300),
            Err(VarError::Uncertainty { .. })
        ));
        assert!(UncertainValue::from_f64(f64::NAN).is_err());
        assert!(UncertainValue::from_f32(f32::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_negative_uncertainty_is_magnitude() {
        assert_eq!(value(1.0, -0.5), value(1.0, 0.5));
    }

    #[test]
    fn test_from_f64_representation_error() {
        assert_eq!(UncertainValue::from_f64(1.0).unwrap().variance(), 0.0);
        assert_eq!(UncertainValue::from_f64(-3.0).unwrap().variance(), 0.0);
        let x = UncertainValue::from_f64(0.1).unwrap();
        let u = ulp(0.1);
        assert_eq!(x.variance(), u * u / 3.0);
        assert_eq!(UncertainValue::try_from(0.1_f64).unwrap(), x);
    }

    #[test]
    fn test_from_f32_representation_error() {
        assert_eq!(UncertainValue::from_f32(0.5).unwrap().variance(), 0.0);
        let x = UncertainValue::from_f32(0.1).unwrap();
        assert_eq!(x.value(), f64::from(0.1f32));
        let u = 2f64.powi(-27);
        assert_eq!(x.variance(), u * u / 3.0);
    }

    #[test]
    fn test_from_i64() {
        let x = UncertainValue::from(1_i64 << 53);
        assert_eq!(x.value(), EXACT_INTEGER_LIMIT);
        assert_eq!(x.variance(), 0.0);
        assert_eq!(UncertainValue::from(-7_i32), UncertainValue::exact(-7.0).unwrap());

        // 2^53 + 1 rounds to 2^53, where the ULP is 2
        let x = UncertainValue::from((1_i64 << 53) + 1);
        assert_eq!(x.value(), EXACT_INTEGER_LIMIT);
        assert_eq!(x.variance(), 4.0 / 3.0);

        // 2^60 is stored exactly
        assert_eq!(UncertainValue::from(1_i64 << 60).variance(), 0.0);
        assert_eq!(UncertainValue::from(i64::MIN).variance(), 0.0);
        let max = UncertainValue::from(i64::MAX);
        assert_eq!(max.value(), 2f64.powi(63));
        assert_eq!(max.variance(), 2048.0 * 2048.0 / 3.0);
    }

    #[test]
    fn test_large_integer_product_uses_exact_path() {
        let a = UncertainValue::from(64919121_i64);
        let b = UncertainValue::from(205117922_i64);
        let product = a.multiply(&b).unwrap();
        assert_eq!(product.value(), 13316075197586562.0);
        // the naive closed form would report no uncertainty at all
        assert_eq!(product.variance(), 4.0 / 3.0);
        assert!((product.uncertainty() - 2.0 / 3f64.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn test_large_integer_sum_uses_exact_path() {
        let big = UncertainValue::from(1_i64 << 60);
        let sum = big.add(&UncertainValue::from(1_i64)).unwrap();
        assert_eq!(sum.value(), 2f64.powi(60));
        assert_eq!(sum.variance(), 256.0 * 256.0 / 3.0);

        // stored exactly, but the low significand bit is set
        let sum = big.add(&UncertainValue::from(256_i64)).unwrap();
        assert_eq!(sum.value(), 2f64.powi(60) + 256.0);
        assert_eq!(sum.variance(), 256.0 * 256.0 / 3.0);

        // stored exactly with the low 26 significand bits clear
        let sum = big.add(&UncertainValue::from(1_i64 << 34)).unwrap();
        assert_eq!(sum.value(), 2f64.powi(60) + 2f64.powi(34));
        assert_eq!(sum.variance(), 0.0);
    }

    #[test]
    fn test_result_just_past_exact_range_uses_exact_path() {
        // 321 · 28059810762433 = 2^53 + 1, which the naive product rounds
        // down to 2^53 itself
        let product = UncertainValue::from(321_i64)
            .multiply(&UncertainValue::from(28_059_810_762_433_i64))
            .unwrap();
        assert_eq!(product.value(), EXACT_INTEGER_LIMIT);
        assert_eq!(product.variance(), 4.0 / 3.0);
        assert_eq!(product, UncertainValue::from((1_i64 << 53) + 1));

        let sum = UncertainValue::from((1_i64 << 53) - 1)
            .add(&UncertainValue::from(2_i64))
            .unwrap();
        assert_eq!(sum, UncertainValue::from((1_i64 << 53) + 1));

        let negative = UncertainValue::from(-321_i64)
            .multiply(&UncertainValue::from(28_059_810_762_433_i64))
            .unwrap();
        assert_eq!(negative.value(), -EXACT_INTEGER_LIMIT);
        assert_eq!(negative.variance(), 4.0 / 3.0);

        // exactly 2^53 is representable and stays exact
        let edge = UncertainValue::from((1_i64 << 53) - 2)
            .add(&UncertainValue::from(2_i64))
            .unwrap();
        assert_eq!(edge.value(), EXACT_INTEGER_LIMIT);
        assert_eq!(edge.variance(), 0.0);
    }

    #[test]
    fn test_small_integer_ops_stay_exact() {
        let a = UncertainValue::from(12345_i64);
        let b = UncertainValue::from(-678_i64);
        assert_eq!(a.multiply(&b).unwrap(), UncertainValue::exact(-8369910.0).unwrap());
        assert_eq!(a.add(&b).unwrap(), UncertainValue::exact(11667.0).unwrap());
    }

    #[test]
    fn test_multiply_variance() {
        let p = value(2.0, 0.1).multiply(&value(3.0, 0.2)).unwrap();
        assert_eq!(p.value(), 6.0);
        assert!((p.variance() - 0.2504).abs() < 1e-15);
    }

    #[test]
    fn test_negate_and_subtract() {
        let x = value(2.0, 0.3);
        assert_eq!((-x).value(), -2.0);
        assert_eq!((-x).variance(), x.variance());
        let d = x.subtract(&value(0.5, 0.4)).unwrap();
        assert_eq!(d.value(), 1.5);
        assert!((d.variance() - 0.25).abs() < 1e-15);
    }

    #[test]
    fn test_shift() {
        let y = value(3.0, 0.5).shift(2).unwrap();
        assert_eq!(y.value(), 12.0);
        assert_eq!(y.variance(), 4.0);
        let y = value(3.0, 0.5).shift(-1).unwrap();
        assert_eq!(y.value(), 1.5);
        assert_eq!(y.variance(), 0.0625);
    }

    #[test]
    fn test_shift_overflow() {
        assert!(matches!(
            UncertainValue::exact(f64::MAX).unwrap().shift(1),
            Err(VarError::Value { .. })
        ));
        assert!(matches!(
            value(1.0, 1e150).shift(200),
            Err(VarError::Uncertainty { .. })
        ));
    }

    #[test]
    fn test_offset_and_scale() {
        let x = value(2.0, 0.5);
        let y = x.add_offset(1.5).unwrap();
        assert_eq!(y.value(), 3.5);
        assert_eq!(y.variance(), x.variance());
        let y = x.scale(-4.0).unwrap();
        assert_eq!(y.value(), -8.0);
        assert_eq!(y.variance(), 4.0);
        assert!(x.add_offset(f64::NAN).is_err());
    }

    #[test]
    fn test_divide_by_exact() {
        let x = value(6.0, 0.2);
        let y = x.divide(&UncertainValue::exact(2.0).unwrap()).unwrap();
        assert_eq!(y.value(), 3.0);
        assert!((y.variance() - 0.01).abs() < 1e-17);
    }

    #[test]
    fn test_divide_by_zero_fails() {
        let err = value(1.0, 0.1).divide(&UncertainValue::default()).unwrap_err();
        assert!(matches!(err, VarError::Value { .. }));
    }

    #[test]
    fn test_sqrt_scales() {
        let a = value(1.0, 0.1).sqrt().unwrap();
        let b = value(4.0, 0.4).sqrt().unwrap();
        assert!((b.value() - 2.0 * a.value()).abs() < 1e-15);
        let err = value(1.0, 0.5).sqrt().unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::NotMonotonic));
    }

    #[test]
    fn test_leakage_combines() {
        let x = value(1.0, 0.1).sin().unwrap();
        let table = MomentTable::standard().leakage();
        assert!((x.leakage() - table).abs() < 1e-24);
        let y = x.add(&value(2.0, 0.1)).unwrap();
        assert_eq!(y.leakage(), x.leakage());
        let z = x.multiply(&x).unwrap();
        assert!(z.leakage() > x.leakage());
        assert!(z.leakage() < 2.0 * x.leakage());
    }

    #[test]
    fn test_display() {
        assert_eq!(value(1.0, 0.1).to_string(), "1.00~0.1");
        assert_eq!(UncertainValue::from(3_i64).to_string(), "3");
        assert_eq!(UncertainValue::from(-42_i64).to_string(), "-42");
        assert_eq!(UncertainValue::exact(-0.0).unwrap().to_string(), "0");
        assert_eq!(UncertainValue::exact(2.5).unwrap().to_string(), "2.50~0");
        assert_eq!(UncertainValue::exact(1.5e7).unwrap().to_string(), "1.50e7~0");
        assert_eq!(value(-12.345, 0.05).to_string(), "-12.3~0.05");
        assert_eq!(value(1.5e-5, 2e-6).to_string(), "1.50e-5~2e-6");
        assert_eq!(value(1234.5678, 0.3).to_string(), "1230~0.3");
        assert_eq!(value(-98765.4, 20.0).to_string(), "-98800~20");
        assert_eq!(value(456.0, 1234.0).to_string(), "456~1000");
    }

    #[test]
    fn test_significant_non_finite() {
        assert_eq!(significant(f64::NAN, 3), "NaN");
        assert_eq!(significant(f64::INFINITY, 3), "+Inf");
        assert_eq!(significant(f64::NEG_INFINITY, 1), "-Inf");
    }

    #[test]
    fn test_compare() {
        let a = value(1.0, 0.1);
        assert_eq!(a.compare(&value(1.05, 0.1)).unwrap(), Ordering::Equal);
        assert_eq!(a.compare(&value(2.0, 0.1)).unwrap(), Ordering::Less);
        assert_eq!(value(2.0, 0.1).compare(&a).unwrap(), Ordering::Greater);

        let e = UncertainValue::exact(1.0).unwrap();
        assert_eq!(e.compare_with(&e, 0.0).unwrap(), Ordering::Equal);
        assert!(a.compare_with(&a, -1.0).is_err());
        assert!(a.compare_with(&a, f64::NAN).is_err());
    }
}
