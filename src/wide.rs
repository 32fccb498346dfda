//! Exact sums and products of finite floats in 128-bit integer arithmetic.
//!
//! Both operands are decomposed into 53-bit significands, combined without
//! rounding, and handed back as a [`FloatDecomposition`] whose single
//! rounding step happens at reconstruction. `to_f64_exact` then reports
//! whether the exact result was representable.

use crate::decompose::FloatDecomposition;

/// Largest alignment shift that keeps a 53-bit significand inside `u128`.
const MAX_ALIGN: i32 = 74;

/// Exact `a · b`. Both inputs must be finite.
pub(crate) fn exact_product(a: f64, b: f64) -> FloatDecomposition {
    let x = FloatDecomposition::from_f64(a);
    let y = FloatDecomposition::from_f64(b);
    let significand = u128::from(x.significand()) * u128::from(y.significand());
    FloatDecomposition::from_wide(
        x.sign() != y.sign(),
        x.exponent() + y.exponent(),
        significand,
    )
}

/// Exact `a + b`. Both inputs must be finite.
///
/// When the exponents are more than 74 bits apart, the smaller operand lies
/// entirely below the rounding position of the larger one and is replaced
/// by a single sticky unit.
pub(crate) fn exact_sum(a: f64, b: f64) -> FloatDecomposition {
    let x = FloatDecomposition::from_f64(a);
    let y = FloatDecomposition::from_f64(b);
    if x.significand() == 0 {
        return y;
    }
    if y.significand() == 0 {
        return x;
    }

    let (big, small) = if x.exponent() >= y.exponent() { (x, y) } else { (y, x) };
    let gap = big.exponent() - small.exponent();
    let (big_mag, small_mag, exponent) = if gap <= MAX_ALIGN {
        (
            u128::from(big.significand()) << gap,
            u128::from(small.significand()),
            small.exponent(),
        )
    } else {
        (
            u128::from(big.significand()) << MAX_ALIGN,
            1,
            big.exponent() - MAX_ALIGN,
        )
    };

    if big.sign() == small.sign() {
        return FloatDecomposition::from_wide(big.sign(), exponent, big_mag + small_mag);
    }
    if big_mag >= small_mag {
        FloatDecomposition::from_wide(big.sign(), exponent, big_mag - small_mag)
    } else {
        FloatDecomposition::from_wide(small.sign(), exponent, small_mag - big_mag)
    }
}
