//! Operations every uncertainty model provides.
//!
//! Code written against [`UncertainArithmetic`] runs unchanged on any
//! model. Binary operations take `&Self`, so mixing two models in one
//! operation does not compile.

use crate::error::Result;
use crate::value::UncertainValue;

/// Arithmetic on a value that carries its own uncertainty.
pub trait UncertainArithmetic: Sized {
    fn value(&self) -> f64;

    /// Standard deviation.
    fn uncertainty(&self) -> f64;

    fn negate(&self) -> Self;

    /// Multiplies by `2^bits`.
    fn shift(&self, bits: i32) -> Result<Self>;

    /// Adds a constant known without error.
    fn add_offset(&self, offset: f64) -> Result<Self>;

    /// Multiplies by a constant known without error.
    fn scale(&self, factor: f64) -> Result<Self>;

    fn pow(&self, exponent: f64) -> Result<Self>;

    fn add(&self, other: &Self) -> Result<Self>;

    fn multiply(&self, other: &Self) -> Result<Self>;
}

impl UncertainArithmetic for UncertainValue {
    fn value(&self) -> f64 {
        UncertainValue::value(self)
    }

    fn uncertainty(&self) -> f64 {
        UncertainValue::uncertainty(self)
    }

    fn negate(&self) -> Self {
        UncertainValue::negate(self)
    }

    fn shift(&self, bits: i32) -> Result<Self> {
        UncertainValue::shift(self, bits)
    }

    fn add_offset(&self, offset: f64) -> Result<Self> {
        UncertainValue::add_offset(self, offset)
    }

    fn scale(&self, factor: f64) -> Result<Self> {
        UncertainValue::scale(self, factor)
    }

    fn pow(&self, exponent: f64) -> Result<Self> {
        UncertainValue::pow(self, exponent)
    }

    fn add(&self, other: &Self) -> Result<Self> {
        UncertainValue::add(self, other)
    }

    fn multiply(&self, other: &Self) -> Result<Self> {
        UncertainValue::multiply(self, other)
    }
}
