//! Taylor-series variance propagation.
//!
//! For an operand `x = v + δ` with `δ = σ·Z`, `Z` a standard normal variable
//! truncated at the table's binding, a function with Taylor coefficients
//! `cₙ = f⁽ⁿ⁾(v)/n!` gives
//!
//! ```text
//! E[f(x)]   = c₀ + Σₙ cₙ·σⁿ·mₙ
//! Var[f(x)] = Σₙ σⁿ · Σⱼ₌₁ⁿ⁻¹ cⱼ·cₙ₋ⱼ·(mₙ − mⱼ·mₙ₋ⱼ)
//! ```
//!
//! where `mₙ` are the truncated moments. Only even orders contribute. In
//! relative mode `σ` is replaced by `σ/v`, which keeps power-like functions
//! scale invariant.
//!
//! # Convergence
//!
//! An infinite series is accepted only when:
//! - every partial variance is non-negative ([`FailureKind::NotPositive`]);
//! - every order is finite, unless the monotonic run was already long
//!   enough, in which case the expansion stops at the last finite order
//!   ([`FailureKind::NotFinite`]);
//! - the final run of non-increasing variance contributions reaches
//!   `min_monotonic` ([`FailureKind::NotMonotonic`]);
//! - the last value contribution is within `stability·σ_out` or one ULP of
//!   the result ([`FailureKind::NotStable`]).
//!
//! A finite series (a polynomial) runs to twice its degree and is exact, so
//! only the first two rules apply. A series whose scale power underflows
//! stops early and is accepted as converged.

use crate::decompose::ulp;
use crate::error::{ExpansionFailure, ExpansionState, FailureKind, Result, VarError};
use crate::moments::MomentTable;
use crate::params::ExpansionParams;
use crate::trace::{NoTrace, OrderTrace, TraceSink};
use crate::value::{combine_leakage, UncertainValue};

/// How a quantity is measured: in absolute units or relative to the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scale {
    Absolute,
    Relative,
}

/// Taylor coefficients of a function at an expansion point, with the scales
/// of its input and output.
///
/// With a relative output, `coefficients[0]` is `f(v)` and the remaining
/// coefficients are those of `f(v(1 + t))/f(v)` (or `f(v + t)/f(v)` for an
/// absolute input); the expansion is carried out around 1 and rescaled by
/// `f(v)` at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct TaylorSeries {
    coefficients: Vec<f64>,
    input: Scale,
    output: Scale,
    degree: Option<usize>,
}

impl TaylorSeries {
    /// A series from explicit coefficients. `degree` marks a finite series.
    pub fn new(coefficients: Vec<f64>, input: Scale, output: Scale, degree: Option<usize>) -> Self {
        Self {
            coefficients,
            input,
            output,
            degree,
        }
    }

    /// Re-expands the polynomial `Σ aᵢ·xⁱ` around `x = value`:
    /// `cₖ = Σᵢ₌ₖ aᵢ·C(i, k)·valueⁱ⁻ᵏ`.
    pub fn polynomial_at(value: f64, coefficients: &[f64]) -> Self {
        let degree = coefficients.len().saturating_sub(1);
        let shifted = (0..coefficients.len())
            .map(|k| {
                let mut binomial = 1.0;
                let mut power = 1.0;
                let mut sum = 0.0;
                for (i, &a) in coefficients.iter().enumerate().skip(k) {
                    sum += a * binomial * power;
                    binomial = binomial * (i + 1) as f64 / (i + 1 - k) as f64;
                    power *= value;
                }
                sum
            })
            .collect();
        Self::new(shifted, Scale::Absolute, Scale::Absolute, Some(degree))
    }

    /// `x^exponent`: `(1 + t)^p = Σ C(p, n)·tⁿ`, relative in and out.
    pub fn power(value: f64, exponent: f64, max_order: usize) -> Self {
        let mut coefficients = Vec::with_capacity(max_order + 1);
        coefficients.push(value.powf(exponent));
        let mut a = 1.0;
        for n in 1..=max_order {
            a = a * (exponent - n as f64 + 1.0) / n as f64;
            coefficients.push(a);
        }
        Self::new(coefficients, Scale::Relative, Scale::Relative, None)
    }

    /// `sin x` around `value`.
    pub fn sine(value: f64, max_order: usize) -> Self {
        let (s, c) = (value.sin(), value.cos());
        Self::derivative_cycle([s, c, -s, -c], max_order)
    }

    /// `cos x` around `value`.
    pub fn cosine(value: f64, max_order: usize) -> Self {
        let (s, c) = (value.sin(), value.cos());
        Self::derivative_cycle([c, -s, -c, s], max_order)
    }

    /// `e^x = e^v · Σ tⁿ/n!`, absolute in, relative out.
    pub fn exponential(value: f64, max_order: usize) -> Self {
        let mut coefficients = Vec::with_capacity(max_order + 1);
        coefficients.push(value.exp());
        let mut inverse_factorial = 1.0;
        for n in 1..=max_order {
            inverse_factorial /= n as f64;
            coefficients.push(inverse_factorial);
        }
        Self::new(coefficients, Scale::Absolute, Scale::Relative, None)
    }

    /// `ln x = ln v + Σ (−1)ⁿ⁺¹·tⁿ/n`, relative in, absolute out.
    pub fn logarithm(value: f64, max_order: usize) -> Self {
        let coefficients = std::iter::once(value.ln())
            .chain((1..=max_order).map(|n| {
                let sign = if n % 2 == 1 { 1.0 } else { -1.0 };
                sign / n as f64
            }))
            .collect();
        Self::new(coefficients, Scale::Relative, Scale::Absolute, None)
    }

    fn derivative_cycle(derivatives: [f64; 4], max_order: usize) -> Self {
        let mut inverse_factorial = 1.0;
        let coefficients = (0..=max_order)
            .map(|n| {
                if n > 0 {
                    inverse_factorial /= n as f64;
                }
                derivatives[n % 4] * inverse_factorial
            })
            .collect();
        Self::new(coefficients, Scale::Absolute, Scale::Absolute, None)
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn input(&self) -> Scale {
        self.input
    }

    pub fn output(&self) -> Scale {
        self.output
    }

    /// Degree of a finite series, `None` for an infinite one.
    pub fn degree(&self) -> Option<usize> {
        self.degree
    }
}

/// Runs Taylor expansions against a moment table under fixed convergence
/// parameters.
///
/// # Examples
/// ```
/// use u_vararith::taylor::Expander;
/// use u_vararith::UncertainValue;
///
/// let x = UncertainValue::new(1.0, 0.1).unwrap();
/// let y = Expander::standard().pow(&x, 2.0).unwrap();
/// assert!((y.value() - 1.01).abs() < 1e-8);
/// assert!((y.variance() - 0.0402).abs() < 1e-7);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Expander<'m> {
    moments: &'m MomentTable,
    params: ExpansionParams,
}

impl Expander<'static> {
    /// The shared moment table with default parameters.
    pub fn standard() -> Self {
        Self {
            moments: MomentTable::standard(),
            params: ExpansionParams::default(),
        }
    }
}

impl<'m> Expander<'m> {
    /// # Errors
    /// [`VarError::InvalidParameter`] if `params` does not validate or asks
    /// for orders beyond the table.
    pub fn new(moments: &'m MomentTable, params: ExpansionParams) -> Result<Self> {
        params.validate()?;
        if params.max_order > moments.max_order() {
            return Err(VarError::invalid_parameter(format!(
                "max_order {} exceeds the moment table's {}",
                params.max_order,
                moments.max_order()
            )));
        }
        Ok(Self { moments, params })
    }

    pub fn moments(&self) -> &'m MomentTable {
        self.moments
    }

    pub fn params(&self) -> &ExpansionParams {
        &self.params
    }

    /// Propagates `x` through `series`.
    pub fn expand(&self, x: &UncertainValue, series: &TaylorSeries) -> Result<UncertainValue> {
        self.expand_traced(x, series, &mut NoTrace)
    }

    /// Propagates `x` through `series`, reporting every order to `sink`.
    ///
    /// # Errors
    /// - [`VarError::Value`] if `f(v)` itself is not finite
    /// - [`VarError::Expansion`] on a convergence failure
    /// - [`VarError::InvalidParameter`] for an empty series or a polynomial
    ///   whose exact expansion needs orders beyond `max_order`
    pub fn expand_traced(
        &self,
        x: &UncertainValue,
        series: &TaylorSeries,
        sink: &mut dyn TraceSink,
    ) -> Result<UncertainValue> {
        let coefficients = series.coefficients();
        let Some(&c0) = coefficients.first() else {
            return Err(VarError::invalid_parameter("Taylor series has no coefficients"));
        };
        if !c0.is_finite() {
            return Err(VarError::value(
                c0,
                format!("function is not finite at {}", x.value()),
            ));
        }
        if x.variance() == 0.0 {
            return UncertainValue::checked(c0, 0.0, x.leakage());
        }

        let top = match series.degree() {
            Some(degree) if 2 * degree > self.params.max_order => {
                return Err(VarError::invalid_parameter(format!(
                    "degree {degree} needs order {} beyond max_order {}",
                    2 * degree,
                    self.params.max_order
                )));
            }
            Some(degree) => 2 * degree,
            None => self.params.max_order,
        };
        let scale = match series.input() {
            Scale::Absolute => x.variance(),
            Scale::Relative => x.variance() / (x.value() * x.value()),
        };
        let relative_output = series.output() == Scale::Relative;

        sink.begin(x, series);

        let mut state = ExpansionState {
            coefficients: coefficients.to_vec(),
            input_value: x.value(),
            input_variance: x.variance(),
            value: if relative_output { 1.0 } else { c0 },
            ..ExpansionState::default()
        };
        let c = |k: usize| coefficients.get(k).copied().unwrap_or(0.0);
        let mut power = 1.0;
        let mut previous_term: Option<f64> = None;
        let mut settled = false;

        for n in (2..=top).step_by(2) {
            let next = power * scale;
            if next == 0.0 || (scale < 1.0 && next >= power) {
                settled = true;
                break;
            }
            power = next;

            let moment = self.moments.get(n);
            let value_term = c(n) * power * moment;
            let variance_term = (1..n)
                .map(|j| c(j) * c(n - j) * (moment - self.moments.get(j) * self.moments.get(n - j)))
                .sum::<f64>()
                * power;
            let value = state.value + value_term;
            let variance = state.variance + variance_term;

            if ![value_term, variance_term, value, variance]
                .iter()
                .all(|t| t.is_finite())
            {
                if state.monotonic >= self.params.min_monotonic {
                    tracing::debug!(
                        order = n,
                        monotonic = state.monotonic,
                        "non-finite order after a monotonic run, keeping previous order"
                    );
                    settled = true;
                    break;
                }
                state.order = n;
                state.value_term = value_term;
                state.variance_term = variance_term;
                return self.fail(FailureKind::NotFinite, state);
            }

            if let Some(previous) = previous_term {
                if variance_term.abs() <= previous.abs() {
                    state.monotonic += 1;
                } else {
                    state.monotonic = 0;
                }
            }
            previous_term = Some(variance_term);
            state.value = value;
            state.variance = variance;
            state.order = n;
            state.value_term = value_term;
            state.variance_term = variance_term;

            sink.order(&OrderTrace {
                order: n,
                monotonic: state.monotonic,
                power,
                moment,
                value,
                variance,
                value_term,
                variance_term,
            });

            if variance < 0.0 {
                return self.fail(FailureKind::NotPositive, state);
            }
        }

        if series.degree().is_none() && !settled {
            if state.monotonic < self.params.min_monotonic {
                return self.fail(FailureKind::NotMonotonic, state);
            }
            let bound = (self.params.stability * state.variance.sqrt()).max(ulp(state.value));
            if state.value_term.abs() > bound {
                return self.fail(FailureKind::NotStable, state);
            }
        }

        let (value, variance) = if relative_output {
            (state.value * c0, state.variance * (c0 * c0))
        } else {
            (state.value, state.variance)
        };
        sink.finish(value, variance);
        UncertainValue::checked(
            value,
            variance,
            combine_leakage(x.leakage(), self.moments.leakage()),
        )
    }

    fn fail(&self, kind: FailureKind, state: ExpansionState) -> Result<UncertainValue> {
        tracing::debug!(
            %kind,
            order = state.order,
            monotonic = state.monotonic,
            value = state.value,
            variance = state.variance,
            "Taylor expansion failed"
        );
        Err(ExpansionFailure::new(kind, state).into())
    }

    /// `x^exponent`. Non-negative integer exponents whose exact expansion
    /// fits in `max_order` go through the finite polynomial path.
    pub fn pow(&self, x: &UncertainValue, exponent: f64) -> Result<UncertainValue> {
        if exponent >= 0.0
            && exponent.fract() == 0.0
            && 2.0 * exponent <= self.params.max_order as f64
        {
            let degree = exponent as usize;
            let mut monomial = vec![0.0; degree + 1];
            monomial[degree] = 1.0;
            return self.polynomial(x, &monomial);
        }
        self.expand(x, &TaylorSeries::power(x.value(), exponent, self.params.max_order))
    }

    /// `Σ coefficients[i]·xⁱ`, expanded exactly around `x.value()`.
    pub fn polynomial(&self, x: &UncertainValue, coefficients: &[f64]) -> Result<UncertainValue> {
        self.expand(x, &TaylorSeries::polynomial_at(x.value(), coefficients))
    }

    pub fn sin(&self, x: &UncertainValue) -> Result<UncertainValue> {
        self.expand(x, &TaylorSeries::sine(x.value(), self.params.max_order))
    }

    pub fn cos(&self, x: &UncertainValue) -> Result<UncertainValue> {
        self.expand(x, &TaylorSeries::cosine(x.value(), self.params.max_order))
    }

    pub fn exp(&self, x: &UncertainValue) -> Result<UncertainValue> {
        self.expand(x, &TaylorSeries::exponential(x.value(), self.params.max_order))
    }

    /// Natural logarithm.
    pub fn ln(&self, x: &UncertainValue) -> Result<UncertainValue> {
        self.expand(x, &TaylorSeries::logarithm(x.value(), self.params.max_order))
    }
}
