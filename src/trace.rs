//! Per-order diagnostics of a Taylor expansion.
//!
//! The engine reports to a [`TraceSink`]. Ordinary calls use [`NoTrace`];
//! [`TraceLog`] keeps everything in memory and renders it as tab-separated
//! text with one block per section, each introduced by a header row whose
//! first cell is the anchor `Input`, `Coefficient`, `Order` or `Output`.

use std::fmt;

use crate::taylor::{Scale, TaylorSeries};
use crate::value::UncertainValue;

/// Receiver of expansion progress. Every method defaults to a no-op.
pub trait TraceSink {
    /// Called once per expansion with a nonzero input variance.
    fn begin(&mut self, _input: &UncertainValue, _series: &TaylorSeries) {}

    /// Called after each evaluated order, including the one that fails
    /// the positivity check.
    fn order(&mut self, _row: &OrderTrace) {}

    /// Called with the rescaled result of a converged expansion.
    fn finish(&mut self, _value: f64, _variance: f64) {}
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl TraceSink for NoTrace {}

/// State after one even order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTrace {
    pub order: usize,
    pub monotonic: usize,
    /// `scaleⁿᐟ²`
    pub power: f64,
    pub moment: f64,
    /// Partial value sum, before output rescaling.
    pub value: f64,
    /// Partial variance sum, before output rescaling.
    pub variance: f64,
    pub value_term: f64,
    pub variance_term: f64,
}

/// In-memory trace of the most recent expansion.
///
/// # Examples
/// ```
/// use u_vararith::taylor::{Expander, TaylorSeries};
/// use u_vararith::trace::TraceLog;
/// use u_vararith::UncertainValue;
///
/// let x = UncertainValue::new(0.0, 0.1).unwrap();
/// let mut log = TraceLog::default();
/// Expander::standard()
///     .expand_traced(&x, &TaylorSeries::exponential(0.0, 200), &mut log)
///     .unwrap();
/// let text = log.to_string();
/// assert!(text.starts_with("Input\t"));
/// assert!(text.contains("\nOutput\t"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceLog {
    input: Option<(f64, f64)>,
    scales: Option<(Scale, Scale)>,
    degree: Option<usize>,
    coefficients: Vec<f64>,
    orders: Vec<OrderTrace>,
    output: Option<(f64, f64)>,
}

impl TraceLog {
    /// Operand value and variance.
    pub fn input(&self) -> Option<(f64, f64)> {
        self.input
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn orders(&self) -> &[OrderTrace] {
        &self.orders
    }

    /// Final value and variance, `None` if the expansion failed.
    pub fn output(&self) -> Option<(f64, f64)> {
        self.output
    }
}

impl TraceSink for TraceLog {
    fn begin(&mut self, input: &UncertainValue, series: &TaylorSeries) {
        *self = Self {
            input: Some((input.value(), input.variance())),
            scales: Some((series.input(), series.output())),
            degree: series.degree(),
            coefficients: series.coefficients().to_vec(),
            ..Self::default()
        };
    }

    fn order(&mut self, row: &OrderTrace) {
        self.orders.push(*row);
    }

    fn finish(&mut self, value: f64, variance: f64) {
        self.output = Some((value, variance));
    }
}

impl fmt::Display for TraceLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Input\tValue\tVariance\tInputScale\tOutputScale\tDegree")?;
        if let (Some((value, variance)), Some((input, output))) = (self.input, self.scales) {
            let degree = self.degree.map_or_else(|| "-".to_string(), |d| d.to_string());
            writeln!(f, "\t{value}\t{variance}\t{input:?}\t{output:?}\t{degree}")?;
        }

        writeln!(f, "Coefficient\tValue")?;
        for (n, c) in self.coefficients.iter().enumerate() {
            writeln!(f, "{n}\t{c}")?;
        }

        writeln!(
            f,
            "Order\tMonotonic\tPower\tMoment\tValue\tVariance\tValueTerm\tVarianceTerm"
        )?;
        for row in &self.orders {
            writeln!(
                f,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                row.order,
                row.monotonic,
                row.power,
                row.moment,
                row.value,
                row.variance,
                row.value_term,
                row.variance_term
            )?;
        }

        writeln!(f, "Output\tValue\tUncertainty\tVariance")?;
        if let Some((value, variance)) = self.output {
            writeln!(f, "\t{value}\t{}\t{variance}", variance.sqrt())?;
        }
        Ok(())
    }
}
