//! Even moments of the truncated standard normal distribution.
//!
//! Taylor-series variance propagation weights the n-th term by `E[Zⁿ]`. For
//! an unbounded Gaussian these moments grow as `(n−1)!!`, so any series with
//! a nonzero input uncertainty eventually diverges. Truncating the
//! distribution at `±binding` standard deviations bounds every moment by
//! `bindingⁿ`, at the price of a quantified excluded tail probability, the
//! *leakage*, that every propagated result carries.
//!
//! # Algorithm
//!
//! With `b` the binding,
//!
//! ```text
//! ∫₀ᵇ zⁿ e^{−z²/2} dz = e^{−b²/2} Σₖ b^{n+1+2k} / Πᵢ₌₀ᵏ (n+1+2i)
//! ```
//!
//! is a series of positive terms, so it sums without cancellation at any
//! order, unlike the integration-by-parts recursion
//! `Mₙ = (n−1)·Mₙ₋₂ − 2bⁿ⁻¹φ(b)`, which loses every digit once `(n−1)!!`
//! dwarfs `bⁿ`. The table stores conditional moments `E[Zⁿ | |Z| ≤ b]`, so
//! `moment(0) = 1`.

use once_cell::sync::Lazy;

use crate::error::{Result, VarError};
use crate::special;

/// Truncation bound, in standard deviations, of the shared table.
pub const DEFAULT_BINDING: f64 = 6.0;

/// Highest order held by the shared table.
pub const DEFAULT_MAX_ORDER: usize = 200;

const MAX_SERIES_TERMS: usize = 10_000;

static STANDARD: Lazy<MomentTable> = Lazy::new(|| {
    MomentTable::new(DEFAULT_BINDING, DEFAULT_MAX_ORDER)
        .unwrap_or_else(|e| unreachable!("default moment table is valid: {e}"))
});

/// Immutable table of `E[Zⁿ | |Z| ≤ binding]` for `n = 0..=max_order`.
///
/// # Examples
/// ```
/// use u_vararith::moments::MomentTable;
/// let table = MomentTable::new(3.0, 20).unwrap();
/// assert_eq!(table.get(0), 1.0);
/// assert_eq!(table.get(3), 0.0);
/// assert!(table.get(2) < 1.0);
/// assert!((table.leakage() - 0.0026997960632601913).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MomentTable {
    binding: f64,
    leakage: f64,
    max_order: usize,
    /// `even[k]` is the moment of order `2k`.
    even: Vec<f64>,
}

impl MomentTable {
    /// Computes the table for a truncation at `±binding`.
    ///
    /// # Errors
    /// [`VarError::InvalidParameter`] if `binding` is not finite and
    /// positive, or if `binding^max_order` overflows.
    pub fn new(binding: f64, max_order: usize) -> Result<Self> {
        if !binding.is_finite() || binding <= 0.0 {
            return Err(VarError::invalid_parameter(format!(
                "binding must be finite and > 0, got {binding}"
            )));
        }
        let top = i32::try_from(max_order).map_err(|_| {
            VarError::invalid_parameter(format!("max_order {max_order} is too large"))
        })?;
        if !binding.powi(top).is_finite() {
            return Err(VarError::invalid_parameter(format!(
                "moments of order {max_order} overflow at binding {binding}"
            )));
        }

        let base = scaled_partial_moment(0, binding);
        let even: Vec<f64> = (0..=max_order)
            .step_by(2)
            .map(|n| {
                if n == 0 {
                    1.0
                } else {
                    binding.powi(n as i32) * scaled_partial_moment(n, binding) / base
                }
            })
            .collect();

        tracing::trace!(binding, max_order, moment_2 = even.get(1).copied(), "built moment table");

        Ok(Self {
            binding,
            leakage: leakage(binding),
            max_order,
            even,
        })
    }

    /// The process-wide table at [`DEFAULT_BINDING`] up to
    /// [`DEFAULT_MAX_ORDER`], built once on first use.
    pub fn standard() -> &'static MomentTable {
        &STANDARD
    }

    pub fn binding(&self) -> f64 {
        self.binding
    }

    /// Probability mass excluded by the truncation.
    pub fn leakage(&self) -> f64 {
        self.leakage
    }

    pub fn max_order(&self) -> usize {
        self.max_order
    }

    /// `E[Zⁿ | |Z| ≤ binding]`: 0 for odd `n` and for `n` beyond the table.
    pub fn get(&self, n: usize) -> f64 {
        if n % 2 == 1 {
            return 0.0;
        }
        self.even.get(n / 2).copied().unwrap_or(0.0)
    }
}

/// Probability mass of a standard normal beyond `±binding`.
///
/// # Examples
/// ```
/// use u_vararith::moments::leakage;
/// assert!((leakage(6.0) / 1.9731752900754024e-9 - 1.0).abs() < 1e-9);
/// ```
pub fn leakage(binding: f64) -> f64 {
    special::two_sided_tail(binding)
}

/// `b^{−(n+1)} · e^{b²/2} · ∫₀ᵇ zⁿ e^{−z²/2} dz`, i.e.
/// `Σₖ b^{2k} / Πᵢ₌₀ᵏ (n+1+2i)`. Terms stay below `e^{b²/2}`.
fn scaled_partial_moment(n: usize, binding: f64) -> f64 {
    let b2 = binding * binding;
    let first = n as f64 + 1.0;
    let mut term = 1.0 / first;
    let mut sum = term;
    for k in 1..MAX_SERIES_TERMS {
        term *= b2 / (first + 2.0 * k as f64);
        sum += term;
        if term < sum * f64::EPSILON * 0.5 {
            break;
        }
    }
    sum
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn moments_increase_with_binding(b1 in 1.0_f64..5.0, b2 in 1.0_f64..5.0, k in 1_usize..10) {
            prop_assume!((b1 - b2).abs() > 1e-2);
            let (lo, hi) = if b1 < b2 { (b1, b2) } else { (b2, b1) };
            let n = 2 * k;
            let m_lo = MomentTable::new(lo, n).unwrap().get(n);
            let m_hi = MomentTable::new(hi, n).unwrap().get(n);
            prop_assert!(m_lo <= m_hi, "moment({}) at {} = {} not below {} at {}", n, lo, m_lo, m_hi, hi);
        }

        #[test]
        fn moments_grow_with_order(b in 1.5_f64..8.0, k in 1_usize..40) {
            // E[Z^{n+2}] ≥ E[Z^n]·E[Z²] by Chebyshev's sum inequality
            let table = MomentTable::new(b, 2 * k + 2).unwrap();
            let n = 2 * k;
            prop_assert!(table.get(n + 2) >= table.get(n) * table.get(2) * (1.0 - 1e-12));
        }
    }
}
