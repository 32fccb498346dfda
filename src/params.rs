//! Convergence parameters of the Taylor expansion.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VarError};

/// Limits and tolerances for one Taylor expansion.
///
/// Missing fields deserialize to their defaults.
///
/// # Examples
/// ```
/// use u_vararith::params::ExpansionParams;
/// let params = ExpansionParams::default().with_max_order(60);
/// assert!(params.validate().is_ok());
/// assert_eq!(params.min_monotonic, 20);
///
/// let odd = ExpansionParams::default().with_max_order(61);
/// assert!(odd.validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionParams {
    /// Highest (even) order evaluated.
    pub max_order: usize,

    /// Consecutive non-increasing variance contributions an infinite series
    /// needs before it is accepted.
    pub min_monotonic: usize,

    /// Largest acceptable ratio of the last value contribution to the
    /// propagated uncertainty.
    pub stability: f64,
}

impl Default for ExpansionParams {
    fn default() -> Self {
        Self {
            max_order: 200,
            min_monotonic: 20,
            stability: 7e-7,
        }
    }
}

impl ExpansionParams {
    /// Values are not validated here; call [`validate`](Self::validate).
    pub fn new(max_order: usize, min_monotonic: usize, stability: f64) -> Self {
        Self {
            max_order,
            min_monotonic,
            stability,
        }
    }

    #[must_use]
    pub fn with_max_order(mut self, max_order: usize) -> Self {
        self.max_order = max_order;
        self
    }

    #[must_use]
    pub fn with_min_monotonic(mut self, min_monotonic: usize) -> Self {
        self.min_monotonic = min_monotonic;
        self
    }

    #[must_use]
    pub fn with_stability(mut self, stability: f64) -> Self {
        self.stability = stability;
        self
    }

    /// # Errors
    ///
    /// [`VarError::InvalidParameter`] if:
    /// - `max_order` is odd or below 2
    /// - `min_monotonic` is not below the number of even orders
    /// - `stability` is not finite and positive
    pub fn validate(&self) -> Result<()> {
        if self.max_order < 2 || self.max_order % 2 != 0 {
            return Err(VarError::invalid_parameter(format!(
                "max_order must be even and >= 2, got {}",
                self.max_order
            )));
        }

        if self.min_monotonic >= self.max_order / 2 {
            return Err(VarError::invalid_parameter(format!(
                "min_monotonic ({}) must be below the {} even orders up to max_order",
                self.min_monotonic,
                self.max_order / 2
            )));
        }

        if !self.stability.is_finite() || self.stability <= 0.0 {
            return Err(VarError::invalid_parameter(format!(
                "stability must be > 0.0 and finite, got {}",
                self.stability
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = ExpansionParams::default();
        assert_eq!(params.max_order, 200);
        assert_eq!(params.min_monotonic, 20);
        assert_eq!(params.stability, 7e-7);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let params = ExpansionParams::default()
            .with_max_order(10)
            .with_min_monotonic(3)
            .with_stability(1e-3);
        assert_eq!(params, ExpansionParams::new(10, 3, 1e-3));
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_order() {
        assert!(ExpansionParams::default().with_max_order(0).validate().is_err());
        assert!(ExpansionParams::default().with_max_order(201).validate().is_err());
    }

    #[test]
    fn test_rejects_unreachable_monotonic_run() {
        let params = ExpansionParams::new(40, 20, 7e-7);
        let err = params.validate().unwrap_err();
        assert!(matches!(err, VarError::InvalidParameter(_)));
        assert!(ExpansionParams::new(40, 19, 7e-7).validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_stability() {
        for s in [0.0, -1e-7, f64::NAN, f64::INFINITY] {
            assert!(ExpansionParams::default().with_stability(s).validate().is_err(), "{s}");
        }
    }

    #[test]
    fn test_json_roundtrip() {
        let params = ExpansionParams::new(100, 10, 1e-6);
        let json = serde_json::to_string(&params).unwrap();
        let back: ExpansionParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let params: ExpansionParams = serde_json::from_str(r#"{"max_order": 64}"#).unwrap();
        assert_eq!(params.max_order, 64);
        assert_eq!(params.min_monotonic, 20);
        assert_eq!(params.stability, 7e-7);
    }
}
