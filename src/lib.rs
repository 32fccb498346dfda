//! # u-vararith
//!
//! Variance arithmetic: floating-point values that carry their own
//! uncertainty through every operation.
//!
//! Each [`UncertainValue`] is a point value plus a variance. Elementary
//! operations propagate the variance in closed form; nonlinear functions go
//! through a Taylor expansion weighted by the moments of a Gaussian
//! truncated at a fixed number of standard deviations, so that higher orders
//! stay bounded. The expansion checks its own convergence and reports a
//! typed failure rather than a silently wrong result.
//!
//! ## Modules
//!
//! - [`rounding`]: Round-half-to-even right shifts of a 64-bit significand
//! - [`decompose`]: Exact `f64` decomposition, power-of-two scaling and
//!   reconstruction
//! - [`special`]: Normal density and `erfc`
//! - [`moments`]: Truncated-Gaussian moment table and leakage
//! - [`params`]: Convergence parameters
//! - [`taylor`]: The Taylor propagation engine and its series
//! - [`value`]: The uncertain value type
//! - [`trace`]: Per-order diagnostics of an expansion
//! - [`model`]: Operations shared by every uncertainty model
//! - [`error`]: Validity errors and the convergence-failure taxonomy
//!
//! ## Design Philosophy
//!
//! - **Exact where possible**: power-of-two scaling never rounds, and large
//!   integer sums and products are redone in wide integer arithmetic
//! - **No silent degradation**: every operation yields a finite result or
//!   a typed error carrying the full expansion state
//! - **Property-based testing**: rounding and propagation invariants verified
//!   via proptest

pub mod decompose;
pub mod error;
pub mod model;
pub mod moments;
pub mod params;
pub mod rounding;
pub mod special;
pub mod taylor;
pub mod trace;
pub mod value;
mod wide;

pub use error::{ExpansionFailure, ExpansionState, FailureKind, Result, VarError};
pub use model::UncertainArithmetic;
pub use moments::MomentTable;
pub use params::ExpansionParams;
pub use taylor::{Expander, Scale, TaylorSeries};
pub use value::UncertainValue;
