//! Error taxonomy.
//!
//! Two families share one enum:
//!
//! - **Validity**: a value or variance that is not finite, or a
//!   reconstruction that over/underflowed ([`VarError::Value`],
//!   [`VarError::Uncertainty`], [`VarError::Type`]).
//! - **Convergence**: a Taylor expansion that could not be trusted
//!   ([`VarError::Expansion`]). Every convergence failure carries the full
//!   [`ExpansionState`] so callers can see which property failed and at
//!   which order, and decide how to degrade.
//!
//! Nothing in the crate swallows these errors; an operation either returns a
//! fully finite result or one of these.

use std::fmt;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, VarError>;

/// Error type for every fallible operation in the crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VarError {
    /// The value itself is not finite, or could not be represented.
    #[error("value {value} is not representable: {context}")]
    Value { value: f64, context: String },

    /// The variance is not finite or negative, or `value ± uncertainty`
    /// overflows.
    #[error("variance {variance} of value {value} is not acceptable: {context}")]
    Uncertainty {
        value: f64,
        variance: f64,
        context: String,
    },

    /// Incompatible concrete representations in a binary operation.
    ///
    /// Reserved for operations mixing uncertainty models. The shared trait
    /// only combines values of one type, so no code path raises it.
    #[error("incompatible representations: {0}")]
    Type(String),

    /// A configuration value was rejected.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A Taylor expansion failed one of its convergence checks.
    #[error(transparent)]
    Expansion(#[from] Box<ExpansionFailure>),
}

impl VarError {
    pub fn value(value: f64, context: impl Into<String>) -> Self {
        VarError::Value {
            value,
            context: context.into(),
        }
    }

    pub fn uncertainty(value: f64, variance: f64, context: impl Into<String>) -> Self {
        VarError::Uncertainty {
            value,
            variance,
            context: context.into(),
        }
    }

    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        VarError::InvalidParameter(msg.into())
    }

    /// The convergence failure behind this error, if it is one.
    pub fn expansion(&self) -> Option<&ExpansionFailure> {
        match self {
            VarError::Expansion(failure) => Some(&**failure),
            _ => None,
        }
    }

    /// Shorthand for `self.expansion().map(|f| f.kind)`.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.expansion().map(|f| f.kind)
    }
}

/// Which convergence property a Taylor expansion violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// An order produced a non-finite value or variance before the
    /// monotonic run was long enough to stop early.
    NotFinite,
    /// Variance contributions did not shrink for enough consecutive orders.
    NotMonotonic,
    /// The last value contribution is too large relative to the propagated
    /// uncertainty.
    NotStable,
    /// A partial variance went negative.
    NotPositive,
    /// Reserved. Declared for completeness; no code path raises it.
    NotReliable,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::NotFinite => "not finite",
            FailureKind::NotMonotonic => "not monotonic",
            FailureKind::NotStable => "not stable",
            FailureKind::NotPositive => "not positive",
            FailureKind::NotReliable => "not reliable",
        };
        f.write_str(name)
    }
}

/// Snapshot of a Taylor expansion at the point it stopped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExpansionState {
    /// Taylor coefficients used, `c₀..c_N`.
    pub coefficients: Vec<f64>,
    /// Operand value.
    pub input_value: f64,
    /// Operand variance.
    pub input_variance: f64,
    /// Partial value sum (before any output rescaling).
    pub value: f64,
    /// Partial variance sum (before any output rescaling).
    pub variance: f64,
    /// Last order processed.
    pub order: usize,
    /// Value contribution of the last order.
    pub value_term: f64,
    /// Variance contribution of the last order.
    pub variance_term: f64,
    /// Consecutive orders with non-increasing variance contribution.
    pub monotonic: usize,
}

/// A convergence failure: the violated property plus the state it was
/// detected in.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error(
    "Taylor expansion {kind} at order {}: value {}, variance {}, monotonic run {}",
    .state.order, .state.value, .state.variance, .state.monotonic
)]
pub struct ExpansionFailure {
    pub kind: FailureKind,
    pub state: ExpansionState,
}

impl ExpansionFailure {
    pub fn new(kind: FailureKind, state: ExpansionState) -> Self {
        Self { kind, state }
    }
}

impl From<ExpansionFailure> for VarError {
    fn from(failure: ExpansionFailure) -> Self {
        VarError::Expansion(Box::new(failure))
    }
}
