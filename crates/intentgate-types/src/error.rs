//! Error types for the IntentGate admission pipeline.
//!
//! All errors use the `IG_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Input shape errors
//! - 3xx: Upstream collaborator errors
//! - 4xx: Consistency faults
//! - 5xx: Internal invariant violations
//! - 9xx: General errors (configuration, I/O, serialization)
//!
//! Semantic admission rejections (2xx) are not errors: they travel as
//! [`RejectReason`](crate::RejectReason) inside an `Ok` decision.

use std::time::Duration;

use thiserror::Error;

use crate::TxId;

/// Central error enum for all IntentGate operations.
#[derive(Debug, Error)]
pub enum IntentgateError {
    // =================================================================
    // Input Errors (1xx)
    // =================================================================
    /// A submitted field failed to parse into its typed form.
    #[error("IG_ERR_100: Malformed field `{field}`: {reason}")]
    MalformedField { field: &'static str, reason: String },

    // =================================================================
    // Upstream Errors (3xx)
    // =================================================================
    /// A collaborator call failed (transport error, non-200, bad JSON).
    #[error("IG_ERR_300: Upstream {collaborator} unavailable: {reason}")]
    UpstreamUnavailable {
        collaborator: &'static str,
        reason: String,
    },

    /// A collaborator call exceeded its bound.
    #[error("IG_ERR_301: Upstream {collaborator} timed out after {after:?}")]
    UpstreamTimeout {
        collaborator: &'static str,
        after: Duration,
    },

    // =================================================================
    // Consistency Faults (4xx)
    // =================================================================
    /// The intent was persisted but never reached the matching engine.
    #[error("IG_ERR_400: Intent {tx_id} persisted but not forwarded: {reason}")]
    ConsistencyFault { tx_id: TxId, reason: String },

    // =================================================================
    // Internal Invariant Violations (5xx)
    // =================================================================
    /// A component was handed a value it can never legitimately receive.
    #[error("IG_ERR_500: Invariant violation: {0}")]
    InvariantViolation(String),

    // =================================================================
    // General (9xx)
    // =================================================================
    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("IG_ERR_900: Configuration error: {0}")]
    Configuration(String),

    /// Serialization / deserialization error.
    #[error("IG_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// I/O error.
    #[error("IG_ERR_902: I/O error: {0}")]
    Io(String),
}

impl IntentgateError {
    /// Shorthand for [`IntentgateError::MalformedField`].
    pub fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedField {
            field,
            reason: reason.into(),
        }
    }

    /// Whether the caller may retry the whole submission later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UpstreamUnavailable { .. } | Self::UpstreamTimeout { .. }
        )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, IntentgateError>;

impl From<std::io::Error> for IntentgateError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for IntentgateError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
