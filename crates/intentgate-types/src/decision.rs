//! Admission outcomes.
//!
//! A decision is created per intent and consumed immediately by the caller.
//! It is never persisted on its own.

use serde::{Deserialize, Serialize};

/// Why an intent was refused. Every variant is safe to show to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// A field failed shape validation. No collaborator was contacted.
    MalformedInput { field: String, detail: String },
    /// Generation timestamp outside the accepted window.
    StaleOrFutureTimestamp,
    /// The transaction id was already admitted.
    DuplicateIntent,
    /// The claimed key is not the key registered on the named account.
    IdentityMismatch,
    /// The signature does not cover the reconstructed payload.
    InvalidSignature,
    /// Allowance or live balance does not cover the collateral.
    InsufficientCollateral,
}

impl RejectReason {
    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedInput { .. } => "MALFORMED_INPUT",
            Self::StaleOrFutureTimestamp => "STALE_OR_FUTURE_TIMESTAMP",
            Self::DuplicateIntent => "DUPLICATE_INTENT",
            Self::IdentityMismatch => "IDENTITY_MISMATCH",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::InsufficientCollateral => "INSUFFICIENT_COLLATERAL",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedInput { field, detail } => {
                write!(f, "malformed input in `{field}`: {detail}")
            }
            Self::StaleOrFutureTimestamp => {
                write!(f, "intent timestamp is outside the accepted window")
            }
            Self::DuplicateIntent => write!(f, "transaction id was already submitted"),
            Self::IdentityMismatch => {
                write!(f, "public key does not match the account's registered key")
            }
            Self::InvalidSignature => write!(f, "signature verification failed"),
            Self::InsufficientCollateral => {
                write!(f, "allowance or balance does not cover the collateral")
            }
        }
    }
}

/// Outcome of running an intent through the admission gates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdmissionDecision {
    Accepted,
    Rejected(RejectReason),
}

impl AdmissionDecision {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    #[must_use]
    pub fn reject_reason(&self) -> Option<&RejectReason> {
        match self {
            Self::Accepted => None,
            Self::Rejected(reason) => Some(reason),
        }
    }
}

impl From<RejectReason> for AdmissionDecision {
    fn from(reason: RejectReason) -> Self {
        Self::Rejected(reason)
    }
}
