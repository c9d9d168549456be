//! Caller-facing intake surface: submit, cancel, health.
//!
//! Rejections travel back verbatim. Upstream failures become a bare
//! `TRY_AGAIN` and everything else a bare `INTERNAL_ERROR`; the detail stays
//! in the logs.

use std::{
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
    time::Instant,
};

use chrono::Utc;
use intentgate_types::{
    AccountId, AdmissionDecision, CancelOrderMessage, GateConfig, IntentSubmission,
    IntentgateError, RejectReason, TxId, constants,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{
    collaborators::Collaborators,
    pipeline::{AdmissionPipeline, bounded},
};

/// One request on the intake surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum IntakeRequest {
    Submit { intent: IntentSubmission },
    #[serde(rename_all = "camelCase")]
    Cancel { tx_id: String, account_id: String },
    Health,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmitReply {
    #[serde(rename_all = "camelCase")]
    Accepted { tx_id: String },
    #[serde(rename_all = "camelCase")]
    Rejected { tx_id: String, reason: RejectReason },
    TryAgain,
    InternalError,
}

/// Why a cancellation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancelRejection {
    MalformedInput { field: String, detail: String },
    UnknownIntent,
    NotOwner,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancelReply {
    #[serde(rename_all = "camelCase")]
    CancelRequested { tx_id: String },
    Rejected { reason: CancelRejection },
    TryAgain,
    InternalError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_secs: u64,
    pub submitted: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntakeReply {
    Submit(SubmitReply),
    Cancel(CancelReply),
    Health(HealthReport),
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    accepted: AtomicU64,
    rejected: AtomicU64,
    failed: AtomicU64,
}

/// The admission pipeline behind the intake operations.
pub struct IntakeService {
    pipeline: AdmissionPipeline,
    collaborators: Collaborators,
    counters: Counters,
    started: Instant,
}

impl IntakeService {
    #[must_use]
    pub fn new(config: &GateConfig, collaborators: Collaborators) -> Self {
        Self {
            pipeline: AdmissionPipeline::new(config, collaborators.clone()),
            collaborators,
            counters: Counters::default(),
            started: Instant::now(),
        }
    }

    pub async fn handle(&self, request: IntakeRequest) -> IntakeReply {
        match request {
            IntakeRequest::Submit { intent } => IntakeReply::Submit(self.submit(&intent).await),
            IntakeRequest::Cancel { tx_id, account_id } => {
                IntakeReply::Cancel(self.cancel(&tx_id, &account_id).await)
            }
            IntakeRequest::Health => IntakeReply::Health(self.health()),
        }
    }

    pub async fn submit(&self, submission: &IntentSubmission) -> SubmitReply {
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        let tx_id = submission.tx_id.clone();
        match self.pipeline.admit(submission).await {
            Ok(AdmissionDecision::Accepted) => {
                self.counters.accepted.fetch_add(1, Ordering::Relaxed);
                SubmitReply::Accepted { tx_id }
            }
            Ok(AdmissionDecision::Rejected(reason)) => {
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                SubmitReply::Rejected { tx_id, reason }
            }
            Err(err) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                collapse(&tx_id, &err, SubmitReply::TryAgain, SubmitReply::InternalError)
            }
        }
    }

    /// Request cancellation of a forwarded intent on behalf of its owner.
    pub async fn cancel(&self, tx_id: &str, account_id: &str) -> CancelReply {
        let parsed = TxId::from_str(tx_id)
            .and_then(|tx| AccountId::from_str(account_id).map(|account| (tx, account)));
        let (tx_id, account) = match parsed {
            Ok(ids) => ids,
            Err(IntentgateError::MalformedField { field, reason }) => {
                return CancelReply::Rejected {
                    reason: CancelRejection::MalformedInput {
                        field: field.to_string(),
                        detail: reason,
                    },
                };
            }
            Err(err) => {
                return collapse(tx_id, &err, CancelReply::TryAgain, CancelReply::InternalError);
            }
        };

        match self.request_cancel(tx_id, account).await {
            Ok(reply) => reply,
            Err(err) => collapse(
                &tx_id.to_string(),
                &err,
                CancelReply::TryAgain,
                CancelReply::InternalError,
            ),
        }
    }

    async fn request_cancel(
        &self,
        tx_id: TxId,
        account: AccountId,
    ) -> intentgate_types::Result<CancelReply> {
        let timeout = self.pipeline.upstream_timeout();
        let owner = bounded(timeout, "registry", self.collaborators.registry.owner_of(tx_id)).await?;
        match owner {
            None => {
                return Ok(CancelReply::Rejected {
                    reason: CancelRejection::UnknownIntent,
                });
            }
            Some(owner) if owner != account => {
                warn!(%tx_id, %account, %owner, "cancel requested by non-owner");
                return Ok(CancelReply::Rejected {
                    reason: CancelRejection::NotOwner,
                });
            }
            Some(_) => {}
        }

        let message = CancelOrderMessage {
            tx_id,
            account_id: account,
            requested_at: Utc::now(),
        };
        bounded(timeout, "forwarder", self.collaborators.forwarder.cancel(message)).await?;
        info!(%tx_id, %account, "cancel forwarded");
        Ok(CancelReply::CancelRequested {
            tx_id: tx_id.to_string(),
        })
    }

    #[must_use]
    pub fn health(&self) -> HealthReport {
        HealthReport {
            status: "ok".to_string(),
            service: constants::SERVICE_NAME.to_string(),
            version: constants::VERSION.to_string(),
            uptime_secs: self.started.elapsed().as_secs(),
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            accepted: self.counters.accepted.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }
}

fn collapse<R>(tx_id: &str, err: &IntentgateError, try_again: R, internal: R) -> R {
    if err.is_retryable() {
        warn!(tx_id, error = %err, "request failed upstream");
        try_again
    } else {
        error!(tx_id, error = %err, "request failed");
        internal
    }
}
