//! The admission pipeline.
//!
//! Gates run strictly in order and stop at the first failure:
//!
//! ```text
//! shape → freshness → replay → identity → signature → collateral → persist → forward
//! ```
//!
//! A gate that refuses the intent yields `Ok(Rejected(..))`. A collaborator
//! that fails or exceeds its bound yields `Err(..)`; nothing is retried here.
//! The pipeline holds no mutable state of its own, so one instance serves any
//! number of concurrent admissions.

use std::{future::Future, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use intentgate_sigverify::{digest, encode_intent, verify};
use intentgate_types::{
    AdmissionDecision, GateConfig, Intent, IntentSubmission, IntentgateError, NewOrderMessage,
    RejectReason, Result,
};
use tracing::{debug, error, info, warn};

use crate::{
    collaborators::{Collaborators, OrphanedIntent, PersistOutcome, PublishOutcome, ResolvedKey},
    shape,
};

/// Run one collaborator call under `timeout`.
///
/// Failures are logged here once; callers only propagate.
pub(crate) async fn bounded<T>(
    timeout: Duration,
    collaborator: &'static str,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            warn!(collaborator, error = %err, "collaborator call failed");
            Err(err)
        }
        Err(_) => {
            warn!(collaborator, timeout_ms = timeout.as_millis(), "collaborator call timed out");
            Err(IntentgateError::UpstreamTimeout {
                collaborator,
                after: timeout,
            })
        }
    }
}

fn to_time_delta(window: Duration) -> TimeDelta {
    TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX)
}

/// Ordered admission gates over injected collaborators.
pub struct AdmissionPipeline {
    past_window: TimeDelta,
    future_window: TimeDelta,
    upstream_timeout: Duration,
    collaborators: Collaborators,
}

impl AdmissionPipeline {
    #[must_use]
    pub fn new(config: &GateConfig, collaborators: Collaborators) -> Self {
        Self {
            past_window: to_time_delta(config.past_window()),
            future_window: to_time_delta(config.future_window()),
            upstream_timeout: config.upstream_timeout(),
            collaborators,
        }
    }

    #[must_use]
    pub fn upstream_timeout(&self) -> Duration {
        self.upstream_timeout
    }

    /// Admit a submission against the current wall clock.
    pub async fn admit(&self, submission: &IntentSubmission) -> Result<AdmissionDecision> {
        self.admit_at(submission, Utc::now()).await
    }

    /// Admit a submission as of `now`.
    pub async fn admit_at(
        &self,
        submission: &IntentSubmission,
        now: DateTime<Utc>,
    ) -> Result<AdmissionDecision> {
        let intent = match shape::validate(submission) {
            Ok(intent) => intent,
            Err(reason) => {
                debug!(tx_id = %submission.tx_id, gate = "shape", %reason, "intent rejected");
                return Ok(reason.into());
            }
        };
        self.admit_intent(&intent, now).await
    }

    /// Run gates 2 onward over an already shape-validated intent.
    pub async fn admit_intent(
        &self,
        intent: &Intent,
        now: DateTime<Utc>,
    ) -> Result<AdmissionDecision> {
        if !self.is_fresh(intent.generated_at, now) {
            return Ok(reject(intent, "freshness", RejectReason::StaleOrFutureTimestamp));
        }

        let c = &self.collaborators;
        if self.call("registry", c.registry.exists(intent.tx_id)).await? {
            return Ok(reject(intent, "replay", RejectReason::DuplicateIntent));
        }

        let resolved = self
            .call("identity", c.identity.resolve(intent.network, intent.account))
            .await?;
        let Some(key) = resolved.filter(|key| key.binds(intent)) else {
            return Ok(reject(intent, "identity", RejectReason::IdentityMismatch));
        };

        if !verify_signature(intent, &key)? {
            return Ok(reject(intent, "signature", RejectReason::InvalidSignature));
        }

        let allowance = self
            .call("allowance", c.collateral.allowance(intent.network, intent.account))
            .await?;
        if allowance < intent.collateral {
            debug!(tx_id = %intent.tx_id, %allowance, collateral = %intent.collateral, "allowance short");
            return Ok(reject(intent, "collateral", RejectReason::InsufficientCollateral));
        }
        let balance = self
            .call("balance", c.collateral.balance(intent.network, intent.account))
            .await?;
        if balance < allowance {
            debug!(tx_id = %intent.tx_id, %allowance, %balance, "allowance exceeds live balance");
            return Ok(reject(intent, "collateral", RejectReason::InsufficientCollateral));
        }

        match self.call("registry", c.registry.persist(intent)).await {
            Ok(PersistOutcome::Stored) => {}
            Ok(PersistOutcome::DuplicateViolation) => {
                return Ok(reject(intent, "persist", RejectReason::DuplicateIntent));
            }
            Err(err) => return Err(self.persist_unconfirmed(intent, now, err).await),
        }

        self.forward(intent, now).await
    }

    /// Persist failed or timed out without a definite answer. The write may
    /// still have committed, in which case a retry would be refused as a
    /// duplicate and the intent never forwarded.
    async fn persist_unconfirmed(
        &self,
        intent: &Intent,
        now: DateTime<Utc>,
        err: IntentgateError,
    ) -> IntentgateError {
        let stored = self
            .call("registry", self.collaborators.registry.exists(intent.tx_id))
            .await;
        if matches!(stored, Ok(false)) {
            return err;
        }
        let reason = format!("persist outcome unknown: {err}");
        error!(
            tx_id = %intent.tx_id,
            account = %intent.account,
            error = %reason,
            "intent may be persisted but was not forwarded"
        );
        self.orphan(intent, NewOrderMessage::from_intent(intent, now), reason)
            .await
    }

    fn is_fresh(&self, generated_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let earliest = now.checked_sub_signed(self.past_window);
        let latest = now.checked_add_signed(self.future_window);
        earliest.is_none_or(|earliest| generated_at >= earliest)
            && latest.is_none_or(|latest| generated_at <= latest)
    }

    async fn forward(&self, intent: &Intent, now: DateTime<Utc>) -> Result<AdmissionDecision> {
        let message = NewOrderMessage::from_intent(intent, now);
        let published = self
            .call("forwarder", self.collaborators.forwarder.publish(message.clone()))
            .await;

        match published {
            Ok(outcome) => {
                let redelivery = outcome == PublishOutcome::AlreadyPublished;
                info!(
                    tx_id = %intent.tx_id,
                    account = %intent.account,
                    side = %intent.side,
                    tx_age_ms = tx_age_ms(intent, now),
                    redelivery,
                    "intent admitted"
                );
                Ok(AdmissionDecision::Accepted)
            }
            Err(err) => {
                let reason = err.to_string();
                error!(
                    tx_id = %intent.tx_id,
                    account = %intent.account,
                    error = %reason,
                    "intent persisted but not forwarded"
                );
                Err(self.orphan(intent, message, reason).await)
            }
        }
    }

    /// Hand an unforwarded intent to reconciliation and build the fault
    /// returned to the caller.
    async fn orphan(
        &self,
        intent: &Intent,
        message: NewOrderMessage,
        reason: String,
    ) -> IntentgateError {
        let report = self.collaborators.reconciliation.report(OrphanedIntent {
            tx_id: intent.tx_id,
            account_id: intent.account,
            reason: reason.clone(),
            detected_at: Utc::now(),
            message,
        });
        if tokio::time::timeout(self.upstream_timeout, report).await.is_err() {
            error!(
                tx_id = %intent.tx_id,
                account = %intent.account,
                error = %reason,
                timeout_ms = self.upstream_timeout.as_millis(),
                "reconciliation report timed out, orphan recorded in log only"
            );
        }
        IntentgateError::ConsistencyFault {
            tx_id: intent.tx_id,
            reason,
        }
    }

    async fn call<T>(
        &self,
        collaborator: &'static str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        bounded(self.upstream_timeout, collaborator, fut).await
    }
}

/// Gate 5. The payload is rebuilt from typed fields only.
fn verify_signature(intent: &Intent, key: &ResolvedKey) -> Result<bool> {
    let payload = encode_intent(intent).map_err(|e| {
        IntentgateError::InvariantViolation(format!("encoding admitted intent {}: {e}", intent.tx_id))
    })?;
    let framed = digest::frame(payload.as_str());
    match verify(&framed, &key.public_key, &intent.signature) {
        Ok(valid) => Ok(valid),
        Err(shape_error) => {
            warn!(tx_id = %intent.tx_id, %shape_error, "verifier refused input shape");
            Ok(false)
        }
    }
}

/// Milliseconds between the transaction id being minted and `now`.
fn tx_age_ms(intent: &Intent, now: DateTime<Utc>) -> u64 {
    u64::try_from(now.timestamp_millis())
        .map_or(0, |now_ms| now_ms.saturating_sub(intent.tx_id.timestamp_ms()))
}

fn reject(intent: &Intent, gate: &'static str, reason: RejectReason) -> AdmissionDecision {
    info!(
        tx_id = %intent.tx_id,
        account = %intent.account,
        gate,
        code = reason.code(),
        "intent rejected"
    );
    AdmissionDecision::Rejected(reason)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use intentgate_types::{AccountId, KeyType, TxId, constants};

    use super::*;

    use crate::{
        collaborators::{IntentRegistry, ReconciliationSink},
        registry::InMemoryIntentRegistry,
        testkit::{
            FakeIdentity, StaleReadRegistry, SubmissionBuilder, TEST_ACCOUNT, TestWorld,
            WalletSigner, usd, usd_cents,
        },
    };

    /// Commits the write, then acknowledges after `ack_delay`.
    struct SlowAckRegistry {
        inner: InMemoryIntentRegistry,
        ack_delay: Duration,
    }

    #[async_trait]
    impl IntentRegistry for SlowAckRegistry {
        async fn exists(&self, tx_id: TxId) -> Result<bool> {
            self.inner.exists(tx_id).await
        }

        async fn persist(&self, intent: &Intent) -> Result<PersistOutcome> {
            let outcome = self.inner.persist(intent).await?;
            tokio::time::sleep(self.ack_delay).await;
            Ok(outcome)
        }

        async fn owner_of(&self, tx_id: TxId) -> Result<Option<AccountId>> {
            self.inner.owner_of(tx_id).await
        }
    }

    /// Refuses every write before it commits.
    #[derive(Default)]
    struct RefusingRegistry {
        inner: InMemoryIntentRegistry,
    }

    #[async_trait]
    impl IntentRegistry for RefusingRegistry {
        async fn exists(&self, tx_id: TxId) -> Result<bool> {
            self.inner.exists(tx_id).await
        }

        async fn persist(&self, _intent: &Intent) -> Result<PersistOutcome> {
            Err(IntentgateError::UpstreamUnavailable {
                collaborator: "registry",
                reason: "connection reset".into(),
            })
        }

        async fn owner_of(&self, tx_id: TxId) -> Result<Option<AccountId>> {
            self.inner.owner_of(tx_id).await
        }
    }

    struct StuckReconciliation;

    #[async_trait]
    impl ReconciliationSink for StuckReconciliation {
        async fn report(&self, _orphan: OrphanedIntent) {
            std::future::pending::<()>().await;
        }
    }

    fn config() -> GateConfig {
        GateConfig {
            upstream_timeout_ms: 200,
            ..GateConfig::default()
        }
    }

    fn pipeline(world: &TestWorld) -> AdmissionPipeline {
        AdmissionPipeline::new(&config(), world.collaborators())
    }

    fn reason(decision: &AdmissionDecision) -> &RejectReason {
        decision.reject_reason().expect("expected a rejection")
    }

    #[tokio::test]
    async fn valid_intent_is_accepted_persisted_and_forwarded() {
        let world = TestWorld::new();
        let sub = world.submission(&SubmissionBuilder::new());

        let decision = pipeline(&world).admit(&sub).await.unwrap();
        assert_eq!(decision, AdmissionDecision::Accepted);

        let published = world.forwarder.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].tx_id.to_string(), sub.tx_id);
        assert_eq!(published[0].public_key, sub.public_key);
        assert_eq!(published[0].collateral, "5500000");
        assert_eq!(world.registry.len(), 1);
    }

    #[tokio::test]
    async fn malformed_input_contacts_no_collaborator() {
        let world = TestWorld::new();
        let mut sub = world.submission(&SubmissionBuilder::new());
        sub.account_id = "0.0.x".into();

        let decision = pipeline(&world).admit(&sub).await.unwrap();
        assert!(matches!(reason(&decision), RejectReason::MalformedInput { field, .. } if field == "account_id"));
        assert_eq!(world.identity.calls(), 0);
        assert_eq!(world.collateral.calls(), 0);
        assert!(world.registry.is_empty());
    }

    #[tokio::test]
    async fn stale_intent_rejected_without_identity_lookup() {
        let world = TestWorld::new();
        let now = Utc::now();
        let sub = world.submission(
            &SubmissionBuilder::new().generated_at(now - ChronoDuration::minutes(10)),
        );

        let decision = pipeline(&world).admit_at(&sub, now).await.unwrap();
        assert_eq!(reason(&decision), &RejectReason::StaleOrFutureTimestamp);
        assert_eq!(world.identity.calls(), 0);
    }

    #[tokio::test]
    async fn freshness_window_edges_are_inclusive() {
        let world = TestWorld::new();
        let p = pipeline(&world);
        let now = Utc::now();
        let past = ChronoDuration::seconds(i64::try_from(constants::DEFAULT_PAST_WINDOW_SECS).unwrap());
        let future =
            ChronoDuration::seconds(i64::try_from(constants::DEFAULT_FUTURE_WINDOW_SECS).unwrap());

        assert!(p.is_fresh(now - past, now));
        assert!(p.is_fresh(now + future, now));
        assert!(!p.is_fresh(now - past - ChronoDuration::milliseconds(1), now));
        assert!(!p.is_fresh(now + future + ChronoDuration::milliseconds(1), now));
    }

    #[tokio::test]
    async fn future_intent_rejected() {
        let world = TestWorld::new();
        let now = Utc::now();
        let sub = world.submission(
            &SubmissionBuilder::new().generated_at(now + ChronoDuration::minutes(2)),
        );
        let decision = pipeline(&world).admit_at(&sub, now).await.unwrap();
        assert_eq!(reason(&decision), &RejectReason::StaleOrFutureTimestamp);
    }

    #[tokio::test]
    async fn resubmission_is_duplicate() {
        let world = TestWorld::new();
        let p = pipeline(&world);
        let sub = world.submission(&SubmissionBuilder::new());

        assert!(p.admit(&sub).await.unwrap().is_accepted());
        let second = p.admit(&sub).await.unwrap();
        assert_eq!(reason(&second), &RejectReason::DuplicateIntent);
        assert_eq!(world.forwarder.published().len(), 1);
        // Replay is caught before identity is consulted again.
        assert_eq!(world.identity.calls(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_duplicates_admit_exactly_once() {
        let world = TestWorld::new();
        let registry = Arc::new(StaleReadRegistry::new());
        let collaborators = Collaborators {
            registry: registry.clone(),
            ..world.collaborators()
        };
        let p = Arc::new(AdmissionPipeline::new(&config(), collaborators));
        let sub = world.submission(&SubmissionBuilder::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let p = p.clone();
                let sub = sub.clone();
                tokio::spawn(async move { p.admit(&sub).await.unwrap() })
            })
            .collect();

        let mut accepted = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                AdmissionDecision::Accepted => accepted += 1,
                AdmissionDecision::Rejected(RejectReason::DuplicateIntent) => duplicates += 1,
                other => panic!("unexpected decision {other:?}"),
            }
        }
        assert_eq!(accepted, 1);
        assert_eq!(duplicates, 7);
        assert_eq!(world.forwarder.published().len(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn ed25519_registration_is_identity_mismatch_before_verification() {
        let world = TestWorld::new();
        let registered = ResolvedKey {
            key_type: KeyType::Ed25519,
            public_key: world.wallet.public_key().to_vec(),
        };
        let world = world.with_identity(FakeIdentity::new().with_key(TEST_ACCOUNT, Some(registered)));
        // A signature that could never verify: if the verifier ran, the
        // reason would be InvalidSignature instead.
        let mut sub = world.submission(&SubmissionBuilder::new());
        sub.signature = "11".repeat(64);

        let decision = pipeline(&world).admit(&sub).await.unwrap();
        assert_eq!(reason(&decision), &RejectReason::IdentityMismatch);
        assert_eq!(world.collateral.calls(), 0);
    }

    #[tokio::test]
    async fn claimed_key_must_be_the_registered_key() {
        let world = TestWorld::new();
        let attacker = WalletSigner::from_seed(99);
        // Correctly signed by the attacker's own key, naming the victim account.
        let sub = SubmissionBuilder::new().sign_with(&attacker);

        let decision = pipeline(&world).admit(&sub).await.unwrap();
        assert_eq!(reason(&decision), &RejectReason::IdentityMismatch);
    }

    #[tokio::test]
    async fn account_without_single_key_is_identity_mismatch() {
        let world =
            TestWorld::new().with_identity(FakeIdentity::new().with_key(TEST_ACCOUNT, None));
        let sub = world.submission(&SubmissionBuilder::new());
        let decision = pipeline(&world).admit(&sub).await.unwrap();
        assert_eq!(reason(&decision), &RejectReason::IdentityMismatch);
    }

    #[tokio::test]
    async fn tampered_price_fails_signature() {
        let world = TestWorld::new();
        let mut sub = world.submission(&SubmissionBuilder::new());
        sub.price = "0.56".into();

        let decision = pipeline(&world).admit(&sub).await.unwrap();
        assert_eq!(reason(&decision), &RejectReason::InvalidSignature);
        assert_eq!(world.collateral.calls(), 0);
    }

    #[tokio::test]
    async fn allowance_one_cent_short_is_insufficient() {
        // $5.00 allowance against $5.01 of collateral.
        let world = TestWorld::new().with_collateral(usd(5), usd(100));
        let sub = world.submission(&SubmissionBuilder::new().price("0.501").quantity("10"));

        let decision = pipeline(&world).admit(&sub).await.unwrap();
        assert_eq!(reason(&decision), &RejectReason::InsufficientCollateral);
        assert!(world.registry.is_empty());
        assert!(world.forwarder.published().is_empty());
    }

    #[tokio::test]
    async fn exact_allowance_is_sufficient() {
        let world = TestWorld::new().with_collateral(usd_cents(550), usd_cents(550));
        let sub = world.submission(&SubmissionBuilder::new());
        assert!(pipeline(&world).admit(&sub).await.unwrap().is_accepted());
    }

    #[tokio::test]
    async fn balance_below_allowance_is_insufficient() {
        let world = TestWorld::new().with_collateral(usd(100), usd(50));
        let sub = world.submission(&SubmissionBuilder::new());
        let decision = pipeline(&world).admit(&sub).await.unwrap();
        assert_eq!(reason(&decision), &RejectReason::InsufficientCollateral);
    }

    #[tokio::test]
    async fn sell_side_collateral_uses_absolute_notional() {
        let world = TestWorld::new().with_collateral(usd_cents(550), usd_cents(550));
        let sub = world.submission(&SubmissionBuilder::new().price("-0.55"));
        assert!(pipeline(&world).admit(&sub).await.unwrap().is_accepted());
        assert_eq!(
            world.forwarder.published()[0].side,
            intentgate_types::Side::Sell
        );
    }

    #[tokio::test]
    async fn slow_identity_is_a_timeout_not_a_rejection() {
        let world = TestWorld::new();
        let slow = FakeIdentity::new()
            .with_key(TEST_ACCOUNT, Some(world.wallet.registered_key()))
            .with_delay(Duration::from_secs(2));
        let world = world.with_identity(slow);
        let sub = world.submission(&SubmissionBuilder::new());

        let err = pipeline(&world).admit(&sub).await.unwrap_err();
        assert!(
            matches!(err, IntentgateError::UpstreamTimeout { collaborator: "identity", .. }),
            "got {err:?}"
        );
        assert!(err.is_retryable());
        assert!(world.registry.is_empty());
    }

    #[tokio::test]
    async fn unknown_account_is_upstream_unavailable() {
        let world = TestWorld::new();
        let sub = world.submission(&SubmissionBuilder::new().account(intentgate_types::AccountId::new(0, 0, 1)));
        let err = pipeline(&world).admit(&sub).await.unwrap_err();
        assert!(matches!(err, IntentgateError::UpstreamUnavailable { .. }));
    }

    #[tokio::test]
    async fn forward_failure_is_consistency_fault_and_reported() {
        let world = TestWorld::new();
        world.forwarder.fail(true);
        let sub = world.submission(&SubmissionBuilder::new());

        let err = pipeline(&world).admit(&sub).await.unwrap_err();
        let tx_id: TxId = sub.tx_id.parse().unwrap();
        assert!(matches!(err, IntentgateError::ConsistencyFault { tx_id: id, .. } if id == tx_id));

        // Durably recorded, surfaced for reconciliation.
        assert!(world.registry.get(tx_id).is_some());
        let orphans = world.reconciliation.orphans();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].tx_id, tx_id);
        assert_eq!(orphans[0].message.tx_id, tx_id);
        assert!(orphans[0].reason.contains("broker connection refused"));
    }

    #[test]
    fn tx_age_is_measured_from_the_id_timestamp() {
        let world = TestWorld::new();
        let intent = shape::validate(&world.submission(&SubmissionBuilder::new())).unwrap();
        let now = Utc::now() + ChronoDuration::seconds(5);
        let age = tx_age_ms(&intent, now);
        assert!((5_000..60_000).contains(&age), "age={age}");
        assert_eq!(tx_age_ms(&intent, DateTime::from_timestamp(0, 0).unwrap()), 0);
    }

    #[tokio::test]
    async fn late_persist_ack_is_reported_not_retried() {
        let world = TestWorld::new();
        let registry = Arc::new(SlowAckRegistry {
            inner: InMemoryIntentRegistry::new(),
            ack_delay: Duration::from_secs(1),
        });
        let collaborators = Collaborators {
            registry: registry.clone(),
            ..world.collaborators()
        };
        let p = AdmissionPipeline::new(&config(), collaborators);
        let sub = world.submission(&SubmissionBuilder::new());
        let tx_id: TxId = sub.tx_id.parse().unwrap();

        let err = p.admit(&sub).await.unwrap_err();
        assert!(
            matches!(err, IntentgateError::ConsistencyFault { tx_id: id, .. } if id == tx_id),
            "got {err:?}"
        );
        assert!(!err.is_retryable());
        assert!(registry.inner.get(tx_id).is_some());
        assert!(world.forwarder.published().is_empty());

        let orphans = world.reconciliation.orphans();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].tx_id, tx_id);
        assert_eq!(orphans[0].message.tx_id, tx_id);
        assert!(orphans[0].reason.starts_with("persist outcome unknown"));
    }

    #[tokio::test]
    async fn uncommitted_persist_failure_stays_retryable() {
        let world = TestWorld::new();
        let collaborators = Collaborators {
            registry: Arc::new(RefusingRegistry::default()),
            ..world.collaborators()
        };
        let sub = world.submission(&SubmissionBuilder::new());

        let err = AdmissionPipeline::new(&config(), collaborators)
            .admit(&sub)
            .await
            .unwrap_err();
        assert!(
            matches!(err, IntentgateError::UpstreamUnavailable { collaborator: "registry", .. }),
            "got {err:?}"
        );
        assert!(err.is_retryable());
        assert!(world.reconciliation.orphans().is_empty());
    }

    #[tokio::test]
    async fn hung_reconciliation_does_not_stall_admission() {
        let world = TestWorld::new();
        world.forwarder.fail(true);
        let collaborators = Collaborators {
            reconciliation: Arc::new(StuckReconciliation),
            ..world.collaborators()
        };
        let sub = world.submission(&SubmissionBuilder::new());

        let admitted = tokio::time::timeout(
            Duration::from_secs(2),
            AdmissionPipeline::new(&config(), collaborators).admit(&sub),
        )
        .await
        .expect("admission stalled on reconciliation");
        assert!(matches!(
            admitted,
            Err(IntentgateError::ConsistencyFault { .. })
        ));
    }
}
