//! Narrow seams to everything outside the pipeline.
//!
//! The pipeline is built from exactly these capabilities and nothing else:
//!
//! | Trait | Capability |
//! |---|---|
//! | [`IntentRegistry`] | duplicate check, uniquely-constrained persist, owner lookup |
//! | [`IdentityResolver`] | account → registered public key |
//! | [`CollateralOracle`] | delegated allowance and live balance |
//! | [`IntentForwarder`] | idempotent publish to the matching engine, cancel |
//! | [`ReconciliationSink`] | operational channel for persisted-but-unforwarded intents |
//!
//! Every method returns [`intentgate_types::Result`]; implementations map
//! their transport failures to `UpstreamUnavailable`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use intentgate_types::{
    AccountId, CancelOrderMessage, Intent, KeyType, Network, NewOrderMessage, Result, TxId, U256,
};
use serde::{Deserialize, Serialize};

/// Key currently registered on a ledger account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    pub key_type: KeyType,
    pub public_key: Vec<u8>,
}

impl ResolvedKey {
    /// Whether this key is exactly the one an intent claims.
    #[must_use]
    pub fn binds(&self, intent: &Intent) -> bool {
        self.key_type == intent.key_type && self.public_key[..] == intent.public_key[..]
    }
}

/// Result of a uniquely-constrained insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    Stored,
    /// Another admission already stored this transaction id.
    DuplicateViolation,
}

/// Result of an idempotent publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    /// Already delivered earlier; nothing was sent.
    AlreadyPublished,
}

/// An intent that is durably recorded but never reached the matching engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanedIntent {
    pub tx_id: TxId,
    pub account_id: AccountId,
    pub reason: String,
    pub detected_at: DateTime<Utc>,
    /// The message that failed to go out, ready to be re-driven.
    pub message: NewOrderMessage,
}

#[async_trait]
pub trait IntentRegistry: Send + Sync {
    async fn exists(&self, tx_id: TxId) -> Result<bool>;

    /// Must be guarded by a uniqueness constraint on `tx_id`.
    async fn persist(&self, intent: &Intent) -> Result<PersistOutcome>;

    async fn owner_of(&self, tx_id: TxId) -> Result<Option<AccountId>>;
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// `Ok(None)` when the account exists but carries no single key.
    async fn resolve(&self, network: Network, account: AccountId) -> Result<Option<ResolvedKey>>;
}

#[async_trait]
pub trait CollateralOracle: Send + Sync {
    /// Allowance the owner granted the settlement spender, in collateral units.
    async fn allowance(&self, network: Network, owner: AccountId) -> Result<U256>;

    /// Owner's live collateral-token balance, in collateral units.
    async fn balance(&self, network: Network, owner: AccountId) -> Result<U256>;
}

#[async_trait]
pub trait IntentForwarder: Send + Sync {
    /// Deduplicated by transaction id.
    async fn publish(&self, message: NewOrderMessage) -> Result<PublishOutcome>;

    /// Best effort.
    async fn cancel(&self, message: CancelOrderMessage) -> Result<()>;
}

#[async_trait]
pub trait ReconciliationSink: Send + Sync {
    async fn report(&self, orphan: OrphanedIntent);
}

/// Everything the pipeline and intake service are wired with.
#[derive(Clone)]
pub struct Collaborators {
    pub registry: Arc<dyn IntentRegistry>,
    pub identity: Arc<dyn IdentityResolver>,
    pub collateral: Arc<dyn CollateralOracle>,
    pub forwarder: Arc<dyn IntentForwarder>,
    pub reconciliation: Arc<dyn ReconciliationSink>,
}
