//! In-memory intent registry.
//!
//! Reference implementation of the duplicate check and the uniquely-constrained
//! persist. The check-and-insert happens under one lock, so of any number of
//! concurrent persists for one transaction id exactly one is `Stored`.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use intentgate_types::{AccountId, Intent, Result, TxId};

use crate::collaborators::{IntentRegistry, PersistOutcome};

/// A persisted intent.
#[derive(Debug, Clone)]
pub struct StoredIntent {
    pub intent: Intent,
    pub persisted_at: DateTime<Utc>,
}

/// Intents keyed by transaction id.
#[derive(Default)]
pub struct InMemoryIntentRegistry {
    intents: Mutex<HashMap<TxId, StoredIntent>>,
}

impl InMemoryIntentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A poisoned lock still holds a consistent map: every mutation is a
    /// single insert.
    fn intents(&self) -> MutexGuard<'_, HashMap<TxId, StoredIntent>> {
        self.intents.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, tx_id: TxId) -> Option<StoredIntent> {
        self.intents().get(&tx_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.intents().len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents().is_empty()
    }
}

#[async_trait]
impl IntentRegistry for InMemoryIntentRegistry {
    async fn exists(&self, tx_id: TxId) -> Result<bool> {
        Ok(self.intents().contains_key(&tx_id))
    }

    async fn persist(&self, intent: &Intent) -> Result<PersistOutcome> {
        let mut intents = self.intents();
        if intents.contains_key(&intent.tx_id) {
            tracing::debug!(tx_id = %intent.tx_id, "uniqueness constraint hit on persist");
            return Ok(PersistOutcome::DuplicateViolation);
        }
        intents.insert(
            intent.tx_id,
            StoredIntent {
                intent: intent.clone(),
                persisted_at: Utc::now(),
            },
        );
        Ok(PersistOutcome::Stored)
    }

    async fn owner_of(&self, tx_id: TxId) -> Result<Option<AccountId>> {
        Ok(self.intents().get(&tx_id).map(|stored| stored.intent.account))
    }
}
