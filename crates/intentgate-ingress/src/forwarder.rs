//! Channel forwarder to the matching engine.
//!
//! New orders go out on a bounded channel (`orders.new`), cancellations on a
//! second one (`orders.cancel`). Publishing is idempotent by transaction id:
//! a [`PublishGuard`] remembers recently delivered ids so a redelivery is a
//! no-op rather than a second order.

use std::{
    collections::{HashSet, VecDeque},
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use intentgate_types::{
    CancelOrderMessage, ForwarderConfig, IntentgateError, NewOrderMessage, Result, TxId, constants,
};
use tokio::sync::mpsc;

use crate::collaborators::{IntentForwarder, PublishOutcome};

/// Bounded set of published transaction ids with oldest-first eviction.
pub struct PublishGuard {
    published: HashSet<TxId>,
    /// Insertion order (front = oldest).
    order: VecDeque<TxId>,
    max_size: usize,
}

impl PublishGuard {
    /// `max_size` of zero is treated as one.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            published: HashSet::with_capacity(max_size.min(4_096)),
            order: VecDeque::with_capacity(max_size.min(4_096)),
            max_size,
        }
    }

    /// Record `tx_id`. Returns `false` if it was already recorded.
    pub fn mark(&mut self, tx_id: TxId) -> bool {
        if self.published.contains(&tx_id) {
            return false;
        }
        if self.published.len() >= self.max_size {
            if let Some(oldest) = self.order.pop_front() {
                self.published.remove(&oldest);
            }
        }
        self.published.insert(tx_id);
        self.order.push_back(tx_id);
        true
    }

    #[must_use]
    pub fn contains(&self, tx_id: &TxId) -> bool {
        self.published.contains(tx_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.published.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.published.is_empty()
    }
}

/// Receiving ends of both engine channels.
pub struct EngineInbox {
    pub new_orders: mpsc::Receiver<NewOrderMessage>,
    pub cancels: mpsc::Receiver<CancelOrderMessage>,
}

/// Publishes onto in-process channels feeding the matching engine.
pub struct ChannelForwarder {
    new_orders: mpsc::Sender<NewOrderMessage>,
    cancels: mpsc::Sender<CancelOrderMessage>,
    guard: Mutex<PublishGuard>,
}

impl ChannelForwarder {
    /// Create the forwarder and the inbox the engine consumes.
    #[must_use]
    pub fn channel(config: &ForwarderConfig) -> (Self, EngineInbox) {
        let capacity = config.channel_capacity.max(1);
        let (new_tx, new_rx) = mpsc::channel(capacity);
        let (cancel_tx, cancel_rx) = mpsc::channel(capacity);
        let forwarder = Self {
            new_orders: new_tx,
            cancels: cancel_tx,
            guard: Mutex::new(PublishGuard::new(config.dedup_capacity)),
        };
        let inbox = EngineInbox {
            new_orders: new_rx,
            cancels: cancel_rx,
        };
        (forwarder, inbox)
    }

    fn guard(&self) -> MutexGuard<'_, PublishGuard> {
        self.guard.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn closed(channel: &'static str) -> IntentgateError {
    IntentgateError::UpstreamUnavailable {
        collaborator: "forwarder",
        reason: format!("channel {channel} is closed"),
    }
}

#[async_trait]
impl IntentForwarder for ChannelForwarder {
    async fn publish(&self, message: NewOrderMessage) -> Result<PublishOutcome> {
        if self.guard().contains(&message.tx_id) {
            return Ok(PublishOutcome::AlreadyPublished);
        }
        // Capacity first, so marking and sending happen together or not at all.
        let permit = self
            .new_orders
            .reserve()
            .await
            .map_err(|_| closed(constants::NEW_ORDERS_CHANNEL))?;
        if !self.guard().mark(message.tx_id) {
            return Ok(PublishOutcome::AlreadyPublished);
        }
        tracing::debug!(
            tx_id = %message.tx_id,
            channel = constants::NEW_ORDERS_CHANNEL,
            "publishing new order"
        );
        permit.send(message);
        Ok(PublishOutcome::Published)
    }

    async fn cancel(&self, message: CancelOrderMessage) -> Result<()> {
        tracing::debug!(
            tx_id = %message.tx_id,
            channel = constants::CANCEL_ORDERS_CHANNEL,
            "publishing cancel"
        );
        self.cancels
            .send(message)
            .await
            .map_err(|_| closed(constants::CANCEL_ORDERS_CHANNEL))
    }
}
