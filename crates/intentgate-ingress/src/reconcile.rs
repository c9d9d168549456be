//! Reconciliation queue for intents that were persisted but never forwarded.
//!
//! Reports go onto an unbounded channel so that reporting a fault can never
//! itself block or fail. Whoever holds the receiver (an operator tool, a
//! re-drive job) decides what to do with them.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::collaborators::{OrphanedIntent, ReconciliationSink};

pub struct ChannelReconciliation {
    tx: mpsc::UnboundedSender<OrphanedIntent>,
}

impl ChannelReconciliation {
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<OrphanedIntent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ReconciliationSink for ChannelReconciliation {
    async fn report(&self, orphan: OrphanedIntent) {
        let tx_id = orphan.tx_id;
        if self.tx.send(orphan).is_err() {
            // Receiver gone: the log line is the only remaining record.
            tracing::error!(%tx_id, "reconciliation queue closed, orphaned intent dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use intentgate_types::NewOrderMessage;

    use super::*;
    use crate::{
        shape,
        testkit::{SubmissionBuilder, WalletSigner},
    };

    fn orphan() -> OrphanedIntent {
        let intent =
            shape::validate(&SubmissionBuilder::new().sign_with(&WalletSigner::from_seed(8)))
                .unwrap();
        OrphanedIntent {
            tx_id: intent.tx_id,
            account_id: intent.account,
            reason: "broker down".into(),
            detected_at: Utc::now(),
            message: NewOrderMessage::from_intent(&intent, Utc::now()),
        }
    }

    #[tokio::test]
    async fn reports_reach_receiver() {
        let (sink, mut rx) = ChannelReconciliation::channel();
        let orphan = orphan();
        sink.report(orphan.clone()).await;
        assert_eq!(rx.recv().await.unwrap(), orphan);
    }

    #[tokio::test]
    async fn report_after_receiver_dropped_does_not_panic() {
        let (sink, rx) = ChannelReconciliation::channel();
        drop(rx);
        sink.report(orphan()).await;
    }

    #[test]
    fn orphan_serializes_for_operators() {
        let json = serde_json::to_value(orphan()).unwrap();
        assert_eq!(json["reason"], "broker down");
        assert!(json["message"]["originalQty"].is_string());
        assert!(json["detectedAt"].is_string());
    }
}
