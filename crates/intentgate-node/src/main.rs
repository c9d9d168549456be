//! IntentGate admission node.
//!
//! Usage: `intentgate-node [config.json]`
//!
//! Reads one JSON request per line on stdin (`{"op":"submit","intent":{..}}`,
//! `{"op":"cancel","txId":..,"accountId":..}`, `{"op":"health"}`) and writes
//! one JSON reply per line on stdout. Logs go to stderr; `RUST_LOG` overrides
//! the default `info` filter.

use std::sync::Arc;

use intentgate_ingress::{
    ChannelForwarder, ChannelReconciliation, Collaborators, EngineInbox, InMemoryIntentRegistry,
    IntakeRequest, IntakeService, MirrorNodeClient, OrphanedIntent,
};
use intentgate_types::{GateConfig, constants};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    sync::mpsc,
};
use tracing_subscriber::EnvFilter;

fn load_config() -> intentgate_types::Result<GateConfig> {
    match std::env::args().nth(1) {
        Some(path) => GateConfig::from_json_file(path),
        None => {
            let config = GateConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Stand-in for the matching engine: log what arrives on each channel.
async fn drain_engine_inbox(mut inbox: EngineInbox) {
    loop {
        tokio::select! {
            Some(order) = inbox.new_orders.recv() => {
                tracing::info!(
                    channel = constants::NEW_ORDERS_CHANNEL,
                    tx_id = %order.tx_id,
                    market_id = %order.market_id,
                    side = %order.side,
                    qty = %order.qty,
                    "order delivered"
                );
            }
            Some(cancel) = inbox.cancels.recv() => {
                tracing::info!(
                    channel = constants::CANCEL_ORDERS_CHANNEL,
                    tx_id = %cancel.tx_id,
                    "cancel delivered"
                );
            }
            else => break,
        }
    }
}

async fn drain_orphans(mut rx: mpsc::UnboundedReceiver<OrphanedIntent>) {
    while let Some(orphan) = rx.recv().await {
        let record = serde_json::to_string(&orphan).unwrap_or_else(|e| e.to_string());
        tracing::error!(tx_id = %orphan.tx_id, %record, "orphaned intent awaiting reconciliation");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    init_tracing(config.log_json);

    let mirror = Arc::new(MirrorNodeClient::new(&config.mirror, config.upstream_timeout())?);
    let (forwarder, inbox) = ChannelForwarder::channel(&config.forwarder);
    let (reconciliation, orphans) = ChannelReconciliation::channel();
    let collaborators = Collaborators {
        registry: Arc::new(InMemoryIntentRegistry::new()),
        identity: mirror.clone(),
        collateral: mirror,
        forwarder: Arc::new(forwarder),
        reconciliation: Arc::new(reconciliation),
    };
    let service = Arc::new(IntakeService::new(&config, collaborators));

    tokio::spawn(drain_engine_inbox(inbox));
    tokio::spawn(drain_orphans(orphans));

    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = reply_rx.recv().await {
            if stdout.write_all(line.as_bytes()).await.is_err()
                || stdout.write_all(b"\n").await.is_err()
                || stdout.flush().await.is_err()
            {
                break;
            }
        }
    });

    tracing::info!(
        service = constants::SERVICE_NAME,
        version = constants::VERSION,
        past_window_secs = config.past_window_secs,
        future_window_secs = config.future_window_secs,
        upstream_timeout_ms = config.upstream_timeout_ms,
        "admission node ready"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let request: IntakeRequest = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(error = %e, "unparseable request line");
                let reply = serde_json::json!({ "status": "BAD_REQUEST", "detail": e.to_string() });
                let _ = reply_tx.send(reply.to_string());
                continue;
            }
        };
        let service = service.clone();
        let reply_tx = reply_tx.clone();
        tokio::spawn(async move {
            let reply = service.handle(request).await;
            match serde_json::to_string(&reply) {
                Ok(json) => {
                    let _ = reply_tx.send(json);
                }
                Err(e) => tracing::error!(error = %e, "failed to encode reply"),
            }
        });
    }

    drop(reply_tx);
    writer.await?;
    tracing::info!("stdin closed, shutting down");
    Ok(())
}
