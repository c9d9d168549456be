//! System-wide constants for the IntentGate admission pipeline.

/// Decimal places used to scale USD collateral into an integer
/// (the collateral token's smallest unit).
pub const COLLATERAL_DECIMALS: u32 = 6;

/// Wallet signing-domain prefix. The declared payload length and the
/// payload itself follow it directly.
pub const SIGNED_MESSAGE_PREFIX: &str = "\x19Hedera Signed Message:\n";

/// Hex characters occupied by the 256-bit collateral field.
pub const COLLATERAL_FIELD_HEX_LEN: usize = 64;

/// Hex characters occupied by each 128-bit identifier field.
pub const IDENTIFIER_FIELD_HEX_LEN: usize = 32;

/// Total hex characters of a canonical payload.
pub const CANONICAL_PAYLOAD_HEX_LEN: usize =
    COLLATERAL_FIELD_HEX_LEN + 2 * IDENTIFIER_FIELD_HEX_LEN;

/// Detached signature length: 32-byte r followed by 32-byte s.
pub const SIGNATURE_LEN: usize = 64;

/// SEC1 compressed secp256k1 public key length.
pub const COMPRESSED_PUBKEY_LEN: usize = 33;

/// EVM address length in bytes.
pub const EVM_ADDRESS_LEN: usize = 20;

/// Default accepted age of an intent's generation timestamp.
pub const DEFAULT_PAST_WINDOW_SECS: u64 = 300;

/// Default accepted clock skew into the future.
pub const DEFAULT_FUTURE_WINDOW_SECS: u64 = 30;

/// Default bound on every collaborator call.
pub const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 2_000;

/// Default capacity of the matching-engine inbound channels.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 10_000;

/// Default number of transaction ids remembered for publish dedup.
pub const DEFAULT_PUBLISH_DEDUP_CAPACITY: usize = 500_000;

/// Channel name the matching engine consumes new intents from.
pub const NEW_ORDERS_CHANNEL: &str = "orders.new";

/// Channel name the matching engine consumes cancellations from.
pub const CANCEL_ORDERS_CHANNEL: &str = "orders.cancel";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service name.
pub const SERVICE_NAME: &str = "IntentGate";
