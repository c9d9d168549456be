//! Identifiers used throughout IntentGate.
//!
//! Transaction and market identifiers are UUIDv7 (time-ordered, 128-bit).
//! Ledger accounts use the `shard.realm.num` form; portfolio indexing uses
//! 20-byte EVM-style addresses.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{IntentgateError, constants};

/// Parse a UUIDv7 in its canonical hyphenated form.
fn parse_v7(field: &'static str, s: &str) -> Result<Uuid, IntentgateError> {
    let trimmed = s.trim();
    // `Uuid::parse_str` also accepts braced, urn and simple forms; only the
    // 36-character hyphenated form is a valid wire representation here.
    if trimmed.len() != 36 {
        return Err(IntentgateError::malformed(
            field,
            format!("expected 36-character UUID, got {} characters", trimmed.len()),
        ));
    }
    let uuid =
        Uuid::parse_str(trimmed).map_err(|e| IntentgateError::malformed(field, e.to_string()))?;
    if uuid.get_version_num() != 7 {
        return Err(IntentgateError::malformed(
            field,
            format!("expected UUID version 7, got version {}", uuid.get_version_num()),
        ));
    }
    Ok(uuid)
}

/// Millisecond timestamp embedded in the first 48 bits of a UUIDv7.
fn v7_timestamp_ms(uuid: &Uuid) -> u64 {
    let bytes = uuid.as_bytes();
    u64::from_be_bytes([
        0, 0, bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5],
    ])
}

// ---------------------------------------------------------------------------
// TxId
// ---------------------------------------------------------------------------

/// Transaction identifier of an intent. The idempotency key of the whole
/// pipeline: globally unique for a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TxId(pub Uuid);

impl TxId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Extract the embedded timestamp (milliseconds since UNIX epoch).
    #[must_use]
    pub fn timestamp_ms(&self) -> u64 {
        v7_timestamp_ms(&self.0)
    }

    #[must_use]
    pub fn as_u128(&self) -> u128 {
        self.0.as_u128()
    }
}

impl Default for TxId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for TxId {
    type Err = IntentgateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_v7("tx_id", s).map(Self)
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// MarketId
// ---------------------------------------------------------------------------

/// Prediction-market identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct MarketId(pub Uuid);

impl MarketId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn as_u128(&self) -> u128 {
        self.0.as_u128()
    }
}

impl Default for MarketId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for MarketId {
    type Err = IntentgateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_v7("market_id", s).map(Self)
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// Ledger account in `shard.realm.num` form (e.g. `0.0.4515`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct AccountId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
}

impl AccountId {
    #[must_use]
    pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self { shard, realm, num }
    }

    /// Parse with a custom field name in the error (e.g. `spender_account`).
    pub fn parse_field(field: &'static str, s: &str) -> Result<Self, IntentgateError> {
        let mut parts = s.trim().split('.');
        let mut next = |part: &str| -> Result<u64, IntentgateError> {
            let raw = parts
                .next()
                .ok_or_else(|| IntentgateError::malformed(field, format!("missing {part}")))?;
            if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
                return Err(IntentgateError::malformed(
                    field,
                    format!("{part} `{raw}` is not a decimal number"),
                ));
            }
            raw.parse::<u64>()
                .map_err(|e| IntentgateError::malformed(field, format!("{part}: {e}")))
        };
        let shard = next("shard")?;
        let realm = next("realm")?;
        let num = next("num")?;
        if parts.next().is_some() {
            return Err(IntentgateError::malformed(
                field,
                "expected exactly three dot-separated components",
            ));
        }
        Ok(Self { shard, realm, num })
    }
}

impl FromStr for AccountId {
    type Err = IntentgateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_field("account_id", s)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl Serialize for AccountId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// EvmAddress
// ---------------------------------------------------------------------------

/// 20-byte EVM-style address used for portfolio indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct EvmAddress(pub [u8; constants::EVM_ADDRESS_LEN]);

impl FromStr for EvmAddress {
    type Err = IntentgateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| IntentgateError::malformed("evm_address", "missing 0x prefix"))?;
        let mut bytes = [0u8; constants::EVM_ADDRESS_LEN];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| IntentgateError::malformed("evm_address", e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for EvmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for EvmAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EvmAddress {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
