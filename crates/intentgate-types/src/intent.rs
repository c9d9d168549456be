//! Intent types: the raw wire submission and its typed, validated form.
//!
//! An [`IntentSubmission`] is what the transport hands over: every field is
//! a string exactly as the client sent it. Shape validation turns it into an
//! [`Intent`], after which no field is ever re-parsed or compared as text.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, EvmAddress, KeyType, MarketId, Network, TxId, U256, constants};

/// Which side of the market the intent takes. Derived from the price sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Positive prices buy, negative prices sell. Zero has no side.
    #[must_use]
    pub fn from_signed_price(price: Decimal) -> Option<Self> {
        if price.is_zero() {
            None
        } else if price.is_sign_negative() {
            Some(Self::Sell)
        } else {
            Some(Self::Buy)
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Intent exactly as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentSubmission {
    pub tx_id: String,
    pub market_id: String,
    pub account_id: String,
    pub network: String,
    /// Fixed-point USD; the sign encodes the side.
    pub price: String,
    pub quantity: String,
    /// RFC-3339 timestamp at which the wallet produced the intent.
    pub generated_at: String,
    /// 64 raw bytes (r || s), hex encoded.
    pub signature: String,
    /// SEC1 compressed public key, hex encoded.
    pub public_key: String,
    pub key_type: String,
    pub evm_address: String,
}

/// A shape-validated intent. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
    pub tx_id: TxId,
    pub market_id: MarketId,
    pub account: AccountId,
    pub network: Network,
    pub side: Side,
    /// Signed price as submitted.
    pub price: Decimal,
    pub quantity: Decimal,
    /// `|price × quantity|` scaled by `10^COLLATERAL_DECIMALS`.
    pub collateral: U256,
    pub generated_at: DateTime<Utc>,
    pub signature: [u8; constants::SIGNATURE_LEN],
    pub public_key: [u8; constants::COMPRESSED_PUBKEY_LEN],
    pub key_type: KeyType,
    pub evm_address: EvmAddress,
}

impl Intent {
    /// Hex form of the claimed public key, as forwarded downstream.
    #[must_use]
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key)
    }
}
