//! Matching-engine wire schema.
//!
//! An admitted intent is re-expressed as a [`NewOrderMessage`] on the
//! "new orders" channel. It carries the caller's public key and key type so
//! the engine never performs a second identity lookup.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, EvmAddress, Intent, KeyType, MarketId, Network, Side, TxId};

/// Inbound order for the matching engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderMessage {
    pub tx_id: TxId,
    pub market_id: MarketId,
    pub account_id: AccountId,
    pub network: Network,
    pub side: Side,
    pub price: Decimal,
    /// Open quantity; equal to `original_qty` on first delivery.
    pub qty: Decimal,
    pub original_qty: Decimal,
    /// Scaled collateral, decimal string.
    pub collateral: String,
    pub public_key: String,
    pub key_type: KeyType,
    pub evm_address: EvmAddress,
    pub generated_at: DateTime<Utc>,
    pub admitted_at: DateTime<Utc>,
}

impl NewOrderMessage {
    #[must_use]
    pub fn from_intent(intent: &Intent, admitted_at: DateTime<Utc>) -> Self {
        Self {
            tx_id: intent.tx_id,
            market_id: intent.market_id,
            account_id: intent.account,
            network: intent.network,
            side: intent.side,
            price: intent.price,
            qty: intent.quantity,
            original_qty: intent.quantity,
            collateral: intent.collateral.to_string(),
            public_key: intent.public_key_hex(),
            key_type: intent.key_type,
            evm_address: intent.evm_address,
            generated_at: intent.generated_at,
            admitted_at,
        }
    }
}

/// Administrative cancellation of a previously forwarded intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderMessage {
    pub tx_id: TxId,
    pub account_id: AccountId,
    pub requested_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::U256;

    fn sample_intent() -> Intent {
        Intent {
            tx_id: TxId::new(),
            market_id: MarketId::new(),
            account: AccountId::new(0, 0, 4515),
            network: Network::Testnet,
            side: Side::Sell,
            price: Decimal::new(-25, 2),
            quantity: Decimal::new(8, 0),
            collateral: U256::from(2_000_000u64),
            generated_at: Utc::now(),
            signature: [1u8; 64],
            public_key: [2u8; 33],
            key_type: KeyType::EcdsaSecp256k1,
            evm_address: EvmAddress([3u8; 20]),
        }
    }

    #[test]
    fn new_order_carries_both_quantities_and_key() {
        let intent = sample_intent();
        let msg = NewOrderMessage::from_intent(&intent, Utc::now());
        assert_eq!(msg.qty, msg.original_qty);
        assert_eq!(msg.public_key, hex::encode([2u8; 33]));
        assert_eq!(msg.collateral, "2000000");
        assert_eq!(msg.side, Side::Sell);
    }

    #[test]
    fn new_order_json_shape() {
        let msg = NewOrderMessage::from_intent(&sample_intent(), Utc::now());
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["accountId"], "0.0.4515");
        assert_eq!(json["keyType"], "ECDSA_SECP256K1");
        assert_eq!(json["side"], "SELL");
        assert_eq!(json["originalQty"], "8");
    }
}
