//! Canonical payload encoding.
//!
//! The payload is 128 lowercase hex characters:
//!
//! ```text
//! | collateral (64) | market id (32) | tx id (32) |
//! ```
//!
//! Each field is the big-endian unsigned value, left-padded with zeros. The
//! same logical intent always yields the same string regardless of how its
//! identifiers were formatted on the wire.

use std::fmt;

use intentgate_types::{Intent, U256, constants};
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::EncodingError;

/// A fixed-length canonical payload in hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalPayload(String);

impl CanonicalPayload {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CanonicalPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scale `|price × quantity|` to an integer number of collateral units.
///
/// Fails if the product carries more than `COLLATERAL_DECIMALS` fractional
/// digits or overflows.
pub fn scaled_collateral(price: Decimal, quantity: Decimal) -> Result<U256, EncodingError> {
    let notional = price
        .checked_mul(quantity)
        .ok_or(EncodingError::CollateralOverflow)?
        .abs();
    let scale = Decimal::from(10u64.pow(constants::COLLATERAL_DECIMALS));
    let scaled = notional
        .checked_mul(scale)
        .ok_or(EncodingError::CollateralOverflow)?;
    if !scaled.fract().is_zero() {
        return Err(EncodingError::ExcessPrecision(notional.normalize().to_string()));
    }
    let units = scaled
        .trunc()
        .to_u128()
        .ok_or(EncodingError::CollateralOverflow)?;
    Ok(U256::from(units))
}

/// Numeric value of a time-ordered identifier's textual form.
///
/// Every `-` separator is removed; the remainder must be exactly 32 hex
/// digits.
pub fn identifier_value(text: &str) -> Result<u128, EncodingError> {
    let digits: String = text.chars().filter(|c| *c != '-').collect();
    if digits.len() != constants::IDENTIFIER_FIELD_HEX_LEN
        || !digits.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return Err(EncodingError::InvalidIdentifier {
            value: text.to_string(),
        });
    }
    u128::from_str_radix(&digits, 16).map_err(|_| EncodingError::InvalidIdentifier {
        value: text.to_string(),
    })
}

/// Encode the three payload fields.
///
/// The field types bound every input to its designated width, so encoding
/// itself cannot fail.
#[must_use]
pub fn encode(collateral: U256, market_id: u128, tx_id: u128) -> CanonicalPayload {
    let mut out = String::with_capacity(constants::CANONICAL_PAYLOAD_HEX_LEN);
    out.push_str(&hex::encode(collateral.to_be_bytes::<32>()));
    out.push_str(&hex::encode(market_id.to_be_bytes()));
    out.push_str(&hex::encode(tx_id.to_be_bytes()));
    debug_assert_eq!(out.len(), constants::CANONICAL_PAYLOAD_HEX_LEN);
    CanonicalPayload(out)
}

/// Build the canonical payload of an admitted intent from its typed fields.
///
/// Identifiers are read back from their canonical hyphenated text form.
pub fn encode_intent(intent: &Intent) -> Result<CanonicalPayload, EncodingError> {
    let market_id = identifier_value(&intent.market_id.to_string())?;
    let tx_id = identifier_value(&intent.tx_id.to_string())?;
    Ok(encode(intent.collateral, market_id, tx_id))
}

/// Split a canonical payload back into its three integers.
pub fn decode(payload: &str) -> Result<(U256, u128, u128), EncodingError> {
    if payload.len() != constants::CANONICAL_PAYLOAD_HEX_LEN {
        return Err(EncodingError::MalformedPayload(format!(
            "expected {} hex characters, got {}",
            constants::CANONICAL_PAYLOAD_HEX_LEN,
            payload.len()
        )));
    }
    let bytes =
        hex::decode(payload).map_err(|e| EncodingError::MalformedPayload(e.to_string()))?;
    let (collateral, ids) = bytes.split_at(32);
    let (market, tx) = ids.split_at(16);

    let collateral: [u8; 32] = collateral
        .try_into()
        .map_err(|_| EncodingError::MalformedPayload("collateral field".into()))?;
    let market: [u8; 16] = market
        .try_into()
        .map_err(|_| EncodingError::MalformedPayload("market field".into()))?;
    let tx: [u8; 16] = tx
        .try_into()
        .map_err(|_| EncodingError::MalformedPayload("tx field".into()))?;

    Ok((
        U256::from_be_bytes(collateral),
        u128::from_be_bytes(market),
        u128::from_be_bytes(tx),
    ))
}
