//! Gate 1: shape validation.
//!
//! Turns the raw [`IntentSubmission`] into a typed [`Intent`]. This is the
//! only place raw strings are interpreted. Any failure is a client-correctable
//! `MalformedInput` and no collaborator is contacted.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use intentgate_sigverify::payload::scaled_collateral;
use intentgate_types::{
    AccountId, EvmAddress, Intent, IntentSubmission, IntentgateError, KeyType, MarketId, Network,
    RejectReason, Side, TxId, constants,
};
use rust_decimal::Decimal;

/// Parse and validate every field of a submission.
pub fn validate(submission: &IntentSubmission) -> Result<Intent, RejectReason> {
    parse(submission).map_err(|err| match err {
        IntentgateError::MalformedField { field, reason } => RejectReason::MalformedInput {
            field: field.to_string(),
            detail: reason,
        },
        other => RejectReason::MalformedInput {
            field: "intent".to_string(),
            detail: other.to_string(),
        },
    })
}

fn parse(sub: &IntentSubmission) -> Result<Intent, IntentgateError> {
    let account = AccountId::from_str(&sub.account_id)?;
    let generated_at = parse_timestamp(&sub.generated_at)?;
    let tx_id = TxId::from_str(&sub.tx_id)?;
    let market_id = MarketId::from_str(&sub.market_id)?;
    let network = Network::from_str(&sub.network)?;

    let price = parse_decimal("price", &sub.price)?;
    let side = Side::from_signed_price(price)
        .ok_or_else(|| IntentgateError::malformed("price", "price must be non-zero"))?;
    let quantity = parse_decimal("quantity", &sub.quantity)?;
    if quantity <= Decimal::ZERO {
        return Err(IntentgateError::malformed("quantity", "quantity must be positive"));
    }
    let collateral = scaled_collateral(price, quantity)
        .map_err(|e| IntentgateError::malformed("price", e.to_string()))?;

    let signature = decode_fixed::<{ constants::SIGNATURE_LEN }>("signature", &sub.signature)?;
    let public_key =
        decode_fixed::<{ constants::COMPRESSED_PUBKEY_LEN }>("public_key", &sub.public_key)?;
    if !matches!(public_key[0], 0x02 | 0x03) {
        return Err(IntentgateError::malformed(
            "public_key",
            "expected a compressed point (0x02/0x03 prefix)",
        ));
    }
    let key_type = KeyType::from_str(&sub.key_type)?;
    if key_type != KeyType::EcdsaSecp256k1 {
        return Err(IntentgateError::malformed(
            "key_type",
            format!("{key_type} keys cannot sign intents"),
        ));
    }
    let evm_address = EvmAddress::from_str(&sub.evm_address)?;

    Ok(Intent {
        tx_id,
        market_id,
        account,
        network,
        side,
        price,
        quantity,
        collateral,
        generated_at,
        signature,
        public_key,
        key_type,
        evm_address,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, IntentgateError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| IntentgateError::malformed("generated_at", e.to_string()))
}

/// Plain decimal notation only; no exponents.
fn parse_decimal(field: &'static str, raw: &str) -> Result<Decimal, IntentgateError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.contains(['e', 'E']) {
        return Err(IntentgateError::malformed(field, format!("`{raw}` is not a decimal")));
    }
    Decimal::from_str_exact(trimmed).map_err(|e| IntentgateError::malformed(field, e.to_string()))
}

fn decode_fixed<const N: usize>(
    field: &'static str,
    raw: &str,
) -> Result<[u8; N], IntentgateError> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.len() != N * 2 {
        return Err(IntentgateError::malformed(
            field,
            format!("expected {N} bytes ({} hex characters), got {}", N * 2, digits.len()),
        ));
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(digits, &mut out)
        .map_err(|e| IntentgateError::malformed(field, e.to_string()))?;
    Ok(out)
}
