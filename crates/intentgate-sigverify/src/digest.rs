//! Wallet message framing and content hashing.
//!
//! A conforming wallet signs
//!
//! ```text
//! "\x19Hedera Signed Message:\n" || len(payload) || payload
//! ```
//!
//! where `payload` is the canonical hex string taken as literal characters
//! (never decoded to bytes) and `len` is its character count in ASCII
//! decimal. Decoding the hex, or counting decoded bytes, yields a different
//! digest than wallets produce and every signature fails.

use intentgate_types::constants::SIGNED_MESSAGE_PREFIX;

/// Frame a canonical payload exactly as the wallet does before signing.
#[must_use]
pub fn frame(canonical: &str) -> Vec<u8> {
    let declared = canonical.chars().count().to_string();
    let mut out =
        Vec::with_capacity(SIGNED_MESSAGE_PREFIX.len() + declared.len() + canonical.len());
    out.extend_from_slice(SIGNED_MESSAGE_PREFIX.as_bytes());
    out.extend_from_slice(declared.as_bytes());
    out.extend_from_slice(canonical.as_bytes());
    out
}

/// Legacy (pre-FIPS-202) Keccak-256. Not SHA3-256: the padding differs.
#[must_use]
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    alloy_primitives::keccak256(data).0
}
