//! # intentgate-sigverify
//!
//! Pure, synchronous building blocks for authenticating a signed intent:
//!
//! 1. **Payload** ([`payload`]): fixed-width canonical hex encoding of the
//!    collateral amount, market id and transaction id
//! 2. **Digest** ([`digest`]): wallet message framing and legacy Keccak-256
//! 3. **Verifier** ([`verifier`]): secp256k1 ECDSA verification with the
//!    range policy of the ledger's verification precompile
//!
//! ## Flow
//!
//! ```text
//! Intent → payload::encode_intent() → digest::frame() → verifier::verify()
//! ```
//!
//! Nothing in this crate performs I/O or holds state; every function is safe
//! to call concurrently.

pub mod digest;
pub mod error;
pub mod payload;
pub mod verifier;

pub use digest::{frame, keccak256};
pub use error::{EncodingError, SignatureShapeError};
pub use payload::{CanonicalPayload, encode, encode_intent};
pub use verifier::verify;
