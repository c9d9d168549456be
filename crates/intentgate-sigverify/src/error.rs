//! Errors raised by the signature building blocks.

use thiserror::Error;

/// A value could not be placed in its fixed-width payload field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// `|price × quantity|` scaled to an integer does not fit the field.
    #[error("collateral amount overflows the 256-bit field")]
    CollateralOverflow,

    /// The collateral has more fractional digits than the scale allows.
    #[error("collateral {0} has more than the allowed decimal places")]
    ExcessPrecision(String),

    /// An identifier did not reduce to exactly 32 hex digits.
    #[error("identifier `{value}` is not 32 hex digits once separators are removed")]
    InvalidIdentifier { value: String },

    /// A canonical payload string had the wrong length or alphabet.
    #[error("canonical payload is malformed: {0}")]
    MalformedPayload(String),
}

/// The caller handed the verifier something that is not a signature or key
/// at all. Distinct from a signature that simply does not verify.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureShapeError {
    #[error("InvalidInputShape: signature must be 64 bytes, got {0}")]
    SignatureLength(usize),

    #[error("InvalidInputShape: public key must be 33 bytes, got {0}")]
    PublicKeyLength(usize),

    #[error("InvalidInputShape: public key is not a point on secp256k1")]
    PublicKeyNotOnCurve,
}
