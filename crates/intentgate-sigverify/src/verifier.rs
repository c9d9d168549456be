//! secp256k1 ECDSA verification with precompile semantics.
//!
//! The on-chain verification precompile accepts any `(r, s)` with
//! `0 < r, s < n` and does not enforce low-s. Off-chain acceptance must agree
//! with it exactly, so verification is done directly over the curve group
//! rather than through a signature type that might normalise or reject
//! high-s values.
//!
//! ```text
//! z  = keccak256(framed) mod n
//! u1 = z / s,  u2 = r / s
//! R  = u1·G + u2·Q
//! valid  ⇔  R ≠ ∞  and  x(R) mod n == r
//! ```

use intentgate_types::constants::{COMPRESSED_PUBKEY_LEN, SIGNATURE_LEN};
use k256::{
    FieldBytes, ProjectivePoint, PublicKey, Scalar, U256,
    elliptic_curve::{PrimeField, ops::Reduce, point::AffineCoordinates},
};

use crate::{SignatureShapeError, digest::keccak256};

/// Verify a 64-byte `r || s` signature over `framed_message`.
///
/// Returns `Ok(false)` for every well-formed input that does not verify,
/// including out-of-range `r` or `s`. Returns `Err` only when the signature
/// or key is not even shaped like one.
pub fn verify(
    framed_message: &[u8],
    public_key: &[u8],
    signature: &[u8],
) -> Result<bool, SignatureShapeError> {
    if signature.len() != SIGNATURE_LEN {
        return Err(SignatureShapeError::SignatureLength(signature.len()));
    }
    if public_key.len() != COMPRESSED_PUBKEY_LEN {
        return Err(SignatureShapeError::PublicKeyLength(public_key.len()));
    }
    let key =
        PublicKey::from_sec1_bytes(public_key).map_err(|_| SignatureShapeError::PublicKeyNotOnCurve)?;

    let digest = keccak256(framed_message);
    Ok(verify_prehashed(&digest, &key, signature))
}

fn verify_prehashed(digest: &[u8; 32], key: &PublicKey, signature: &[u8]) -> bool {
    let (r_bytes, s_bytes) = signature.split_at(32);
    let (Some(r), Some(s)) = (scalar_in_range(r_bytes), scalar_in_range(s_bytes)) else {
        return false;
    };

    let z = <Scalar as Reduce<U256>>::reduce_bytes(&FieldBytes::clone_from_slice(digest));
    let Some(s_inv) = Option::<Scalar>::from(s.invert()) else {
        return false;
    };
    let u1 = z * s_inv;
    let u2 = r * s_inv;

    let point = (ProjectivePoint::GENERATOR * u1) + (ProjectivePoint::from(*key.as_affine()) * u2);
    // The point at infinity has affine x = 0, which never equals a non-zero r.
    let x = point.to_affine().x();
    <Scalar as Reduce<U256>>::reduce_bytes(&x) == r
}

/// Big-endian 32 bytes as a scalar in `[1, n)`.
fn scalar_in_range(bytes: &[u8]) -> Option<Scalar> {
    let scalar = Option::<Scalar>::from(Scalar::from_repr(FieldBytes::clone_from_slice(bytes)))?;
    if bool::from(scalar.is_zero()) {
        return None;
    }
    Some(scalar)
}
