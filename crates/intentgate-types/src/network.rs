//! Closed ledger enumerations: network names and public-key types.
//!
//! Raw strings are normalised exactly once, at the boundary. Nothing past
//! shape validation compares network or key-type strings.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::IntentgateError;

/// Ledger network an intent is declared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Previewnet,
}

impl Network {
    pub const ALL: [Self; 3] = [Self::Mainnet, Self::Testnet, Self::Previewnet];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Previewnet => "previewnet",
        }
    }
}

impl FromStr for Network {
    type Err = IntentgateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "previewnet" => Ok(Self::Previewnet),
            other => Err(IntentgateError::malformed(
                "network",
                format!("unrecognised network `{other}`"),
            )),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public-key type registered on a ledger account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    #[serde(rename = "ED25519")]
    Ed25519,
    #[serde(rename = "ECDSA_SECP256K1")]
    EcdsaSecp256k1,
    /// Threshold keys and key lists. Never bindable to a single signature.
    #[serde(rename = "ProtobufEncoded")]
    ProtobufEncoded,
}

impl KeyType {
    /// Mirror-node spelling of the key type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ed25519 => "ED25519",
            Self::EcdsaSecp256k1 => "ECDSA_SECP256K1",
            Self::ProtobufEncoded => "ProtobufEncoded",
        }
    }
}

impl FromStr for KeyType {
    type Err = IntentgateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ED25519" => Ok(Self::Ed25519),
            "ECDSA_SECP256K1" | "ECDSA" | "SECP256K1" => Ok(Self::EcdsaSecp256k1),
            "PROTOBUFENCODED" => Ok(Self::ProtobufEncoded),
            _ => Err(IntentgateError::malformed(
                "key_type",
                format!("unrecognised key type `{}`", s.trim()),
            )),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
