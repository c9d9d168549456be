//! # intentgate-types
//!
//! Shared types, errors, and configuration for the **IntentGate** admission
//! pipeline.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`TxId`], [`MarketId`], [`AccountId`], [`EvmAddress`]
//! - **Ledger enums**: [`Network`], [`KeyType`]
//! - **Intent model**: [`IntentSubmission`] (wire form), [`Intent`] (typed), [`Side`]
//! - **Decisions**: [`AdmissionDecision`], [`RejectReason`]
//! - **Matching-engine messages**: [`NewOrderMessage`], [`CancelOrderMessage`]
//! - **Configuration**: [`GateConfig`], [`MirrorConfig`], [`ForwarderConfig`]
//! - **Errors**: [`IntentgateError`] with `IG_ERR_` prefix codes
//! - **Constants**: field widths, framing prefix, collateral precision

pub mod config;
pub mod constants;
pub mod decision;
pub mod error;
pub mod ids;
pub mod intent;
pub mod message;
pub mod network;

pub use config::*;
pub use decision::*;
pub use error::*;
pub use ids::*;
pub use intent::*;
pub use message::*;
pub use network::*;

/// 256-bit unsigned integer used for scaled collateral amounts.
pub use alloy_primitives::U256;

// Constants are accessed via `intentgate_types::constants::FOO`
// (not re-exported to avoid name collisions).
