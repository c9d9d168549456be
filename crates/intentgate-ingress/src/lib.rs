//! # intentgate-ingress
//!
//! **Admission plane**: turns a signed intent from a caller into exactly one
//! order on the matching engine's inbound channel, or a reason why not.
//!
//! ## Architecture
//!
//! 1. **shape**: gate 1, wire strings into a typed `Intent`
//! 2. **AdmissionPipeline**: gates 2 to 6, then persist and forward
//! 3. **Collaborators**: narrow traits for everything outside the pipeline
//! 4. **MirrorNodeClient**: identity and collateral over the mirror-node REST API
//! 5. **InMemoryIntentRegistry**: duplicate check plus uniquely-constrained persist
//! 6. **ChannelForwarder**: idempotent publish onto the engine channels
//! 7. **ChannelReconciliation**: operational queue for persisted-but-unforwarded intents
//! 8. **IntakeService**: submit / cancel / health for callers
//!
//! ## Admission Flow
//!
//! ```text
//! IntakeService.submit() → shape::validate() → freshness → registry.exists()
//!     → identity.resolve() → sigverify::verify() → collateral.allowance()/balance()
//!     → registry.persist() → forwarder.publish() → Accepted
//! ```
//!
//! Every collaborator call is bounded by the configured upstream timeout.

pub mod collaborators;
pub mod forwarder;
pub mod mirror;
pub mod pipeline;
pub mod reconcile;
pub mod registry;
pub mod service;
pub mod shape;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testkit;

pub use collaborators::{
    CollateralOracle, Collaborators, IdentityResolver, IntentForwarder, IntentRegistry,
    OrphanedIntent, PersistOutcome, PublishOutcome, ReconciliationSink, ResolvedKey,
};
pub use forwarder::{ChannelForwarder, EngineInbox, PublishGuard};
pub use mirror::MirrorNodeClient;
pub use pipeline::AdmissionPipeline;
pub use reconcile::ChannelReconciliation;
pub use registry::InMemoryIntentRegistry;
pub use service::{
    CancelRejection, CancelReply, HealthReport, IntakeReply, IntakeRequest, IntakeService,
    SubmitReply,
};
