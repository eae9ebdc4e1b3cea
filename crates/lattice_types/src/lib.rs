//! Shared value types for artifacts produced by intents.
//!
//! These are the CANONICAL definitions of artifact links and tracked pull
//! requests; the registries own the live values, the event bus carries
//! clones of them.

pub mod artifact;
pub mod pull_request;

pub use artifact::{ArtifactKind, ArtifactLink, ArtifactRole};
pub use pull_request::{
    FieldChange, PrChanges, PrField, PrKey, PrState, PullRequest, ReviewState,
};
