//! Registries - Single-Owner State Management
//!
//! Each registry is one tokio task that exclusively owns its map and
//! processes commands from an mpsc queue, answering through oneshot
//! channels. Writers are serialized by the queue, never by a lock, and a
//! query can only ever observe fully-applied updates.
//!
//! # Components
//!
//! 1. **ArtifactRegistry**: records intent -> artifact links and announces
//!    each one on [`Topic::Artifacts`](lattice_events::Topic::Artifacts)
//! 2. **PrTracker**: pull requests keyed by `(repo, number)`; registers PRs
//!    automatically from artifact announcements and publishes
//!    registrations and deltas on
//!    [`Topic::PullRequests`](lattice_events::Topic::PullRequests)

pub mod artifacts;
pub mod error;
pub mod pr_tracker;

pub use artifacts::{spawn_artifact_registry, ArtifactRegistry, ArtifactRegistryHandle};
pub use error::{RegistryError, Result};
pub use pr_tracker::{spawn_pr_tracker, PrTracker, PrTrackerHandle, PrUpdate};

/// Default depth of each registry's command queue.
pub const DEFAULT_COMMAND_BUFFER: usize = 64;

/// One-shot channel for returning results from a registry task
pub type Responder<T> = tokio::sync::oneshot::Sender<T>;
