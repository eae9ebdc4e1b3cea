//! Event types carried on the bus.

use lattice_ids::IntentId;
use lattice_intent::IntentState;
use lattice_types::{ArtifactLink, FieldChange, PullRequest};
use serde::Serialize;
use std::fmt;

/// Bus topics. Subscribers pick the topics they care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// Artifact links recorded by the artifact registry
    Artifacts,
    /// PR registrations and updates from the PR tracker
    PullRequests,
    /// Lifecycle transitions driven by governance
    Intents,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Artifacts => "artifacts",
            Topic::PullRequests => "pull_requests",
            Topic::Intents => "intents",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Events published on the bus.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    // ========================================================================
    // Artifact Events
    // ========================================================================
    /// A new artifact link was recorded
    ArtifactLinked { link: ArtifactLink },

    // ========================================================================
    // Pull Request Events
    // ========================================================================
    /// A PR was registered for the first time
    PrRegistered { pr: PullRequest },

    /// A PR changed; `changes` is never empty
    PrUpdated {
        pr: PullRequest,
        changes: Vec<FieldChange>,
    },

    // ========================================================================
    // Intent Events
    // ========================================================================
    /// An intent moved between lifecycle states
    IntentTransitioned {
        intent_id: IntentId,
        from: IntentState,
        to: IntentState,
        actor: Option<String>,
    },
}

impl Event {
    /// The topic this event belongs on.
    pub fn topic(&self) -> Topic {
        match self {
            Event::ArtifactLinked { .. } => Topic::Artifacts,
            Event::PrRegistered { .. } | Event::PrUpdated { .. } => Topic::PullRequests,
            Event::IntentTransitioned { .. } => Topic::Intents,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::ArtifactLinked { .. } => "artifact_linked",
            Event::PrRegistered { .. } => "pr_registered",
            Event::PrUpdated { .. } => "pr_updated",
            Event::IntentTransitioned { .. } => "intent_transitioned",
        }
    }
}
