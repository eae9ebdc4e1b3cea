//! Intent core types and lifecycle state machine.
//!
//! Canonical definitions for Intent, IntentState, and the transitions an
//! intent may take between proposal and a terminal outcome.

pub mod lifecycle;

pub use lattice_ids::IntentId;
pub use lifecycle::{
    classify, is_terminal, route_after_classification, transition, transition_named,
    valid_transitions, valid_transitions_named, LifecycleError,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Intent State - The core state machine
// ============================================================================

/// Lifecycle states of an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentState {
    /// Created, not yet classified
    Proposed,
    /// Safety tier assigned
    Classified,
    /// Gate: waiting for a human decision on the governance issue
    AwaitingApproval,
    /// Cleared to run
    Approved,
    /// A worker is executing the intent
    Running,

    // ========== Terminal States ==========
    /// Terminal: finished successfully
    Completed,
    /// Terminal: execution failed
    Failed,
    /// Terminal: a human said no
    Rejected,
    /// Terminal: withdrawn before running
    Canceled,
}

impl IntentState {
    pub const ALL: [IntentState; 9] = [
        IntentState::Proposed,
        IntentState::Classified,
        IntentState::AwaitingApproval,
        IntentState::Approved,
        IntentState::Running,
        IntentState::Completed,
        IntentState::Failed,
        IntentState::Rejected,
        IntentState::Canceled,
    ];

    pub const TERMINAL: [IntentState; 4] = [
        IntentState::Completed,
        IntentState::Failed,
        IntentState::Rejected,
        IntentState::Canceled,
    ];

    /// Get the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentState::Proposed => "proposed",
            IntentState::Classified => "classified",
            IntentState::AwaitingApproval => "awaiting_approval",
            IntentState::Approved => "approved",
            IntentState::Running => "running",
            IntentState::Completed => "completed",
            IntentState::Failed => "failed",
            IntentState::Rejected => "rejected",
            IntentState::Canceled => "canceled",
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            IntentState::Completed
                | IntentState::Failed
                | IntentState::Rejected
                | IntentState::Canceled
        )
    }

    /// Check if this is a gate (awaiting human approval).
    pub fn is_gate(&self) -> bool {
        matches!(self, IntentState::AwaitingApproval)
    }

    /// Get valid transitions from this state.
    pub fn valid_transitions(&self) -> &'static [IntentState] {
        match self {
            IntentState::Proposed => &[IntentState::Classified],
            IntentState::Classified => &[IntentState::AwaitingApproval, IntentState::Approved],
            IntentState::AwaitingApproval => &[
                IntentState::Approved,
                IntentState::Rejected,
                IntentState::Canceled,
            ],
            IntentState::Approved => &[IntentState::Running, IntentState::Canceled],
            IntentState::Running => &[IntentState::Completed, IntentState::Failed],
            IntentState::Completed
            | IntentState::Failed
            | IntentState::Rejected
            | IntentState::Canceled => &[],
        }
    }

    /// Check if a transition to the target state is valid.
    pub fn can_transition_to(&self, target: IntentState) -> bool {
        self.valid_transitions().contains(&target)
    }
}

impl fmt::Display for IntentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for IntentState {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IntentState::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| LifecycleError::InvalidState(s.to_string()))
    }
}

// ============================================================================
// Intent - The unit of work
// ============================================================================

/// What an intent asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    /// Change something (open a PR, run a job)
    Action,
    /// Ask a human something; no side effects of its own
    Question,
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IntentKind::Action => "action",
            IntentKind::Question => "question",
        };
        write!(f, "{}", s)
    }
}

/// Safety tier, assigned by an external classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// May proceed without a human
    Safe,
    /// Needs sign-off
    Elevated,
    /// Needs sign-off; touches production or irreversible state
    Dangerous,
}

impl Classification {
    /// Whether intents of this tier must pass the approval gate.
    pub fn requires_approval(&self) -> bool {
        !matches!(self, Classification::Safe)
    }
}

/// Where an intent came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentSource {
    /// Origin type (e.g. "github_issue", "schedule", "agent")
    pub source_type: String,
    /// Identifier within that origin
    pub id: String,
}

impl IntentSource {
    pub fn new(source_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            source_type: source_type.into(),
            id: id.into(),
        }
    }
}

/// One entry of the transition log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionEntry {
    pub from: IntentState,
    pub to: IntentState,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A unit of work tracked through approval and execution.
///
/// Values are immutable from the lifecycle's point of view: every
/// transition produces a new `Intent` and leaves the input untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub id: IntentId,
    pub kind: IntentKind,
    pub state: IntentState,
    pub source: IntentSource,
    pub summary: String,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    pub inserted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub classified_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Newest first.
    #[serde(default)]
    pub transition_log: Vec<TransitionEntry>,
}

impl Intent {
    /// Create a new intent in `proposed`.
    pub fn new(kind: IntentKind, source: IntentSource, summary: impl Into<String>) -> Self {
        Self::with_id(IntentId::new(), kind, source, summary)
    }

    /// Create a new intent in `proposed` with a caller-chosen id.
    pub fn with_id(
        id: IntentId,
        kind: IntentKind,
        source: IntentSource,
        summary: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            kind,
            state: IntentState::Proposed,
            source,
            summary: summary.into(),
            payload: serde_json::Value::Null,
            classification: None,
            metadata: BTreeMap::new(),
            inserted_at: now,
            updated_at: now,
            classified_at: None,
            approved_at: None,
            started_at: None,
            completed_at: None,
            transition_log: Vec::new(),
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Check if the intent is at a gate requiring human input.
    pub fn needs_human_input(&self) -> bool {
        self.state.is_gate()
    }

    /// The most recent transition, if any.
    pub fn last_transition(&self) -> Option<&TransitionEntry> {
        self.transition_log.first()
    }
}

// ============================================================================
// Tests
// ============================================================================
