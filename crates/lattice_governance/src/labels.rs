//! Governance labels.
//!
//! A governance issue carries at most one of three labels, mirroring the
//! approval gate of its intent. Humans may also decide by applying a label
//! themselves, so the mapping runs both ways, but only the two decision
//! labels map back to a state.

use lattice_intent::IntentState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("state {0} has no governance label")]
    NoLabel(IntentState),

    #[error("unknown governance label: '{0}'")]
    UnknownLabel(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GovernanceLabel {
    #[serde(rename = "intent-awaiting-approval")]
    AwaitingApproval,
    #[serde(rename = "intent-approved")]
    Approved,
    #[serde(rename = "intent-rejected")]
    Rejected,
}

impl GovernanceLabel {
    pub const ALL: [GovernanceLabel; 3] = [
        GovernanceLabel::AwaitingApproval,
        GovernanceLabel::Approved,
        GovernanceLabel::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GovernanceLabel::AwaitingApproval => "intent-awaiting-approval",
            GovernanceLabel::Approved => "intent-approved",
            GovernanceLabel::Rejected => "intent-rejected",
        }
    }

    /// The intent state this label stands for.
    pub fn state(&self) -> IntentState {
        match self {
            GovernanceLabel::AwaitingApproval => IntentState::AwaitingApproval,
            GovernanceLabel::Approved => IntentState::Approved,
            GovernanceLabel::Rejected => IntentState::Rejected,
        }
    }
}

impl fmt::Display for GovernanceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GovernanceLabel {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GovernanceLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| LabelError::UnknownLabel(s.to_string()))
    }
}

/// Label to show on the governance issue while the intent is in `state`.
pub fn for_state(state: IntentState) -> Result<GovernanceLabel, LabelError> {
    match state {
        IntentState::AwaitingApproval => Ok(GovernanceLabel::AwaitingApproval),
        IntentState::Approved => Ok(GovernanceLabel::Approved),
        IntentState::Rejected => Ok(GovernanceLabel::Rejected),
        other => Err(LabelError::NoLabel(other)),
    }
}

/// Decision carried by a label a human applied.
///
/// `intent-awaiting-approval` is a governance label but not a decision, so
/// it is rejected here like any foreign label.
pub fn to_state(label: &str) -> Result<IntentState, LabelError> {
    match label.parse::<GovernanceLabel>()?.state() {
        IntentState::AwaitingApproval => Err(LabelError::UnknownLabel(label.to_string())),
        decided => Ok(decided),
    }
}

pub fn is_valid(label: &str) -> bool {
    label.parse::<GovernanceLabel>().is_ok()
}

/// Label edits that bring an issue in line with an intent state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelPlan {
    pub add: Vec<GovernanceLabel>,
    pub remove: Vec<GovernanceLabel>,
}

impl LabelPlan {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

/// Work out which governance labels to add and remove so the issue carries
/// exactly the label for `state`. Foreign labels are never touched, and a
/// state without a label leaves the existing governance labels in place.
pub fn reconcile<S: AsRef<str>>(current: &[S], state: IntentState) -> LabelPlan {
    let Ok(wanted) = for_state(state) else {
        return LabelPlan::default();
    };

    let present: Vec<GovernanceLabel> = current
        .iter()
        .filter_map(|label| label.as_ref().parse().ok())
        .collect();

    let mut plan = LabelPlan::default();
    if !present.contains(&wanted) {
        plan.add.push(wanted);
    }
    for label in GovernanceLabel::ALL {
        if label != wanted && present.contains(&label) {
            plan.remove.push(label);
        }
    }
    plan
}
