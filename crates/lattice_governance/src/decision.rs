//! Approval decisions.

use crate::labels::{self, LabelError};
use crate::protocol::ParsedComment;
use lattice_intent::IntentState;
use serde::{Deserialize, Serialize};

/// What a human decided at the approval gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "notes", rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
    /// No clear answer; carries whatever the human wrote.
    Clarify(String),
}

impl Decision {
    /// State the gate resolves to, `None` while the question stays open.
    pub fn target_state(&self) -> Option<IntentState> {
        match self {
            Decision::Approve => Some(IntentState::Approved),
            Decision::Reject => Some(IntentState::Rejected),
            Decision::Clarify(_) => None,
        }
    }
}

/// The two checklist items of an approval question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalOptions {
    pub approve: String,
    pub reject: String,
}

impl ApprovalOptions {
    pub const APPROVE_ITEM: u32 = 1;
    pub const REJECT_ITEM: u32 = 2;

    pub fn new(approve: impl Into<String>, reject: impl Into<String>) -> Self {
        Self {
            approve: approve.into(),
            reject: reject.into(),
        }
    }

    /// Checklist items in posting order.
    pub fn items(&self) -> [&str; 2] {
        [self.approve.as_str(), self.reject.as_str()]
    }

    /// Exactly one of the two options ticked decides; anything else asks
    /// for clarification.
    pub fn decide(&self, checked: &[u32], freeform: &str) -> Decision {
        let approve = checked.contains(&Self::APPROVE_ITEM);
        let reject = checked.contains(&Self::REJECT_ITEM);
        match (approve, reject) {
            (true, false) => Decision::Approve,
            (false, true) => Decision::Reject,
            _ => Decision::Clarify(freeform.to_string()),
        }
    }

    pub fn decide_comment(&self, comment: &ParsedComment) -> Decision {
        self.decide(&comment.checked, &comment.freeform)
    }
}

impl Default for ApprovalOptions {
    fn default() -> Self {
        Self::new("Approve: run this intent", "Reject: do not run this intent")
    }
}

/// Decision expressed by a human applying a governance label.
pub fn decision_from_label(label: &str) -> Result<Decision, LabelError> {
    match labels::to_state(label)? {
        IntentState::Approved => Ok(Decision::Approve),
        _ => Ok(Decision::Reject),
    }
}
