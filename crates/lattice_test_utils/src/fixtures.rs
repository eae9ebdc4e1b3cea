//! Intent fixtures.

use lattice_ids::IntentId;
use lattice_intent::{Intent, IntentKind, IntentSource, IntentState, TransitionEntry};

/// An action intent in `proposed`, sourced from an issue.
pub fn test_intent(id: &str) -> Intent {
    Intent::with_id(
        parse_id(id),
        IntentKind::Action,
        IntentSource::new("issue", "org/repo#1"),
        "Test intent",
    )
}

pub fn question_intent(id: &str, summary: &str) -> Intent {
    Intent::with_id(
        parse_id(id),
        IntentKind::Question,
        IntentSource::new("issue", "org/repo#1"),
        summary,
    )
}

/// An action intent placed directly in `state`, with one synthetic log
/// entry so it looks like it got there legitimately.
pub fn intent_at(id: &str, state: IntentState) -> Intent {
    let mut intent = test_intent(id);
    if state != IntentState::Proposed {
        intent.transition_log.insert(
            0,
            TransitionEntry {
                from: IntentState::Proposed,
                to: state,
                timestamp: intent.inserted_at,
                actor: Some("fixture".to_string()),
                reason: None,
            },
        );
        intent.state = state;
    }
    intent
}

fn parse_id(id: &str) -> IntentId {
    IntentId::parse(id).unwrap_or_else(|err| panic!("fixture intent id {:?}: {}", id, err))
}
