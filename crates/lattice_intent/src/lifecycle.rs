//! Lifecycle transitions over immutable intent values.
//!
//! Every function here is pure: the input intent is borrowed and a new
//! value is returned. Callers that share an intent across tasks serialize
//! their own writes.

use crate::{Classification, Intent, IntentState, TransitionEntry};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

/// Errors for lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: IntentState, to: IntentState },
}

/// Apply a transition and return the updated intent.
pub fn transition(
    intent: &Intent,
    to: IntentState,
    actor: Option<&str>,
    reason: Option<&str>,
) -> Result<Intent, LifecycleError> {
    transition_at(intent, to, actor, reason, Utc::now())
}

/// String-typed entry point: the target is parsed before anything else.
pub fn transition_named(
    intent: &Intent,
    to: &str,
    actor: Option<&str>,
    reason: Option<&str>,
) -> Result<Intent, LifecycleError> {
    let to: IntentState = to.parse()?;
    transition(intent, to, actor, reason)
}

pub(crate) fn transition_at(
    intent: &Intent,
    to: IntentState,
    actor: Option<&str>,
    reason: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Intent, LifecycleError> {
    let from = intent.state;
    if !from.can_transition_to(to) {
        return Err(LifecycleError::InvalidTransition { from, to });
    }

    let mut next = intent.clone();
    next.state = to;
    next.updated_at = now;
    match to {
        IntentState::Classified => next.classified_at = Some(now),
        IntentState::Approved => next.approved_at = Some(now),
        IntentState::Running => next.started_at = Some(now),
        IntentState::Completed | IntentState::Failed => next.completed_at = Some(now),
        IntentState::Proposed
        | IntentState::AwaitingApproval
        | IntentState::Rejected
        | IntentState::Canceled => {}
    }
    next.transition_log.insert(
        0,
        TransitionEntry {
            from,
            to,
            timestamp: now,
            actor: actor.map(str::to_string),
            reason: reason.map(str::to_string),
        },
    );

    debug!(intent_id = %intent.id, %from, %to, "intent transitioned");
    Ok(next)
}

/// Allowed targets from `state`; empty for terminal states.
pub fn valid_transitions(state: IntentState) -> &'static [IntentState] {
    state.valid_transitions()
}

/// Like [`valid_transitions`], for a state given by name.
pub fn valid_transitions_named(state: &str) -> Result<&'static [IntentState], LifecycleError> {
    let state: IntentState = state.parse()?;
    Ok(state.valid_transitions())
}

pub fn is_terminal(state: IntentState) -> bool {
    state.is_terminal()
}

/// Record a classification and move `proposed -> classified`.
pub fn classify(
    intent: &Intent,
    classification: Classification,
    actor: Option<&str>,
) -> Result<Intent, LifecycleError> {
    let reason = format!("classified as {:?}", classification).to_lowercase();
    let mut next = transition(intent, IntentState::Classified, actor, Some(&reason))?;
    next.classification = Some(classification);
    Ok(next)
}

/// Where a classified intent goes next. Unclassified intents are treated
/// as needing approval.
pub fn route_after_classification(intent: &Intent) -> IntentState {
    match intent.classification {
        Some(Classification::Safe) => IntentState::Approved,
        Some(Classification::Elevated) | Some(Classification::Dangerous) | None => {
            IntentState::AwaitingApproval
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IntentKind, IntentSource};

    fn intent_in(state: IntentState) -> Intent {
        let mut intent = Intent::new(
            IntentKind::Action,
            IntentSource::new("test", "1"),
            "test intent",
        );
        intent.state = state;
        intent
    }

    fn timestamps(intent: &Intent) -> [Option<DateTime<Utc>>; 4] {
        [
            intent.classified_at,
            intent.approved_at,
            intent.started_at,
            intent.completed_at,
        ]
    }

    #[test]
    fn test_transition_prepends_log_entry() {
        let intent = intent_in(IntentState::Proposed);
        let classified =
            transition(&intent, IntentState::Classified, Some("classifier"), None).unwrap();
        let approved =
            transition(&classified, IntentState::Approved, Some("alice"), Some("lgtm")).unwrap();

        assert_eq!(approved.state, IntentState::Approved);
        assert_eq!(approved.transition_log.len(), 2);
        let head = &approved.transition_log[0];
        assert_eq!(head.from, IntentState::Classified);
        assert_eq!(head.to, IntentState::Approved);
        assert_eq!(head.actor.as_deref(), Some("alice"));
        assert_eq!(head.reason.as_deref(), Some("lgtm"));
        assert_eq!(approved.transition_log[1].to, IntentState::Classified);
    }

    #[test]
    fn test_transition_does_not_mutate_input() {
        let intent = intent_in(IntentState::Proposed);
        let before = intent.clone();
        let _ = transition(&intent, IntentState::Classified, None, None).unwrap();
        assert_eq!(intent, before);
    }

    #[test]
    fn test_timestamps_per_target() {
        let now = Utc::now();
        let cases = [
            (IntentState::Proposed, IntentState::Classified, Some(0)),
            (IntentState::Classified, IntentState::AwaitingApproval, None),
            (IntentState::Classified, IntentState::Approved, Some(1)),
            (IntentState::Approved, IntentState::Running, Some(2)),
            (IntentState::Running, IntentState::Completed, Some(3)),
            (IntentState::Running, IntentState::Failed, Some(3)),
            (IntentState::AwaitingApproval, IntentState::Rejected, None),
            (IntentState::Approved, IntentState::Canceled, None),
        ];

        for (from, to, slot) in cases {
            let intent = intent_in(from);
            let next = transition_at(&intent, to, None, None, now).unwrap();
            let before = timestamps(&intent);
            let after = timestamps(&next);
            for idx in 0..4 {
                if Some(idx) == slot {
                    assert_eq!(after[idx], Some(now), "{} -> {}", from, to);
                } else {
                    assert_eq!(after[idx], before[idx], "{} -> {}", from, to);
                }
            }
            assert_eq!(next.updated_at, now);
        }
    }

    #[test]
    fn test_invalid_transition_leaves_intent_unchanged() {
        let intent = intent_in(IntentState::Proposed);
        let err = transition(&intent, IntentState::Running, None, None).unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InvalidTransition {
                from: IntentState::Proposed,
                to: IntentState::Running,
            }
        );
        assert!(intent.transition_log.is_empty());
    }

    #[test]
    fn test_terminal_states_never_move() {
        for terminal in IntentState::TERMINAL {
            let intent = intent_in(terminal);
            for target in IntentState::ALL {
                assert!(matches!(
                    transition(&intent, target, None, None),
                    Err(LifecycleError::InvalidTransition { .. })
                ));
            }
        }
    }

    #[test]
    fn test_transition_named_rejects_unknown_state() {
        let intent = intent_in(IntentState::Proposed);
        let err = transition_named(&intent, "exploded", None, None).unwrap_err();
        assert_eq!(err, LifecycleError::InvalidState("exploded".to_string()));

        let ok = transition_named(&intent, "classified", None, None).unwrap();
        assert_eq!(ok.state, IntentState::Classified);
    }

    #[test]
    fn test_valid_transitions_named() {
        assert_eq!(
            valid_transitions_named("running").unwrap(),
            &[IntentState::Completed, IntentState::Failed]
        );
        assert!(valid_transitions_named("canceled").unwrap().is_empty());
        assert!(matches!(
            valid_transitions_named("bogus"),
            Err(LifecycleError::InvalidState(_))
        ));
    }

    #[test]
    fn test_classify_records_tier() {
        let intent = intent_in(IntentState::Proposed);
        let classified = classify(&intent, Classification::Dangerous, Some("policy")).unwrap();
        assert_eq!(classified.state, IntentState::Classified);
        assert_eq!(classified.classification, Some(Classification::Dangerous));
        assert_eq!(
            classified.transition_log[0].reason.as_deref(),
            Some("classified as dangerous")
        );
        assert_eq!(
            route_after_classification(&classified),
            IntentState::AwaitingApproval
        );
    }

    #[test]
    fn test_route_safe_skips_gate() {
        let intent = intent_in(IntentState::Proposed);
        let classified = classify(&intent, Classification::Safe, None).unwrap();
        assert_eq!(route_after_classification(&classified), IntentState::Approved);
    }
}
