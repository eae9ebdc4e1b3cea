//! Property tests for the intent lifecycle.

use lattice_intent::{
    is_terminal, transition, valid_transitions, Intent, IntentKind, IntentSource, IntentState,
    LifecycleError,
};
use proptest::prelude::*;

fn any_state() -> impl Strategy<Value = IntentState> {
    (0..IntentState::ALL.len()).prop_map(|idx| IntentState::ALL[idx])
}

fn intent_with_state(state: IntentState) -> Intent {
    let mut intent = Intent::new(
        IntentKind::Action,
        IntentSource::new("proptest", "0"),
        "property intent",
    );
    intent.state = state;
    intent
}

#[test]
fn test_every_table_edge_is_accepted() {
    for from in IntentState::ALL {
        for &to in valid_transitions(from) {
            let intent = intent_with_state(from);
            let next = transition(&intent, to, Some("test"), None).unwrap();
            assert_eq!(next.state, to);
            let head = next.transition_log.first().unwrap();
            assert_eq!((head.from, head.to), (from, to));
            assert_eq!(next.transition_log.len(), intent.transition_log.len() + 1);
        }
    }
}

proptest! {
    #[test]
    fn prop_no_outgoing_edges_iff_terminal(state in any_state()) {
        prop_assert_eq!(valid_transitions(state).is_empty(), is_terminal(state));
    }

    #[test]
    fn prop_transition_follows_table(from in any_state(), to in any_state()) {
        let intent = intent_with_state(from);
        let result = transition(&intent, to, None, None);
        if valid_transitions(from).contains(&to) {
            let next = result.unwrap();
            prop_assert_eq!(next.state, to);
            prop_assert_eq!(next.transition_log.len(), 1);
            prop_assert!(next.updated_at >= intent.updated_at);
        } else {
            prop_assert_eq!(result.unwrap_err(), LifecycleError::InvalidTransition { from, to });
            prop_assert_eq!(intent.state, from);
            prop_assert!(intent.transition_log.is_empty());
        }
    }

    #[test]
    fn prop_walks_never_escape_terminal(choices in proptest::collection::vec(0usize..8, 0..12)) {
        let mut intent = intent_with_state(IntentState::Proposed);
        for choice in choices {
            let targets = valid_transitions(intent.state);
            if targets.is_empty() {
                prop_assert!(intent.state.is_terminal());
                break;
            }
            let to = targets[choice % targets.len()];
            intent = transition(&intent, to, None, None).unwrap();
        }
        for pair in intent.transition_log.windows(2) {
            // newest first: each entry starts where the older one ended
            prop_assert_eq!(pair[0].from, pair[1].to);
        }
    }
}
