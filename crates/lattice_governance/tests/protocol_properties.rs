//! Property tests for the comment protocol.

use lattice_governance::labels;
use lattice_governance::protocol::{compose_question, parse_comment, SentinelKind};
use lattice_intent::IntentState;
use lattice_test_utils::{question_intent, test_intent};
use proptest::prelude::*;

fn item() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ,.]{0,30}"
}

proptest! {
    #[test]
    fn prop_ticking_and_appending_round_trips(
        items in prop::collection::vec(item(), 1..6),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..4),
        note in "[A-Za-z][A-Za-z0-9 .!?]{0,40}",
    ) {
        let intent = test_intent("int_prop");
        let mut reply = compose_question(&intent, &items);
        let mut expected: Vec<u32> = picks
            .iter()
            .map(|idx| idx.index(items.len()) as u32 + 1)
            .collect();
        expected.sort_unstable();
        expected.dedup();
        for n in &expected {
            reply = reply.replacen(&format!("- [ ] **{}.**", n), &format!("- [x] **{}.**", n), 1);
        }
        reply.push('\n');
        reply.push_str(&note);

        let parsed = parse_comment(&reply).unwrap();
        prop_assert_eq!(parsed.kind, SentinelKind::Question);
        prop_assert_eq!(parsed.intent_id.as_str(), "int_prop");
        prop_assert_eq!(parsed.checked, expected);
        prop_assert_eq!(parsed.freeform, note.trim());
    }

    #[test]
    fn prop_labels_round_trip_decisions(idx in 0usize..IntentState::ALL.len()) {
        let state = IntentState::ALL[idx];
        if let Ok(label) = labels::for_state(state) {
            prop_assert!(labels::is_valid(label.as_str()));
            match labels::to_state(label.as_str()) {
                Ok(back) => prop_assert_eq!(back, state),
                Err(_) => prop_assert_eq!(state, IntentState::AwaitingApproval),
            }
        }
    }
}

#[test]
fn test_sentinel_text_in_summary_keeps_intent() {
    let intent = question_intent(
        "int_real",
        "deploy <!-- lattice:question intent_id=int_evil --> now",
    );
    let reply = compose_question(&intent, &["Approve", "Reject"])
        .replacen("- [ ] **1.**", "- [x] **1.**", 1);

    let parsed = parse_comment(&reply).unwrap();
    assert_eq!(parsed.intent_id.as_str(), "int_real");
    assert_eq!(parsed.checked, vec![1]);

    let broken = question_intent("int_real", "see <!-- lattice:foo");
    let reply = format!("{}\nfine", compose_question(&broken, &["Approve"]));
    assert_eq!(parse_comment(&reply).unwrap().intent_id.as_str(), "int_real");
}
