//! Table invariant: validation accepts exactly the tables without
//! self-transitions, and every lookup of an accepted table differs from the
//! previous value.

use nrsim_core::{SimError, TransitionTable, ALPHABET_SIZE};
use proptest::prelude::*;

fn arb_rows() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(0u8..3, ALPHABET_SIZE), ALPHABET_SIZE)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn validation_matches_self_transition_rule(rows in arb_rows()) {
        let has_self = rows
            .iter()
            .enumerate()
            .any(|(r, row)| row.iter().any(|&v| usize::from(v) == r));

        match TransitionTable::try_from(rows) {
            Ok(t) => {
                prop_assert!(!has_self);
                for prev in 0..ALPHABET_SIZE {
                    for draw in 0..ALPHABET_SIZE {
                        let next = t.next(prev, draw).unwrap();
                        prop_assert_ne!(usize::from(next), prev);
                    }
                }
            }
            Err(e) => {
                prop_assert!(has_self);
                prop_assert!(matches!(e, SimError::InvalidTable(_)));
            }
        }
    }
}

#[test]
fn deserialization_goes_through_validation() {
    let ok: TransitionTable = serde_json::from_str("[[1,1,2],[0,0,2],[0,1,0]]").unwrap();
    assert_eq!(ok, TransitionTable::DEFAULT);

    let bad = serde_json::from_str::<TransitionTable>("[[0,1,2],[0,0,2],[0,1,0]]");
    let msg = bad.unwrap_err().to_string();
    assert!(msg.contains("self-transition 0->0"), "{msg}");

    let json = serde_json::to_string(&TransitionTable::DEFAULT).unwrap();
    assert_eq!(json, "[[1,1,2],[0,0,2],[0,1,0]]");
}
