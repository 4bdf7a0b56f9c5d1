//! Conformance tests for the participation codec and event status tally.

use ezvote_participation::{
    ANSWER_VALUE_INVALID, ANSWER_VALUE_SKIPPED, Answer, Error, Event, EventId, EventStatus,
    LedgerSnapshot, Participation, Participations, Question, StatusAggregator,
};
use proptest::prelude::*;
use sha2::{Digest, Sha256};

// =============================================================================
// Test Utilities
// =============================================================================

/// An event id whose first bytes carry `n`.
fn event_id(n: u64) -> EventId {
    let mut id = [0u8; 32];
    id[..8].copy_from_slice(&n.to_le_bytes());
    EventId(id)
}

/// `n` participations for distinct events.
fn distinct_participations(n: usize) -> Participations {
    (0..n as u64)
        .map(|i| Participation::new(event_id(i), vec![(i % 4) as u8]))
        .collect::<Vec<_>>()
        .into()
}

/// An event whose questions declare the given answer values.
fn ballot_event(id: EventId, questions: &[&[u8]]) -> Event {
    Event {
        id,
        name: "ballot".into(),
        milestone_index_commence: 100,
        milestone_index_start: 200,
        milestone_index_end: 300,
        questions: questions
            .iter()
            .map(|values| Question {
                text: String::new(),
                answers: values
                    .iter()
                    .map(|&value| Answer {
                        value,
                        text: format!("answer {}", value),
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn status_of(ledger: &LedgerSnapshot, id: &EventId) -> EventStatus {
    StatusAggregator::from_ledger(ledger).event_status(id).unwrap()
}

// =============================================================================
// Binary codec
// =============================================================================

/// A validated collection survives encode then decode field-for-field, in order.
#[test]
fn binary_roundtrip() {
    let original = Participations::new(vec![
        Participation::new(event_id(7), vec![1, 2, 3]),
        Participation::new(event_id(2), vec![]),
        Participation::new(event_id(5), vec![255, 0]),
    ]);

    let bytes = original.encode(true).unwrap();
    let (decoded, consumed) = Participations::decode(&bytes, true).unwrap();

    assert_eq!(decoded, original);
    assert_eq!(consumed, bytes.len());
}

/// Wire layout: count byte, then each record in order.
#[test]
fn binary_layout() {
    let collection = Participations::new(vec![
        Participation::new(EventId([0xaa; 32]), vec![1]),
        Participation::new(EventId([0xbb; 32]), vec![2, 3]),
    ]);
    let bytes = collection.encode(true).unwrap();

    let mut expected = vec![2u8];
    expected.extend_from_slice(&[0xaa; 32]);
    expected.extend_from_slice(&[1, 1]);
    expected.extend_from_slice(&[0xbb; 32]);
    expected.extend_from_slice(&[2, 2, 3]);
    assert_eq!(bytes, expected);
}

/// Duplicates pass when validation is off and fail when it is on.
#[test]
fn duplicate_event_validation_toggle() {
    let dup = Participations::new(vec![
        Participation::new(event_id(1), vec![1]),
        Participation::new(event_id(1), vec![2]),
    ]);

    let bytes = dup.encode(false).unwrap();
    assert_eq!(Participations::decode(&bytes, false).unwrap().0, dup);

    assert!(matches!(
        dup.encode(true),
        Err(Error::MultipleEventParticipation(id)) if id == event_id(1)
    ));
    assert!(matches!(
        Participations::decode(&bytes, true),
        Err(Error::MultipleEventParticipation(id)) if id == event_id(1)
    ));
}

/// Zero records fail, one and 255 succeed, 256 is never emitted.
#[test]
fn count_bounds() {
    assert!(matches!(
        distinct_participations(0).encode(true),
        Err(Error::ParticipationCount { count: 0, min: 1, max: 255 })
    ));
    assert!(matches!(
        Participations::decode(&[0u8], true),
        Err(Error::ParticipationCount { count: 0, .. })
    ));

    for n in [1, 255] {
        let collection = distinct_participations(n);
        let bytes = collection.encode(true).unwrap();
        assert_eq!(Participations::decode(&bytes, true).unwrap().0, collection);
    }

    let oversized = distinct_participations(256);
    assert!(oversized.encode(true).is_err());
    assert!(oversized.encode(false).is_err());
}

/// A collection that is both oversized and duplicate-containing reports the bounds error.
#[test]
fn bounds_error_before_duplicate_error() {
    let mut items: Vec<Participation> = distinct_participations(256).participations;
    items[1] = items[0].clone();
    let both = Participations::new(items);

    assert!(matches!(
        both.encode(true),
        Err(Error::ParticipationCount { count: 256, .. })
    ));
}

// =============================================================================
// JSON codec
// =============================================================================

#[test]
fn json_roundtrip() {
    let original = distinct_participations(3);
    let json = original.to_json().unwrap();
    assert!(json["participations"].is_array());
    assert_eq!(Participations::from_json(json).unwrap(), original);

    let text = serde_json::to_string(&original).unwrap();
    assert_eq!(Participations::from_json_str(&text).unwrap(), original);
}

#[test]
fn json_failure_names_position() {
    let text = r#"{"participations": [
        {"eventId": "0x0000000000000000000000000000000000000000000000000000000000000000", "answers": "0x01"},
        {"eventId": "0x0000000000000000000000000000000000000000000000000000000000000001", "answers": "0x01"},
        {"eventId": "0x00", "answers": "0x01"}
    ]}"#;

    let err = Participations::from_json_str(text).unwrap_err();
    assert!(matches!(err, Error::JsonElement { pos: 2, .. }));
    assert!(err.to_string().starts_with("pos 2:"));
}

// =============================================================================
// Event status
// =============================================================================

/// One question with answers [1, 2]; only answer 1 has current balance.
#[test]
fn worked_example_checksum() {
    let id = event_id(42);
    let (acc1, acc2) = (25u64, 3u64);
    let mut ledger = LedgerSnapshot::new(250).with_event(ballot_event(id, &[&[1, 2]]));
    ledger.set_balance(id, 0, 1, 10, acc1);
    ledger.set_balance(id, 0, 2, 0, acc2);

    let status = status_of(&ledger, &id);

    let answers: Vec<(u8, u64, u64)> = status.questions[0]
        .answers
        .iter()
        .map(|a| (a.value, a.current, a.accumulated))
        .collect();
    assert_eq!(
        answers,
        vec![(1, 10, acc1), (2, 0, acc2), (0, 0, 0), (255, 0, 0)]
    );

    let mut preimage = vec![0x00];
    for (value, current, accumulated) in [(1u8, 10u64, acc1), (2, 0, acc2), (0, 0, 0), (255, 0, 0)] {
        preimage.push(value);
        preimage.extend_from_slice(&current.to_le_bytes());
        preimage.extend_from_slice(&accumulated.to_le_bytes());
    }
    assert_eq!(status.checksum, hex::encode(Sha256::digest(&preimage)));
    assert_eq!(status.milestone_index, 250);
    assert_eq!(status.status, "holding");
}

/// Questions in declaration order; answers in declared order, then skipped, then invalid.
#[test]
fn status_ordering() {
    let id = event_id(1);
    let ledger = LedgerSnapshot::new(0).with_event(ballot_event(id, &[&[3, 1, 2], &[9], &[]]));

    let status = status_of(&ledger, &id);
    let values: Vec<Vec<u8>> = status
        .questions
        .iter()
        .map(|q| q.answers.iter().map(|a| a.value).collect())
        .collect();

    assert_eq!(
        values,
        vec![
            vec![3, 1, 2, ANSWER_VALUE_SKIPPED, ANSWER_VALUE_INVALID],
            vec![9, ANSWER_VALUE_SKIPPED, ANSWER_VALUE_INVALID],
            vec![ANSWER_VALUE_SKIPPED, ANSWER_VALUE_INVALID],
        ]
    );
    assert_eq!(status.status, "upcoming");
}

/// Reordering declared answers changes the checksum even with identical balances.
#[test]
fn answer_order_changes_checksum() {
    let id = event_id(1);
    let a = LedgerSnapshot::new(0).with_event(ballot_event(id, &[&[1, 2]]));
    let b = LedgerSnapshot::new(0).with_event(ballot_event(id, &[&[2, 1]]));
    assert_ne!(status_of(&a, &id).checksum, status_of(&b, &id).checksum);
}

#[test]
fn status_json_shape() {
    let id = event_id(1);
    let mut ledger = LedgerSnapshot::new(301).with_event(ballot_event(id, &[&[1]]));
    ledger.set_balance(id, 0, 1, 4, 8);

    let json = serde_json::to_value(status_of(&ledger, &id)).unwrap();
    assert_eq!(json["milestoneIndex"], 301);
    assert_eq!(json["status"], "ended");
    assert_eq!(
        json["questions"][0]["answers"][0],
        serde_json::json!({"value": 1, "current": 4, "accumulated": 8})
    );
    assert_eq!(json["checksum"].as_str().unwrap().len(), 64);
}

// =============================================================================
// Properties
// =============================================================================

fn arb_participations() -> impl Strategy<Value = Participations> {
    prop::collection::btree_map(
        any::<[u8; 32]>(),
        prop::collection::vec(any::<u8>(), 0..=10),
        1..=32,
    )
    .prop_flat_map(|by_event| {
        let items: Vec<Participation> = by_event
            .into_iter()
            .map(|(id, answers)| Participation::new(EventId(id), answers))
            .collect();
        Just(items).prop_shuffle()
    })
    .prop_map(Participations::new)
}

fn arb_balances() -> impl Strategy<Value = Vec<(u64, u64)>> {
    prop::collection::vec((any::<u64>(), any::<u64>()), 5)
}

/// Ledger with one event of two questions ([1, 2] and [7]), five answers in total.
fn ledger_with(balances: &[(u64, u64)]) -> (LedgerSnapshot, EventId) {
    let id = event_id(99);
    let mut ledger = LedgerSnapshot::new(150).with_event(ballot_event(id, &[&[1, 2], &[7]]));
    let slots = [(0u8, 1u8), (0, 2), (0, ANSWER_VALUE_SKIPPED), (1, 7), (1, ANSWER_VALUE_INVALID)];
    for (&(question, answer), &(current, accumulated)) in slots.iter().zip(balances) {
        ledger.set_balance(id, question, answer, current, accumulated);
    }
    (ledger, id)
}

proptest! {
    #[test]
    fn prop_binary_roundtrip(original in arb_participations()) {
        let bytes = original.encode(true).unwrap();
        let (decoded, consumed) = Participations::decode(&bytes, true).unwrap();
        prop_assert_eq!(consumed, bytes.len());
        prop_assert_eq!(decoded, original);
    }

    #[test]
    fn prop_json_roundtrip(original in arb_participations()) {
        let json = original.to_json().unwrap();
        prop_assert_eq!(Participations::from_json(json).unwrap(), original);
    }

    #[test]
    fn prop_checksum_deterministic(balances in arb_balances()) {
        let (first, id) = ledger_with(&balances);
        let (second, _) = ledger_with(&balances);
        prop_assert_eq!(status_of(&first, &id), status_of(&second, &id));
    }

    #[test]
    fn prop_checksum_sensitive(
        balances in arb_balances(),
        slot in 0usize..5,
        accumulated in any::<bool>(),
        delta in 1u64..,
    ) {
        let (before, id) = ledger_with(&balances);

        let mut changed = balances.clone();
        if accumulated {
            changed[slot].1 = changed[slot].1.wrapping_add(delta);
        } else {
            changed[slot].0 = changed[slot].0.wrapping_add(delta);
        }
        let (after, _) = ledger_with(&changed);

        prop_assert_ne!(status_of(&before, &id).checksum, status_of(&after, &id).checksum);
    }
}
