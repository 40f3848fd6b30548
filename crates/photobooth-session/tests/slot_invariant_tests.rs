//! Tests slot invariants over seeded random operation sequences.

use photobooth_core::{Bitmap, SlotIndex};
use photobooth_session::{SlotError, SlotSession, TargetKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn photo(tag: u8) -> Bitmap {
    Bitmap::from_rgba(1, 1, vec![tag, 0, 0, 255]).expect("valid bitmap")
}

fn occupied_count(session: &SlotSession) -> usize {
    session.slots().filter(|(_, slot)| slot.is_occupied()).count()
}

#[test]
fn slot_invariant_tests_filled_count_tracks_occupancy() {
    for seed in 0..32_u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut session = SlotSession::default();

        for step in 0..64_u8 {
            match rng.random_range(0..4) {
                0 | 1 => {
                    let _ = session.capture_into(|_| Ok::<_, SlotError>(photo(step)));
                }
                2 => {
                    let slot = SlotIndex::new(rng.random_range(0..3));
                    let _ = session.begin_retake(slot);
                }
                _ => {
                    if rng.random_bool(0.1) {
                        session.reset();
                    }
                }
            }

            assert_eq!(session.filled_count(), occupied_count(&session));
        }
    }
}

#[test]
fn slot_invariant_tests_retake_touches_only_its_slot() {
    let mut session = SlotSession::default();
    for tag in 0..3 {
        session
            .capture_into(|_| Ok::<_, SlotError>(photo(tag)))
            .expect("fresh capture");
    }

    session.begin_retake(SlotIndex::new(1)).expect("slot 1 is occupied");
    let outcome = session
        .capture_into(|target| {
            assert_eq!(target.kind, TargetKind::Retake);
            Ok::<_, SlotError>(photo(99))
        })
        .expect("retake capture");

    assert_eq!(outcome.slot, SlotIndex::new(1));
    assert!(outcome.replaced);
    assert_eq!(session.filled_count(), 3);
    assert_eq!(session.slot(SlotIndex::new(0)).unwrap().image(), Some(&photo(0)));
    assert_eq!(session.slot(SlotIndex::new(1)).unwrap().image(), Some(&photo(99)));
    assert_eq!(session.slot(SlotIndex::new(2)).unwrap().image(), Some(&photo(2)));
}

#[test]
fn slot_invariant_tests_next_target_is_lowest_empty_or_pending_retake() {
    let mut session = SlotSession::default();
    session.commit(SlotIndex::new(0), photo(0)).expect("commit");
    session.commit(SlotIndex::new(2), photo(2)).expect("commit");

    let target = session.next_capture_target().expect("slot 1 is free");
    assert_eq!(target.slot, SlotIndex::new(1));
    assert_eq!(target.kind, TargetKind::Fresh);

    session.begin_retake(SlotIndex::new(2)).expect("slot 2 is occupied");
    let target = session.next_capture_target().expect("retake pending");
    assert_eq!(target.slot, SlotIndex::new(2));
    assert_eq!(target.kind, TargetKind::Retake);

    session.begin_retake(SlotIndex::new(0)).expect("slot 0 is occupied");
    assert_eq!(session.pending_retake(), Some(SlotIndex::new(0)));

    assert_eq!(session.cancel_retake(), Some(SlotIndex::new(0)));
    assert_eq!(session.next_capture_target().unwrap().slot, SlotIndex::new(1));
}

#[test]
fn slot_invariant_tests_full_session_still_accepts_retake() {
    let mut session = SlotSession::default();
    for tag in 0..3 {
        session
            .capture_into(|_| Ok::<_, SlotError>(photo(tag)))
            .expect("fresh capture");
    }
    assert_eq!(session.next_capture_target(), Err(SlotError::SessionFull));

    session.begin_retake(SlotIndex::new(2)).expect("slot 2 is occupied");
    let outcome = session
        .capture_into(|_| Ok::<_, SlotError>(photo(7)))
        .expect("retake capture on full session");
    assert_eq!(outcome.slot, SlotIndex::new(2));
    assert!(session.is_complete());
}
