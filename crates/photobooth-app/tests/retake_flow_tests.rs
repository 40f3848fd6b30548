//! Integration tests for retaking a photo through the booth.

mod common;

use common::{at, fixture_booth};
use photobooth_capture::SyntheticCamera;
use photobooth_core::SlotIndex;

#[test]
fn retake_flow_tests_replaces_only_the_target_slot() {
    let mut booth = fixture_booth();
    for ms in 1..=3 {
        booth.capture(at(ms * 1_000)).expect("capture should succeed");
    }
    let before: Vec<_> = booth
        .session()
        .slots()
        .map(|(_, slot)| slot.image().cloned())
        .collect();

    booth.begin_retake(SlotIndex::new(1)).expect("slot 2 is occupied");
    let report = booth.capture(at(4_000)).expect("retake should succeed");

    assert_eq!(report.slot, SlotIndex::new(1));
    assert!(report.replaced);
    assert_eq!(booth.session().filled_count(), 3);
    assert!(booth.session().pending_retake().is_none());

    let after: Vec<_> = booth
        .session()
        .slots()
        .map(|(_, slot)| slot.image().cloned())
        .collect();
    assert_eq!(after[0], before[0]);
    assert_ne!(after[1], before[1]);
    assert_eq!(after[2], before[2]);
}

#[test]
fn retake_flow_tests_gallery_keeps_replaced_photos() {
    let mut booth = fixture_booth();
    for ms in 1..=3 {
        booth.capture(at(ms * 1_000)).expect("capture should succeed");
    }
    let original = booth
        .session()
        .slot(SlotIndex::new(0))
        .and_then(|slot| slot.image())
        .cloned()
        .expect("slot 1 should be filled");

    booth.begin_retake(SlotIndex::new(0)).expect("slot 1 is occupied");
    let report = booth.capture(at(4_000)).expect("retake should succeed");

    let entries = booth.gallery().list();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].sequence, report.gallery_sequence);
    assert_eq!(entries[0].id, 4_000);
    assert!(entries.iter().any(|entry| entry.image == original));
}

#[test]
fn retake_flow_tests_failed_capture_keeps_the_pending_retake() {
    let mut booth = fixture_booth();
    booth.capture(at(1_000)).expect("capture should succeed");
    booth.begin_retake(SlotIndex::new(0)).expect("slot 1 is occupied");

    let camera = std::mem::replace(booth.camera_mut(), SyntheticCamera::not_ready());
    booth.capture(at(2_000)).expect_err("camera is not ready");
    assert_eq!(booth.session().pending_retake(), Some(SlotIndex::new(0)));

    *booth.camera_mut() = camera;
    let report = booth.capture(at(3_000)).expect("retake should succeed");
    assert_eq!(report.slot, SlotIndex::new(0));
    assert_eq!(booth.session().filled_count(), 1);
}

#[test]
fn retake_flow_tests_cancel_returns_to_fresh_slots() {
    let mut booth = fixture_booth();
    booth.capture(at(1_000)).expect("capture should succeed");
    booth.begin_retake(SlotIndex::new(0)).expect("slot 1 is occupied");
    assert_eq!(booth.cancel_retake(), Some(SlotIndex::new(0)));

    let report = booth.capture(at(2_000)).expect("capture should succeed");
    assert_eq!(report.slot, SlotIndex::new(1));
    assert!(!report.replaced);
}

#[test]
fn retake_flow_tests_reset_keeps_gallery_history() {
    let mut booth = fixture_booth();
    booth.capture(at(1_000)).expect("capture should succeed");
    booth.capture(at(2_000)).expect("capture should succeed");
    booth.reset_session();

    assert_eq!(booth.session().filled_count(), 0);
    assert_eq!(booth.gallery().len(), 2);
    let report = booth.capture(at(3_000)).expect("capture should succeed");
    assert_eq!(report.slot, SlotIndex::new(0));
}
