//! Integration tests for the single-flight capture gate.

mod common;

use common::{at, fixture_booth};
use photobooth_app::{BoothError, ErrorKind};
use photobooth_capture::SyntheticCamera;

#[test]
fn busy_gate_tests_rejects_capture_while_another_is_in_flight() {
    let mut booth = fixture_booth();
    let flag = booth.busy_flag();
    let guard = flag.try_acquire().expect("flag should start idle");

    let error = booth.capture(at(1_000)).expect_err("capture should be rejected");
    assert!(matches!(error, BoothError::Busy));
    assert_eq!(error.kind(), ErrorKind::Busy);
    assert_eq!(booth.session().filled_count(), 0);
    assert!(booth.gallery().is_empty());
    assert_eq!(booth.camera().frames_delivered(), 0);

    drop(guard);
    booth.capture(at(2_000)).expect("capture should succeed once idle");
    assert_eq!(booth.session().filled_count(), 1);
}

#[test]
fn busy_gate_tests_clears_busy_after_success_and_failure() {
    let mut booth = fixture_booth();
    booth.capture(at(1_000)).expect("capture should succeed");
    assert!(!booth.busy_flag().is_busy());

    *booth.camera_mut() = SyntheticCamera::not_ready();
    booth.capture(at(2_000)).expect_err("camera should be unavailable");
    assert!(!booth.busy_flag().is_busy());
}

#[test]
fn busy_gate_tests_second_acquire_fails_until_guard_drops() {
    let booth = fixture_booth();
    let flag = booth.busy_flag();
    let guard = flag.try_acquire().expect("first acquire should succeed");
    assert!(flag.try_acquire().is_none());
    drop(guard);
    assert!(flag.try_acquire().is_some());
}
