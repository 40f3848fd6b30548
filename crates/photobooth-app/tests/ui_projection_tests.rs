//! Integration tests for projecting booth state into the UI model.

mod common;

use common::{at, fixture_booth, fixture_camera, fixture_config};
use photobooth_app::{Photobooth, app_version};
use photobooth_capture::VideoFrameProvider;
use photobooth_core::SlotIndex;
use photobooth_frames::{CustomFrameStore, CustomFrameUpload, FrameLibrary};
use photobooth_ui::{
    CAPTURE_SUCCESS_MESSAGE, CaptureButton, SELECT_FRAME_MESSAGE, STORAGE_FULL_MESSAGE, Toast,
    ToastKind, UPLOAD_SUCCESS_MESSAGE,
};

#[test]
fn ui_projection_tests_button_follows_session_and_retake() {
    let mut booth = fixture_booth();
    assert_eq!(booth.capture_button_state(), CaptureButton::Ready);

    for ms in 1..=3 {
        booth.capture(at(ms * 1_000)).expect("capture should succeed");
    }
    assert_eq!(booth.capture_button_state(), CaptureButton::Disabled);

    booth.begin_retake(SlotIndex::new(2)).expect("slot 3 is occupied");
    assert_eq!(booth.capture_button_state(), CaptureButton::Ready);

    let flag = booth.busy_flag();
    let _guard = flag.try_acquire().expect("flag should be idle");
    assert_eq!(booth.capture_button_state(), CaptureButton::Busy);
}

#[test]
fn ui_projection_tests_button_is_disabled_without_frame() {
    let booth = Photobooth::new(fixture_config(), fixture_camera(), FrameLibrary::empty())
        .expect("booth should build");
    assert_eq!(booth.capture_button_state(), CaptureButton::Disabled);
}

#[test]
fn ui_projection_tests_state_mirrors_slots_gallery_and_frame() {
    let mut booth = fixture_booth();
    booth.capture(at(1_000)).expect("capture should succeed");
    booth.capture(at(2_000)).expect("capture should succeed");
    booth.begin_retake(SlotIndex::new(0)).expect("slot 1 is occupied");

    let state = booth.ui_state();
    assert_eq!(state.version, app_version());
    assert_eq!(state.filled_count(), 2);
    assert!(state.slots[0].retake_target);
    assert!(!state.slots[2].occupied);
    assert_eq!(state.gallery_len, 2);
    assert!(state.preview_available);
    assert_eq!(state.frame_status, "Default frame loaded");
    assert_eq!(state.capture_button, CaptureButton::Ready);
}

#[test]
fn ui_projection_tests_capture_outcomes_replace_the_toast() {
    let mut booth = fixture_booth();
    assert_eq!(booth.ui_state().toast, None);

    booth.capture(at(1_000)).expect("capture should succeed");
    assert_eq!(
        booth.ui_state().toast,
        Some(Toast {
            message: CAPTURE_SUCCESS_MESSAGE.to_string(),
            kind: ToastKind::Info,
        })
    );

    booth.capture(at(2_000)).expect("capture should succeed");
    booth.capture(at(3_000)).expect("capture should succeed");
    let error = booth.capture(at(4_000)).expect_err("session is full");
    let toast = booth.ui_state().toast.expect("failure should leave a toast");
    assert_eq!(toast.kind, ToastKind::Error);
    assert_eq!(toast.message, error.toast_message());

    booth.dismiss_toast();
    assert_eq!(booth.ui_state().toast, None);
}

#[test]
fn ui_projection_tests_missing_frame_shows_select_frame_toast() {
    let mut booth = Photobooth::new(fixture_config(), fixture_camera(), FrameLibrary::empty())
        .expect("booth should build");
    booth.capture(at(1_000)).expect_err("capture needs a frame");

    let toast = booth.toast().expect("failure should leave a toast");
    assert_eq!(toast.message, SELECT_FRAME_MESSAGE);
    assert_eq!(toast.kind, ToastKind::Error);
}

#[test]
fn ui_projection_tests_upload_outcomes_set_the_toast() {
    let mut booth = fixture_booth();
    let store = CustomFrameStore::new(std::env::temp_dir().join(format!(
        "photobooth-ui-toast-{}.json",
        std::process::id()
    )));
    store.clear().expect("clear should succeed");
    let png = fixture_camera().current_frame().to_png().expect("png encode should succeed");
    let upload = |mime_type: &str| CustomFrameUpload {
        name: "border.png".to_string(),
        mime_type: mime_type.to_string(),
        bytes: png.clone(),
    };

    booth
        .upload_frame(&store, upload("image/png"), at(1_000))
        .expect("upload should succeed");
    let toast = booth.toast().expect("upload should leave a toast");
    assert_eq!((toast.message.as_str(), toast.kind), (UPLOAD_SUCCESS_MESSAGE, ToastKind::Info));

    booth
        .upload_frame(&store, upload("text/plain"), at(2_000))
        .expect_err("text is not an image");
    let toast = booth.toast().expect("rejection should leave a toast");
    assert_eq!(toast.message, "Please upload an image file (PNG, JPG, JPEG)");
    assert_eq!(toast.kind, ToastKind::Error);

    let tiny = store.clone().with_quota(16);
    let outcome = booth
        .upload_frame(&tiny, upload("image/png"), at(3_000))
        .expect("upload should succeed without persistence");
    assert!(outcome.storage_warning.is_some());
    let toast = booth.toast().expect("storage warning should leave a toast");
    assert_eq!((toast.message.as_str(), toast.kind), (STORAGE_FULL_MESSAGE, ToastKind::Error));

    store.clear().expect("clear should succeed");
}
