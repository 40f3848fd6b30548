//! Shared fixtures for booth integration tests.

use std::sync::{Arc, Mutex};

use photobooth_app::{BoothConfig, BoothDelegate, BoothError, CaptureReport, Photobooth};
use photobooth_capture::{CameraConstraints, CameraFacing, SyntheticCamera};
use photobooth_collage::Collage;
use photobooth_core::{Bitmap, SlotIndex};
use photobooth_frames::FrameLibrary;
use time::OffsetDateTime;

/// Booth type used across the suites.
#[allow(dead_code)]
pub type TestBooth = Photobooth<SyntheticCamera, FrameLibrary>;

/// Small capture size keeps composites fast.
#[allow(dead_code)]
pub fn fixture_config() -> BoothConfig {
    BoothConfig {
        capture_width: 160,
        ..BoothConfig::default()
    }
}

/// Ready front-facing camera at 320x240.
#[allow(dead_code)]
pub fn fixture_camera() -> SyntheticCamera {
    SyntheticCamera::new(
        CameraConstraints::new(320, 240, CameraFacing::Front).expect("constraints should be valid"),
    )
}

/// Booth with the default generated frame selected.
#[allow(dead_code)]
pub fn fixture_booth() -> TestBooth {
    fixture_booth_with(fixture_config())
}

/// Booth with the default frame and a custom config.
#[allow(dead_code)]
pub fn fixture_booth_with(config: BoothConfig) -> TestBooth {
    Photobooth::new(config, fixture_camera(), FrameLibrary::new()).expect("booth should build")
}

/// Timestamp `ms` milliseconds after the Unix epoch.
#[allow(dead_code)]
pub fn at(ms: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
        .expect("timestamp should be in range")
}

/// Delegate callbacks in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub enum Event {
    SlotChanged(SlotIndex, bool),
    Preview(String),
    CaptureOk(SlotIndex),
    CaptureErr(String),
}

/// Delegate that records every callback.
#[derive(Debug, Default)]
#[allow(dead_code)]
pub struct RecordingDelegate {
    events: Mutex<Vec<Event>>,
}

#[allow(dead_code)]
impl RecordingDelegate {
    /// Creates a shared recorder.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Drains recorded events.
    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock().expect("events lock should not be poisoned"))
    }

    fn push(&self, event: Event) {
        self.events
            .lock()
            .expect("events lock should not be poisoned")
            .push(event);
    }
}

impl BoothDelegate for RecordingDelegate {
    fn on_slot_changed(&self, slot: SlotIndex, image: Option<&Bitmap>) {
        self.push(Event::SlotChanged(slot, image.is_some()));
    }

    fn on_collage_preview(&self, collage: &Collage) {
        self.push(Event::Preview(collage.title.clone()));
    }

    fn on_capture_result(&self, result: &Result<CaptureReport, BoothError>) {
        self.push(match result {
            Ok(report) => Event::CaptureOk(report.slot),
            Err(error) => Event::CaptureErr(error.to_string()),
        });
    }
}
