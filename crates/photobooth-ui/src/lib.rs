#![warn(missing_docs)]
//! # photobooth-ui
//!
//! ## Purpose
//! Defines the UI-facing state model for the photobooth.
//!
//! ## Responsibilities
//! - Project slot occupancy and the retake target into per-slot views.
//! - Decide the capture button state from busy, session and frame gates.
//! - Hold transient toasts and the frame status line.
//!
//! ## Data flow
//! Orchestrator events mutate [`UiState`], which a rendering shell draws.
//!
//! ## Ownership and lifetimes
//! `UiState` owns plain strings and flags only; thumbnails stay with the
//! session so reducers never borrow image data.
//!
//! ## Error model
//! This crate favors explicit state over recoverable errors. Out-of-range slot
//! updates are ignored.

use photobooth_core::SlotIndex;

/// Toast shown after a successful capture.
pub const CAPTURE_SUCCESS_MESSAGE: &str = "Photo captured successfully!";
/// Toast shown when capture is attempted without an overlay.
pub const SELECT_FRAME_MESSAGE: &str = "Please select a frame first";
/// Toast shown after a custom frame upload.
pub const UPLOAD_SUCCESS_MESSAGE: &str = "Custom frame uploaded successfully!";
/// Toast shown when a custom frame cannot be persisted.
pub const STORAGE_FULL_MESSAGE: &str = "Failed to save frame. Local storage might be full.";

/// Capture button projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureButton {
    /// Pressing captures a photo.
    Ready,
    /// A capture is in flight.
    Busy,
    /// Capturing is currently impossible.
    Disabled,
}

/// Derives the capture button state.
///
/// Busy wins over everything; a full session only accepts a capture while a
/// retake is pending, and nothing is captured without a frame.
pub fn capture_button_state(
    busy: bool,
    session_full: bool,
    retake_pending: bool,
    frame_selected: bool,
) -> CaptureButton {
    if busy {
        CaptureButton::Busy
    } else if !frame_selected || (session_full && !retake_pending) {
        CaptureButton::Disabled
    } else {
        CaptureButton::Ready
    }
}

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    /// Confirmation.
    Info,
    /// Failure the user should notice.
    Error,
}

/// Transient notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Display text.
    pub message: String,
    /// Severity.
    pub kind: ToastKind,
}

/// One slot in the strip editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotView {
    /// Slot position.
    pub slot: SlotIndex,
    /// Whether a photo is stored.
    pub occupied: bool,
    /// Whether the next capture retakes this slot.
    pub retake_target: bool,
}

impl SlotView {
    /// Caption under the thumbnail.
    pub fn label(&self) -> String {
        if self.retake_target {
            format!("{} (retake)", self.slot)
        } else if self.occupied {
            self.slot.to_string()
        } else {
            format!("{} (empty)", self.slot)
        }
    }
}

/// Aggregate UI runtime state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    /// App version string sourced from root `VERSION`.
    pub version: String,
    /// Capture button projection.
    pub capture_button: CaptureButton,
    /// Per-slot views in slot order.
    pub slots: Vec<SlotView>,
    /// Current toast, if any.
    pub toast: Option<Toast>,
    /// Frame picker status line.
    pub frame_status: String,
    /// Number of gallery entries.
    pub gallery_len: usize,
    /// Whether a collage preview can be shown.
    pub preview_available: bool,
}

impl UiState {
    /// Creates the initial state for `slot_count` empty slots.
    pub fn new(version: impl Into<String>, slot_count: usize) -> Self {
        Self {
            version: version.into(),
            capture_button: CaptureButton::Disabled,
            slots: (0..slot_count)
                .map(|index| SlotView {
                    slot: SlotIndex::new(index),
                    occupied: false,
                    retake_target: false,
                })
                .collect(),
            toast: None,
            frame_status: "No frame selected".to_string(),
            gallery_len: 0,
            preview_available: false,
        }
    }

    /// Records a slot occupancy change.
    pub fn on_slot_changed(&mut self, slot: SlotIndex, occupied: bool) {
        if let Some(view) = self.slots.get_mut(slot.index()) {
            view.occupied = occupied;
            if occupied {
                view.retake_target = false;
            }
        }
        self.preview_available = self.slots.iter().any(|view| view.occupied);
    }

    /// Marks `target` as the pending retake, clearing any other marker.
    pub fn set_retake_target(&mut self, target: Option<SlotIndex>) {
        for view in &mut self.slots {
            view.retake_target = Some(view.slot) == target;
        }
    }

    /// Replaces the current toast.
    pub fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.toast = Some(Toast {
            message: message.into(),
            kind,
        });
    }

    /// Clears the current toast.
    pub fn dismiss_toast(&mut self) {
        self.toast = None;
    }

    /// Number of occupied slots.
    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|view| view.occupied).count()
    }
}
