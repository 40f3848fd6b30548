#![warn(missing_docs)]
//! # photobooth-app
//!
//! ## Purpose
//! Orchestrates camera, frames, composite, slots, gallery and collage for one
//! photobooth.
//!
//! ## Responsibilities
//! - Serialize captures through a busy gate; a second capture is rejected,
//!   never queued.
//! - Check the frame precondition, composite the camera frame and commit it
//!   to the session slot chosen by the retake policy.
//! - Mirror every successful capture into the gallery history.
//! - Render previews and exports and name exported files.
//! - Notify a [`BoothDelegate`] and project state for the UI layer, including
//!   the toast left by the latest capture or upload.
//!
//! ## Data flow
//! Capture request -> [`BusyFlag`] -> `FrameSource` + `VideoFrameProvider` ->
//! composite -> `SlotSession::capture_into` -> `GalleryLog::append` ->
//! delegate (slot change, optional preview, capture result).
//!
//! ## Ownership and lifetimes
//! [`Photobooth`] exclusively owns its session and gallery; callers receive
//! cloned [`Bitmap`] handles and snapshots. The busy flag is shared with the
//! UI shell through cheap clones.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`BoothError`], classified by
//! [`BoothError::kind`] and rendered for users by
//! [`BoothError::toast_message`].
//!
//! ## Example
//! ```
//! use photobooth_app::{BoothConfig, Photobooth};
//! use photobooth_capture::SyntheticCamera;
//! use photobooth_frames::FrameLibrary;
//! use time::OffsetDateTime;
//!
//! let mut booth = Photobooth::new(BoothConfig::default(), SyntheticCamera::default(), FrameLibrary::new())
//!     .expect("default config is valid");
//! let report = booth.capture(OffsetDateTime::UNIX_EPOCH).expect("capture should succeed");
//! assert_eq!(report.slot.number(), 1);
//! assert_eq!(booth.gallery().len(), 1);
//! ```

mod config;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};
use photobooth_capture::{FrameSource, VideoFrameProvider};
use photobooth_collage::{Collage, CollageError, assemble};
use photobooth_composite::{CompositeError, composite};
use photobooth_core::{Bitmap, CoreError, SlotIndex};
use photobooth_frames::{
    CustomFrameStore, CustomFrameUpload, FrameChoice, FrameError, FrameLibrary, UploadOutcome,
};
use photobooth_gallery::{GalleryError, GalleryLog};
use photobooth_session::{SlotError, SlotSession, TargetKind};
use photobooth_ui::{
    CAPTURE_SUCCESS_MESSAGE, CaptureButton, SELECT_FRAME_MESSAGE, STORAGE_FULL_MESSAGE, Toast,
    ToastKind, UPLOAD_SUCCESS_MESSAGE, UiState, capture_button_state,
};
use thiserror::Error;
use time::{Date, OffsetDateTime};

pub use config::{
    BoothConfig, ENV_AUTO_PREVIEW, ENV_CAPTURE_WIDTH, ENV_EXPORT_WIDTH, ENV_PREVIEW_WIDTH,
    MAX_GALLERY_CAPACITY,
};

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("PHOTOBOOTH_VERSION");

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Shared "capture in flight" marker.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    /// Creates an idle flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the flag busy, or returns `None` when it already is.
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(Arc::clone(&self.0)))
    }

    /// Returns `true` while a guard is alive.
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Clears its [`BusyFlag`] when dropped.
#[derive(Debug)]
pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Receives booth events; implementations must not block.
pub trait BoothDelegate: Send + Sync {
    /// Called when a slot gains, replaces or loses its photo.
    fn on_slot_changed(&self, slot: SlotIndex, image: Option<&Bitmap>);

    /// Called with a freshly rendered preview.
    fn on_collage_preview(&self, collage: &Collage);

    /// Called once per capture attempt, after all other notifications.
    fn on_capture_result(&self, result: &Result<CaptureReport, BoothError>);
}

/// Summary of a successful capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureReport {
    /// Slot that received the photo.
    pub slot: SlotIndex,
    /// Whether an earlier photo was replaced.
    pub replaced: bool,
    /// Gallery sequence number of the new entry.
    pub gallery_sequence: u64,
    /// Composited photo.
    pub image: Bitmap,
}

/// Rendered strip ready to be saved.
#[derive(Debug, Clone)]
pub struct ExportedCollage {
    /// Full-width strip.
    pub bitmap: Bitmap,
    /// Download name encoding the number of photos.
    pub suggested_filename: String,
    /// Rendering details.
    pub collage: Collage,
}

/// File name for an exported strip holding `filled` of `slot_count` photos.
pub fn export_filename(filled: usize, slot_count: usize, timestamp_ms: u64) -> String {
    let prefix = match filled {
        count if count == slot_count => "complete-photo-strip".to_string(),
        1 => "single-photo".to_string(),
        2 => "double-photo-strip".to_string(),
        count => format!("{count}-photo-strip"),
    };
    format!("{prefix}-{timestamp_ms}.png")
}

/// Unix epoch milliseconds, clamped at zero.
pub fn unix_millis(now: OffsetDateTime) -> u64 {
    u64::try_from(now.unix_timestamp_nanos() / 1_000_000).unwrap_or(0)
}

/// One photobooth: a slot session, its gallery and the collaborators feeding it.
pub struct Photobooth<V, F> {
    config: BoothConfig,
    camera: V,
    frames: F,
    session: SlotSession,
    gallery: GalleryLog,
    busy: BusyFlag,
    delegate: Option<Arc<dyn BoothDelegate>>,
    toast: Option<Toast>,
}

impl<V, F> fmt::Debug for Photobooth<V, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Photobooth")
            .field("config", &self.config)
            .field("filled", &self.session.filled_count())
            .field("gallery_len", &self.gallery.len())
            .field("busy", &self.busy.is_busy())
            .field("toast", &self.toast)
            .finish_non_exhaustive()
    }
}

impl<V: VideoFrameProvider, F: FrameSource> Photobooth<V, F> {
    /// Creates a booth with an empty session and gallery.
    ///
    /// # Errors
    /// Returns [`BoothError::Config`] when `config` fails validation.
    pub fn new(config: BoothConfig, camera: V, frames: F) -> Result<Self, BoothError> {
        config.validate()?;
        let session = SlotSession::new(config.slot_count)?;
        let gallery = GalleryLog::with_capacity(config.gallery_capacity)?;
        info!(
            "photobooth {} ready: {} slots, ratio {}, capture width {}",
            APP_VERSION, config.slot_count, config.aspect_ratio, config.capture_width
        );
        Ok(Self {
            config,
            camera,
            frames,
            session,
            gallery,
            busy: BusyFlag::new(),
            delegate: None,
            toast: None,
        })
    }

    /// Installs the event delegate.
    pub fn set_delegate(&mut self, delegate: Arc<dyn BoothDelegate>) {
        self.delegate = Some(delegate);
    }

    /// Active configuration.
    pub fn config(&self) -> &BoothConfig {
        &self.config
    }

    /// Current slot session.
    pub fn session(&self) -> &SlotSession {
        &self.session
    }

    /// Capture history.
    pub fn gallery(&self) -> &GalleryLog {
        &self.gallery
    }

    /// Handle on the busy flag for UI shells.
    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    /// Camera collaborator.
    pub fn camera(&self) -> &V {
        &self.camera
    }

    /// Mutable camera access, e.g. to switch facing.
    pub fn camera_mut(&mut self) -> &mut V {
        &mut self.camera
    }

    /// Frame collaborator.
    pub fn frames(&self) -> &F {
        &self.frames
    }

    /// Mutable frame access for selection changes.
    pub fn frames_mut(&mut self) -> &mut F {
        &mut self.frames
    }

    /// Notification left by the latest capture or upload.
    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    /// Clears the pending notification.
    pub fn dismiss_toast(&mut self) {
        self.toast = None;
    }

    fn set_toast(&mut self, message: &str, kind: ToastKind) {
        self.toast = Some(Toast {
            message: message.to_string(),
            kind,
        });
    }

    /// Takes one photo into the next slot.
    ///
    /// The delegate sees the result whether the capture succeeded or not, and
    /// the outcome replaces the current toast.
    ///
    /// # Errors
    /// - [`BoothError::Busy`] while another capture holds the busy flag.
    /// - [`BoothError::NoFrameSelected`] without an overlay.
    /// - [`BoothError::Slot`] with [`SlotError::SessionFull`] when no target exists.
    /// - [`BoothError::Composite`] when the camera is not ready or decoding fails.
    pub fn capture(&mut self, now: OffsetDateTime) -> Result<CaptureReport, BoothError> {
        let result = self.try_capture(now);
        match &result {
            Ok(report) => {
                info!(
                    "captured into {} (replaced={}, gallery #{})",
                    report.slot, report.replaced, report.gallery_sequence
                );
                self.set_toast(CAPTURE_SUCCESS_MESSAGE, ToastKind::Info);
            }
            Err(error) => {
                warn!("capture failed: {error}");
                self.set_toast(error.toast_message(), ToastKind::Error);
            }
        }
        if let Some(delegate) = &self.delegate {
            delegate.on_capture_result(&result);
        }
        result
    }

    fn try_capture(&mut self, now: OffsetDateTime) -> Result<CaptureReport, BoothError> {
        let _guard = self.busy.try_acquire().ok_or(BoothError::Busy)?;
        let frame = self.frames.current_frame().ok_or(BoothError::NoFrameSelected)?;

        let camera = &self.camera;
        let (ratio, width) = (self.config.aspect_ratio, self.config.capture_width);
        let outcome = self.session.capture_into(|target| {
            debug!(
                "capturing into {} ({})",
                target.slot,
                match target.kind {
                    TargetKind::Fresh => "fresh",
                    TargetKind::Retake => "retake",
                }
            );
            let video = camera.current_frame();
            composite(&video, &frame, camera.is_mirrored(), ratio, width).map_err(BoothError::from)
        })?;

        let image = self
            .session
            .slot(outcome.slot)
            .and_then(|slot| slot.image())
            .cloned()
            .ok_or(BoothError::Slot(SlotError::SlotNotOccupied(outcome.slot)))?;
        let gallery_sequence = self.gallery.append(image.clone(), unix_millis(now)).sequence;

        if let Some(delegate) = &self.delegate {
            delegate.on_slot_changed(outcome.slot, Some(&image));
        }
        if self.config.auto_preview {
            self.emit_preview(now.date());
        }

        Ok(CaptureReport {
            slot: outcome.slot,
            replaced: outcome.replaced,
            gallery_sequence,
            image,
        })
    }

    fn emit_preview(&self, date: Date) {
        let Some(delegate) = &self.delegate else {
            return;
        };
        match self.preview_collage(date) {
            Ok(collage) => delegate.on_collage_preview(&collage),
            Err(error) => warn!("preview not rendered: {error}"),
        }
    }

    /// Marks an occupied slot as the target of the next capture.
    ///
    /// # Errors
    /// Returns [`BoothError::Slot`] for empty or out-of-range slots.
    pub fn begin_retake(&mut self, slot: SlotIndex) -> Result<(), BoothError> {
        Ok(self.session.begin_retake(slot)?)
    }

    /// Drops the pending retake target.
    pub fn cancel_retake(&mut self) -> Option<SlotIndex> {
        let cancelled = self.session.cancel_retake();
        if let Some(slot) = cancelled {
            info!("retake of {slot} cancelled");
        }
        cancelled
    }

    /// Empties every slot; the gallery keeps its history.
    pub fn reset_session(&mut self) {
        let cleared = self.session.occupied_indices();
        self.session.reset();
        if let Some(delegate) = &self.delegate {
            for slot in cleared {
                delegate.on_slot_changed(slot, None);
            }
        }
    }

    /// Renders the strip at preview width.
    ///
    /// # Errors
    /// Returns [`BoothError::Collage`] when the preview width is unusable.
    pub fn preview_collage(&self, date: Date) -> Result<Collage, BoothError> {
        Ok(assemble(&self.session, self.config.preview_width, date)?)
    }

    /// Renders the strip at export width and names it.
    ///
    /// # Errors
    /// - [`BoothError::NothingToExport`] when no slot is filled.
    /// - [`BoothError::Collage`] when the export width is unusable.
    pub fn export_collage(&self, now: OffsetDateTime) -> Result<ExportedCollage, BoothError> {
        let filled = self.session.filled_count();
        if filled == 0 {
            return Err(BoothError::NothingToExport);
        }

        let collage = assemble(&self.session, self.config.export_width, now.date())?;
        let suggested_filename =
            export_filename(filled, self.session.slot_count(), unix_millis(now));
        if !collage.degraded_slots.is_empty() {
            warn!(
                "export {suggested_filename} has {} placeholder slot(s)",
                collage.degraded_slots.len()
            );
        }
        info!("exported {suggested_filename}");

        Ok(ExportedCollage {
            bitmap: collage.bitmap.clone(),
            suggested_filename,
            collage,
        })
    }

    /// Capture button projection for the current state.
    pub fn capture_button_state(&self) -> CaptureButton {
        capture_button_state(
            self.busy.is_busy(),
            self.session.is_complete(),
            self.session.pending_retake().is_some(),
            self.frames.current_frame().is_some(),
        )
    }

    /// Full UI projection; `frame_status` comes from the frame picker.
    pub fn project_ui_state(&self, frame_status: impl Into<String>) -> UiState {
        let mut state = UiState::new(APP_VERSION, self.session.slot_count());
        for (slot, entry) in self.session.slots() {
            state.on_slot_changed(slot, entry.is_occupied());
        }
        state.set_retake_target(self.session.pending_retake());
        state.capture_button = self.capture_button_state();
        state.frame_status = frame_status.into();
        state.gallery_len = self.gallery.len();
        if let Some(toast) = &self.toast {
            state.show_toast(toast.message.clone(), toast.kind);
        }
        state
    }
}

impl<V: VideoFrameProvider> Photobooth<V, FrameLibrary> {
    /// Switches the overlay and returns the resulting status line.
    pub fn select_frame(&mut self, choice: FrameChoice, store: &CustomFrameStore) -> String {
        self.frames.select(choice, store);
        self.frames.status_text()
    }

    /// Validates, stores and selects a custom overlay.
    ///
    /// A frame that is selected but not persisted leaves a storage warning
    /// toast instead of the success one.
    ///
    /// # Errors
    /// Returns [`BoothError::Frame`] when the upload is not an image.
    pub fn upload_frame(
        &mut self,
        store: &CustomFrameStore,
        upload: CustomFrameUpload,
        now: OffsetDateTime,
    ) -> Result<UploadOutcome, BoothError> {
        match self.frames.upload_custom(store, upload, now) {
            Ok(outcome) => {
                match &outcome.storage_warning {
                    None => self.set_toast(UPLOAD_SUCCESS_MESSAGE, ToastKind::Info),
                    Some(_) => self.set_toast(STORAGE_FULL_MESSAGE, ToastKind::Error),
                }
                Ok(outcome)
            }
            Err(error) => {
                let error = BoothError::from(error);
                self.set_toast(error.toast_message(), ToastKind::Error);
                Err(error)
            }
        }
    }

    /// UI projection using the library's own status line.
    pub fn ui_state(&self) -> UiState {
        self.project_ui_state(self.frames.status_text())
    }
}

/// Coarse failure categories shared with the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Camera produced no pixels.
    SourceUnavailable,
    /// No overlay is selected.
    NoFrameSelected,
    /// Retake requested for an empty slot.
    SlotNotOccupied,
    /// All slots filled and no retake pending.
    SessionFull,
    /// Image bytes could not be decoded.
    DecodeFailure,
    /// Custom frame could not be persisted.
    StorageFull,
    /// A capture is already running.
    Busy,
    /// Export requested with no photos.
    NothingToExport,
    /// Anything else.
    Internal,
}

/// Booth integration error type.
#[derive(Debug, Error)]
pub enum BoothError {
    /// A capture is already in flight.
    #[error("a capture is already in progress")]
    Busy,
    /// No overlay is selected.
    #[error("no frame selected")]
    NoFrameSelected,
    /// Export requested with every slot empty.
    #[error("nothing to export")]
    NothingToExport,
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Composite failure.
    #[error("composite error: {0}")]
    Composite(#[from] CompositeError),
    /// Slot transition failure.
    #[error("slot error: {0}")]
    Slot(#[from] SlotError),
    /// Collage rendering failure.
    #[error("collage error: {0}")]
    Collage(#[from] CollageError),
    /// Frame loading or storage failure.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
    /// Gallery configuration failure.
    #[error("gallery error: {0}")]
    Gallery(#[from] GalleryError),
}

impl BoothError {
    /// Category used for UI decisions.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BoothError::Busy => ErrorKind::Busy,
            BoothError::NoFrameSelected => ErrorKind::NoFrameSelected,
            BoothError::NothingToExport => ErrorKind::NothingToExport,
            BoothError::Composite(CompositeError::SourceUnavailable) => ErrorKind::SourceUnavailable,
            BoothError::Composite(CompositeError::EmptyFrame) => ErrorKind::NoFrameSelected,
            BoothError::Composite(CompositeError::Core(error))
            | BoothError::Collage(CollageError::Core(error))
            | BoothError::Frame(FrameError::Core(error)) => core_kind(error),
            BoothError::Slot(SlotError::SlotNotOccupied(_)) => ErrorKind::SlotNotOccupied,
            BoothError::Slot(SlotError::SessionFull) => ErrorKind::SessionFull,
            BoothError::Frame(FrameError::NotAnImage(_) | FrameError::Encoding(_)) => {
                ErrorKind::DecodeFailure
            }
            BoothError::Frame(FrameError::StorageFull(_)) => ErrorKind::StorageFull,
            _ => ErrorKind::Internal,
        }
    }

    /// User-visible notification text.
    pub fn toast_message(&self) -> &'static str {
        match (self.kind(), self) {
            (ErrorKind::SourceUnavailable, _) => "Unable to access camera. Please check permissions.",
            (ErrorKind::NoFrameSelected, _) => SELECT_FRAME_MESSAGE,
            (ErrorKind::SlotNotOccupied, _) => "Take a photo in this slot before retaking it",
            (ErrorKind::SessionFull, _) => "All slots are filled. Pick a photo to retake.",
            (ErrorKind::DecodeFailure, BoothError::Frame(_)) => {
                "Please upload an image file (PNG, JPG, JPEG)"
            }
            (ErrorKind::StorageFull, _) => STORAGE_FULL_MESSAGE,
            (ErrorKind::Busy, _) => "Capture already in progress",
            (ErrorKind::NothingToExport, _) => "Take at least one photo before exporting",
            _ => "Error capturing photo. Please try again.",
        }
    }
}

fn core_kind(error: &CoreError) -> ErrorKind {
    match error {
        CoreError::Decode(_) => ErrorKind::DecodeFailure,
        _ => ErrorKind::Internal,
    }
}
