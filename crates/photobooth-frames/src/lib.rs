#![warn(missing_docs)]
//! # photobooth-frames
//!
//! ## Purpose
//! Supplies the decorative overlay that every capture is composited under.
//!
//! ## Responsibilities
//! - Draw the built-in [`FrameStyle`] overlays.
//! - Load image assets from disk and user uploads from memory.
//! - Persist one custom upload across runs in a [`CustomFrameStore`].
//! - Track the current selection and expose it through [`FrameSource`].
//!
//! ## Data flow
//! [`FrameChoice`] -> [`FrameLibrary::select`] -> [`FrameSpec`] ->
//! `FrameSource::current_frame` -> composite.
//!
//! ## Ownership and lifetimes
//! The library owns the selected [`FrameSpec`]; composites receive cheap
//! [`Bitmap`] clones. The store owns only a path and reads the disk lazily.
//!
//! ## Error model
//! Load failures of assets and stored uploads degrade to the generated
//! default frame with a `warn!`. Upload validation errors surface as
//! [`FrameError`]; a failed save after a valid upload is reported as a
//! warning alongside the selected frame.
//!
//! ## Example
//! ```
//! use photobooth_capture::FrameSource;
//! use photobooth_frames::{FrameChoice, FrameLibrary, FrameStyle, CustomFrameStore};
//!
//! let store = CustomFrameStore::new(std::env::temp_dir().join("photobooth-doc-frame.json"));
//! let mut library = FrameLibrary::empty();
//! assert_eq!(library.status_text(), "No frame selected");
//!
//! library.select(FrameChoice::Style(FrameStyle::Stars), &store);
//! assert_eq!(library.status_text(), "Stars frame loaded");
//! assert!(library.current_frame().is_some());
//! ```

mod generate;
mod store;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::{info, warn};
use photobooth_capture::FrameSource;
use photobooth_core::{Bitmap, CoreError};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub use generate::{FRAME_HEIGHT, FRAME_WIDTH, FrameStyle};
pub use store::{CustomFrameRecord, CustomFrameStore, DEFAULT_QUOTA_BYTES};

/// Label given to the default frame when it replaces a frame that failed to load.
pub const FALLBACK_LABEL: &str = "Default (fallback)";

/// Where the active overlay came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSourceKind {
    /// Drawn by [`FrameStyle::generate`].
    Generated,
    /// Read from an image file.
    LoadedAsset,
    /// Uploaded by the user.
    CustomUpload,
}

/// Selected overlay plus its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSpec {
    /// Overlay pixels; transparent where the photo shows through.
    pub bitmap: Bitmap,
    /// Provenance.
    pub source_kind: FrameSourceKind,
    /// Human-readable name for status text.
    pub label: String,
}

impl FrameSpec {
    fn generated(style: FrameStyle) -> Self {
        Self {
            bitmap: style.generate(),
            source_kind: FrameSourceKind::Generated,
            label: style.label().to_string(),
        }
    }

    fn fallback() -> Self {
        Self {
            label: FALLBACK_LABEL.to_string(),
            ..Self::generated(FrameStyle::Default)
        }
    }
}

/// Frame picker options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameChoice {
    /// A built-in generated overlay.
    Style(FrameStyle),
    /// An image file on disk.
    Asset(PathBuf),
    /// The upload persisted in the [`CustomFrameStore`].
    Custom,
}

/// A user-supplied overlay before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomFrameUpload {
    /// Original file name.
    pub name: String,
    /// Declared MIME type; must start with `image/`.
    pub mime_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

/// Result of a successful upload.
#[derive(Debug)]
pub struct UploadOutcome {
    /// What was (or would have been) persisted.
    pub record: CustomFrameRecord,
    /// Set when persisting failed; the frame is selected regardless.
    pub storage_warning: Option<FrameError>,
}

/// Holds the currently selected overlay.
#[derive(Debug, Clone)]
pub struct FrameLibrary {
    current: Option<FrameSpec>,
}

impl FrameLibrary {
    /// Library with [`FrameStyle::Default`] selected.
    pub fn new() -> Self {
        Self {
            current: Some(FrameSpec::generated(FrameStyle::Default)),
        }
    }

    /// Library with nothing selected.
    pub fn empty() -> Self {
        Self { current: None }
    }

    /// Currently selected overlay.
    pub fn current(&self) -> Option<&FrameSpec> {
        self.current.as_ref()
    }

    /// Switches to `choice` and returns the resulting selection.
    ///
    /// Assets and stored uploads that cannot be read or decoded are replaced
    /// by the default frame labeled [`FALLBACK_LABEL`]. Choosing
    /// [`FrameChoice::Custom`] when nothing is stored clears the selection.
    pub fn select(&mut self, choice: FrameChoice, store: &CustomFrameStore) -> Option<&FrameSpec> {
        self.current = match choice {
            FrameChoice::Style(style) => Some(FrameSpec::generated(style)),
            FrameChoice::Asset(path) => Some(load_asset(&path).unwrap_or_else(|error| {
                warn!("frame asset {} unusable, using fallback: {error}", path.display());
                FrameSpec::fallback()
            })),
            FrameChoice::Custom => match store.load() {
                Ok(None) => {
                    info!("no custom frame stored");
                    None
                }
                Ok(Some(record)) => Some(custom_spec(&record).unwrap_or_else(|error| {
                    warn!("stored custom frame unusable, using fallback: {error}");
                    FrameSpec::fallback()
                })),
                Err(error) => {
                    warn!("custom frame store unreadable, using fallback: {error}");
                    Some(FrameSpec::fallback())
                }
            },
        };

        if let Some(spec) = &self.current {
            info!("frame selected: {}", spec.label);
        }
        self.current.as_ref()
    }

    /// Validates, persists, and selects an uploaded overlay.
    ///
    /// # Errors
    /// Returns [`FrameError::NotAnImage`] for non-image MIME types or bytes
    /// that do not decode. Persistence failures do not fail the upload; they
    /// come back in [`UploadOutcome::storage_warning`].
    pub fn upload_custom(
        &mut self,
        store: &CustomFrameStore,
        upload: CustomFrameUpload,
        now: OffsetDateTime,
    ) -> Result<UploadOutcome, FrameError> {
        if !upload.mime_type.starts_with("image/") {
            return Err(FrameError::NotAnImage(upload.mime_type));
        }

        let bitmap = decode_overlay(upload.bytes.clone())
            .map_err(|error| FrameError::NotAnImage(format!("{}: {error}", upload.name)))?;

        let uploaded_at = now
            .format(&Rfc3339)
            .map_err(|error| FrameError::Timestamp(error.to_string()))?;
        let record = CustomFrameRecord {
            name: upload.name,
            mime_type: upload.mime_type,
            size_bytes: upload.bytes.len() as u64,
            data_base64: STANDARD.encode(&upload.bytes),
            uploaded_at,
        };

        let storage_warning = match store.save(&record) {
            Ok(()) => None,
            Err(error) => {
                warn!("custom frame not persisted: {error}");
                Some(error)
            }
        };

        self.current = Some(FrameSpec {
            bitmap,
            source_kind: FrameSourceKind::CustomUpload,
            label: custom_label(&record.name),
        });
        info!("custom frame {} selected", record.name);

        Ok(UploadOutcome {
            record,
            storage_warning,
        })
    }

    /// Status line shown under the frame picker.
    pub fn status_text(&self) -> String {
        match &self.current {
            Some(spec) => format!("{} loaded", spec.label),
            None => "No frame selected".to_string(),
        }
    }
}

impl Default for FrameLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for FrameLibrary {
    fn current_frame(&self) -> Option<Bitmap> {
        self.current.as_ref().map(|spec| spec.bitmap.clone())
    }
}

fn custom_label(name: &str) -> String {
    format!("Custom frame ({name})")
}

fn decode_overlay(bytes: Vec<u8>) -> Result<Bitmap, CoreError> {
    let encoded = Bitmap::from_encoded(bytes)?;
    let pixels = encoded.decode()?;
    Ok(Bitmap::from_image(Arc::unwrap_or_clone(pixels)))
}

fn load_asset(path: &Path) -> Result<FrameSpec, FrameError> {
    let bytes = fs::read(path)?;
    let bitmap = decode_overlay(bytes)?;
    let label = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(FrameSpec {
        bitmap,
        source_kind: FrameSourceKind::LoadedAsset,
        label,
    })
}

fn custom_spec(record: &CustomFrameRecord) -> Result<FrameSpec, FrameError> {
    Ok(FrameSpec {
        bitmap: record.to_bitmap()?,
        source_kind: FrameSourceKind::CustomUpload,
        label: custom_label(&record.name),
    })
}

/// Frame loading, upload, and persistence errors.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Upload is not a decodable image.
    #[error("not an image: {0}")]
    NotAnImage(String),
    /// Persisting the custom frame failed or would exceed the quota.
    #[error("frame storage full: {0}")]
    StorageFull(String),
    /// Reading an asset or the store failed.
    #[error("frame i/o failed: {0}")]
    Io(#[from] std::io::Error),
    /// Stored record is not valid JSON for [`CustomFrameRecord`].
    #[error("frame record codec failed: {0}")]
    Codec(#[from] serde_json::Error),
    /// Stored record carries invalid base64 data.
    #[error("frame record encoding invalid: {0}")]
    Encoding(String),
    /// Upload timestamp could not be formatted.
    #[error("frame timestamp invalid: {0}")]
    Timestamp(String),
    /// Image decode failure.
    #[error(transparent)]
    Core(#[from] CoreError),
}
