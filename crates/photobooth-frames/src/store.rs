//! Single-record persistence for the user's custom overlay.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::{debug, info};
use photobooth_core::Bitmap;
use serde::{Deserialize, Serialize};

use crate::{FrameError, decode_overlay};

/// Default byte budget for the stored record (5 MiB).
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// Persisted custom overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFrameRecord {
    /// Original file name.
    pub name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Size of the raw upload in bytes.
    pub size_bytes: u64,
    /// Raw upload, standard base64.
    pub data_base64: String,
    /// Upload time, RFC 3339.
    pub uploaded_at: String,
}

impl CustomFrameRecord {
    /// Decodes the embedded image.
    ///
    /// # Errors
    /// [`FrameError::Encoding`] for bad base64, [`FrameError::Core`] when
    /// the bytes are not a decodable image.
    pub fn to_bitmap(&self) -> Result<Bitmap, FrameError> {
        let bytes = STANDARD
            .decode(&self.data_base64)
            .map_err(|error| FrameError::Encoding(error.to_string()))?;
        Ok(decode_overlay(bytes)?)
    }
}

/// JSON file holding at most one [`CustomFrameRecord`].
#[derive(Debug, Clone)]
pub struct CustomFrameStore {
    path: PathBuf,
    quota_bytes: u64,
}

impl CustomFrameStore {
    /// Store at `path` with [`DEFAULT_QUOTA_BYTES`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }

    /// Overrides the byte budget.
    pub fn with_quota(mut self, quota_bytes: u64) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte budget for the serialized record.
    pub fn quota_bytes(&self) -> u64 {
        self.quota_bytes
    }

    /// Replaces the stored record.
    ///
    /// # Errors
    /// [`FrameError::StorageFull`] when the serialized record exceeds the
    /// quota or the file cannot be written.
    pub fn save(&self, record: &CustomFrameRecord) -> Result<(), FrameError> {
        let json = serde_json::to_vec(record)?;
        if json.len() as u64 > self.quota_bytes {
            return Err(FrameError::StorageFull(format!(
                "record is {} bytes, quota is {}",
                json.len(),
                self.quota_bytes
            )));
        }

        fs::write(&self.path, &json)
            .map_err(|error| FrameError::StorageFull(format!("{}: {error}", self.path.display())))?;
        info!("custom frame {} saved ({} bytes)", record.name, json.len());
        Ok(())
    }

    /// Reads the stored record; `Ok(None)` when nothing was saved.
    ///
    /// # Errors
    /// [`FrameError::Io`] when the file exists but cannot be read,
    /// [`FrameError::Codec`] when it is not a valid record.
    pub fn load(&self) -> Result<Option<CustomFrameRecord>, FrameError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Removes the stored record, if any.
    ///
    /// # Errors
    /// [`FrameError::Io`] for failures other than a missing file.
    pub fn clear(&self) -> Result<(), FrameError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("custom frame store cleared");
                Ok(())
            }
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}
