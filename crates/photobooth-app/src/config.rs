//! Booth configuration: defaults, JSON documents and environment overrides.

use std::ops::RangeInclusive;

use log::warn;
use photobooth_collage::{
    EXPORT_WIDTH, MAX_CANVAS_WIDTH, MIN_CANVAS_WIDTH, PREVIEW_WIDTH, canvas_height_for,
};
use photobooth_composite::{DEFAULT_TARGET_WIDTH, MAX_TARGET_DIMENSION, target_height_for};
use photobooth_core::AspectRatio;
use photobooth_gallery::GALLERY_CAPACITY;
use photobooth_session::DEFAULT_SLOT_COUNT;
use serde::{Deserialize, Serialize};

use crate::BoothError;

/// Overrides [`BoothConfig::capture_width`].
pub const ENV_CAPTURE_WIDTH: &str = "PHOTOBOOTH_CAPTURE_WIDTH";
/// Overrides [`BoothConfig::preview_width`].
pub const ENV_PREVIEW_WIDTH: &str = "PHOTOBOOTH_PREVIEW_WIDTH";
/// Overrides [`BoothConfig::export_width`].
pub const ENV_EXPORT_WIDTH: &str = "PHOTOBOOTH_EXPORT_WIDTH";
/// Overrides [`BoothConfig::auto_preview`].
pub const ENV_AUTO_PREVIEW: &str = "PHOTOBOOTH_AUTO_PREVIEW";

/// Largest accepted [`BoothConfig::gallery_capacity`].
pub const MAX_GALLERY_CAPACITY: usize = 256;

const CAPTURE_WIDTHS: RangeInclusive<u32> = 1..=MAX_TARGET_DIMENSION;
const STRIP_WIDTHS: RangeInclusive<u32> = MIN_CANVAS_WIDTH..=MAX_CANVAS_WIDTH;

/// Runtime settings for one booth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoothConfig {
    /// Slots per strip.
    pub slot_count: usize,
    /// Output ratio of every capture.
    pub aspect_ratio: AspectRatio,
    /// Width of composited captures.
    pub capture_width: u32,
    /// Width of the live collage preview.
    pub preview_width: u32,
    /// Width of the exported strip.
    pub export_width: u32,
    /// Photos kept in the gallery history.
    pub gallery_capacity: usize,
    /// Re-render the preview after every capture.
    pub auto_preview: bool,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            slot_count: DEFAULT_SLOT_COUNT,
            aspect_ratio: AspectRatio::FOUR_THREE,
            capture_width: DEFAULT_TARGET_WIDTH,
            preview_width: PREVIEW_WIDTH,
            export_width: EXPORT_WIDTH,
            gallery_capacity: GALLERY_CAPACITY,
            auto_preview: true,
        }
    }
}

impl BoothConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Parses a JSON document; missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns [`BoothError::Config`] for malformed JSON or invalid values.
    pub fn from_json(raw: &str) -> Result<Self, BoothError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|error| BoothError::Config(error.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides from `lookup`; unparsable or out-of-range values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(width) = width_override(&lookup, ENV_CAPTURE_WIDTH, CAPTURE_WIDTHS) {
            self.capture_width = width;
        }
        if let Some(width) = width_override(&lookup, ENV_PREVIEW_WIDTH, STRIP_WIDTHS) {
            self.preview_width = width;
        }
        if let Some(width) = width_override(&lookup, ENV_EXPORT_WIDTH, STRIP_WIDTHS) {
            self.export_width = width;
        }
        if let Some(raw) = lookup(ENV_AUTO_PREVIEW) {
            match parse_flag(&raw) {
                Some(flag) => self.auto_preview = flag,
                None => warn!("ignoring {ENV_AUTO_PREVIEW}={raw:?}"),
            }
        }
        self
    }

    /// Checks that every size is usable and every output fits its bounds.
    ///
    /// A full strip must fit the collage canvas at both the preview and the
    /// export width, which also caps `slotCount`.
    ///
    /// # Errors
    /// Returns [`BoothError::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), BoothError> {
        if self.slot_count == 0 {
            return Err(invalid("slotCount", "must be greater than zero"));
        }
        if !(1..=MAX_GALLERY_CAPACITY).contains(&self.gallery_capacity) {
            return Err(invalid(
                "galleryCapacity",
                format!("must be between 1 and {MAX_GALLERY_CAPACITY}"),
            ));
        }
        target_height_for(self.aspect_ratio, self.capture_width)
            .map_err(|error| invalid("captureWidth", error))?;
        canvas_height_for(self.slot_count, self.preview_width)
            .map_err(|error| invalid("previewWidth", error))?;
        canvas_height_for(self.slot_count, self.export_width)
            .map_err(|error| invalid("exportWidth", error))?;
        Ok(())
    }
}

fn invalid(field: &str, reason: impl std::fmt::Display) -> BoothError {
    BoothError::Config(format!("{field} {reason}"))
}

fn width_override(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    accepted: RangeInclusive<u32>,
) -> Option<u32> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u32>() {
        Ok(width) if accepted.contains(&width) => Some(width),
        _ => {
            warn!("ignoring {key}={raw:?}");
            None
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
