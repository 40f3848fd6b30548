#![warn(missing_docs)]
//! # photobooth-composite
//!
//! ## Purpose
//! Turns one camera frame plus one decorative overlay into a finished photo.
//!
//! ## Responsibilities
//! - Compute the centred "cover" crop matching the output aspect ratio.
//! - Scale the cropped video to the fixed output size, mirroring it for
//!   front-facing cameras.
//! - Stretch the overlay over the whole output, keeping its transparency.
//!
//! ## Data flow
//! Camera [`Bitmap`] + overlay [`Bitmap`] -> [`composite`] -> composited
//! [`Bitmap`] committed into a slot and appended to the gallery.
//!
//! ## Ownership and lifetimes
//! Inputs are borrowed; the output owns a fresh raster, so nothing returned
//! here aliases camera or overlay memory.
//!
//! ## Error model
//! A zero-size camera frame fails with [`CompositeError::SourceUnavailable`].
//! Checking that an overlay is selected at all is the caller's job; this
//! crate only rejects a zero-size overlay.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use photobooth_core::{AspectRatio, Bitmap, CoreError};
use thiserror::Error;

/// Default output width for captured photos.
pub const DEFAULT_TARGET_WIDTH: u32 = 1200;
/// Largest width or height a composite may have.
pub const MAX_TARGET_DIMENSION: u32 = 8192;

/// Source region kept by the cover crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    /// Left edge in source pixels.
    pub x: u32,
    /// Top edge in source pixels.
    pub y: u32,
    /// Cropped width.
    pub width: u32,
    /// Cropped height.
    pub height: u32,
}

/// Computes the centred crop of a `width x height` source matching `ratio`.
///
/// Wider sources lose columns on both sides, taller sources lose rows at top
/// and bottom; no padding is ever introduced.
pub fn crop_rect_for(width: u32, height: u32, ratio: AspectRatio) -> CropRect {
    let num = u64::from(ratio.numerator());
    let den = u64::from(ratio.denominator());
    let (w, h) = (u64::from(width), u64::from(height));

    if w * den > h * num {
        let crop_width = (h * num / den).clamp(1, w);
        CropRect {
            x: ((w - crop_width) / 2) as u32,
            y: 0,
            width: crop_width as u32,
            height,
        }
    } else if w * den < h * num {
        let crop_height = (w * den / num).clamp(1, h);
        CropRect {
            x: 0,
            y: ((h - crop_height) / 2) as u32,
            width,
            height: crop_height as u32,
        }
    } else {
        CropRect {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// Composites `frame` over a cropped, optionally mirrored `video`.
///
/// The output is `target_width x target_width * den / num`. Mirroring applies
/// to the video layer only; the overlay is stretched to the full output
/// regardless of its own aspect ratio.
///
/// # Errors
/// - [`CompositeError::SourceUnavailable`] when `video` has a zero dimension.
/// - [`CompositeError::EmptyFrame`] when `frame` has a zero dimension.
/// - [`CompositeError::InvalidTarget`] when the output size collapses to zero
///   or exceeds [`MAX_TARGET_DIMENSION`] on either axis.
/// - [`CompositeError::Core`] when an input cannot be decoded.
pub fn composite(
    video: &Bitmap,
    frame: &Bitmap,
    mirror: bool,
    ratio: AspectRatio,
    target_width: u32,
) -> Result<Bitmap, CompositeError> {
    if video.is_empty() {
        return Err(CompositeError::SourceUnavailable);
    }
    if frame.is_empty() {
        return Err(CompositeError::EmptyFrame);
    }

    let target_height = target_height_for(ratio, target_width)?;

    let video_pixels = video.decode()?;
    let crop = crop_rect_for(video.width(), video.height(), ratio);
    let cropped = imageops::crop_imm(&*video_pixels, crop.x, crop.y, crop.width, crop.height).to_image();

    let mut canvas = fit_exactly(cropped, target_width, target_height);
    if mirror {
        imageops::flip_horizontal_in_place(&mut canvas);
    }

    let overlay = fit_exactly((*frame.decode()?).clone(), target_width, target_height);
    imageops::overlay(&mut canvas, &overlay, 0, 0);

    Ok(Bitmap::from_image(canvas))
}

fn fit_exactly(image: RgbaImage, width: u32, height: u32) -> RgbaImage {
    if image.width() == width && image.height() == height {
        return image;
    }
    imageops::resize(&image, width, height, FilterType::Triangle)
}

/// Error type for composite rendering.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompositeError {
    /// Camera frame has no pixels yet.
    #[error("camera frame is not available")]
    SourceUnavailable,
    /// Overlay bitmap has a zero dimension.
    #[error("frame overlay is empty")]
    EmptyFrame,
    /// Requested output size is degenerate.
    #[error("invalid composite target {width}x{height}")]
    InvalidTarget {
        /// Requested width.
        width: u32,
        /// Derived height.
        height: u32,
    },
    /// Input bitmap could not be materialized.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Output height for `target_width` at `ratio`, checked against the size bounds.
///
/// # Errors
/// Returns [`CompositeError::InvalidTarget`] for a zero or oversized target.
pub fn target_height_for(ratio: AspectRatio, target_width: u32) -> Result<u32, CompositeError> {
    let height = ratio.height_for_width(target_width);
    match height {
        Some(height)
            if target_width > 0
                && height > 0
                && target_width <= MAX_TARGET_DIMENSION
                && height <= MAX_TARGET_DIMENSION =>
        {
            Ok(height)
        }
        _ => Err(CompositeError::InvalidTarget {
            width: target_width,
            height: height.unwrap_or(u32::MAX),
        }),
    }
}
