#![warn(missing_docs)]
//! # photobooth-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `photobooth` workspace.
//!
//! ## Responsibilities
//! - Represent immutable bitmaps with an in-memory or encoded pixel source.
//! - Model target aspect ratios and slot indices.
//! - Provide the small raster toolkit (blending, rectangles, polygons, text)
//!   used by frame generation and collage rendering.
//!
//! ## Data flow
//! Camera and frame collaborators hand out [`Bitmap`] values; the composite
//! engine produces new ones; slot sessions and the gallery store clones of
//! them; the collage assembler decodes them for rendering.
//!
//! ## Ownership and lifetimes
//! A [`Bitmap`] is an `Arc`-backed handle. Cloning it never copies pixels, so
//! the same capture can sit in a slot and in the gallery at once.
//!
//! ## Error model
//! Shape mismatches, zero ratios, and decode/encode failures return
//! [`CoreError`] variants.
//!
//! ## Example
//! ```rust
//! use photobooth_core::{AspectRatio, Bitmap, SlotIndex};
//!
//! let bitmap = Bitmap::from_rgba(2, 2, vec![0; 16]).unwrap();
//! assert_eq!((bitmap.width(), bitmap.height()), (2, 2));
//! assert_eq!(AspectRatio::FOUR_THREE.height_for_width(1200), Some(900));
//! assert_eq!(SlotIndex::new(2).to_string(), "Slot 3");
//! ```

pub mod glyphs;
pub mod raster;

use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

use image::{ImageFormat, ImageReader, RgbaImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Immutable image handle with known dimensions.
///
/// The pixel source is either a decoded RGBA raster or encoded image bytes
/// (PNG/JPEG). Encoded bitmaps are decoded lazily by [`Bitmap::decode`].
#[derive(Clone, PartialEq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    source: PixelSource,
}

#[derive(Clone, PartialEq)]
enum PixelSource {
    Raster(Arc<RgbaImage>),
    Encoded(Arc<[u8]>),
}

impl Bitmap {
    /// Constructs a raster bitmap from raw RGBA bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidShape`] when the buffer length is not
    /// exactly `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, CoreError> {
        let expected = required_rgba_len(width, height)?;
        if rgba.len() != expected {
            return Err(CoreError::InvalidShape {
                expected,
                actual: rgba.len(),
            });
        }

        let image = RgbaImage::from_raw(width, height, rgba).ok_or(CoreError::InvalidShape {
            expected,
            actual: 0,
        })?;
        Ok(Self::from_image(image))
    }

    /// Wraps an already decoded raster.
    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            source: PixelSource::Raster(Arc::new(image)),
        }
    }

    /// Returns a zero-size bitmap, used by cameras that are not ready yet.
    pub fn empty() -> Self {
        Self::from_image(RgbaImage::new(0, 0))
    }

    /// Wraps encoded bytes, probing the dimensions from the image header.
    ///
    /// Only the header is read here; a damaged body surfaces later as
    /// [`CoreError::Decode`] from [`Bitmap::decode`].
    ///
    /// # Errors
    /// Returns [`CoreError::Decode`] when the format or header is unreadable.
    pub fn from_encoded(bytes: Vec<u8>) -> Result<Self, CoreError> {
        let (width, height) = ImageReader::new(Cursor::new(bytes.as_slice()))
            .with_guessed_format()
            .map_err(|error| CoreError::Decode(error.to_string()))?
            .into_dimensions()
            .map_err(|error| CoreError::Decode(error.to_string()))?;

        Ok(Self::encoded(width, height, bytes))
    }

    /// Wraps encoded bytes whose dimensions were declared by the producer.
    pub fn encoded(width: u32, height: u32, bytes: Vec<u8>) -> Self {
        Self {
            width,
            height,
            source: PixelSource::Encoded(bytes.into()),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `true` when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` when pixels still need decoding.
    pub fn is_encoded(&self) -> bool {
        matches!(self.source, PixelSource::Encoded(_))
    }

    /// Materializes the RGBA raster.
    ///
    /// # Errors
    /// Returns [`CoreError::Decode`] when encoded bytes cannot be decoded or
    /// decode to dimensions different from the declared ones.
    pub fn decode(&self) -> Result<Arc<RgbaImage>, CoreError> {
        match &self.source {
            PixelSource::Raster(image) => Ok(Arc::clone(image)),
            PixelSource::Encoded(bytes) => {
                let image = image::load_from_memory(bytes)
                    .map_err(|error| CoreError::Decode(error.to_string()))?
                    .to_rgba8();
                if image.width() != self.width || image.height() != self.height {
                    return Err(CoreError::Decode(format!(
                        "decoded {}x{} but bitmap declares {}x{}",
                        image.width(),
                        image.height(),
                        self.width,
                        self.height
                    )));
                }
                Ok(Arc::new(image))
            }
        }
    }

    /// Encodes the bitmap as PNG bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::Decode`] when the source cannot be materialized and
    /// [`CoreError::Encode`] when PNG encoding fails.
    pub fn to_png(&self) -> Result<Vec<u8>, CoreError> {
        if let PixelSource::Encoded(bytes) = &self.source
            && matches!(image::guess_format(bytes), Ok(ImageFormat::Png))
        {
            return Ok(bytes.to_vec());
        }

        let image = self.decode()?;
        let mut encoded = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
            .map_err(|error| CoreError::Encode(error.to_string()))?;
        Ok(encoded)
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            PixelSource::Raster(_) => "raster",
            PixelSource::Encoded(_) => "encoded",
        };
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("source", &source)
            .finish()
    }
}

/// Width:height ratio of an output image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAspectRatio")]
pub struct AspectRatio {
    numerator: u32,
    denominator: u32,
}

#[derive(Deserialize)]
struct RawAspectRatio {
    numerator: u32,
    denominator: u32,
}

impl TryFrom<RawAspectRatio> for AspectRatio {
    type Error = CoreError;

    fn try_from(raw: RawAspectRatio) -> Result<Self, Self::Error> {
        AspectRatio::new(raw.numerator, raw.denominator)
    }
}

impl AspectRatio {
    /// Classic 4:3 photo ratio used for every capture.
    pub const FOUR_THREE: AspectRatio = AspectRatio {
        numerator: 4,
        denominator: 3,
    };

    /// Creates a validated ratio.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidAspectRatio`] when either term is zero.
    pub fn new(numerator: u32, denominator: u32) -> Result<Self, CoreError> {
        if numerator == 0 || denominator == 0 {
            return Err(CoreError::InvalidAspectRatio {
                numerator,
                denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Width term.
    pub fn numerator(&self) -> u32 {
        self.numerator
    }

    /// Height term.
    pub fn denominator(&self) -> u32 {
        self.denominator
    }

    /// Height matching `width` at this ratio, rounded down.
    ///
    /// Returns `None` when the height does not fit in `u32`.
    pub fn height_for_width(&self, width: u32) -> Option<u32> {
        let height = u64::from(width) * u64::from(self.denominator) / u64::from(self.numerator);
        u32::try_from(height).ok()
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.numerator, self.denominator)
    }
}

/// Zero-based position of a slot inside a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotIndex(usize);

impl SlotIndex {
    /// Wraps a zero-based index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Zero-based index.
    pub const fn index(&self) -> usize {
        self.0
    }

    /// One-based number shown to users.
    pub const fn number(&self) -> usize {
        self.0 + 1
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot {}", self.number())
    }
}

/// Error type for core data validation and pixel codecs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Pixel buffer does not match declared geometry.
    #[error("invalid bitmap shape: expected {expected} bytes, got {actual}")]
    InvalidShape {
        /// Expected RGBA byte count.
        expected: usize,
        /// Actual RGBA byte count.
        actual: usize,
    },
    /// Bitmap dimensions overflow addressable memory.
    #[error("bitmap dimensions overflow")]
    Overflow,
    /// Ratio with a zero term.
    #[error("invalid aspect ratio {numerator}:{denominator}")]
    InvalidAspectRatio {
        /// Width term.
        numerator: u32,
        /// Height term.
        denominator: u32,
    },
    /// Encoded bytes could not be turned into pixels.
    #[error("bitmap decode failure: {0}")]
    Decode(String),
    /// Pixels could not be encoded.
    #[error("bitmap encode failure: {0}")]
    Encode(String),
}

fn required_rgba_len(width: u32, height: u32) -> Result<usize, CoreError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or(CoreError::Overflow)
}
