#![warn(missing_docs)]
//! # photobooth-capture
//!
//! ## Purpose
//! Defines the collaborator seams that feed the capture pipeline: the live
//! camera and the decorative frame overlay.
//!
//! ## Responsibilities
//! - Define a backend-agnostic camera trait ([`VideoFrameProvider`]).
//! - Define the overlay trait ([`FrameSource`]) read at capture time.
//! - Describe camera facing and requested stream constraints.
//! - Expose a deterministic synthetic camera for CI, tests and demos.
//!
//! ## Data flow
//! UI requests a capture -> orchestrator pulls one [`Bitmap`] from the camera
//! and one from the frame source -> both enter the composite engine.
//!
//! ## Ownership and lifetimes
//! Providers hand out owned [`Bitmap`] handles; no borrowed camera memory
//! escapes a provider.
//!
//! ## Error model
//! A camera that is not ready answers with a zero-size bitmap rather than an
//! error; only invalid constraints produce [`CaptureError`].

use std::sync::Mutex;

use image::{Rgba, RgbaImage};
use log::debug;
use photobooth_core::Bitmap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which physical camera feeds the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraFacing {
    /// User-facing camera; its picture is mirrored before compositing.
    Front,
    /// Environment-facing camera.
    Rear,
}

impl CameraFacing {
    /// Returns `true` when frames from this camera need a horizontal flip.
    pub fn is_mirrored(&self) -> bool {
        matches!(self, CameraFacing::Front)
    }

    /// Returns the opposite camera.
    pub fn toggled(&self) -> Self {
        match self {
            CameraFacing::Front => CameraFacing::Rear,
            CameraFacing::Rear => CameraFacing::Front,
        }
    }
}

/// Stream constraints requested when opening a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConstraints {
    /// Preferred frame width in pixels.
    pub ideal_width: u32,
    /// Preferred frame height in pixels.
    pub ideal_height: u32,
    /// Requested camera.
    pub facing: CameraFacing,
}

impl CameraConstraints {
    /// Creates validated constraints.
    ///
    /// # Errors
    /// Returns [`CaptureError::InvalidConstraints`] when a dimension is zero.
    pub fn new(ideal_width: u32, ideal_height: u32, facing: CameraFacing) -> Result<Self, CaptureError> {
        if ideal_width == 0 || ideal_height == 0 {
            return Err(CaptureError::InvalidConstraints {
                width: ideal_width,
                height: ideal_height,
            });
        }
        Ok(Self {
            ideal_width,
            ideal_height,
            facing,
        })
    }
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 1280,
            ideal_height: 720,
            facing: CameraFacing::Front,
        }
    }
}

/// Live camera seam.
pub trait VideoFrameProvider {
    /// Returns the current frame; a zero-size bitmap means the camera is not
    /// ready yet.
    fn current_frame(&self) -> Bitmap;

    /// Returns `true` when the active camera needs mirroring.
    fn is_mirrored(&self) -> bool;
}

/// Overlay seam. The overlay is read at the moment of capture, so switching
/// frames only affects later captures.
pub trait FrameSource {
    /// Returns the currently selected overlay, if any.
    fn current_frame(&self) -> Option<Bitmap>;
}

impl FrameSource for Option<Bitmap> {
    fn current_frame(&self) -> Option<Bitmap> {
        self.clone()
    }
}

/// Deterministic camera for tests, CI and the demo binary.
///
/// Frames are a left-to-right red ramp over a top-to-bottom green ramp with
/// a blue tint that changes every frame, so mirroring and frame order are
/// both observable.
#[derive(Debug)]
pub struct SyntheticCamera {
    constraints: CameraConstraints,
    ready: bool,
    sequence: Mutex<u64>,
}

impl SyntheticCamera {
    /// Creates a ready camera honouring `constraints`.
    pub fn new(constraints: CameraConstraints) -> Self {
        Self {
            constraints,
            ready: true,
            sequence: Mutex::new(0),
        }
    }

    /// Creates a camera that never delivers pixels.
    pub fn not_ready() -> Self {
        Self {
            constraints: CameraConstraints::default(),
            ready: false,
            sequence: Mutex::new(0),
        }
    }

    /// Switches between front and rear camera.
    pub fn switch_facing(&mut self) {
        self.constraints.facing = self.constraints.facing.toggled();
        debug!("synthetic camera now facing {:?}", self.constraints.facing);
    }

    /// Returns the active constraints.
    pub fn constraints(&self) -> CameraConstraints {
        self.constraints
    }

    /// Number of frames delivered so far.
    pub fn frames_delivered(&self) -> u64 {
        self.sequence.lock().map(|sequence| *sequence).unwrap_or(0)
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new(CameraConstraints::default())
    }
}

impl VideoFrameProvider for SyntheticCamera {
    fn current_frame(&self) -> Bitmap {
        if !self.ready {
            return Bitmap::empty();
        }

        let tint = match self.sequence.lock() {
            Ok(mut sequence) => {
                *sequence += 1;
                ((*sequence * 40) % 256) as u8
            }
            Err(_) => return Bitmap::empty(),
        };

        let width = self.constraints.ideal_width;
        let height = self.constraints.ideal_height;
        let image = RgbaImage::from_fn(width, height, |x, y| {
            let red = (u64::from(x) * 255 / u64::from(width.max(1))) as u8;
            let green = (u64::from(y) * 255 / u64::from(height.max(1))) as u8;
            Rgba([red, green, tint, 255])
        });
        Bitmap::from_image(image)
    }

    fn is_mirrored(&self) -> bool {
        self.constraints.facing.is_mirrored()
    }
}

/// Capture layer error type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// Requested stream dimensions are unusable.
    #[error("invalid camera constraints {width}x{height}")]
    InvalidConstraints {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}
