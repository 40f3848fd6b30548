//! Procedurally drawn overlays.
//!
//! Every style renders onto a fully transparent 1280x720 canvas so only the
//! decoration covers the photo.

use std::f32::consts::PI;

use image::{Rgba, RgbaImage};
use photobooth_core::Bitmap;
use photobooth_core::raster::{fill_polygon, fill_rect, stroke_rect, stroke_rect_dashed};
use serde::{Deserialize, Serialize};

/// Width of generated overlays (16:9, the usual webcam stream).
pub const FRAME_WIDTH: u32 = 1280;
/// Height of generated overlays.
pub const FRAME_HEIGHT: u32 = 720;

const GRAY: Rgba<u8> = Rgba([138, 138, 138, 179]);
const CHARCOAL: Rgba<u8> = Rgba([51, 51, 51, 128]);
const HOT_PINK: Rgba<u8> = Rgba([255, 105, 180, 179]);
const GOLD: Rgba<u8> = Rgba([255, 215, 0, 179]);
/// Colour of the `Squares` style.
pub const SEA_GREEN: Rgba<u8> = Rgba([46, 139, 87, 179]);

/// Built-in overlay designs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameStyle {
    /// Double gray border.
    Default,
    /// Ring of hearts.
    Hearts,
    /// Gold border with a ring of stars.
    Stars,
    /// Dashed green border with corner blocks.
    Squares,
}

impl FrameStyle {
    /// Every built-in style, in menu order.
    pub const ALL: [FrameStyle; 4] = [
        FrameStyle::Default,
        FrameStyle::Hearts,
        FrameStyle::Stars,
        FrameStyle::Squares,
    ];

    /// Display label for status text.
    pub fn label(&self) -> &'static str {
        match self {
            FrameStyle::Default => "Default frame",
            FrameStyle::Hearts => "Hearts frame",
            FrameStyle::Stars => "Stars frame",
            FrameStyle::Squares => "Squares frame",
        }
    }

    /// Draws the overlay.
    pub fn generate(&self) -> Bitmap {
        let mut canvas = RgbaImage::new(FRAME_WIDTH, FRAME_HEIGHT);
        match self {
            FrameStyle::Default => draw_default(&mut canvas),
            FrameStyle::Hearts => draw_hearts(&mut canvas),
            FrameStyle::Stars => draw_stars(&mut canvas),
            FrameStyle::Squares => draw_squares(&mut canvas),
        }
        Bitmap::from_image(canvas)
    }
}

fn canvas_size(canvas: &RgbaImage) -> (i64, i64) {
    (i64::from(canvas.width()), i64::from(canvas.height()))
}

fn draw_default(canvas: &mut RgbaImage) {
    let (w, h) = canvas_size(canvas);
    stroke_rect(canvas, 50, 50, w - 100, h - 100, 30, GRAY);
    stroke_rect(canvas, 85, 85, w - 170, h - 170, 15, CHARCOAL);
}

fn draw_hearts(canvas: &mut RgbaImage) {
    let (w, h) = canvas_size(canvas);
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);

    for i in 0..20 {
        let angle = i as f32 / 20.0 * PI * 2.0;
        let points = heart_outline(cx + angle.cos() * 550.0, cy + angle.sin() * 300.0, 25.0);
        fill_polygon(canvas, &points, HOT_PINK);
    }
}

fn draw_stars(canvas: &mut RgbaImage) {
    let (w, h) = canvas_size(canvas);
    stroke_rect(canvas, 100, 100, w - 200, h - 200, 8, GOLD);

    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    for i in 0..16 {
        let angle = i as f32 / 16.0 * PI * 2.0;
        let points = star_outline(cx + angle.cos() * 500.0, cy + angle.sin() * 250.0, 5, 20.0, 8.0);
        fill_polygon(canvas, &points, GOLD);
    }
}

fn draw_squares(canvas: &mut RgbaImage) {
    let (w, h) = canvas_size(canvas);
    stroke_rect_dashed(canvas, 80, 80, w - 160, h - 160, 15, 20, 10, SEA_GREEN);

    for (x, y) in [(80, 80), (w - 120, 80), (80, h - 120), (w - 120, h - 120)] {
        fill_rect(canvas, x, y, 40, 40, SEA_GREEN);
    }
}

/// Heart made of two cubic curves in unit space, turned upside down and
/// scaled by `size` around `(x, y)`.
fn heart_outline(x: f32, y: f32, size: f32) -> Vec<(f32, f32)> {
    const CURVES: [[(f32, f32); 4]; 2] = [
        [(0.0, 0.7), (0.0, 0.3), (-0.6, -0.1), (0.0, -0.5)],
        [(0.0, -0.5), (0.6, -0.1), (0.0, 0.3), (0.0, 0.7)],
    ];
    const STEPS: usize = 16;

    let mut points = Vec::with_capacity(CURVES.len() * STEPS);
    for curve in CURVES {
        for step in 0..STEPS {
            let (ux, uy) = cubic_bezier(curve, step as f32 / STEPS as f32);
            // Rotation by PI negates both axes.
            points.push((x - ux * size, y - uy * size));
        }
    }
    points
}

fn cubic_bezier(curve: [(f32, f32); 4], t: f32) -> (f32, f32) {
    let u = 1.0 - t;
    let weights = [u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t];
    curve
        .iter()
        .zip(weights)
        .fold((0.0, 0.0), |(ax, ay), (&(px, py), w)| (ax + px * w, ay + py * w))
}

fn star_outline(cx: f32, cy: f32, spikes: usize, outer: f32, inner: f32) -> Vec<(f32, f32)> {
    let step = PI / spikes as f32;
    let mut rotation = PI / 2.0 * 3.0;
    let mut points = Vec::with_capacity(spikes * 2);

    for _ in 0..spikes {
        points.push((cx + rotation.cos() * outer, cy + rotation.sin() * outer));
        rotation += step;
        points.push((cx + rotation.cos() * inner, cy + rotation.sin() * inner));
        rotation += step;
    }
    points
}
