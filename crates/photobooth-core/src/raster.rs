//! Minimal software raster helpers on top of [`image::RgbaImage`].
//!
//! Coordinates are signed so shapes may hang off the canvas; everything is
//! clipped to the canvas bounds. Drawing blends source-over, the same way a
//! 2D canvas context composites translucent strokes.

use image::{Rgba, RgbaImage};

use crate::glyphs::{GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH, glyph};

/// Blends `color` over the pixel at `(x, y)`; out-of-bounds writes are ignored.
pub fn blend_pixel(canvas: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x < 0 || y < 0 || x >= i64::from(canvas.width()) || y >= i64::from(canvas.height()) {
        return;
    }

    let dst = canvas.get_pixel_mut(x as u32, y as u32);
    *dst = blend(*dst, color);
}

fn blend(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let src_a = f32::from(src[3]) / 255.0;
    if src_a >= 1.0 {
        return src;
    }
    if src_a <= 0.0 {
        return dst;
    }

    let dst_a = f32::from(dst[3]) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    let channel = |index: usize| {
        let value = (f32::from(src[index]) * src_a
            + f32::from(dst[index]) * dst_a * (1.0 - src_a))
            / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round() as u8,
    ])
}

/// Fills an axis-aligned rectangle.
pub fn fill_rect(canvas: &mut RgbaImage, x: i64, y: i64, width: i64, height: i64, color: Rgba<u8>) {
    if width <= 0 || height <= 0 {
        return;
    }

    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + width).min(i64::from(canvas.width()));
    let y1 = (y + height).min(i64::from(canvas.height()));

    for py in y0..y1 {
        for px in x0..x1 {
            blend_pixel(canvas, px, py, color);
        }
    }
}

/// Strokes a rectangle outline with the line centred on the path.
pub fn stroke_rect(
    canvas: &mut RgbaImage,
    x: i64,
    y: i64,
    width: i64,
    height: i64,
    line_width: i64,
    color: Rgba<u8>,
) {
    if line_width <= 0 {
        return;
    }

    let half = line_width / 2;
    fill_rect(canvas, x - half, y - half, width + line_width, line_width, color);
    fill_rect(
        canvas,
        x - half,
        y + height - half,
        width + line_width,
        line_width,
        color,
    );

    // Side bands stop short of the top/bottom bands so corners blend once.
    let side_height = height - line_width;
    fill_rect(canvas, x - half, y - half + line_width, line_width, side_height, color);
    fill_rect(
        canvas,
        x + width - half,
        y - half + line_width,
        line_width,
        side_height,
        color,
    );
}

/// Strokes a rectangle outline as dashes of `dash` pixels separated by `gap`.
#[allow(clippy::too_many_arguments)]
pub fn stroke_rect_dashed(
    canvas: &mut RgbaImage,
    x: i64,
    y: i64,
    width: i64,
    height: i64,
    line_width: i64,
    dash: i64,
    gap: i64,
    color: Rgba<u8>,
) {
    if line_width <= 0 || dash <= 0 {
        return;
    }

    let half = line_width / 2;
    let step = (dash + gap.max(0)) as usize;

    for offset in (0..width.max(0)).step_by(step) {
        let length = dash.min(width - offset);
        fill_rect(canvas, x + offset, y - half, length, line_width, color);
        fill_rect(canvas, x + offset, y + height - half, length, line_width, color);
    }
    for offset in (0..height.max(0)).step_by(step) {
        let length = dash.min(height - offset);
        fill_rect(canvas, x - half, y + offset, line_width, length, color);
        fill_rect(canvas, x + width - half, y + offset, line_width, length, color);
    }
}

/// Draws a one pixel horizontal line from `x0` (inclusive) to `x1` (exclusive).
pub fn draw_hline(canvas: &mut RgbaImage, x0: i64, x1: i64, y: i64, color: Rgba<u8>) {
    fill_rect(canvas, x0, y, x1 - x0, 1, color);
}

/// Overwrites the whole canvas with a top-to-bottom linear gradient.
pub fn vertical_gradient(canvas: &mut RgbaImage, top: Rgba<u8>, bottom: Rgba<u8>) {
    let height = canvas.height().max(1);
    let span = (height - 1).max(1) as f32;

    for y in 0..canvas.height() {
        let t = y as f32 / span;
        let lerp = |index: usize| {
            let a = f32::from(top[index]);
            let b = f32::from(bottom[index]);
            (a + (b - a) * t).round() as u8
        };
        let color = Rgba([lerp(0), lerp(1), lerp(2), lerp(3)]);
        for x in 0..canvas.width() {
            canvas.put_pixel(x, y, color);
        }
    }
}

/// Fills a closed polygon using the even-odd rule, sampling pixel centres.
pub fn fill_polygon(canvas: &mut RgbaImage, points: &[(f32, f32)], color: Rgba<u8>) {
    if points.len() < 3 {
        return;
    }

    let min_y = points.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
    let max_y = points.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);
    let row_start = (min_y.floor() as i64).max(0);
    let row_end = (max_y.ceil() as i64).min(i64::from(canvas.height()));

    let mut crossings = Vec::with_capacity(points.len());
    for row in row_start..row_end {
        let sample_y = row as f32 + 0.5;
        crossings.clear();

        for (index, &(x0, y0)) in points.iter().enumerate() {
            let (x1, y1) = points[(index + 1) % points.len()];
            let spans_row = (y0 <= sample_y && sample_y < y1) || (y1 <= sample_y && sample_y < y0);
            if spans_row {
                crossings.push(x0 + (sample_y - y0) * (x1 - x0) / (y1 - y0));
            }
        }

        crossings.sort_by(f32::total_cmp);
        for pair in crossings.chunks_exact(2) {
            let start = (pair[0] - 0.5).ceil() as i64;
            let end = (pair[1] - 0.5).ceil() as i64;
            fill_rect(canvas, start, row, end - start, 1, color);
        }
    }
}

/// Width in pixels of `text` rendered at `scale`.
pub fn text_width(text: &str, scale: u32) -> u32 {
    let count = text.chars().count() as u32;
    if count == 0 {
        return 0;
    }
    (count * GLYPH_ADVANCE - 1) * scale
}

/// Height in pixels of one text line rendered at `scale`.
pub fn text_height(scale: u32) -> u32 {
    GLYPH_HEIGHT * scale
}

/// Largest scale in `1..=preferred` whose rendering of `text` fits `max_width`.
pub fn fit_text_scale(text: &str, max_width: u32, preferred: u32) -> u32 {
    (1..=preferred.max(1))
        .rev()
        .find(|scale| text_width(text, *scale) <= max_width)
        .unwrap_or(1)
}

/// Draws `text` with its top-left corner at `(x, y)`.
pub fn draw_text(canvas: &mut RgbaImage, x: i64, y: i64, text: &str, scale: u32, color: Rgba<u8>) {
    let scale = i64::from(scale.max(1));
    let advance = i64::from(GLYPH_ADVANCE) * scale;

    for (position, ch) in text.chars().enumerate() {
        let origin_x = x + position as i64 * advance;
        for (row, bits) in glyph(ch).iter().enumerate() {
            for column in 0..GLYPH_WIDTH {
                if bits & (0x10 >> column) == 0 {
                    continue;
                }
                fill_rect(
                    canvas,
                    origin_x + i64::from(column) * scale,
                    y + row as i64 * scale,
                    scale,
                    scale,
                    color,
                );
            }
        }
    }
}

/// Draws `text` horizontally centred on `center_x`.
pub fn draw_text_centered(
    canvas: &mut RgbaImage,
    center_x: i64,
    y: i64,
    text: &str,
    scale: u32,
    color: Rgba<u8>,
) {
    let half_width = i64::from(text_width(text, scale)) / 2;
    draw_text(canvas, center_x - half_width, y, text, scale, color);
}
