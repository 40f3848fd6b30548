#![warn(missing_docs)]
//! # photobooth-collage
//!
//! ## Purpose
//! Renders the filled slots of a session into one vertical photo strip.
//!
//! ## Responsibilities
//! - Compute a layout whose height depends only on the filled count.
//! - Decode every slot photo first, then render in one pass.
//! - Degrade a slot that fails to decode into a placeholder card instead of
//!   failing the whole strip.
//! - Produce the header title and footer status captions.
//!
//! ## Data flow
//! [`SlotSession`] -> [`compute_layout`] -> decode phase -> render phase ->
//! [`Collage`] (preview on every commit, export on request).
//!
//! ## Ownership and lifetimes
//! The session is only borrowed; the collage owns a fresh raster plus the
//! layout it was drawn from.
//!
//! ## Error model
//! A canvas outside [`MIN_CANVAS_WIDTH`]..=[`MAX_CANVAS_WIDTH`], or a strip
//! taller than [`MAX_CANVAS_HEIGHT`], returns [`CollageError`]. Per-slot
//! decode failures never surface as errors; they are listed in
//! [`Collage::degraded_slots`].
//!
//! ## Layout rules
//! Rows are assigned in drawn order: the k-th occupied slot (ascending
//! index) takes the k-th row. Captions keep the slot's own index, so with
//! only slots 1 and 3 filled the rows read `Slot 1`, `Slot 3`.

use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use log::{debug, warn};
use photobooth_core::raster::{
    draw_hline, draw_text_centered, fill_rect, fit_text_scale, stroke_rect, text_height,
    vertical_gradient,
};
use photobooth_core::{Bitmap, CoreError, SlotIndex};
use photobooth_session::SlotSession;
use thiserror::Error;
use time::Date;

/// Canvas width of the live preview strip.
pub const PREVIEW_WIDTH: u32 = 400;
/// Canvas width of the exported strip.
pub const EXPORT_WIDTH: u32 = 1200;
/// Horizontal padding between canvas edge and photo cards.
pub const OUTER_PADDING: u32 = 40;
/// Vertical gap after each row's caption.
pub const PHOTO_SPACING: u32 = 30;
/// Height reserved under each photo for its caption.
pub const LABEL_HEIGHT: u32 = 40;
/// Height of the title bar.
pub const HEADER_HEIGHT: u32 = 100;
/// Height of the status footer.
pub const FOOTER_HEIGHT: u32 = 120;
/// Lower bound for the canvas height.
pub const MIN_HEIGHT: u32 = 600;
/// Inset of a photo inside its white card.
pub const CARD_PADDING: u32 = 10;
/// Narrowest canvas that still leaves room for a photo.
pub const MIN_CANVAS_WIDTH: u32 = 2 * OUTER_PADDING + 4 * CARD_PADDING;
/// Widest canvas a strip may be rendered at.
pub const MAX_CANVAS_WIDTH: u32 = 4096;
/// Tallest canvas a strip may grow to.
pub const MAX_CANVAS_HEIGHT: u32 = 65_535;
/// Size of the empty-session placeholder.
pub const PLACEHOLDER_SIZE: (u32, u32) = (800, 600);
/// Caption of the empty-session placeholder.
pub const EMPTY_CAPTION: &str = "No photos yet";

const BACKGROUND_TOP: Rgba<u8> = Rgba([255, 236, 239, 255]);
const BACKGROUND_BOTTOM: Rgba<u8> = Rgba([232, 222, 255, 255]);
const HEADER_COLOR: Rgba<u8> = Rgba([51, 51, 51, 255]);
const TITLE_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
/// Fill of a regular photo card.
pub const CARD_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const CARD_BORDER: Rgba<u8> = Rgba([200, 200, 200, 255]);
/// Fill of a card whose photo failed to decode.
pub const PLACEHOLDER_CARD_COLOR: Rgba<u8> = Rgba([204, 204, 204, 255]);
const PLACEHOLDER_TEXT: Rgba<u8> = Rgba([120, 120, 120, 255]);
const CAPTION_COLOR: Rgba<u8> = Rgba([68, 68, 68, 255]);
const SEPARATOR_COLOR: Rgba<u8> = Rgba([180, 180, 180, 255]);

/// Placement of one occupied slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollageRow {
    /// Slot rendered in this row.
    pub slot: SlotIndex,
    /// Zero-based row number in drawn order.
    pub row: usize,
    /// Top edge of the photo card.
    pub y_offset: u32,
    /// Card width.
    pub photo_width: u32,
    /// Card height (always 4:3 of the width).
    pub photo_height: u32,
}

impl CollageRow {
    /// Left edge of the photo card.
    pub fn x_offset(&self) -> u32 {
        OUTER_PADDING
    }

    /// Caption under the card, based on the slot index rather than the row.
    pub fn caption(&self) -> String {
        self.slot.to_string()
    }
}

/// Geometry of a non-empty strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollageLayout {
    /// Canvas width.
    pub canvas_width: u32,
    /// Canvas height.
    pub canvas_height: u32,
    /// Rows in drawn order.
    pub rows: Vec<CollageRow>,
    /// Slots in the session (N).
    pub slot_count: usize,
}

impl CollageLayout {
    /// Number of rendered rows.
    pub fn filled_count(&self) -> usize {
        self.rows.len()
    }

    /// Top of the footer area.
    pub fn footer_top(&self) -> u32 {
        let rows = u32::try_from(self.rows.len()).unwrap_or(u32::MAX);
        rows.saturating_mul(row_height(self.canvas_width))
            .saturating_add(HEADER_HEIGHT)
    }
}

/// Rendered strip plus the data it was drawn from.
#[derive(Debug, Clone)]
pub struct Collage {
    /// Flattened strip image.
    pub bitmap: Bitmap,
    /// Layout used; `None` for the empty-session placeholder.
    pub layout: Option<CollageLayout>,
    /// Header title, `PHOTO STRIP (k/N)`.
    pub title: String,
    /// Footer status caption.
    pub status: String,
    /// Footer date caption; absent on the placeholder.
    pub date_caption: Option<String>,
    /// Slots drawn as placeholders because their photo failed to decode.
    pub degraded_slots: Vec<SlotIndex>,
}

impl Collage {
    /// Returns `true` for the empty-session placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.layout.is_none()
    }
}

/// Header title for `filled` photos out of `slot_count`.
pub fn title_caption(filled: usize, slot_count: usize) -> String {
    format!("PHOTO STRIP ({filled}/{slot_count})")
}

/// Footer status for `filled` photos out of `slot_count`.
pub fn status_caption(filled: usize, slot_count: usize) -> String {
    if filled == 0 {
        return EMPTY_CAPTION.to_string();
    }
    if filled >= slot_count {
        return format!("Complete photo strip ({slot_count}/{slot_count})");
    }

    let plural = if filled == 1 { "" } else { "s" };
    format!(
        "{filled} photo{plural} - Add {} more for complete strip",
        slot_count - filled
    )
}

/// Footer date caption, e.g. `October 19, 2026`.
pub fn date_caption(date: Date) -> String {
    format!("{} {}, {}", date.month(), date.day(), date.year())
}

fn photo_size(canvas_width: u32) -> (u32, u32) {
    let width = canvas_width.saturating_sub(2 * OUTER_PADDING);
    let height = u64::from(width) * 3 / 4;
    (width, u32::try_from(height).unwrap_or(u32::MAX))
}

fn row_height(canvas_width: u32) -> u32 {
    photo_size(canvas_width)
        .1
        .saturating_add(PHOTO_SPACING + LABEL_HEIGHT)
}

/// Canvas height of a strip with `rows` photos at `canvas_width`.
///
/// # Errors
/// Returns the width errors of [`compute_layout`], or
/// [`CollageError::CanvasTooTall`] above [`MAX_CANVAS_HEIGHT`].
pub fn canvas_height_for(rows: usize, canvas_width: u32) -> Result<u32, CollageError> {
    if canvas_width < MIN_CANVAS_WIDTH {
        return Err(CollageError::CanvasTooNarrow {
            width: canvas_width,
            minimum: MIN_CANVAS_WIDTH,
        });
    }
    if canvas_width > MAX_CANVAS_WIDTH {
        return Err(CollageError::CanvasTooWide {
            width: canvas_width,
            maximum: MAX_CANVAS_WIDTH,
        });
    }

    let content_height = u64::try_from(rows)
        .unwrap_or(u64::MAX)
        .saturating_mul(u64::from(row_height(canvas_width)))
        .saturating_add(u64::from(HEADER_HEIGHT + FOOTER_HEIGHT))
        .max(u64::from(MIN_HEIGHT));
    match u32::try_from(content_height) {
        Ok(height) if height <= MAX_CANVAS_HEIGHT => Ok(height),
        _ => Err(CollageError::CanvasTooTall {
            height: content_height,
            maximum: MAX_CANVAS_HEIGHT,
        }),
    }
}

/// Computes the strip geometry for the given occupied slots.
///
/// Input order does not matter; rows always follow ascending slot index.
///
/// # Errors
/// - [`CollageError::CanvasTooNarrow`] below [`MIN_CANVAS_WIDTH`].
/// - [`CollageError::CanvasTooWide`] above [`MAX_CANVAS_WIDTH`].
/// - [`CollageError::CanvasTooTall`] when the rows exceed [`MAX_CANVAS_HEIGHT`].
pub fn compute_layout(
    occupied: &[SlotIndex],
    slot_count: usize,
    canvas_width: u32,
) -> Result<CollageLayout, CollageError> {
    let mut ordered = occupied.to_vec();
    ordered.sort_unstable();
    ordered.dedup();

    let canvas_height = canvas_height_for(ordered.len(), canvas_width)?;
    let (photo_width, photo_height) = photo_size(canvas_width);
    let row_height = row_height(canvas_width);
    let rows: Vec<CollageRow> = ordered
        .into_iter()
        .enumerate()
        .map(|(row, slot)| CollageRow {
            slot,
            row,
            y_offset: HEADER_HEIGHT + row as u32 * row_height,
            photo_width,
            photo_height,
        })
        .collect();

    Ok(CollageLayout {
        canvas_width,
        canvas_height,
        rows,
        slot_count,
    })
}

/// Assembles the strip for the live preview ([`PREVIEW_WIDTH`]).
///
/// # Errors
/// See [`assemble`].
pub fn assemble_preview(session: &SlotSession, date: Date) -> Result<Collage, CollageError> {
    assemble(session, PREVIEW_WIDTH, date)
}

/// Assembles the strip for export ([`EXPORT_WIDTH`]).
///
/// # Errors
/// See [`assemble`].
pub fn assemble_export(session: &SlotSession, date: Date) -> Result<Collage, CollageError> {
    assemble(session, EXPORT_WIDTH, date)
}

/// Renders every occupied slot of `session` into one strip.
///
/// An empty session always yields the fixed-size placeholder, whatever the
/// requested width.
///
/// # Errors
/// Returns the [`compute_layout`] errors when a non-empty session cannot be
/// laid out at `canvas_width`.
pub fn assemble(
    session: &SlotSession,
    canvas_width: u32,
    date: Date,
) -> Result<Collage, CollageError> {
    let slot_count = session.slot_count();
    if session.filled_count() == 0 {
        return Ok(render_placeholder(slot_count));
    }

    let layout = compute_layout(&session.occupied_indices(), slot_count, canvas_width)?;
    let decoded = decode_rows(session, &layout);

    let mut canvas = RgbaImage::new(layout.canvas_width, layout.canvas_height);
    vertical_gradient(&mut canvas, BACKGROUND_TOP, BACKGROUND_BOTTOM);

    let title = title_caption(layout.filled_count(), slot_count);
    draw_header(&mut canvas, &title);

    let mut degraded_slots = Vec::new();
    for (row, pixels) in layout.rows.iter().zip(&decoded) {
        match pixels {
            Ok(pixels) => draw_photo_card(&mut canvas, row, pixels),
            Err(error) => {
                warn!("{} could not be decoded, drawing placeholder: {error}", row.slot);
                draw_placeholder_card(&mut canvas, row);
                degraded_slots.push(row.slot);
            }
        }
        draw_row_caption(&mut canvas, row);
    }

    let status = status_caption(layout.filled_count(), slot_count);
    let date_text = date_caption(date);
    draw_footer(&mut canvas, &layout, &status, &date_text);

    debug!(
        "assembled {}x{} strip with {} rows",
        layout.canvas_width,
        layout.canvas_height,
        layout.rows.len()
    );

    Ok(Collage {
        bitmap: Bitmap::from_image(canvas),
        layout: Some(layout),
        title,
        status,
        date_caption: Some(date_text),
        degraded_slots,
    })
}

// Decodes every row up front so rendering never interleaves with decoding.
fn decode_rows(
    session: &SlotSession,
    layout: &CollageLayout,
) -> Vec<Result<Arc<RgbaImage>, CoreError>> {
    layout
        .rows
        .iter()
        .map(|row| {
            session
                .slot(row.slot)
                .and_then(|slot| slot.image())
                .ok_or_else(|| CoreError::Decode(format!("{} is empty", row.slot)))
                .and_then(Bitmap::decode)
        })
        .collect()
}

fn render_placeholder(slot_count: usize) -> Collage {
    let (width, height) = PLACEHOLDER_SIZE;
    let mut canvas = RgbaImage::new(width, height);
    vertical_gradient(&mut canvas, BACKGROUND_TOP, BACKGROUND_BOTTOM);

    let scale = fit_text_scale(EMPTY_CAPTION, width - 2 * OUTER_PADDING, 4);
    let y = i64::from(height / 2) - i64::from(text_height(scale) / 2);
    draw_text_centered(
        &mut canvas,
        i64::from(width / 2),
        y,
        EMPTY_CAPTION,
        scale,
        CAPTION_COLOR,
    );

    Collage {
        bitmap: Bitmap::from_image(canvas),
        layout: None,
        title: title_caption(0, slot_count),
        status: EMPTY_CAPTION.to_string(),
        date_caption: None,
        degraded_slots: Vec::new(),
    }
}

fn draw_header(canvas: &mut RgbaImage, title: &str) {
    let width = canvas.width();
    fill_rect(
        canvas,
        0,
        0,
        i64::from(width),
        i64::from(HEADER_HEIGHT),
        HEADER_COLOR,
    );

    let scale = fit_text_scale(title, width.saturating_sub(2 * OUTER_PADDING), 4);
    let y = i64::from(HEADER_HEIGHT / 2) - i64::from(text_height(scale) / 2);
    draw_text_centered(canvas, i64::from(width / 2), y, title, scale, TITLE_COLOR);
}

fn card_bounds(row: &CollageRow) -> (i64, i64, i64, i64) {
    (
        i64::from(row.x_offset()),
        i64::from(row.y_offset),
        i64::from(row.photo_width),
        i64::from(row.photo_height),
    )
}

fn draw_photo_card(canvas: &mut RgbaImage, row: &CollageRow, pixels: &RgbaImage) {
    let (x, y, width, height) = card_bounds(row);
    fill_rect(canvas, x, y, width, height, CARD_COLOR);

    let box_width = row.photo_width.saturating_sub(2 * CARD_PADDING);
    let box_height = row.photo_height.saturating_sub(2 * CARD_PADDING);
    let (fit_width, fit_height) = fit_within(pixels.width(), pixels.height(), box_width, box_height);
    if fit_width > 0 && fit_height > 0 {
        let scaled = if (fit_width, fit_height) == (pixels.width(), pixels.height()) {
            pixels.clone()
        } else {
            imageops::resize(pixels, fit_width, fit_height, FilterType::Triangle)
        };
        let photo_x = x + i64::from(CARD_PADDING) + i64::from((box_width - fit_width) / 2);
        let photo_y = y + i64::from(CARD_PADDING) + i64::from((box_height - fit_height) / 2);
        imageops::overlay(canvas, &scaled, photo_x, photo_y);
    }

    stroke_rect(canvas, x, y, width, height, 1, CARD_BORDER);
}

fn draw_placeholder_card(canvas: &mut RgbaImage, row: &CollageRow) {
    let (x, y, width, height) = card_bounds(row);
    fill_rect(canvas, x, y, width, height, PLACEHOLDER_CARD_COLOR);

    let text = format!("Photo {}", row.slot.number());
    let scale = fit_text_scale(&text, row.photo_width, 3);
    let text_y = y + height / 2 - i64::from(text_height(scale) / 2);
    draw_text_centered(canvas, x + width / 2, text_y, &text, scale, PLACEHOLDER_TEXT);

    stroke_rect(canvas, x, y, width, height, 1, CARD_BORDER);
}

fn draw_row_caption(canvas: &mut RgbaImage, row: &CollageRow) {
    let caption = row.caption();
    let scale = fit_text_scale(&caption, row.photo_width, 2);
    let label_top = i64::from(row.y_offset + row.photo_height);
    let y = label_top + i64::from(LABEL_HEIGHT / 2) - i64::from(text_height(scale) / 2);
    let center_x = i64::from(row.x_offset() + row.photo_width / 2);
    draw_text_centered(canvas, center_x, y, &caption, scale, CAPTION_COLOR);
}

fn draw_footer(canvas: &mut RgbaImage, layout: &CollageLayout, status: &str, date: &str) {
    let width = layout.canvas_width;
    let top = i64::from(layout.footer_top());
    let content_width = width - 2 * OUTER_PADDING;

    draw_hline(
        canvas,
        i64::from(OUTER_PADDING),
        i64::from(width - OUTER_PADDING),
        top + 10,
        SEPARATOR_COLOR,
    );

    let center_x = i64::from(width / 2);
    let status_scale = fit_text_scale(status, content_width, 2);
    draw_text_centered(canvas, center_x, top + 30, status, status_scale, HEADER_COLOR);

    let date_scale = fit_text_scale(date, content_width, 2);
    draw_text_centered(canvas, center_x, top + 70, date, date_scale, CAPTION_COLOR);
}

fn fit_within(width: u32, height: u32, box_width: u32, box_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let scale = f64::min(
        f64::from(box_width) / f64::from(width),
        f64::from(box_height) / f64::from(height),
    );
    let fit_width = (f64::from(width) * scale).round() as u32;
    let fit_height = (f64::from(height) * scale).round() as u32;
    (fit_width.min(box_width), fit_height.min(box_height))
}

/// Error type for collage assembly.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollageError {
    /// Canvas cannot fit padding plus a photo.
    #[error("canvas width {width} is below the minimum of {minimum}")]
    CanvasTooNarrow {
        /// Requested width.
        width: u32,
        /// Minimum usable width.
        minimum: u32,
    },
    /// Canvas is wider than a strip may be rendered.
    #[error("canvas width {width} exceeds the maximum of {maximum}")]
    CanvasTooWide {
        /// Requested width.
        width: u32,
        /// Maximum usable width.
        maximum: u32,
    },
    /// Rows would make the strip taller than the canvas limit.
    #[error("strip height {height} exceeds the maximum of {maximum}")]
    CanvasTooTall {
        /// Height the rows would need.
        height: u64,
        /// Maximum canvas height.
        maximum: u32,
    },
    /// Pixel materialization failed outside a slot.
    #[error(transparent)]
    Core(#[from] CoreError),
}

#[cfg(test)]
mod tests {
    //! Unit tests for layout arithmetic and captions.

    use super::*;

    #[test]
    fn export_layout_matches_expected_geometry() {
        let layout = compute_layout(
            &[SlotIndex::new(0), SlotIndex::new(1), SlotIndex::new(2)],
            3,
            EXPORT_WIDTH,
        )
        .expect("layout");

        // 1120 wide photos, 840 tall, rows of 840 + 30 + 40.
        assert_eq!(layout.rows[0].photo_width, 1120);
        assert_eq!(layout.rows[0].photo_height, 840);
        assert_eq!(layout.rows[1].y_offset, 100 + 910);
        assert_eq!(layout.canvas_height, 100 + 3 * 910 + 120);
    }

    #[test]
    fn short_strips_use_the_minimum_height() {
        let layout = compute_layout(&[SlotIndex::new(0)], 3, MIN_CANVAS_WIDTH).expect("layout");
        assert_eq!(layout.canvas_height, MIN_HEIGHT);
    }

    #[test]
    fn status_caption_tracks_filled_count() {
        assert_eq!(status_caption(1, 3), "1 photo - Add 2 more for complete strip");
        assert_eq!(status_caption(2, 3), "2 photos - Add 1 more for complete strip");
        assert_eq!(status_caption(3, 3), "Complete photo strip (3/3)");
        assert_eq!(title_caption(2, 3), "PHOTO STRIP (2/3)");
    }

    #[test]
    fn narrow_canvas_is_rejected() {
        assert_eq!(
            compute_layout(&[SlotIndex::new(0)], 3, 50),
            Err(CollageError::CanvasTooNarrow {
                width: 50,
                minimum: MIN_CANVAS_WIDTH
            })
        );
    }

    #[test]
    fn huge_canvas_width_is_rejected_without_overflow() {
        assert_eq!(
            compute_layout(&[SlotIndex::new(0)], 3, u32::MAX),
            Err(CollageError::CanvasTooWide {
                width: u32::MAX,
                maximum: MAX_CANVAS_WIDTH
            })
        );
        assert!(compute_layout(&[SlotIndex::new(0)], 3, MAX_CANVAS_WIDTH).is_ok());
    }

    #[test]
    fn too_many_rows_are_rejected() {
        let occupied: Vec<SlotIndex> = (0..100).map(SlotIndex::new).collect();
        let result = compute_layout(&occupied, 100, EXPORT_WIDTH);
        assert_eq!(
            result,
            Err(CollageError::CanvasTooTall {
                height: 100 + 100 * 910 + 120,
                maximum: MAX_CANVAS_HEIGHT
            })
        );
        assert!(matches!(
            canvas_height_for(usize::MAX, MAX_CANVAS_WIDTH),
            Err(CollageError::CanvasTooTall { .. })
        ));
    }

    #[test]
    fn fit_within_preserves_aspect() {
        assert_eq!(fit_within(1200, 900, 1100, 820), (1093, 820));
        assert_eq!(fit_within(4, 3, 400, 300), (400, 300));
    }
}
