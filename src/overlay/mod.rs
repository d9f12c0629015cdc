//! Display surface and detection overlay.
//!
//! The surface is a fixed 640x480 canvas. Each tick the loop clears it, draws
//! the camera frame stretched to fill it, and then draws one red box plus a
//! confidence label per detection.

mod image_surface;
mod recording;

use anyhow::Result;

use crate::detect::{BoundingBox, Detection};
use crate::frame::Frame;

pub use image_surface::ImageSurface;
pub use recording::{DrawOp, RecordingSurface};

pub const SURFACE_WIDTH: u32 = 640;
pub const SURFACE_HEIGHT: u32 = 480;

pub const BOX_LINE_WIDTH: u32 = 2;
pub const LABEL_FONT_PX: f32 = 18.0;

/// Labels closer than this to the top edge are pinned to it.
const LABEL_MIN_Y: f32 = 10.0;
const LABEL_LIFT: f32 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const RED: Color = Color([255, 0, 0]);
    pub const BLACK: Color = Color([0, 0, 0]);
}

/// A 2D drawing target with canvas-like primitives.
///
/// Coordinates are surface pixels; text is positioned by its baseline.
pub trait Surface {
    fn width(&self) -> u32 {
        SURFACE_WIDTH
    }

    fn height(&self) -> u32 {
        SURFACE_HEIGHT
    }

    fn clear(&mut self);

    /// Draw a frame scaled to cover the whole surface.
    fn draw_frame(&mut self, frame: &Frame) -> Result<()>;

    fn stroke_rect(&mut self, bbox: &BoundingBox, line_width: u32, color: Color);

    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Color);
}

/// `"{class} ({percent}%)"`, with the confidence rounded to a whole percent.
pub fn label_text(detection: &Detection) -> String {
    format!(
        "{} ({}%)",
        detection.class_label,
        (detection.confidence * 100.0).round() as i64
    )
}

/// Baseline origin for a box label: just above the box, or pinned near the
/// top edge when the box starts within 10px of it.
pub fn label_origin(bbox: &BoundingBox) -> (f32, f32) {
    let y = if bbox.y > LABEL_MIN_Y {
        bbox.y - LABEL_LIFT
    } else {
        LABEL_MIN_Y
    };
    (bbox.x, y)
}

/// Draw one detection's box and label.
pub fn draw_detection<S: Surface + ?Sized>(surface: &mut S, detection: &Detection) {
    surface.stroke_rect(&detection.bbox, BOX_LINE_WIDTH, Color::RED);
    let (x, y) = label_origin(&detection.bbox);
    surface.fill_text(&label_text(detection), x, y, Color::RED);
}
