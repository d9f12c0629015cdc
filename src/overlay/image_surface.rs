use std::path::Path;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use anyhow::{anyhow, Context, Result};
use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use super::{Color, Surface, LABEL_FONT_PX, SURFACE_HEIGHT, SURFACE_WIDTH};
use crate::detect::BoundingBox;
use crate::frame::Frame;

/// In-memory RGB canvas of the fixed surface size.
///
/// Label text needs a TrueType font; without one, `fill_text` is a no-op.
pub struct ImageSurface {
    canvas: RgbImage,
    font: Option<FontVec>,
    font_scale: PxScale,
    warned_no_font: bool,
}

impl Default for ImageSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageSurface {
    pub fn new() -> Self {
        Self {
            canvas: RgbImage::new(SURFACE_WIDTH, SURFACE_HEIGHT),
            font: None,
            font_scale: PxScale::from(LABEL_FONT_PX),
            warned_no_font: false,
        }
    }

    /// Load a TTF/OTF font for label text.
    pub fn with_font_file(mut self, path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("failed to read font {}", path.display()))?;
        let font = FontVec::try_from_vec(data)
            .map_err(|err| anyhow!("invalid font {}: {}", path.display(), err))?;
        self.font = Some(font);
        Ok(self)
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn canvas(&self) -> &RgbImage {
        &self.canvas
    }

    /// True when every pixel is black.
    pub fn is_blank(&self) -> bool {
        self.canvas.pixels().all(|px| px.0 == Color::BLACK.0)
    }
}

impl Surface for ImageSurface {
    fn clear(&mut self) {
        for px in self.canvas.pixels_mut() {
            *px = Rgb(Color::BLACK.0);
        }
    }

    fn draw_frame(&mut self, frame: &Frame) -> Result<()> {
        let image = RgbImage::from_raw(frame.width, frame.height, frame.pixels().to_vec())
            .ok_or_else(|| anyhow!("frame buffer does not match its dimensions"))?;
        self.canvas = if frame.width == SURFACE_WIDTH && frame.height == SURFACE_HEIGHT {
            image
        } else {
            imageops::resize(
                &image,
                SURFACE_WIDTH,
                SURFACE_HEIGHT,
                imageops::FilterType::Triangle,
            )
        };
        Ok(())
    }

    fn stroke_rect(&mut self, bbox: &BoundingBox, line_width: u32, color: Color) {
        let x = bbox.x.round() as i32;
        let y = bbox.y.round() as i32;
        let width = bbox.width.round().max(1.0) as u32;
        let height = bbox.height.round().max(1.0) as u32;

        // Nested 1px outlines, centered on the box edge.
        let half = (line_width / 2) as i32;
        for inset in 0..line_width.max(1) as i32 {
            let offset = inset - half;
            let w = width as i32 - 2 * offset;
            let h = height as i32 - 2 * offset;
            if w < 1 || h < 1 {
                break;
            }
            let rect = Rect::at(x + offset, y + offset).of_size(w as u32, h as u32);
            draw_hollow_rect_mut(&mut self.canvas, rect, Rgb(color.0));
        }
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Color) {
        let Some(font) = self.font.as_ref() else {
            if !self.warned_no_font {
                log::debug!("ImageSurface: no font configured, skipping label text");
                self.warned_no_font = true;
            }
            return;
        };
        // `y` is the baseline; imageproc positions text by its top edge.
        let ascent = font.as_scaled(self.font_scale).ascent();
        let top = (y - ascent).round() as i32;
        draw_text_mut(
            &mut self.canvas,
            Rgb(color.0),
            x.round() as i32,
            top,
            self.font_scale,
            font,
            text,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_surface_is_blank_and_fixed_size() {
        let surface = ImageSurface::new();
        assert_eq!(surface.canvas().dimensions(), (SURFACE_WIDTH, SURFACE_HEIGHT));
        assert!(surface.is_blank());
    }

    #[test]
    fn frames_are_stretched_to_the_surface() {
        let mut surface = ImageSurface::new();
        let frame = Frame::new(vec![200u8; 32 * 24 * 3], 32, 24, 1).unwrap();
        surface.draw_frame(&frame).unwrap();

        assert_eq!(surface.canvas().dimensions(), (SURFACE_WIDTH, SURFACE_HEIGHT));
        assert_eq!(surface.canvas().get_pixel(639, 479).0, [200, 200, 200]);

        surface.clear();
        assert!(surface.is_blank());
    }

    #[test]
    fn stroke_rect_outlines_without_filling() {
        let mut surface = ImageSurface::new();
        surface.stroke_rect(&BoundingBox::new(10.0, 20.0, 30.0, 40.0), 2, Color::RED);

        let canvas = surface.canvas();
        assert_eq!(canvas.get_pixel(10, 20).0, Color::RED.0);
        assert_eq!(canvas.get_pixel(39, 59).0, Color::RED.0);
        assert_eq!(canvas.get_pixel(25, 40).0, Color::BLACK.0);
    }

    #[test]
    fn text_without_font_is_skipped() {
        let mut surface = ImageSurface::new();
        surface.fill_text("person (90%)", 10.0, 15.0, Color::RED);
        assert!(surface.is_blank());
    }

    #[test]
    fn missing_font_file_is_an_error() {
        let result = ImageSurface::new().with_font_file(Path::new("/nonexistent/font.ttf"));
        assert!(result.is_err());
    }
}
