use anyhow::Result;

use super::{Color, Surface};
use crate::detect::BoundingBox;
use crate::frame::Frame;

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Clear,
    Frame {
        sequence: u64,
        width: u32,
        height: u32,
    },
    Rect {
        bbox: BoundingBox,
        line_width: u32,
        color: Color,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        color: Color,
    },
}

/// Surface that records draw calls instead of rasterizing them.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Operations since the most recent `clear`, i.e. the current picture.
    pub fn current(&self) -> &[DrawOp] {
        let start = self
            .ops
            .iter()
            .rposition(|op| *op == DrawOp::Clear)
            .map_or(0, |idx| idx + 1);
        &self.ops[start..]
    }

    pub fn rects(&self) -> Vec<BoundingBox> {
        self.current()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect { bbox, .. } => Some(*bbox),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<(String, f32, f32)> {
        self.current()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, x, y, .. } => Some((text.clone(), *x, *y)),
                _ => None,
            })
            .collect()
    }

    /// True when nothing has been drawn since the last clear.
    pub fn is_blank(&self) -> bool {
        self.current().is_empty()
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn draw_frame(&mut self, frame: &Frame) -> Result<()> {
        self.ops.push(DrawOp::Frame {
            sequence: frame.sequence,
            width: frame.width,
            height: frame.height,
        });
        Ok(())
    }

    fn stroke_rect(&mut self, bbox: &BoundingBox, line_width: u32, color: Color) {
        self.ops.push(DrawOp::Rect {
            bbox: *bbox,
            line_width,
            color,
        });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Color) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            color,
        });
    }
}
