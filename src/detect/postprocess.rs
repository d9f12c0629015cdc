//! Decoding of raw detector output into `Detection`s.
//!
//! Models exported in the YOLOv8 layout produce a single `[1, 4 + C, N]`
//! tensor: for each of the `N` proposals, `cx, cy, w, h` in model-input pixels
//! followed by `C` class scores. Decoding keeps the best class per proposal,
//! drops proposals at or below the confidence threshold, maps boxes back to frame
//! pixels, and suppresses overlapping boxes of the same class.

use anyhow::{anyhow, Result};

use crate::detect::result::{BoundingBox, Detection};

/// Geometry needed to map model-input coordinates back to the frame.
#[derive(Clone, Copy, Debug)]
pub struct DecodeGeometry {
    pub input_width: u32,
    pub input_height: u32,
    pub frame_width: u32,
    pub frame_height: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct DecodeThresholds {
    pub confidence: f32,
    pub iou: f32,
}

/// Decode a row-major `[4 + classes, proposals]` score matrix.
pub fn decode_proposals(
    data: &[f32],
    rows: usize,
    proposals: usize,
    labels: &[String],
    geometry: DecodeGeometry,
    thresholds: DecodeThresholds,
) -> Result<Vec<Detection>> {
    if rows < 5 {
        return Err(anyhow!("detector output has {} rows, expected at least 5", rows));
    }
    if data.len() != rows * proposals {
        return Err(anyhow!(
            "detector output has {} values, expected {}x{}",
            data.len(),
            rows,
            proposals
        ));
    }
    let classes = rows - 4;
    let scale_x = geometry.frame_width as f32 / geometry.input_width as f32;
    let scale_y = geometry.frame_height as f32 / geometry.input_height as f32;
    let frame_w = geometry.frame_width as f32;
    let frame_h = geometry.frame_height as f32;

    let mut candidates: Vec<(usize, Detection)> = Vec::new();
    for i in 0..proposals {
        let mut best_class = 0usize;
        let mut best_score = f32::NEG_INFINITY;
        for c in 0..classes {
            let score = data[(4 + c) * proposals + i];
            if score > best_score {
                best_score = score;
                best_class = c;
            }
        }
        // Strictly above the threshold.
        if best_score <= thresholds.confidence {
            continue;
        }

        let cx = data[i];
        let cy = data[proposals + i];
        let w = data[2 * proposals + i];
        let h = data[3 * proposals + i];

        let x1 = ((cx - w / 2.0) * scale_x).clamp(0.0, frame_w);
        let y1 = ((cy - h / 2.0) * scale_y).clamp(0.0, frame_h);
        let x2 = ((cx + w / 2.0) * scale_x).clamp(0.0, frame_w);
        let y2 = ((cy + h / 2.0) * scale_y).clamp(0.0, frame_h);
        if x2 <= x1 || y2 <= y1 {
            continue;
        }

        let label = labels
            .get(best_class)
            .cloned()
            .unwrap_or_else(|| format!("class_{}", best_class));
        candidates.push((
            best_class,
            Detection::new(
                label,
                best_score.min(1.0),
                BoundingBox::new(x1, y1, x2 - x1, y2 - y1),
            ),
        ));
    }

    Ok(nms_per_class(candidates, thresholds.iou))
}

/// Greedy NMS: highest score first, suppress same-class boxes above `iou_thresh`.
///
/// The result is ordered by descending confidence.
pub fn nms_per_class(mut candidates: Vec<(usize, Detection)>, iou_thresh: f32) -> Vec<Detection> {
    candidates.sort_by(|a, b| {
        b.1.confidence
            .partial_cmp(&a.1.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut suppressed = vec![false; candidates.len()];
    let mut kept = Vec::new();
    for i in 0..candidates.len() {
        if suppressed[i] {
            continue;
        }
        for j in (i + 1)..candidates.len() {
            if candidates[i].0 == candidates[j].0
                && candidates[i].1.bbox.iou(&candidates[j].1.bbox) > iou_thresh
            {
                suppressed[j] = true;
            }
        }
        kept.push(candidates[i].1.clone());
    }
    kept
}
