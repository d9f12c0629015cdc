#![cfg(feature = "backend-tract")]

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use image::{imageops, RgbImage};
use tract_onnx::prelude::*;

use crate::detect::backend::DetectorBackend;
use crate::detect::labels::coco_labels;
use crate::detect::postprocess::{decode_proposals, DecodeGeometry, DecodeThresholds};
use crate::detect::result::Detection;
use crate::frame::Frame;

const DEFAULT_IOU_THRESHOLD: f32 = 0.45;

/// Tract-based backend for ONNX object detection.
///
/// Expects a YOLOv8-style export with a single `[1, 4 + C, N]` output and a
/// square RGB input. Frames of any size are resized to the model input;
/// returned boxes are in the original frame's pixel space.
pub struct TractBackend {
    model: TypedRunnableModel<TypedModel>,
    input_size: u32,
    labels: Vec<String>,
    confidence_threshold: f32,
    iou_threshold: f32,
}

impl TractBackend {
    /// Load an ONNX model from disk and prepare it for inference.
    pub fn new<P: AsRef<Path>>(model_path: P, input_size: u32) -> Result<Self> {
        let model_path = model_path.as_ref();
        if input_size == 0 {
            return Err(anyhow!("model input size must be non-zero"));
        }
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(1, 3, input_size as usize, input_size as usize),
                ),
            )
            .context("failed to set input fact")?
            .into_optimized()
            .context("failed to optimize ONNX model")?
            .into_runnable()
            .context("failed to build runnable ONNX model")?;

        Ok(Self {
            model,
            input_size,
            labels: coco_labels(),
            confidence_threshold: 0.5,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
        })
    }

    /// Override the default confidence threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Replace the COCO label set, for models trained on other classes.
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    fn build_input(&self, frame: &Frame) -> Result<Tensor> {
        let image = RgbImage::from_raw(frame.width, frame.height, frame.pixels().to_vec())
            .ok_or_else(|| anyhow!("frame buffer does not match its dimensions"))?;
        let size = self.input_size;
        let resized = if frame.width == size && frame.height == size {
            image
        } else {
            imageops::resize(&image, size, size, imageops::FilterType::Triangle)
        };

        let side = size as usize;
        let input = tract_ndarray::Array4::from_shape_fn((1, 3, side, side), |(_, c, y, x)| {
            resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
        });

        Ok(input.into_tensor())
    }

    fn decode(&self, outputs: TVec<TValue>, frame: &Frame) -> Result<Vec<Detection>> {
        let output = outputs
            .first()
            .ok_or_else(|| anyhow!("model produced no outputs"))?;
        let view = output
            .to_array_view::<f32>()
            .context("model output tensor was not f32")?;
        let shape = view.shape();
        if shape.len() != 3 || shape[0] != 1 {
            return Err(anyhow!("unexpected model output shape {:?}", shape));
        }
        let (rows, proposals) = (shape[1], shape[2]);
        let data: Vec<f32> = view.iter().copied().collect();

        decode_proposals(
            &data,
            rows,
            proposals,
            &self.labels,
            DecodeGeometry {
                input_width: self.input_size,
                input_height: self.input_size,
                frame_width: frame.width,
                frame_height: frame.height,
            },
            DecodeThresholds {
                confidence: self.confidence_threshold,
                iou: self.iou_threshold,
            },
        )
    }
}

impl DetectorBackend for TractBackend {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>> {
        let input = self.build_input(frame)?;
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .context("ONNX inference failed")?;
        self.decode(outputs, frame)
    }

    fn labels(&self) -> Option<&[String]> {
        Some(&self.labels)
    }

    fn warm_up(&mut self) -> Result<()> {
        let blank = Frame::blank(self.input_size, self.input_size, 0)?;
        self.detect(&blank).map(|_| ())
    }
}
