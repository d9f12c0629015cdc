mod backend;
mod backends;
mod labels;
mod postprocess;
mod result;

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};

use crate::alerts::HELMET_LABEL;
use crate::config::DetectorSettings;

pub use backend::DetectorBackend;
pub use backends::StubBackend;
#[cfg(feature = "backend-tract")]
pub use backends::TractBackend;
pub use labels::{coco_labels, load_labels, COCO_CLASSES};
pub use postprocess::{decode_proposals, nms_per_class, DecodeGeometry, DecodeThresholds};
pub use result::{BoundingBox, Detection};

/// Detector implementations selectable at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    #[default]
    Stub,
    Tract,
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stub" => Ok(Self::Stub),
            "tract" | "onnx" => Ok(Self::Tract),
            other => Err(anyhow!("unknown detector backend '{}'", other)),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stub => f.write_str("stub"),
            Self::Tract => f.write_str("tract"),
        }
    }
}

/// Build and warm up the configured detector.
///
/// Warns when the backend publishes a label set without a "helmet" class,
/// since the no-helmet rule would then fire for every rider.
pub fn load_backend(settings: &DetectorSettings) -> Result<Box<dyn DetectorBackend>> {
    let mut backend: Box<dyn DetectorBackend> = match settings.backend {
        BackendKind::Stub => {
            log::warn!(
                "stub detector active: detections and alerts come from a scripted demo, not the camera; \
                 set detector.backend = \"tract\" with a model for real inference"
            );
            Box::new(StubBackend::demo())
        }
        BackendKind::Tract => load_tract(settings)?,
    };
    backend.warm_up()?;

    if let Some(labels) = backend.labels() {
        if !labels.iter().any(|label| label == HELMET_LABEL) {
            log::warn!(
                "detector '{}' has no '{}' class ({} labels); every detected rider will raise a no-helmet alert",
                backend.name(),
                HELMET_LABEL,
                labels.len()
            );
        }
    }
    log::info!("detector backend '{}' ready", backend.name());
    Ok(backend)
}

#[cfg(feature = "backend-tract")]
fn load_tract(settings: &DetectorSettings) -> Result<Box<dyn DetectorBackend>> {
    let model_path = settings
        .model_path
        .as_ref()
        .ok_or_else(|| anyhow!("tract backend requires a model path"))?;
    let mut backend = TractBackend::new(model_path, settings.input_size)?
        .with_threshold(settings.confidence_threshold);
    if let Some(path) = settings.labels_path.as_ref() {
        backend = backend.with_labels(load_labels(path)?);
    }
    Ok(Box::new(backend))
}

#[cfg(not(feature = "backend-tract"))]
fn load_tract(_settings: &DetectorSettings) -> Result<Box<dyn DetectorBackend>> {
    Err(anyhow!(
        "tract backend not available (build with --features backend-tract)"
    ))
}
