use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::capture::DEFAULT_FPS;
use crate::detect::BackendKind;
use crate::ingest::{CameraConfig, DEFAULT_CAMERA_DEVICE, MAX_CAMERA_DIMENSION};
use crate::overlay::{SURFACE_HEIGHT, SURFACE_WIDTH};

pub const CONFIG_ENV: &str = "HELMET_WATCH_CONFIG";

const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;
const DEFAULT_INPUT_SIZE: u32 = 640;

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct WatchConfigFile {
    camera: Option<CameraConfigFile>,
    detector: Option<DetectorConfigFile>,
    overlay: Option<OverlayConfigFile>,
    max_frames: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct CameraConfigFile {
    device: Option<String>,
    target_fps: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct DetectorConfigFile {
    backend: Option<String>,
    model_path: Option<PathBuf>,
    labels_path: Option<PathBuf>,
    confidence_threshold: Option<f32>,
    input_size: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct OverlayConfigFile {
    font_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchConfig {
    pub camera: CameraConfig,
    pub detector: DetectorSettings,
    pub overlay: OverlaySettings,
    /// Stop after this many frames; run until interrupted when `None`.
    pub max_frames: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectorSettings {
    pub backend: BackendKind,
    pub model_path: Option<PathBuf>,
    pub labels_path: Option<PathBuf>,
    pub confidence_threshold: f32,
    /// Square model input side, in pixels.
    pub input_size: u32,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::Stub,
            model_path: None,
            labels_path: None,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            input_size: DEFAULT_INPUT_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlaySettings {
    pub font_path: Option<PathBuf>,
}

/// Command-line values that take precedence over file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub camera: Option<String>,
    pub fps: Option<u32>,
    pub backend: Option<BackendKind>,
    pub model_path: Option<PathBuf>,
    pub labels_path: Option<PathBuf>,
    pub font_path: Option<PathBuf>,
    pub max_frames: Option<u64>,
}

impl WatchConfig {
    /// Load from the file named by `HELMET_WATCH_CONFIG` (if set), then apply
    /// environment overrides and validate.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var(CONFIG_ENV).ok();
        Self::load_from(config_path.as_deref().map(Path::new))
    }

    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, Overrides::default())
    }

    /// File, then environment, then `overrides`; validated once at the end.
    pub fn load_with(path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let file_cfg = match path {
            Some(path) => Some(read_config_file(path)?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default())?;
        cfg.apply_env()?;
        cfg.apply_overrides(overrides);
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: WatchConfigFile) -> Result<Self> {
        let camera_file = file.camera.unwrap_or_default();
        let camera = CameraConfig {
            device: camera_file
                .device
                .unwrap_or_else(|| DEFAULT_CAMERA_DEVICE.to_string()),
            target_fps: camera_file.target_fps.unwrap_or(DEFAULT_FPS),
            width: camera_file.width.unwrap_or(SURFACE_WIDTH),
            height: camera_file.height.unwrap_or(SURFACE_HEIGHT),
        };

        let detector_file = file.detector.unwrap_or_default();
        let backend = match detector_file.backend.as_deref() {
            Some(name) => name.parse()?,
            None => BackendKind::default(),
        };
        let detector = DetectorSettings {
            backend,
            model_path: detector_file.model_path,
            labels_path: detector_file.labels_path,
            confidence_threshold: detector_file
                .confidence_threshold
                .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD),
            input_size: detector_file.input_size.unwrap_or(DEFAULT_INPUT_SIZE),
        };

        let overlay = OverlaySettings {
            font_path: file.overlay.and_then(|overlay| overlay.font_path),
        };

        Ok(Self {
            camera,
            detector,
            overlay,
            max_frames: file.max_frames,
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(device) = env_value("HELMET_WATCH_CAMERA") {
            self.camera.device = device;
        }
        if let Some(fps) = env_value("HELMET_WATCH_FPS") {
            self.camera.target_fps = fps
                .parse()
                .map_err(|_| anyhow!("HELMET_WATCH_FPS must be an integer frame rate"))?;
        }
        if let Some(backend) = env_value("HELMET_WATCH_BACKEND") {
            self.detector.backend = backend.parse()?;
        }
        if let Some(path) = env_value("HELMET_WATCH_MODEL") {
            self.detector.model_path = Some(PathBuf::from(path));
        }
        if let Some(path) = env_value("HELMET_WATCH_LABELS") {
            self.detector.labels_path = Some(PathBuf::from(path));
        }
        if let Some(path) = env_value("HELMET_WATCH_FONT") {
            self.overlay.font_path = Some(PathBuf::from(path));
        }
        if let Some(frames) = env_value("HELMET_WATCH_MAX_FRAMES") {
            let frames: u64 = frames
                .parse()
                .map_err(|_| anyhow!("HELMET_WATCH_MAX_FRAMES must be an integer"))?;
            self.max_frames = Some(frames);
        }
        Ok(())
    }

    /// Apply command-line overrides and re-validate.
    pub fn with_overrides(mut self, overrides: Overrides) -> Result<Self> {
        self.apply_overrides(overrides);
        self.validate()?;
        Ok(self)
    }

    fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(device) = overrides.camera {
            self.camera.device = device;
        }
        if let Some(fps) = overrides.fps {
            self.camera.target_fps = fps;
        }
        if let Some(backend) = overrides.backend {
            self.detector.backend = backend;
        }
        if let Some(path) = overrides.model_path {
            self.detector.model_path = Some(path);
        }
        if let Some(path) = overrides.labels_path {
            self.detector.labels_path = Some(path);
        }
        if let Some(path) = overrides.font_path {
            self.overlay.font_path = Some(path);
        }
        if let Some(frames) = overrides.max_frames {
            self.max_frames = Some(frames);
        }
    }

    fn validate(&mut self) -> Result<()> {
        self.camera.device = self.camera.device.trim().to_string();
        if self.camera.device.is_empty() {
            return Err(anyhow!("camera device must not be empty"));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(anyhow!("camera resolution must be non-zero"));
        }
        if self.camera.width > MAX_CAMERA_DIMENSION || self.camera.height > MAX_CAMERA_DIMENSION {
            return Err(anyhow!(
                "camera resolution {}x{} exceeds {} pixels per side",
                self.camera.width,
                self.camera.height,
                MAX_CAMERA_DIMENSION
            ));
        }
        let threshold = self.detector.confidence_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(anyhow!(
                "confidence threshold must be within [0, 1], got {}",
                threshold
            ));
        }
        if self.detector.input_size == 0 {
            return Err(anyhow!("detector input size must be greater than zero"));
        }
        if self.detector.backend == BackendKind::Tract && self.detector.model_path.is_none() {
            return Err(anyhow!("tract backend requires detector.model_path"));
        }
        Ok(())
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn read_config_file(path: &Path) -> Result<WatchConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = toml::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
