use anyhow::{anyhow, Result};

use super::synthetic::SyntheticSource;
#[cfg(feature = "ingest-v4l2")]
use super::v4l2::DeviceSource;
use super::FrameSource;
use crate::frame::Frame;

pub const DEFAULT_CAMERA_DEVICE: &str = "stub://webcam";
/// Largest accepted frame width or height (8K UHD).
pub const MAX_CAMERA_DIMENSION: u32 = 7680;
const STUB_SCHEME: &str = "stub://";

/// Configuration for the camera.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CameraConfig {
    /// Device path (e.g., "/dev/video0") or `stub://<name>`.
    pub device: String,
    /// Requested frame rate. Devices may ignore it.
    pub target_fps: u32,
    /// Preferred frame width.
    pub width: u32,
    /// Preferred frame height.
    pub height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_CAMERA_DEVICE.to_string(),
            target_fps: 30,
            width: 640,
            height: 480,
        }
    }
}

impl CameraConfig {
    pub fn is_synthetic(&self) -> bool {
        self.device.starts_with(STUB_SCHEME)
    }
}

/// Camera frame source.
///
/// Uses libv4l for real devices, with a synthetic fallback for `stub://` paths.
pub struct CameraSource {
    backend: CameraBackend,
}

enum CameraBackend {
    Synthetic(SyntheticSource),
    #[cfg(feature = "ingest-v4l2")]
    Device(DeviceSource),
}

impl CameraSource {
    pub fn new(config: CameraConfig) -> Result<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(anyhow!(
                "camera resolution must be non-zero (got {}x{})",
                config.width,
                config.height
            ));
        }
        if config.width > MAX_CAMERA_DIMENSION || config.height > MAX_CAMERA_DIMENSION {
            return Err(anyhow!(
                "camera resolution {}x{} exceeds {} pixels per side",
                config.width,
                config.height,
                MAX_CAMERA_DIMENSION
            ));
        }
        if config.is_synthetic() {
            return Ok(Self {
                backend: CameraBackend::Synthetic(SyntheticSource::new(config)),
            });
        }
        Self::device(config)
    }

    #[cfg(feature = "ingest-v4l2")]
    fn device(config: CameraConfig) -> Result<Self> {
        Ok(Self {
            backend: CameraBackend::Device(DeviceSource::new(config)),
        })
    }

    #[cfg(not(feature = "ingest-v4l2"))]
    fn device(config: CameraConfig) -> Result<Self> {
        Err(anyhow!(
            "camera {} requires V4L2 support (build with --features ingest-v4l2)",
            config.device
        ))
    }

    /// Create and connect in one step.
    pub fn open(config: CameraConfig) -> Result<Self> {
        let mut source = Self::new(config)?;
        source.connect()?;
        Ok(source)
    }

    /// Connect to the camera.
    pub fn connect(&mut self) -> Result<()> {
        match &mut self.backend {
            CameraBackend::Synthetic(source) => source.connect(),
            #[cfg(feature = "ingest-v4l2")]
            CameraBackend::Device(source) => source.connect(),
        }
    }

    /// Capture the next frame.
    pub fn next_frame(&mut self) -> Result<Frame> {
        match &mut self.backend {
            CameraBackend::Synthetic(source) => source.next_frame(),
            #[cfg(feature = "ingest-v4l2")]
            CameraBackend::Device(source) => source.next_frame(),
        }
    }

    /// Check if the source is healthy.
    pub fn is_healthy(&self) -> bool {
        match &self.backend {
            CameraBackend::Synthetic(source) => source.is_healthy(),
            #[cfg(feature = "ingest-v4l2")]
            CameraBackend::Device(source) => source.is_healthy(),
        }
    }

    /// Get frame statistics.
    pub fn stats(&self) -> CameraStats {
        match &self.backend {
            CameraBackend::Synthetic(source) => source.stats(),
            #[cfg(feature = "ingest-v4l2")]
            CameraBackend::Device(source) => source.stats(),
        }
    }
}

impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Result<Frame> {
        CameraSource::next_frame(self)
    }
}

/// Statistics for a camera source.
#[derive(Clone, Debug)]
pub struct CameraStats {
    pub frames_captured: u64,
    pub device: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub_config() -> CameraConfig {
        CameraConfig {
            device: "stub://test".to_string(),
            ..CameraConfig::default()
        }
    }

    #[test]
    fn stub_camera_produces_frames() -> Result<()> {
        let mut source = CameraSource::open(stub_config())?;

        let frame = source.next_frame()?;
        assert_eq!(frame.width, 640);
        assert_eq!(frame.height, 480);
        assert_eq!(frame.sequence, 1);
        assert!(source.is_healthy());

        Ok(())
    }

    #[test]
    fn stub_camera_frames_change_over_time() -> Result<()> {
        let mut source = CameraSource::open(stub_config())?;

        let frame1 = source.next_frame()?;
        let frame2 = source.next_frame()?;
        assert_eq!(frame2.sequence, 2);
        assert_ne!(frame1.pixels(), frame2.pixels());
        assert_eq!(source.stats().frames_captured, 2);

        Ok(())
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let config = CameraConfig {
            width: 0,
            ..stub_config()
        };
        assert!(CameraSource::new(config).is_err());

        let config = CameraConfig {
            height: MAX_CAMERA_DIMENSION + 1,
            ..stub_config()
        };
        assert!(CameraSource::new(config).is_err());
    }

    #[cfg(not(feature = "ingest-v4l2"))]
    #[test]
    fn device_paths_need_v4l2_support() {
        let config = CameraConfig {
            device: "/dev/video0".to_string(),
            ..CameraConfig::default()
        };
        assert!(CameraSource::new(config).is_err());
    }
}
