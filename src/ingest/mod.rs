//! Frame ingestion sources.
//!
//! The camera is addressed by a device string:
//! - `stub://<name>` selects a synthetic moving test pattern (always available)
//! - anything else is a V4L2 device node such as `/dev/video0` (feature: ingest-v4l2)
//!
//! All sources produce RGB `Frame`s with a monotonically increasing sequence
//! number starting at 1.

mod camera;
mod synthetic;
#[cfg(feature = "ingest-v4l2")]
mod v4l2;

use anyhow::Result;

use crate::frame::Frame;

pub use camera::{
    CameraConfig, CameraSource, CameraStats, DEFAULT_CAMERA_DEVICE, MAX_CAMERA_DIMENSION,
};

/// Anything the capture loop can pull frames from.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Frame>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Frame> {
        (**self).next_frame()
    }
}
