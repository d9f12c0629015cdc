//! Webcam capture through libv4l.
//!
//! Frames must arrive as packed RGB24 (`RGB3`). A webcam that negotiates any
//! other pixel format is refused when the stream starts.

use anyhow::{anyhow, Context, Result};
use ouroboros::self_referencing;
use std::time::{Duration, Instant};
use v4l::video::Capture;

use super::camera::{CameraConfig, CameraStats};
use crate::frame::{expected_len, Frame};

const RGB3: &[u8; 4] = b"RGB3";
const STREAM_BUFFERS: u32 = 4;

/// A webcam counts as stalled after this many missed frame intervals.
const STALL_INTERVALS: u32 = 6;
const MIN_STALL_WINDOW_MS: u32 = 2_000;

pub(super) struct DeviceSource {
    config: CameraConfig,
    stream: Option<WebcamStream>,
    frames: u64,
    last_capture: Option<Instant>,
    failure: Option<String>,
    width: u32,
    height: u32,
}

/// The opened device together with the mmap stream borrowing it.
#[self_referencing]
struct WebcamStream {
    device: v4l::Device,
    #[borrows(mut device)]
    #[covariant]
    buffers: v4l::prelude::MmapStream<'this, v4l::Device>,
}

impl DeviceSource {
    pub(super) fn new(config: CameraConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            config,
            stream: None,
            frames: 0,
            last_capture: None,
            failure: None,
        }
    }

    pub(super) fn connect(&mut self) -> Result<()> {
        let result = self.start_stream();
        self.failure = result.as_ref().err().map(|err| format!("{:#}", err));
        result
    }

    fn start_stream(&mut self) -> Result<()> {
        use v4l::buffer::Type;

        let device = v4l::Device::with_path(&self.config.device)
            .with_context(|| format!("cannot open webcam {}", self.config.device))?;
        let (width, height) = negotiate_rgb(&device, &self.config)?;
        request_frame_rate(&device, &self.config);

        let stream = WebcamStreamBuilder {
            device,
            buffers_builder: |device| {
                v4l::prelude::MmapStream::with_buffers(device, Type::VideoCapture, STREAM_BUFFERS)
                    .map_err(|err| anyhow::Error::new(err).context("mmap webcam buffers"))
            },
        }
        .try_build()?;

        self.width = width;
        self.height = height;
        self.stream = Some(stream);
        log::info!(
            "webcam {} streaming {}x{} RGB3",
            self.config.device,
            width,
            height
        );
        Ok(())
    }

    pub(super) fn next_frame(&mut self) -> Result<Frame> {
        use v4l::io::traits::CaptureStream;

        let len = expected_len(self.width, self.height)?;
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| anyhow!("webcam {} is not streaming", self.config.device))?;
        let captured = stream.with_buffers_mut(|buffers| {
            buffers
                .next()
                .map(|(data, _meta)| data.get(..len).map(<[u8]>::to_vec))
        });
        let pixels = match captured {
            Ok(Some(pixels)) => pixels,
            Ok(None) => return Err(anyhow!("webcam buffer shorter than {} bytes", len)),
            Err(err) => {
                self.failure = Some(err.to_string());
                return Err(anyhow::Error::new(err).context("dequeue webcam buffer"));
            }
        };

        self.frames += 1;
        self.last_capture = Some(Instant::now());
        Frame::new(pixels, self.width, self.height, self.frames)
    }

    /// Healthy until an error is recorded or frames stop arriving.
    pub(super) fn is_healthy(&self) -> bool {
        if self.failure.is_some() {
            return false;
        }
        self.last_capture
            .map_or(true, |at| at.elapsed() <= stall_window(self.config.target_fps))
    }

    pub(super) fn stats(&self) -> CameraStats {
        CameraStats {
            frames_captured: self.frames,
            device: self.config.device.clone(),
        }
    }
}

/// Ask for RGB3 at the configured size; returns the size the driver chose.
fn negotiate_rgb(device: &v4l::Device, config: &CameraConfig) -> Result<(u32, u32)> {
    let mut wanted = device.format().context("query webcam format")?;
    wanted.width = config.width;
    wanted.height = config.height;
    wanted.fourcc = v4l::FourCC::new(RGB3);

    let granted = device.set_format(&wanted).or_else(|err| {
        log::warn!("webcam {} kept its format ({})", config.device, err);
        device.format().context("query webcam format")
    })?;
    if granted.fourcc != v4l::FourCC::new(RGB3) {
        return Err(anyhow!(
            "webcam {} offers {} instead of RGB3",
            config.device,
            granted.fourcc
        ));
    }
    Ok((granted.width, granted.height))
}

/// Frame rate is a hint; drivers that refuse it keep their own.
fn request_frame_rate(device: &v4l::Device, config: &CameraConfig) {
    if config.target_fps == 0 {
        return;
    }
    let params = v4l::video::capture::Parameters::with_fps(config.target_fps);
    if let Err(err) = device.set_params(&params) {
        log::debug!(
            "webcam {} ignored {} fps request: {}",
            config.device,
            config.target_fps,
            err
        );
    }
}

fn stall_window(target_fps: u32) -> Duration {
    let window_ms = match target_fps {
        0 => MIN_STALL_WINDOW_MS,
        fps => (1000 / fps)
            .saturating_mul(STALL_INTERVALS)
            .max(MIN_STALL_WINDOW_MS),
    };
    Duration::from_millis(u64::from(window_ms))
}
