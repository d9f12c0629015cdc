use anyhow::Result;

use super::camera::{CameraConfig, CameraStats};
use crate::frame::{expected_len, Frame, RGB_CHANNELS};

/// Synthetic camera for `stub://` devices.
///
/// Renders a diagonal gradient with a bright bar sweeping left to right, so
/// consecutive frames always differ.
pub(super) struct SyntheticSource {
    config: CameraConfig,
    frame_count: u64,
}

impl SyntheticSource {
    pub(super) fn new(config: CameraConfig) -> Self {
        Self {
            config,
            frame_count: 0,
        }
    }

    /// Synthetic sources are always "connected".
    pub(super) fn connect(&mut self) -> Result<()> {
        log::info!("CameraSource: connected to {} (synthetic)", self.config.device);
        Ok(())
    }

    pub(super) fn next_frame(&mut self) -> Result<Frame> {
        self.frame_count += 1;
        let pixels = self.render()?;
        Frame::new(pixels, self.config.width, self.config.height, self.frame_count)
    }

    fn render(&self) -> Result<Vec<u8>> {
        let width = self.config.width as usize;
        let height = self.config.height as usize;
        let bar_width = (width / 16).max(1);
        let bar_x = (self.frame_count as usize * 8) % width;

        let mut pixels = vec![0u8; expected_len(self.config.width, self.config.height)?];
        for (idx, px) in pixels.chunks_exact_mut(RGB_CHANNELS).enumerate() {
            let x = idx % width;
            let y = idx / width;
            if x >= bar_x && x < bar_x + bar_width {
                px.copy_from_slice(&[240, 240, 240]);
            } else {
                px[0] = (x * 255 / width) as u8;
                px[1] = (y * 255 / height) as u8;
                px[2] = 96;
            }
        }
        Ok(pixels)
    }

    pub(super) fn is_healthy(&self) -> bool {
        true
    }

    pub(super) fn stats(&self) -> CameraStats {
        CameraStats {
            frames_captured: self.frame_count,
            device: self.config.device.clone(),
        }
    }
}
