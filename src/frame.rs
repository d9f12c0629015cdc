//! Captured video frames.
//!
//! - `Frame`: packed RGB24 pixels with dimensions and a capture sequence number.
//!
//! Frames are produced by the ingestion layer, handed to the detector as-is and
//! drawn onto the display surface. They are not retained past the tick that
//! produced them.

use anyhow::{anyhow, Result};

/// Bytes per pixel for packed RGB24.
pub const RGB_CHANNELS: usize = 3;

/// A single captured frame in packed RGB24, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Monotonic capture counter assigned by the source (1-based).
    pub sequence: u64,
}

impl Frame {
    /// Wrap RGB24 pixel data. Fails when the buffer does not match the dimensions.
    pub fn new(data: Vec<u8>, width: u32, height: u32, sequence: u64) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(anyhow!("frame dimensions must be non-zero"));
        }
        let expected_len = expected_len(width, height)?;
        if data.len() != expected_len {
            return Err(anyhow!(
                "expected {} RGB bytes for {}x{}, received {}",
                expected_len,
                width,
                height,
                data.len()
            ));
        }
        Ok(Self {
            data,
            width,
            height,
            sequence,
        })
    }

    /// A black frame, used by synthetic sources and tests.
    pub fn blank(width: u32, height: u32, sequence: u64) -> Result<Self> {
        let len = expected_len(width, height)?;
        Self::new(vec![0u8; len], width, height, sequence)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.data
    }
}

pub(crate) fn expected_len(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(RGB_CHANNELS))
        .ok_or_else(|| anyhow!("frame dimensions overflow"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rejects_mismatched_buffer() {
        assert!(Frame::new(vec![0u8; 10], 2, 2, 1).is_err());
        assert!(Frame::new(vec![0u8; 12], 2, 2, 1).is_ok());
    }

    #[test]
    fn frame_rejects_zero_dimensions() {
        assert!(Frame::new(Vec::new(), 0, 480, 1).is_err());
        assert!(Frame::blank(640, 0, 1).is_err());
    }

    #[test]
    fn blank_frame_is_black() {
        let frame = Frame::blank(4, 3, 7).unwrap();
        assert_eq!(frame.pixels().len(), 36);
        assert!(frame.pixels().iter().all(|&p| p == 0));
        assert_eq!(frame.sequence, 7);
    }
}
