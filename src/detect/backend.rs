use anyhow::Result;

use crate::detect::result::Detection;
use crate::frame::Frame;

/// Detector backend trait.
///
/// The backend is an opaque, pre-trained model. The capture loop only relies on
/// `detect` returning an ordered list of detections whose boxes are expressed
/// in pixel coordinates of the frame it was given.
pub trait DetectorBackend: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Run detection on a frame.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>>;

    /// Class labels the backend can emit, when known.
    fn labels(&self) -> Option<&[String]> {
        None
    }

    /// Optional warm-up hook, called once after loading.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<B: DetectorBackend + ?Sized> DetectorBackend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>> {
        (**self).detect(frame)
    }

    fn labels(&self) -> Option<&[String]> {
        (**self).labels()
    }

    fn warm_up(&mut self) -> Result<()> {
        (**self).warm_up()
    }
}
