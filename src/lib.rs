//! Helmet Watch
//!
//! Live camera object detection with rider safety alerts.
//!
//! # Architecture
//!
//! A single capture loop pulls frames from a camera, draws them onto a fixed
//! 640x480 surface, runs a pretrained detector, and overlays a red box and a
//! `"{class} ({percent}%)"` label per detection. Each frame's person/helmet
//! counts drive two alerts:
//!
//! 1. **Multiple riders**: more than one person in the frame.
//! 2. **No helmet**: at least one person and no helmet.
//!
//! Alerts are appended to an `AlertLog` owned by the controller and rendered
//! by a read-only `AlertView`. They are not throttled: every qualifying frame
//! appends again.
//!
//! # Module Structure
//!
//! - `frame`: captured RGB frames
//! - `ingest`: camera sources (synthetic `stub://`, V4L2)
//! - `detect`: detector backends (scripted stub, ONNX via tract)
//! - `overlay`: drawing surface and label rules
//! - `alerts`: alert rules, log, view
//! - `capture`: the per-frame loop and its stop/pause control
//! - `app`: controller wiring everything together
//! - `config`: file + environment configuration

pub mod alerts;
pub mod app;
pub mod capture;
pub mod config;
pub mod detect;
pub mod frame;
pub mod ingest;
pub mod overlay;
pub mod ui;

pub use alerts::{AlertBoard, AlertLog, AlertSink, AlertView, FrameCounts};
pub use app::{App, WatchLoop};
pub use capture::{CaptureLoop, FrameReport, FrameTicker, LoopControl};
pub use config::{DetectorSettings, Overrides, WatchConfig};
pub use detect::{BackendKind, BoundingBox, Detection, DetectorBackend, StubBackend};
pub use frame::Frame;
pub use ingest::{CameraConfig, CameraSource, FrameSource};
pub use overlay::{ImageSurface, RecordingSurface, Surface};
