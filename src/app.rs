//! Top-level controller.
//!
//! Owns the alert board and wires camera, detector and surface into a
//! `CaptureLoop`. The detector is loaded once, before the camera is opened; if
//! that fails the camera is never touched and the loop never starts. A camera
//! that cannot be opened is logged and the loop runs without frames, leaving
//! the surface blank.

use anyhow::Result;
use std::io::Write;

use crate::alerts::AlertBoard;
use crate::capture::{CaptureLoop, FrameTicker, LoopControl};
use crate::config::WatchConfig;
use crate::detect::{load_backend, DetectorBackend};
use crate::ingest::CameraSource;
use crate::overlay::ImageSurface;
use crate::ui::Ui;

/// The loop `App` drives: configured camera, loaded detector, image canvas.
pub type WatchLoop = CaptureLoop<CameraSource, Box<dyn DetectorBackend>, ImageSurface>;

pub struct App<W: Write> {
    config: WatchConfig,
    board: AlertBoard<W>,
}

impl<W: Write> App<W> {
    /// `out` receives the rendered alert list.
    pub fn new(config: WatchConfig, out: W) -> Self {
        Self {
            config,
            board: AlertBoard::new(out),
        }
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn board(&self) -> &AlertBoard<W> {
        &self.board
    }

    pub fn into_board(self) -> AlertBoard<W> {
        self.board
    }

    /// Open the configured camera. Failure is logged, never raised.
    pub fn acquire_camera(&self) -> Option<CameraSource> {
        match CameraSource::open(self.config.camera.clone()) {
            Ok(source) => Some(source),
            Err(err) => {
                log::error!(
                    "error accessing camera {}: {:#}",
                    self.config.camera.device,
                    err
                );
                None
            }
        }
    }

    pub fn load_detector(&self) -> Result<Box<dyn DetectorBackend>> {
        load_backend(&self.config.detector)
    }

    pub fn build_surface(&self) -> Result<ImageSurface> {
        let surface = ImageSurface::new();
        match &self.config.overlay.font_path {
            Some(path) => surface.with_font_file(path),
            None => {
                log::warn!("no label font configured; boxes will be drawn without labels");
                Ok(surface)
            }
        }
    }

    /// Load the detector, then open the camera and build the surface.
    pub fn prepare(&self, ui: &Ui) -> Result<WatchLoop> {
        let detector = {
            let _stage = ui.stage("Load detector");
            self.load_detector()?
        };
        let source = {
            let _stage = ui.stage("Acquire camera");
            self.acquire_camera()
        };
        let surface = {
            let _stage = ui.stage("Prepare surface");
            self.build_surface()?
        };

        let mut capture = CaptureLoop::new(source, detector, surface)
            .with_ticker(FrameTicker::new(self.config.camera.target_fps));
        if let Some(limit) = self.config.max_frames {
            capture = capture.with_frame_limit(limit);
        }
        if !capture.has_source() {
            log::warn!("running without a camera; the surface will stay blank");
        }
        Ok(capture)
    }

    /// Run until `control` is stopped, the frame limit is hit, or a step fails.
    pub fn run(&mut self, control: &LoopControl, ui: &Ui) -> Result<u64> {
        let mut capture = self.prepare(ui)?;

        let status = ui.watch_status();
        let mut alerts = self.board.log().len();
        let mut frames = 0u64;
        let steps = capture.run_with(control, &mut self.board, |report| {
            frames += 1;
            alerts += report.alerts.len();
            status.update(frames, alerts);
        })?;
        drop(status);

        if let Some(source) = capture.source() {
            let stats = source.stats();
            log::info!(
                "camera health={} frames={} device={}",
                source.is_healthy(),
                stats.frames_captured,
                stats.device
            );
        }
        Ok(steps)
    }
}
