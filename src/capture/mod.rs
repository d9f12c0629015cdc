//! The capture-and-render loop.
//!
//! One step per tick:
//! 1. Clear the surface
//! 2. Pull a frame from the camera and draw it stretched to the surface
//! 3. Run the detector on the frame
//! 4. Count persons and helmets, draw a box and label for every detection
//! 5. Hand the frame's alerts to the sink
//!
//! Steps run strictly one after another on the caller's thread. Without a
//! camera the surface is cleared each tick and nothing else happens.

mod control;
mod ticker;

use anyhow::{Context, Result};
use std::time::Duration;

use crate::alerts::{AlertSink, FrameCounts};
use crate::detect::{Detection, DetectorBackend};
use crate::ingest::FrameSource;
use crate::overlay::{draw_detection, Surface};

pub use control::LoopControl;
pub use ticker::{FrameTicker, DEFAULT_FPS};

const PAUSE_POLL: Duration = Duration::from_millis(20);

/// What one step saw and did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Source sequence number; `None` when there is no camera.
    pub sequence: Option<u64>,
    /// Detections in surface coordinates, as drawn.
    pub detections: Vec<Detection>,
    pub counts: FrameCounts,
    pub alerts: Vec<&'static str>,
}

pub struct CaptureLoop<Src, D, S> {
    source: Option<Src>,
    detector: D,
    surface: S,
    ticker: FrameTicker,
    frame_limit: Option<u64>,
    frames_processed: u64,
}

impl<Src, D, S> CaptureLoop<Src, D, S>
where
    Src: FrameSource,
    D: DetectorBackend,
    S: Surface,
{
    /// `source` is `None` when the camera could not be acquired.
    pub fn new(source: Option<Src>, detector: D, surface: S) -> Self {
        Self {
            source,
            detector,
            surface,
            ticker: FrameTicker::default(),
            frame_limit: None,
            frames_processed: 0,
        }
    }

    pub fn with_ticker(mut self, ticker: FrameTicker) -> Self {
        self.ticker = ticker;
        self
    }

    /// Stop `run` after this many steps.
    pub fn with_frame_limit(mut self, limit: u64) -> Self {
        self.frame_limit = Some(limit);
        self
    }

    /// Process one tick.
    pub fn step(&mut self, sink: &mut dyn AlertSink) -> Result<FrameReport> {
        self.surface.clear();

        let Some(source) = self.source.as_mut() else {
            self.frames_processed += 1;
            return Ok(FrameReport::default());
        };

        let frame = source.next_frame().context("camera capture failed")?;
        self.surface.draw_frame(&frame)?;

        let detections = self
            .detector
            .detect(&frame)
            .with_context(|| format!("detector failed on frame {}", frame.sequence))?;

        let sx = self.surface.width() as f32 / frame.width as f32;
        let sy = self.surface.height() as f32 / frame.height as f32;

        let mut counts = FrameCounts::default();
        let mut drawn = Vec::with_capacity(detections.len());
        for detection in detections {
            let detection = Detection {
                bbox: detection.bbox.scaled(sx, sy),
                ..detection
            };
            counts.record(&detection);
            draw_detection(&mut self.surface, &detection);
            drawn.push(detection);
        }

        let alerts = counts.alerts();
        for message in &alerts {
            sink.on_alert(message);
        }

        self.frames_processed += 1;
        log::debug!(
            "frame {}: {} detections, persons={} helmets={} alerts={}",
            frame.sequence,
            drawn.len(),
            counts.person_count,
            counts.helmet_count,
            alerts.len()
        );

        Ok(FrameReport {
            sequence: Some(frame.sequence),
            detections: drawn,
            counts,
            alerts,
        })
    }

    /// Step until stopped or the frame limit is reached. Returns the number of
    /// steps taken. Any step error ends the loop and is returned.
    pub fn run(&mut self, control: &LoopControl, sink: &mut dyn AlertSink) -> Result<u64> {
        self.run_with(control, sink, |_| {})
    }

    /// Like `run`, calling `observer` after every completed step.
    pub fn run_with<F>(
        &mut self,
        control: &LoopControl,
        sink: &mut dyn AlertSink,
        mut observer: F,
    ) -> Result<u64>
    where
        F: FnMut(&FrameReport),
    {
        let mut steps = 0u64;
        loop {
            if control.is_stopped() {
                log::info!("capture loop stopped after {} frames", steps);
                break;
            }
            if self.frame_limit.is_some_and(|limit| steps >= limit) {
                log::info!("capture loop reached frame limit ({})", steps);
                break;
            }
            if control.is_paused() {
                std::thread::sleep(PAUSE_POLL);
                continue;
            }

            self.ticker.wait();
            let report = self.step(sink)?;
            steps += 1;
            observer(&report);
        }
        Ok(steps)
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn source(&self) -> Option<&Src> {
        self.source.as_ref()
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Total steps taken, across `step` and `run` calls.
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}
