use anyhow::Result;

use crate::detect::backend::DetectorBackend;
use crate::detect::result::{BoundingBox, Detection};
use crate::frame::Frame;

/// Stub backend for testing and demos.
///
/// Replays a script of per-frame detection lists, one entry per `detect` call,
/// wrapping around at the end. An empty script yields no detections.
#[derive(Clone, Debug, Default)]
pub struct StubBackend {
    script: Vec<Vec<Detection>>,
    cursor: usize,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scripted(script: Vec<Vec<Detection>>) -> Self {
        Self { script, cursor: 0 }
    }

    /// A short rider scenario that exercises every alert path:
    /// helmeted rider, bare-headed rider, two riders sharing one helmet, empty road.
    pub fn demo() -> Self {
        let rider = |x: f32| Detection::new("person", 0.91, BoundingBox::new(x, 140.0, 120.0, 300.0));
        let helmet = |x: f32| Detection::new("helmet", 0.84, BoundingBox::new(x + 30.0, 110.0, 60.0, 50.0));
        let bike = Detection::new("motorcycle", 0.77, BoundingBox::new(150.0, 300.0, 320.0, 170.0));

        Self::scripted(vec![
            vec![rider(200.0), helmet(200.0), bike.clone()],
            vec![rider(200.0), bike.clone()],
            vec![rider(160.0), rider(300.0), helmet(160.0), bike],
            vec![],
        ])
    }

    /// Number of `detect` calls served so far.
    pub fn calls(&self) -> usize {
        self.cursor
    }
}

impl DetectorBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, _frame: &Frame) -> Result<Vec<Detection>> {
        let detections = if self.script.is_empty() {
            Vec::new()
        } else {
            self.script[self.cursor % self.script.len()].clone()
        };
        self.cursor += 1;
        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stub_detects_nothing() {
        let mut backend = StubBackend::new();
        let frame = Frame::blank(4, 4, 1).unwrap();
        assert!(backend.detect(&frame).unwrap().is_empty());
        assert_eq!(backend.calls(), 1);
    }

    #[test]
    fn scripted_stub_replays_in_order_and_wraps() {
        let person = Detection::new("person", 0.9, BoundingBox::new(1.0, 2.0, 3.0, 4.0));
        let mut backend = StubBackend::scripted(vec![vec![person.clone()], vec![]]);
        let frame = Frame::blank(4, 4, 1).unwrap();

        assert_eq!(backend.detect(&frame).unwrap(), vec![person.clone()]);
        assert!(backend.detect(&frame).unwrap().is_empty());
        assert_eq!(backend.detect(&frame).unwrap(), vec![person]);
    }

    #[test]
    fn demo_script_covers_every_scenario() {
        let mut backend = StubBackend::demo();
        let frame = Frame::blank(4, 4, 1).unwrap();
        let persons: Vec<usize> = (0..4)
            .map(|_| {
                backend
                    .detect(&frame)
                    .unwrap()
                    .iter()
                    .filter(|d| d.is_class("person"))
                    .count()
            })
            .collect();
        assert_eq!(persons, vec![1, 1, 2, 0]);
    }
}
