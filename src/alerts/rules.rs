use crate::detect::Detection;

pub const PERSON_LABEL: &str = "person";
pub const HELMET_LABEL: &str = "helmet";

pub const MULTIPLE_RIDERS_ALERT: &str = "Multiple riders detected!";
pub const NO_HELMET_ALERT: &str = "No helmet detected!";

/// Per-frame class tallies. Recomputed from scratch every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameCounts {
    pub person_count: usize,
    pub helmet_count: usize,
}

impl FrameCounts {
    pub fn tally(detections: &[Detection]) -> Self {
        let mut counts = Self::default();
        for detection in detections {
            counts.record(detection);
        }
        counts
    }

    /// Count one detection. Labels other than person/helmet are ignored.
    pub fn record(&mut self, detection: &Detection) {
        if detection.is_class(PERSON_LABEL) {
            self.person_count += 1;
        } else if detection.is_class(HELMET_LABEL) {
            self.helmet_count += 1;
        }
    }

    /// Alerts for this frame, multiple riders first.
    pub fn alerts(&self) -> Vec<&'static str> {
        let mut alerts = Vec::with_capacity(2);
        if self.person_count > 1 {
            alerts.push(MULTIPLE_RIDERS_ALERT);
        }
        if self.person_count > 0 && self.helmet_count == 0 {
            alerts.push(NO_HELMET_ALERT);
        }
        alerts
    }
}
