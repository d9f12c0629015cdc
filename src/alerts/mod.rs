//! Rider safety alerts.
//!
//! The capture loop evaluates `FrameCounts` for every frame and hands each
//! resulting message to an `AlertSink`. The controller's sink is an
//! `AlertBoard`: an append-only `AlertLog` plus an `AlertView` that renders new
//! entries as they arrive.

mod alert_log;
mod board;
mod rules;
mod view;

pub use alert_log::{Alert, AlertLog};
pub use board::AlertBoard;
pub use rules::{
    FrameCounts, HELMET_LABEL, MULTIPLE_RIDERS_ALERT, NO_HELMET_ALERT, PERSON_LABEL,
};
pub use view::AlertView;

/// Receiver of alert messages.
pub trait AlertSink {
    fn on_alert(&mut self, message: &str);
}

impl<F: FnMut(&str)> AlertSink for F {
    fn on_alert(&mut self, message: &str) {
        self(message)
    }
}
