use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop/pause switch for a running `CaptureLoop`.
///
/// Clones share state, so one handle can live in a signal handler while the
/// loop polls another.
#[derive(Clone, Debug, Default)]
pub struct LoopControl {
    stopped: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
}

impl LoopControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to exit after the current step. Irreversible.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}
