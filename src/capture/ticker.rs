use std::time::{Duration, Instant};

pub const DEFAULT_FPS: u32 = 30;

/// Paces loop iterations to a target frame rate.
///
/// When a step overruns its slot the next one starts immediately; missed
/// ticks are dropped, never replayed.
#[derive(Debug)]
pub struct FrameTicker {
    interval: Option<Duration>,
    next_deadline: Option<Instant>,
}

impl FrameTicker {
    /// `fps == 0` disables pacing.
    pub fn new(fps: u32) -> Self {
        let interval = (fps > 0).then(|| Duration::from_secs(1) / fps);
        Self {
            interval,
            next_deadline: None,
        }
    }

    /// Run as fast as steps complete.
    pub fn unpaced() -> Self {
        Self::new(0)
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Block until the next tick is due.
    pub fn wait(&mut self) {
        let Some(interval) = self.interval else {
            return;
        };
        let now = Instant::now();
        match self.next_deadline {
            Some(deadline) if deadline > now => {
                std::thread::sleep(deadline - now);
                self.next_deadline = Some(deadline + interval);
            }
            _ => self.next_deadline = Some(now + interval),
        }
    }
}

impl Default for FrameTicker {
    fn default() -> Self {
        Self::new(DEFAULT_FPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_follows_fps() {
        assert_eq!(FrameTicker::new(10).interval(), Some(Duration::from_millis(100)));
        assert_eq!(FrameTicker::unpaced().interval(), None);
    }

    #[test]
    fn unpaced_ticker_never_sleeps() {
        let mut ticker = FrameTicker::unpaced();
        let start = Instant::now();
        for _ in 0..1000 {
            ticker.wait();
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn paced_ticker_spaces_ticks() {
        let mut ticker = FrameTicker::new(100);
        let start = Instant::now();
        for _ in 0..4 {
            ticker.wait();
        }
        // First tick is immediate, the next three wait ~10ms each.
        assert!(start.elapsed() >= Duration::from_millis(25));
    }
}
