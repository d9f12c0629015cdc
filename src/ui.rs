//! Terminal progress output for startup stages and the live watch loop.
//!
//! Spinners are drawn on stderr only when stderr is a TTY and pretty output
//! is not disabled; otherwise each stage prints a plain `==>` line.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiMode {
    Auto,
    Plain,
    Pretty,
}

#[derive(Clone, Debug)]
pub struct Ui {
    mode: UiMode,
    is_tty: bool,
    disable_pretty: bool,
}

impl Ui {
    pub fn new(mode: UiMode, is_tty: bool, disable_pretty: bool) -> Self {
        Self {
            mode,
            is_tty,
            disable_pretty,
        }
    }

    pub fn from_args(ui_flag: Option<&str>, is_tty: bool, disable_pretty: bool) -> Self {
        let mode = match ui_flag {
            Some("plain") => UiMode::Plain,
            Some("pretty") => UiMode::Pretty,
            _ => UiMode::Auto,
        };
        Self::new(mode, is_tty, disable_pretty)
    }

    /// Plain output, for tests and non-interactive runs.
    pub fn plain() -> Self {
        Self::new(UiMode::Plain, false, true)
    }

    fn use_pretty(&self) -> bool {
        self.is_tty
            && match self.mode {
                UiMode::Pretty => true,
                UiMode::Auto => !self.disable_pretty,
                UiMode::Plain => false,
            }
    }

    pub fn stage(&self, name: &str) -> StageGuard {
        if self.use_pretty() {
            let spinner = spinner(format!("{name}…"));
            StageGuard::new(name.to_string(), Some(spinner))
        } else {
            eprintln!("==> {}", name);
            StageGuard::new(name.to_string(), None)
        }
    }

    /// Live counter shown while the capture loop runs. Silent in plain mode.
    pub fn watch_status(&self) -> WatchStatus {
        let spinner = self.use_pretty().then(|| spinner("watching…".to_string()));
        WatchStatus { spinner }
    }
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_draw_target(ProgressDrawTarget::stderr());
    spinner.enable_steady_tick(Duration::from_millis(120));
    let style = ProgressStyle::with_template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message);
    spinner
}

pub struct StageGuard {
    name: String,
    start: Instant,
    spinner: Option<ProgressBar>,
}

impl StageGuard {
    fn new(name: String, spinner: Option<ProgressBar>) -> Self {
        Self {
            name,
            start: Instant::now(),
            spinner,
        }
    }
}

impl Drop for StageGuard {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        let message = format!("✔ {} ({})", self.name, format_duration(elapsed));
        if let Some(spinner) = &self.spinner {
            spinner.finish_with_message(message);
        } else {
            eprintln!("{message}");
        }
    }
}

pub struct WatchStatus {
    spinner: Option<ProgressBar>,
}

impl WatchStatus {
    pub fn update(&self, frames: u64, alerts: usize) {
        if let Some(spinner) = &self.spinner {
            spinner.set_message(status_message(frames, alerts));
        }
    }

    pub fn is_live(&self) -> bool {
        self.spinner.is_some()
    }
}

impl Drop for WatchStatus {
    fn drop(&mut self) {
        if let Some(spinner) = &self.spinner {
            spinner.finish_and_clear();
        }
    }
}

fn status_message(frames: u64, alerts: usize) -> String {
    format!("watching: {frames} frames, {alerts} alerts")
}

fn format_duration(duration: Duration) -> String {
    if duration.as_secs() >= 1 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ui_flag_selects_mode() {
        assert_eq!(Ui::from_args(Some("plain"), true, false).mode, UiMode::Plain);
        assert_eq!(Ui::from_args(Some("pretty"), true, false).mode, UiMode::Pretty);
        assert_eq!(Ui::from_args(None, true, false).mode, UiMode::Auto);
    }

    #[test]
    fn pretty_output_requires_a_tty() {
        assert!(!Ui::from_args(Some("pretty"), false, false).use_pretty());
        assert!(!Ui::from_args(None, true, true).use_pretty());
        assert!(Ui::from_args(None, true, false).use_pretty());
    }

    #[test]
    fn plain_watch_status_is_silent() {
        let status = Ui::plain().watch_status();
        assert!(!status.is_live());
        status.update(3, 1);
    }

    #[test]
    fn durations_format_by_magnitude() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
        assert_eq!(status_message(12, 2), "watching: 12 frames, 2 alerts");
    }
}
