use std::io::{self, Write};

use super::AlertLog;

/// Read-only text display of an `AlertLog`.
///
/// Renders one `[n] message` line per entry, oldest first. `refresh` prints
/// only entries added since the previous refresh, so calling it after every
/// append keeps the output in sync with the log.
pub struct AlertView<W: Write> {
    out: W,
    rendered: usize,
}

impl<W: Write> AlertView<W> {
    pub fn new(out: W) -> Self {
        Self { out, rendered: 0 }
    }

    /// Render entries appended since the last call. Returns how many were written.
    pub fn refresh(&mut self, log: &AlertLog) -> io::Result<usize> {
        let new_entries = log.entries().get(self.rendered..).unwrap_or_default();
        let mut written = 0;
        // Advance per line so a failed write never re-renders earlier lines.
        for alert in new_entries {
            writeln!(self.out, "[{}] {}", self.rendered + 1, alert)?;
            self.rendered += 1;
            written += 1;
        }
        self.out.flush()?;
        Ok(written)
    }

    /// Render the whole log from the beginning.
    pub fn render_all(&mut self, log: &AlertLog) -> io::Result<usize> {
        self.rendered = 0;
        self.refresh(log)
    }

    pub fn rendered(&self) -> usize {
        self.rendered
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
