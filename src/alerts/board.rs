use std::io::Write;

use super::{AlertLog, AlertSink, AlertView};

/// Controller-owned alert state: the log and its live view.
pub struct AlertBoard<W: Write> {
    log: AlertLog,
    view: AlertView<W>,
}

impl<W: Write> AlertBoard<W> {
    pub fn new(out: W) -> Self {
        Self {
            log: AlertLog::new(),
            view: AlertView::new(out),
        }
    }

    pub fn log(&self) -> &AlertLog {
        &self.log
    }

    pub fn into_parts(self) -> (AlertLog, W) {
        (self.log, self.view.into_inner())
    }
}

impl<W: Write> AlertSink for AlertBoard<W> {
    fn on_alert(&mut self, message: &str) {
        let index = self.log.append(message);
        log::info!("alert #{}: {}", index + 1, message);
        if let Err(err) = self.view.refresh(&self.log) {
            log::warn!("failed to render alert view: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{MULTIPLE_RIDERS_ALERT, NO_HELMET_ALERT};

    #[test]
    fn board_appends_then_renders() {
        let mut board = AlertBoard::new(Vec::new());
        board.on_alert(MULTIPLE_RIDERS_ALERT);
        board.on_alert(NO_HELMET_ALERT);

        assert_eq!(board.log().len(), 2);
        let (log, out) = board.into_parts();
        assert_eq!(log.messages(), vec![MULTIPLE_RIDERS_ALERT, NO_HELMET_ALERT]);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[1] Multiple riders detected!\n[2] No helmet detected!\n"
        );
    }
}
