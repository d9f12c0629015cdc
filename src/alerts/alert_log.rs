use std::fmt;

use super::AlertSink;

/// One alert message. Immutable once logged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert(String);

impl Alert {
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Append-only, insertion-ordered alert log.
///
/// There is no way to edit, remove or clear entries; an entry's index is its
/// position in time. Duplicates are kept.
#[derive(Clone, Debug, Default)]
pub struct AlertLog {
    entries: Vec<Alert>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its index.
    pub fn append(&mut self, message: impl Into<String>) -> usize {
        self.entries.push(Alert(message.into()));
        self.entries.len() - 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Alert> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Alert> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[Alert] {
        &self.entries
    }

    /// Messages in insertion order.
    pub fn messages(&self) -> Vec<&str> {
        self.entries.iter().map(Alert::message).collect()
    }
}

impl<'a> IntoIterator for &'a AlertLog {
    type Item = &'a Alert;
    type IntoIter = std::slice::Iter<'a, Alert>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl AlertSink for AlertLog {
    fn on_alert(&mut self, message: &str) {
        self.append(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_order_and_duplicates() {
        let mut log = AlertLog::new();
        assert!(log.is_empty());
        assert_eq!(log.append("No helmet detected!"), 0);
        assert_eq!(log.append("Multiple riders detected!"), 1);
        assert_eq!(log.append("No helmet detected!"), 2);

        assert_eq!(log.len(), 3);
        assert_eq!(
            log.messages(),
            vec![
                "No helmet detected!",
                "Multiple riders detected!",
                "No helmet detected!"
            ]
        );
        assert_eq!(log.get(1).map(Alert::message), Some("Multiple riders detected!"));
        assert!(log.get(3).is_none());
    }

    #[test]
    fn log_is_an_alert_sink() {
        let mut log = AlertLog::new();
        let sink: &mut dyn AlertSink = &mut log;
        sink.on_alert("No helmet detected!");
        assert_eq!(log.entries().len(), 1);
        assert_eq!(log.entries()[0].to_string(), "No helmet detected!");
    }
}
