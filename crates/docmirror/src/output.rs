//! Colored terminal output utilities.

use std::fmt::Display;

use console::{Style, Term};

/// Terminal output formatter.
///
/// Writes to stderr so stdout stays free for piping.
pub(crate) struct Output {
    term: Term,
    green: Style,
    red: Style,
    label: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            red: Style::new().red(),
            label: Style::new().cyan().bold(),
        }
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print a `label: value` line with the label highlighted.
    pub(crate) fn field(&self, label: &str, value: impl Display) {
        let line = format!("{} {value}", self.label.apply_to(format!("{label}:")));
        let _ = self.term.write_line(&line);
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }
}
