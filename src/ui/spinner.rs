use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::ui::icons::{CHECK, CROSS};

/// Spinner on stderr while a remote call runs. Hidden when stderr is not a terminal.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn start(message: impl Into<String>) -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    pub fn succeed(self, message: impl AsRef<str>) {
        self.bar
            .finish_with_message(format!("{}{}", CHECK, message.as_ref()));
    }

    pub fn fail(self, message: impl AsRef<str>) {
        self.bar
            .abandon_with_message(format!("{}{}", CROSS, message.as_ref()));
    }

    /// Remove the spinner without leaving a line behind.
    pub fn clear(self) {
        self.bar.finish_and_clear();
    }
}
