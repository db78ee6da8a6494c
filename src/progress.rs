//! Download spinner
//!
//! One spinner per file being fetched, cleared from the terminal as soon as
//! the transfer ends.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK_INTERVAL: Duration = Duration::from_millis(120);

/// Spinner naming the file being downloaded, cleared when dropped
pub struct DownloadSpinner {
    bar: Option<ProgressBar>,
}

impl DownloadSpinner {
    /// Start spinning for `file`; nothing is drawn unless `visible`
    pub fn start(file: &str, visible: bool) -> Self {
        if !visible {
            return Self { bar: None };
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_strings(&["-", "\\", "|", "/", "+"])
            .template("{spinner:.green} downloading {msg:.bold} [{elapsed}]")
        {
            bar.set_style(style);
        }
        bar.set_message(file.to_string());
        bar.enable_steady_tick(TICK_INTERVAL);
        Self { bar: Some(bar) }
    }
}

impl Drop for DownloadSpinner {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
