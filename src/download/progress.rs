//! Progress UI for a single streaming download.

use std::io::{IsTerminal, stdout};

use indicatif::{ProgressBar, ProgressStyle};

/// Byte-progress display for one file.
///
/// Rendered only when stdout is an interactive terminal; in pipelines
/// and cron runs the display is suppressed and all methods are no-ops.
pub(crate) struct DownloadProgress {
    bar: Option<ProgressBar>,
}

impl DownloadProgress {
    /// Starts a progress display for a body of `content_length` bytes.
    pub(crate) fn start(content_length: Option<u64>) -> Self {
        if !stdout().is_terminal() {
            return Self { bar: None };
        }
        let bar = match content_length {
            Some(total) => {
                let bar = ProgressBar::new(total);
                bar.set_style(
                    ProgressStyle::with_template(
                        "[{bar:50}] {percent:>3}% {bytes}/{total_bytes}",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
                );
                bar
            }
            // No Content-Length: show moving byte count instead of a fraction.
            None => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(
                    ProgressStyle::with_template("{spinner} {bytes}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                bar
            }
        };
        Self { bar: Some(bar) }
    }

    /// Advances the display by `bytes` newly written bytes.
    pub(crate) fn advance(&self, bytes: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(bytes);
        }
    }

    /// Clears the display.
    pub(crate) fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}
