//! Progress bar display.

use super::{ProgressBarOpts, ProgressSink};
use indicatif::{HumanBytes, ProgressBar};
use std::path::Path;

/// Single progress bar following the file currently being downloaded.
#[derive(Debug, Clone)]
pub struct ProgressDisplay {
    bar: ProgressBar,
    opts: ProgressBarOpts,
}

impl Default for ProgressDisplay {
    fn default() -> Self {
        Self::new(ProgressBarOpts::with_pip_style())
    }
}

impl ProgressDisplay {
    /// Create a display drawing a bar styled by `opts`.
    pub fn new(opts: ProgressBarOpts) -> Self {
        Self {
            bar: opts.clone().to_progress_bar(0),
            opts,
        }
    }

    /// Create a display that draws nothing.
    pub fn hidden() -> Self {
        Self::new(ProgressBarOpts::hidden())
    }

    /// The underlying progress bar.
    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }

    /// Finish the bar, clearing or keeping it based on configuration.
    pub fn finish(&self) {
        if self.opts.clear {
            self.bar.finish_and_clear();
        } else {
            self.bar.finish();
        }
    }
}

impl ProgressSink for ProgressDisplay {
    fn on_start(&self, path: &Path) {
        self.bar.reset();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.set_prefix(name);
    }

    fn on_progress(&self, total: Option<u64>, downloaded: u64, rate: u64) {
        if let Some(total) = total {
            self.bar.set_length(total);
        }
        self.bar.set_position(downloaded);
        self.bar.set_message(format!("{}/s", HumanBytes(rate)));
    }
}
