//! Progress bar styling and configuration options.
//!
//! # Examples
//!
//! ```rust
//! use steady::progress::ProgressBarOpts;
//!
//! let custom = ProgressBarOpts::new(
//!     Some("{prefix} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}".to_string()),
//!     Some(ProgressBarOpts::CHARS_FINE.to_string()),
//!     true,
//!     false,
//! );
//! let hidden = ProgressBarOpts::hidden();
//! ```

use indicatif::{ProgressBar, ProgressStyle};

/// Define the options for a progress bar.
#[derive(Debug, Clone)]
pub struct ProgressBarOpts {
    /// Progress bar template string.
    template: Option<String>,
    /// Progression characters set.
    ///
    /// There must be at least 3 characters for the following states:
    /// "filled", "current", and "to do".
    progress_chars: Option<String>,
    /// Enable or disable the progress bar.
    pub(crate) enabled: bool,
    /// Clear the progress bar once completed.
    pub(crate) clear: bool,
}

impl Default for ProgressBarOpts {
    fn default() -> Self {
        Self {
            template: None,
            progress_chars: None,
            enabled: true,
            clear: true,
        }
    }
}

impl ProgressBarOpts {
    /// Template which looks like the Python package installer pip.
    ///
    /// `photo.jpg ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━ 211.23 KiB/211.23 KiB 1008.31 KiB/s eta 0s`
    ///
    /// The transfer rate comes from the download loop through the bar message.
    pub const TEMPLATE_PIP: &'static str =
        "{prefix} {bar:40.green/black} {bytes:>11.green}/{total_bytes:<11.green} {msg:>13.red} eta {eta:.blue}";
    /// Compact template without a bar.
    ///
    /// `photo.jpg 100.00 KiB/211.23 KiB (47%) 1008.31 KiB/s`
    pub const TEMPLATE_COMPACT: &'static str =
        "{prefix} {bytes}/{total_bytes} ({percent}%) {msg}";
    /// Use fine blocks as progress characters: `"█▉▊▋▌▍▎▏  "`.
    pub const CHARS_FINE: &'static str = "█▉▊▋▌▍▎▏  ";
    /// Use a line as progress characters: `"━╾─"`.
    pub const CHARS_LINE: &'static str = "━╾╴─";

    /// Create a new [`ProgressBarOpts`].
    pub fn new(
        template: Option<String>,
        progress_chars: Option<String>,
        enabled: bool,
        clear: bool,
    ) -> Self {
        Self {
            template,
            progress_chars,
            enabled,
            clear,
        }
    }

    /// Create a [`ProgressStyle`] based on the provided options.
    ///
    /// An invalid template falls back to the default bar.
    pub fn to_progress_style(self) -> ProgressStyle {
        let mut style = ProgressStyle::default_bar();
        if let Some(template) = self.template {
            style = style
                .template(&template)
                .unwrap_or_else(|_| ProgressStyle::default_bar());
        }
        if let Some(progress_chars) = self.progress_chars {
            style = style.progress_chars(&progress_chars);
        }
        style
    }

    /// Create a [`ProgressBar`] based on the provided options.
    pub fn to_progress_bar(self, len: u64) -> ProgressBar {
        // Return a hidden Progress bar if we disabled it.
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let style = self.to_progress_style();
        ProgressBar::new(len).with_style(style)
    }

    /// Create a new [`ProgressBarOpts`] which looks like Python pip.
    pub fn with_pip_style() -> Self {
        Self {
            template: Some(ProgressBarOpts::TEMPLATE_PIP.into()),
            progress_chars: Some(ProgressBarOpts::CHARS_LINE.into()),
            enabled: true,
            clear: true,
        }
    }

    /// Set to `true` to clear the progress bar upon completion.
    pub fn set_clear(&mut self, clear: bool) {
        self.clear = clear;
    }

    /// Whether the bar is drawn at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Create a new [`ProgressBarOpts`] which hides the progress bars.
    pub fn hidden() -> Self {
        Self {
            enabled: false,
            ..ProgressBarOpts::default()
        }
    }
}
