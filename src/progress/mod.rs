//! Progress reporting.
//!
//! The download loop reports through the [`ProgressSink`] trait: once when
//! it starts writing a file and then periodically while bytes arrive.
//!
//! - `style` - progress bar styling options and templates
//! - `display` - an `indicatif` progress bar implementing [`ProgressSink`]
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use steady::progress::{ProgressBarOpts, ProgressDisplay};
//! use steady::TransferBuilder;
//!
//! let display = Arc::new(ProgressDisplay::new(ProgressBarOpts::with_pip_style()));
//! let builder = TransferBuilder::new().progress_sink(display);
//! ```

pub(crate) mod display;
pub(crate) mod style;

pub use display::ProgressDisplay;
pub use style::ProgressBarOpts;

use std::path::Path;

/// Receiver of progress events.
pub trait ProgressSink: Send + Sync {
    /// A file started receiving bytes.
    fn on_start(&self, path: &Path);

    /// `downloaded` out of `total` bytes are on disk; `rate` is in bytes per second.
    fn on_progress(&self, total: Option<u64>, downloaded: u64, rate: u64);
}

/// Sink discarding every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_start(&self, _path: &Path) {}

    fn on_progress(&self, _total: Option<u64>, _downloaded: u64, _rate: u64) {}
}
