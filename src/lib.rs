//! Steady is a crate aiming at providing a robust way to download single
//! files over HTTP(S): interrupted downloads are resumed, transient failures
//! are retried with a linear backoff, file sizes are checked against
//! configured bounds and filename extensions are verified against the
//! file's magic bytes.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use steady::{Error, FileDestination, TransferBuilder, TransferRequest};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! let url = "https://github.com/seanmonstar/reqwest/archive/refs/tags/v0.11.9.zip";
//! let request = TransferRequest::try_from(url)?;
//! let mut destination = FileDestination::from_url("output", url)?;
//!
//! let transfer = TransferBuilder::new().retries(3).rate("1M").build()?;
//! if transfer.download(&request, &mut destination).await {
//!     destination.finalize().await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! The steady crate is organized into several modules:
//!
//! - [`transfer`] - The main `Transfer` and `TransferBuilder` driving the retry loop
//! - [`download`] - Per-file inputs: `TransferRequest`, the `Destination` trait and `FileDestination`
//! - [`signature`] - Magic byte and MIME type tables used to pick filename extensions
//! - [`budget`] - Minimum/maximum file size policy
//! - [`throttle`] - Rate-limited streaming copy
//! - [`error`] - Centralized error handling with the `Error` enum
//! - [`http`] - HTTP client setup and the `Transport` abstraction
//! - [`progress`] - Progress events and an `indicatif` progress bar
//! - [`utils`] - Shared utility functions

pub mod budget;
pub mod download;
pub mod error;
pub mod http;
pub mod progress;
pub mod signature;
pub mod throttle;
pub mod transfer;
pub mod utils;

pub use budget::{BudgetViolation, SizeBudget};
pub use download::{Destination, FileDestination, HttpMetadata, OpenMode, TransferRequest, Validation};
pub use error::{Error, Result};
pub use http::{create_http_client, HttpClientConfig, HttpTransport, ResponseView, Transport};
pub use progress::{NullProgress, ProgressBarOpts, ProgressDisplay, ProgressSink};
pub use transfer::{Retries, Transfer, TransferBuilder, TransferConfig};
pub use utils::{parse_bytes, parse_content_range_total};
