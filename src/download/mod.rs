//! Download module containing what a single transfer works on.
//!
//! - [`request`] - the [`TransferRequest`] describing what to fetch, and the
//!   optional response [`Validation`] hook
//! - [`destination`] - the [`Destination`] trait and the filesystem-backed
//!   [`FileDestination`]
//! - [`metadata`] - [`HttpMetadata`] gathered from response headers
//!
//! # Examples
//!
//! ```rust
//! use steady::download::{Destination, FileDestination, TransferRequest};
//!
//! let url = "https://example.com/files/report.pdf";
//! let request = TransferRequest::try_from(url)?;
//! let destination = FileDestination::from_url("downloads", url)?;
//! assert_eq!(request.url, url);
//! assert_eq!(destination.extension(), Some("pdf"));
//! # Ok::<(), steady::Error>(())
//! ```

pub mod destination;
pub mod metadata;
pub mod request;

pub use destination::{Destination, FileDestination, OpenMode};
pub use metadata::HttpMetadata;
pub use request::{TransferRequest, ValidateFn, Validation};
