//! Error handling for the steady library.
//!
//! The download loop itself never returns an error: every outcome of
//! [`Transfer::download`](crate::Transfer::download) is a boolean plus a log
//! line. The types in this module cover the fallible setup surface instead,
//! such as building the HTTP client, parsing byte sizes or finalizing a
//! destination on disk.

use std::io;
use thiserror::Error;

/// Errors that can happen when using steady.
#[derive(Error, Debug)]
pub enum Error {
    /// Error from the underlying URL parser or the expected URL format.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A human-readable byte size such as `"10M"` could not be parsed.
    #[error("Invalid byte size: {0:?}")]
    InvalidByteSize(String),

    /// I/O Error.
    ///
    /// This variant wraps standard I/O errors that can occur during file operations,
    /// such as creating, moving, or stamping files on disk.
    #[error("I/O error")]
    IOError {
        #[from]
        source: io::Error,
    },

    /// Error from the Reqwest library.
    ///
    /// Returned when the HTTP client cannot be built from the configuration.
    #[error("Reqwest Error")]
    Reqwest {
        #[from]
        source: reqwest::Error,
    },
}

/// Result type alias for operations that can fail with a steady error.
pub type Result<T> = std::result::Result<T, Error>;
