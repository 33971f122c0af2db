//! Shared utility functions.
//!
//! - [`content_length`] - declared payload sizes from `Content-Length` and
//!   `Content-Range` headers
//! - [`byte_size`] - human-readable byte amounts such as `"2.5M"`
//!
//! # Examples
//!
//! ```rust
//! use steady::utils::{parse_bytes, parse_content_range_total};
//!
//! assert_eq!(parse_content_range_total("bytes 0-1023/2048"), Some(2048));
//! assert_eq!(parse_bytes("10k").unwrap(), 10 * 1024);
//! ```

pub mod byte_size;
pub mod content_length;

pub use byte_size::parse_bytes;
pub use content_length::{declared_size, parse_content_length, parse_content_range_total};
