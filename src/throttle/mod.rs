//! Streaming copy with optional bandwidth limiting and progress events.
//!
//! - [`copier`] - [`ThrottledCopier`], writing body chunks to a sink while
//!   pacing them to a target rate and reporting progress
//!
//! # Examples
//!
//! ```rust
//! use bytes::Bytes;
//! use futures::stream;
//! use steady::progress::NullProgress;
//! use steady::throttle::ThrottledCopier;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sink = NullProgress;
//! let copier = ThrottledCopier::new(32 * 1024, Some(512 * 1024), Some(Duration::from_secs(3)), &sink);
//!
//! let mut body = stream::iter(vec![Ok(Bytes::from_static(b"hello"))]);
//! let mut out = Vec::new();
//! let written = copier.copy(&mut out, &mut body, Some(5), 0).await?;
//! assert_eq!(written, 5);
//! # Ok(())
//! # }
//! ```

pub mod copier;

pub use copier::{CopyError, ThrottledCopier};
