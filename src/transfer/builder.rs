//! Builder pattern implementation for creating [`Transfer`] instances.
//!
//! # Examples
//!
//! ```rust
//! use steady::TransferBuilder;
//! use reqwest::header::{HeaderValue, USER_AGENT};
//!
//! # fn example() -> Result<(), steady::Error> {
//! let transfer = TransferBuilder::new()
//!     .retries(3)
//!     .timeout(10.0)
//!     .header(USER_AGENT, HeaderValue::from_static("steady/0.1"))
//!     .max_size("25M")
//!     .rate("500k")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use super::{
    config::{Retries, TransferConfig, DEFAULT_CHUNK_SIZE},
    transfer::Transfer,
};
use crate::error::Result;
use crate::http::{create_http_client, HttpClientConfig, HttpTransport, Transport};
use crate::progress::ProgressSink;
use crate::utils::parse_bytes;

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// A builder used to create a [`Transfer`].
///
/// ```rust
/// # fn main() -> Result<(), steady::Error> {
/// use steady::TransferBuilder;
///
/// let t = TransferBuilder::new().retries(-1).chunk_size("64k").build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct TransferBuilder {
    config: TransferConfig,
}

impl TransferBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        TransferBuilder::default()
    }

    /// Set the number of retries per download. Negative values retry forever.
    pub fn retries(mut self, retries: i64) -> Self {
        self.config.retries = Retries::from_signed(retries);
        self
    }

    /// Set the request timeout in seconds. Zero or invalid values disable it.
    pub fn timeout(mut self, seconds: f64) -> Self {
        self.config.timeout = seconds_to_duration(seconds).filter(|d| !d.is_zero());
        self
    }

    /// Enable or disable TLS certificate verification.
    pub fn verify(mut self, verify: bool) -> Self {
        self.config.verify = verify;
        self
    }

    /// Send every request through a proxy.
    pub fn proxy(mut self, proxy: reqwest::Proxy) -> Self {
        self.config.proxy = Some(proxy);
        self
    }

    /// Add the http headers.
    ///
    /// You can call `.headers()` multiple times and all `HeaderMap` will be
    /// merged into a single one. These headers override per-request ones.
    ///
    /// See also [`header()`].
    ///
    /// [`header()`]: TransferBuilder::header
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.config.headers.extend(headers);
        self
    }

    /// Add the http header
    ///
    /// ```
    /// use reqwest::header::{self, HeaderValue};
    /// use steady::TransferBuilder;
    ///
    /// let auth = HeaderValue::from_str("Basic aGk6MTIzNDU2Cg==").expect("Invalid auth");
    ///
    /// let builder = TransferBuilder::new()
    ///     .header(header::USER_AGENT, HeaderValue::from_static("curl/7.87"))
    ///     .header(header::AUTHORIZATION, auth);
    /// ```
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.config.headers.insert(name, value);
        self
    }

    /// Reject files smaller than `size`, e.g. `"10k"`.
    pub fn min_size(mut self, size: &str) -> Self {
        self.config.budget.min = parse_bound(size, "minimum file size");
        self
    }

    /// Reject files larger than `size`, e.g. `"200M"`.
    pub fn max_size(mut self, size: &str) -> Self {
        self.config.budget.max = parse_bound(size, "maximum file size");
        self
    }

    /// Largest number of bytes written at once, e.g. `"64k"`.
    pub fn chunk_size(mut self, size: &str) -> Self {
        self.config.chunk_size = match parse_bound(size, "chunk size") {
            Some(size) => usize::try_from(size).unwrap_or(usize::MAX),
            None => DEFAULT_CHUNK_SIZE,
        };
        self
    }

    /// Limit the bandwidth of each transfer, in bytes per second, e.g. `"500k"`.
    pub fn rate(mut self, rate: &str) -> Self {
        self.config.rate = parse_bound(rate, "rate limit");
        self
    }

    /// Interval in seconds between progress events; `None` disables them.
    pub fn progress(mut self, seconds: Option<f64>) -> Self {
        self.config.progress = seconds.and_then(seconds_to_duration);
        self
    }

    /// Check filename extensions against file signatures.
    pub fn adjust_extension(mut self, adjust: bool) -> Self {
        self.config.adjust_extension = adjust;
        self
    }

    /// Record `Last-Modified` as the file's modification time.
    pub fn mtime(mut self, mtime: bool) -> Self {
        self.config.mtime = mtime;
        self
    }

    /// Hand response header metadata to the destination under `key`.
    pub fn http_metadata(mut self, key: impl Into<String>) -> Self {
        self.config.http_metadata = Some(key.into());
        self
    }

    /// Receive progress events.
    pub fn progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.config.progress_sink = sink;
        self
    }

    /// Create the [`Transfer`] with a `reqwest` transport.
    pub fn build(self) -> Result<Transfer> {
        let client = create_http_client(HttpClientConfig {
            timeout: self.config.timeout,
            proxy: self.config.proxy.clone(),
            verify: self.config.verify,
        })?;
        Ok(self.build_with_transport(Arc::new(HttpTransport::new(client))))
    }

    /// Create the [`Transfer`] on top of another transport.
    pub fn build_with_transport(mut self, transport: Arc<dyn Transport>) -> Transfer {
        self.config.normalize();
        Transfer::new(self.config, transport)
    }
}

/// Parse a positive byte amount, warning about anything else.
fn parse_bound(value: &str, what: &str) -> Option<u64> {
    match parse_bytes(value) {
        Ok(bytes) if bytes > 0 => Some(bytes),
        _ => {
            warn!("Invalid {} ({:?})", what, value);
            None
        }
    }
}

fn seconds_to_duration(seconds: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(seconds).ok()
}
