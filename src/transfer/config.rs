//! Configuration structures and defaults for a [`Transfer`](super::Transfer).

use crate::budget::SizeBudget;
use crate::progress::{NullProgress, ProgressSink};

use reqwest::header::HeaderMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default number of bytes written per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// How many times a failed attempt is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retries {
    /// Retry up to this many times after the first attempt.
    Limited(u32),
    /// Never give up on retryable errors.
    Infinite,
}

impl Default for Retries {
    fn default() -> Self {
        Self::Limited(4)
    }
}

impl Retries {
    /// Negative counts mean [`Retries::Infinite`].
    pub fn from_signed(retries: i64) -> Self {
        match u32::try_from(retries) {
            Ok(n) => Self::Limited(n),
            Err(_) if retries < 0 => Self::Infinite,
            Err(_) => Self::Limited(u32::MAX),
        }
    }

    /// Whether `attempt` failed attempts use up the budget.
    pub fn exhausted(&self, attempt: u32) -> bool {
        match self {
            Self::Limited(retries) => attempt > *retries,
            Self::Infinite => false,
        }
    }
}

impl fmt::Display for Retries {
    /// Formats the total number of attempts, `inf` when unlimited.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limited(retries) => write!(f, "{}", u64::from(*retries) + 1),
            Self::Infinite => f.write_str("inf"),
        }
    }
}

/// Configuration structure for a transfer.
#[derive(Clone)]
pub struct TransferConfig {
    /// Retry budget for retryable failures.
    pub retries: Retries,
    /// Timeout applied to each request.
    pub timeout: Option<Duration>,
    /// Verify TLS certificates.
    pub verify: bool,
    /// Optional proxy configuration.
    pub proxy: Option<reqwest::Proxy>,
    /// Headers sent with every request.
    pub headers: HeaderMap,
    /// Accepted file sizes.
    pub budget: SizeBudget,
    /// Largest number of bytes written at once.
    pub chunk_size: usize,
    /// Bandwidth limit in bytes per second.
    pub rate: Option<u64>,
    /// Interval between progress events.
    pub progress: Option<Duration>,
    /// Check and correct filename extensions against file signatures.
    pub adjust_extension: bool,
    /// Record `Last-Modified` as the file's modification time.
    pub mtime: bool,
    /// Metadata key under which response headers are handed to the destination.
    pub http_metadata: Option<String>,
    /// Receiver of progress events.
    pub progress_sink: Arc<dyn ProgressSink>,
}

impl fmt::Debug for TransferConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferConfig")
            .field("retries", &self.retries)
            .field("timeout", &self.timeout)
            .field("verify", &self.verify)
            .field("proxy", &self.proxy)
            .field("headers", &self.headers)
            .field("budget", &self.budget)
            .field("chunk_size", &self.chunk_size)
            .field("rate", &self.rate)
            .field("progress", &self.progress)
            .field("adjust_extension", &self.adjust_extension)
            .field("mtime", &self.mtime)
            .field("http_metadata", &self.http_metadata)
            .finish_non_exhaustive()
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            retries: Retries::default(),
            timeout: Some(Duration::from_secs(30)),
            verify: true,
            proxy: None,
            headers: HeaderMap::new(),
            budget: SizeBudget::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            rate: None,
            progress: Some(Duration::from_secs(3)),
            adjust_extension: true,
            mtime: true,
            http_metadata: None,
            progress_sink: Arc::new(NullProgress),
        }
    }
}

impl TransferConfig {
    /// A rate limit below the chunk size shrinks the chunks to match.
    pub(crate) fn normalize(&mut self) {
        if let Some(rate) = self.rate {
            let rate = usize::try_from(rate).unwrap_or(usize::MAX);
            if rate < self.chunk_size {
                self.chunk_size = rate;
            }
        }
        self.chunk_size = self.chunk_size.max(1);
    }
}
