//! Chunked copy loop.

use crate::http::TransportError;
use crate::progress::ProgressSink;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::fmt;
use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::time::{sleep, Instant};

/// Why a copy stopped early.
#[derive(Error, Debug)]
pub enum CopyError {
    /// Reading the next chunk from the source failed.
    #[error(transparent)]
    Stream(TransportError),
    /// Writing to the sink failed.
    #[error("write error: {0}")]
    Write(#[from] io::Error),
}

/// Writes body chunks to a sink, optionally pacing them and reporting progress.
///
/// Chunks larger than the configured chunk size are split before writing.
/// Without a rate limit or progress interval the copy is a plain write loop.
/// Otherwise, after each chunk the time it took is compared with the time the
/// chunk should take at the target rate, and the difference is slept off.
pub struct ThrottledCopier<'a> {
    chunk_size: usize,
    rate: Option<u64>,
    progress: Option<Duration>,
    sink: &'a dyn ProgressSink,
}

impl fmt::Debug for ThrottledCopier<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThrottledCopier")
            .field("chunk_size", &self.chunk_size)
            .field("rate", &self.rate)
            .field("progress", &self.progress)
            .finish_non_exhaustive()
    }
}

impl<'a> ThrottledCopier<'a> {
    /// Create a copier.
    ///
    /// `rate` is in bytes per second; zero is treated as unlimited.
    pub fn new(
        chunk_size: usize,
        rate: Option<u64>,
        progress: Option<Duration>,
        sink: &'a dyn ProgressSink,
    ) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            rate: rate.filter(|r| *r > 0),
            progress,
            sink,
        }
    }

    /// Whether timing is tracked per chunk.
    pub fn is_throttled(&self) -> bool {
        self.rate.is_some() || self.progress.is_some()
    }

    /// Copy every chunk of `body` into `writer`.
    ///
    /// `total` is the declared size of the whole file and `downloaded` the
    /// number of bytes already on disk before this copy, both only used for
    /// progress events. Returns the number of bytes written by this call.
    pub async fn copy<W, S>(
        &self,
        writer: &mut W,
        body: &mut S,
        total: Option<u64>,
        downloaded: u64,
    ) -> Result<u64, CopyError>
    where
        W: AsyncWrite + Unpin + ?Sized,
        S: Stream<Item = Result<Bytes, TransportError>> + Unpin + ?Sized,
    {
        let mut pacer = self.is_throttled().then(|| Pacer::new(downloaded));
        let mut written = 0u64;

        while let Some(item) = body.next().await {
            let mut data = match item {
                Ok(data) => data,
                Err(e) => {
                    // Whatever arrived so far must be on disk before a resume.
                    writer.flush().await?;
                    return Err(CopyError::Stream(e));
                }
            };
            while !data.is_empty() {
                let chunk = data.split_to(self.chunk_size.min(data.len()));
                writer.write_all(&chunk).await?;
                written += chunk.len() as u64;

                if let Some(pacer) = pacer.as_mut() {
                    pacer.chunk_written(self, chunk.len(), total).await;
                }
            }
        }

        writer.flush().await?;
        Ok(written)
    }
}

/// Timing state of one throttled copy.
struct Pacer {
    start: Instant,
    last_chunk: Instant,
    last_report: Instant,
    bytes_start: u64,
    downloaded: u64,
}

impl Pacer {
    fn new(downloaded: u64) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_chunk: now,
            last_report: now,
            bytes_start: downloaded,
            downloaded,
        }
    }

    async fn chunk_written(&mut self, copier: &ThrottledCopier<'_>, len: usize, total: Option<u64>) {
        let mut now = Instant::now();
        let elapsed = now - self.last_chunk;
        self.downloaded += len as u64;

        if let Some(interval) = copier.progress {
            if now - self.last_report >= interval {
                let since_start = (now - self.start).as_secs_f64();
                let rate = if since_start > 0.0 {
                    ((self.downloaded - self.bytes_start) as f64 / since_start) as u64
                } else {
                    0
                };
                copier.sink.on_progress(total, self.downloaded, rate);
                self.last_report = now;
            }
        }

        if let Some(rate) = copier.rate {
            let expected = Duration::from_secs_f64(len as f64 / rate as f64);
            if elapsed < expected {
                sleep(expected - elapsed).await;
                now = Instant::now();
            }
        }

        self.last_chunk = now;
    }
}
