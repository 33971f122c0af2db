//! Core transfer implementation with the retry loop.
//!
//! # Examples
//!
//! ```rust,no_run
//! use steady::{FileDestination, TransferBuilder, TransferRequest};
//!
//! # async fn example() -> Result<(), steady::Error> {
//! let transfer = TransferBuilder::new().retries(3).build()?;
//! let request = TransferRequest::try_from("https://example.com/images/cat.jpg")?;
//! let mut destination = FileDestination::from_url("downloads", &request.url)?;
//!
//! if transfer.download(&request, &mut destination).await {
//!     destination.finalize().await?;
//! }
//! # Ok(())
//! # }
//! ```

use super::config::{Retries, TransferConfig};
use super::guard::IncompleteGuard;
use super::status::{status_message, ResponseClass};
use crate::download::metadata::parse_last_modified;
use crate::download::{Destination, HttpMetadata, OpenMode, TransferRequest, Validation};
use crate::http::{BodyStream, Transport, TransportError, TransportRequest};
use crate::signature::{
    corrected_extension, has_signature, infer_extension_from_mime, DEFAULT_MIME_TYPE, HEADER_LEN,
};
use crate::throttle::{CopyError, ThrottledCopier};
use crate::utils::declared_size;

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, RANGE};
use std::fmt;
use std::io::SeekFrom;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::time::sleep;
use tracing::{debug, warn};

/// Result of a single attempt.
#[derive(Debug)]
enum Attempt {
    /// Every byte is on disk.
    Complete(Option<SystemTime>),
    /// The resolved path already exists; nothing was written.
    Exists,
    /// Start over against another URL without using up a retry.
    Redirect(String),
    /// Transient failure.
    Retry(String),
    /// Give up; the reason has been logged.
    Fatal,
}

/// Represents the transfer engine.
///
/// A transfer is created via its builder and can be shared between tasks;
/// each call to [`Transfer::download`] is independent.
///
/// ```rust
/// # fn main() -> Result<(), steady::Error> {
/// use steady::TransferBuilder;
///
/// let t = TransferBuilder::new().build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Transfer {
    config: TransferConfig,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transfer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Transfer {
    /// Creates a new Transfer with the given configuration.
    pub(crate) fn new(config: TransferConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// Gets the full configuration.
    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Gets the retry budget.
    pub fn retries(&self) -> Retries {
        self.config.retries
    }

    /// Gets the bandwidth limit in bytes per second.
    pub fn rate(&self) -> Option<u64> {
        self.config.rate
    }

    /// Gets the chunk size.
    pub fn chunk_size(&self) -> usize {
        self.config.chunk_size
    }

    /// Download `request` into `destination`.
    ///
    /// Returns `true` once the destination holds the complete file, or when
    /// the file turned out to exist already. Returns `false` when the
    /// download failed for good; the reason is logged.
    pub async fn download<D>(&self, request: &TransferRequest, destination: &mut D) -> bool
    where
        D: Destination + ?Sized,
    {
        let mut guard = IncompleteGuard::new();
        let mut url = request.url.clone();
        let mut tries: u32 = 0;

        loop {
            match self.attempt(request, &url, destination, &mut guard).await {
                Attempt::Complete(last_modified) => {
                    guard.disarm();
                    if self.config.mtime {
                        destination.record_mtime(last_modified);
                    }
                    return true;
                }
                Attempt::Exists => {
                    guard.disarm();
                    destination.skip_temp();
                    return true;
                }
                Attempt::Redirect(next) => {
                    debug!("Retrying with {}", next);
                    url = next;
                }
                Attempt::Retry(reason) => {
                    tries = tries.saturating_add(1);
                    warn!("{} ({}/{})", reason, tries, self.config.retries);
                    if self.config.retries.exhausted(tries) {
                        return false;
                    }
                    sleep(Duration::from_secs(u64::from(tries))).await;
                }
                Attempt::Fatal => return false,
            }
        }
    }

    async fn attempt<D>(
        &self,
        request: &TransferRequest,
        url: &str,
        destination: &mut D,
        guard: &mut IncompleteGuard,
    ) -> Attempt
    where
        D: Destination + ?Sized,
    {
        // A file left by an earlier attempt must not pass for an existing download.
        guard.discard();

        let partial = destination.partial_size();
        let headers = self.request_headers(request, partial);

        let response = match self
            .transport
            .send(TransportRequest {
                method: &request.method,
                url,
                headers,
                body: request.body.as_ref(),
            })
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_retryable() => return Attempt::Retry(e.to_string()),
            Err(e) => {
                warn!("{}", e);
                return Attempt::Fatal;
            }
        };

        let status = response.status();
        let class = ResponseClass::classify(status, partial);
        match class {
            ResponseClass::Full | ResponseClass::Partial => {}
            ResponseClass::AlreadyComplete => {
                return Attempt::Complete(parse_last_modified(response.headers()));
            }
            ResponseClass::Retryable => return Attempt::Retry(status_message(status, url)),
            ResponseClass::Fatal => {
                warn!("{}", status_message(status, url));
                return Attempt::Fatal;
            }
        }
        let mut offset = class.body_offset(partial);
        let size = declared_size(status, response.headers());

        if let Some(validate) = request.validator() {
            match validate(&response) {
                Validation::Accept => {}
                Validation::Reject => {
                    warn!("Invalid response");
                    return Attempt::Fatal;
                }
                Validation::Redirect(next) => return Attempt::Redirect(next),
            }
        }

        if let Err(violation) = self.config.budget.check(size) {
            warn!("{}", violation);
            return Attempt::Fatal;
        }

        if destination.extension().is_none() {
            let mime = response
                .header_str(CONTENT_TYPE)
                .unwrap_or(DEFAULT_MIME_TYPE);
            destination.set_extension(infer_extension_from_mime(mime));
            if destination.exists() {
                return Attempt::Exists;
            }
        }

        if let Some(key) = self.config.http_metadata.as_deref() {
            destination.set_metadata(key, HttpMetadata::from_headers(response.headers()));
            if destination.exists() {
                return Attempt::Exists;
            }
        }

        let last_modified = parse_last_modified(response.headers());
        let mut body = response.into_body();

        let adjust = request
            .adjust_extension
            .unwrap_or(self.config.adjust_extension);
        let mut header = Bytes::new();
        if adjust && offset == 0 && has_known_signature(destination) {
            header = match read_header(&mut body).await {
                Ok(header) => header,
                Err(e) => return Attempt::Retry(e.to_string()),
            };
            if adjust_extension(destination, &header) && destination.exists() {
                return Attempt::Exists;
            }
        }

        let mode = if offset == 0 {
            if partial > 0 {
                debug!("Unable to resume partial download");
            }
            OpenMode::Truncate
        } else {
            debug!("Resuming download at byte {}", offset);
            OpenMode::Update
        };

        if !destination.supports_resume() {
            guard.arm(destination.temp_path());
        }
        let mut file = match destination.open(mode).await {
            Ok(file) => file,
            Err(e) => {
                warn!("Unable to open {:?}: {}", destination.temp_path(), e);
                return Attempt::Fatal;
            }
        };

        if !header.is_empty() {
            if let Err(e) = file.write_all(&header).await {
                warn!("Unable to write {:?}: {}", destination.temp_path(), e);
                return Attempt::Fatal;
            }
            offset += header.len() as u64;
        } else if offset > 0 {
            if adjust && has_known_signature(destination) {
                let mut existing = Vec::with_capacity(HEADER_LEN);
                if let Err(e) = (&mut file)
                    .take(HEADER_LEN as u64)
                    .read_to_end(&mut existing)
                    .await
                {
                    warn!("Unable to read {:?}: {}", destination.temp_path(), e);
                    return Attempt::Fatal;
                }
                adjust_extension(destination, &existing);
            }
            if let Err(e) = file.seek(SeekFrom::Start(offset)).await {
                warn!("Unable to seek {:?}: {}", destination.temp_path(), e);
                return Attempt::Fatal;
            }
        }

        let sink = self.config.progress_sink.as_ref();
        sink.on_start(destination.path());

        let copier = ThrottledCopier::new(
            self.config.chunk_size,
            self.config.rate,
            self.config.progress,
            sink,
        );
        let written = match copier.copy(&mut file, &mut body, size, offset).await {
            Ok(written) => written,
            Err(CopyError::Stream(e)) => return Attempt::Retry(e.to_string()),
            Err(CopyError::Write(e)) => {
                warn!("Unable to write {:?}: {}", destination.temp_path(), e);
                return Attempt::Fatal;
            }
        };

        let position = offset + written;
        if let Some(size) = size.filter(|size| *size > 0) {
            if position < size {
                return Attempt::Retry(format!("file size mismatch ({} < {})", position, size));
            }
        }

        Attempt::Complete(last_modified)
    }

    /// `Accept: */*`, then per-request headers, then global headers, then `Range`.
    fn request_headers(&self, request: &TransferRequest, partial: u64) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.extend(request.headers.clone());
        headers.extend(self.config.headers.clone());
        if partial > 0 {
            if let Ok(range) = HeaderValue::from_str(&format!("bytes={}-", partial)) {
                headers.insert(RANGE, range);
            }
        }
        headers
    }
}

fn has_known_signature<D: Destination + ?Sized>(destination: &D) -> bool {
    destination.extension().is_some_and(has_signature)
}

/// Switch to the extension the header bytes point to. Returns whether it changed.
fn adjust_extension<D: Destination + ?Sized>(destination: &mut D, header: &[u8]) -> bool {
    let corrected = destination
        .extension()
        .and_then(|extension| corrected_extension(extension, header));
    match corrected {
        Some(extension) => {
            debug!("Adjusting filename extension to '{}'", extension);
            destination.set_extension(extension);
            true
        }
        None => false,
    }
}

/// Collect at least [`HEADER_LEN`] bytes from the start of the body, or all of it if shorter.
async fn read_header(body: &mut BodyStream) -> Result<Bytes, TransportError> {
    let mut header = BytesMut::new();
    while header.len() < HEADER_LEN {
        match body.next().await {
            Some(chunk) => header.extend_from_slice(&chunk?),
            None => break,
        }
    }
    Ok(header.freeze())
}
