//! The request/response seam between the download loop and the network.
//!
//! [`Transfer`](crate::Transfer) only ever sees a [`ResponseView`]: a status
//! code, a header map and a single-pass stream of body chunks. Anything able
//! to produce one can stand in for HTTP through the [`Transport`] trait.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use reqwest::{
    header::{AsHeaderName, HeaderMap},
    Method, StatusCode,
};
use reqwest_middleware::ClientWithMiddleware;
use std::fmt;
use std::pin::Pin;
use thiserror::Error;

/// Lazy, single-pass sequence of body chunks.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Failures reported by a [`Transport`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The remote end could not be reached.
    #[error("{0}")]
    Connect(String),
    /// The request or a body read took longer than the configured timeout.
    #[error("{0}")]
    Timeout(String),
    /// Any other failure while issuing the request.
    #[error("{0}")]
    Request(String),
    /// The body stream broke off mid-transfer.
    #[error("{0}")]
    Body(String),
}

impl TransportError {
    /// Whether another attempt may succeed where this one failed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Request(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

impl From<reqwest_middleware::Error> for TransportError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(err) => Self::from(err),
            reqwest_middleware::Error::Middleware(err) => Self::Request(err.to_string()),
        }
    }
}

/// Everything a transport needs to issue one request.
#[derive(Debug)]
pub struct TransportRequest<'a> {
    pub method: &'a Method,
    pub url: &'a str,
    pub headers: HeaderMap,
    pub body: Option<&'a Bytes>,
}

/// One response, alive for the duration of a single attempt.
pub struct ResponseView {
    status: StatusCode,
    headers: HeaderMap,
    body: BodyStream,
}

impl fmt::Debug for ResponseView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseView")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl ResponseView {
    pub fn new(status: StatusCode, headers: HeaderMap, body: BodyStream) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Build a response whose body yields `chunks` in order.
    pub fn from_chunks(status: StatusCode, headers: HeaderMap, chunks: Vec<Bytes>) -> Self {
        Self::new(status, headers, stream::iter(chunks.into_iter().map(Ok)).boxed())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Value of a header as text, if present and valid.
    pub fn header_str<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn into_body(self) -> BodyStream {
        self.body
    }
}

/// Issues requests on behalf of [`Transfer`](crate::Transfer).
///
/// Implementations must map unreachable hosts and timeouts to
/// [`TransportError::Connect`] / [`TransportError::Timeout`] so they get
/// retried; every other error is final.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest<'_>) -> Result<ResponseView, TransportError>;
}

/// [`Transport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: ClientWithMiddleware,
}

impl HttpTransport {
    pub fn new(client: ClientWithMiddleware) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest<'_>) -> Result<ResponseView, TransportError> {
        let mut req = self
            .client
            .request(request.method.clone(), request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            req = req.body(body.clone());
        }

        let res = req.send().await?;
        let status = res.status();
        let headers = res.headers().clone();
        let body = res
            .bytes_stream()
            .map(|item| item.map_err(|e| TransportError::Body(e.to_string())))
            .boxed();

        Ok(ResponseView::new(status, headers, body))
    }
}
