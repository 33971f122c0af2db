//! Per-file request description.
//!
//! # Examples
//!
//! ```rust
//! use steady::download::{TransferRequest, Validation};
//! use reqwest::header::{HeaderValue, REFERER};
//!
//! let request = TransferRequest::try_from("https://example.com/image.jpg")?
//!     .header(REFERER, HeaderValue::from_static("https://example.com/"))
//!     .validate(|response| {
//!         if response.header_str("content-type") == Some("text/html") {
//!             Validation::Redirect("https://example.com/image.jpg?direct=1".into())
//!         } else {
//!             Validation::Accept
//!         }
//!     });
//! # Ok::<(), steady::Error>(())
//! ```

use crate::error::Error;
use crate::http::ResponseView;

use bytes::Bytes;
use reqwest::{
    header::{HeaderMap, HeaderValue, IntoHeaderName},
    Method, Url,
};
use std::convert::TryFrom;
use std::fmt;
use std::sync::Arc;

/// Verdict of a response validation hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Keep going with this response.
    Accept,
    /// Give up on the download.
    Reject,
    /// Discard this response and start over against another URL.
    ///
    /// Restarting does not count against the retry budget.
    Redirect(String),
}

impl From<bool> for Validation {
    fn from(accept: bool) -> Self {
        if accept {
            Self::Accept
        } else {
            Self::Reject
        }
    }
}

/// Hook inspecting each response before its body is consumed.
pub type ValidateFn = dyn Fn(&ResponseView) -> Validation + Send + Sync;

/// Represents a file to be downloaded.
#[derive(Clone)]
pub struct TransferRequest {
    /// URL of the file to download.
    pub url: String,
    /// HTTP method, `GET` unless set otherwise.
    pub method: Method,
    /// Headers specific to this file.
    pub headers: HeaderMap,
    /// Optional request body.
    pub body: Option<Bytes>,
    /// Overrides the transfer-wide extension adjustment setting.
    pub adjust_extension: Option<bool>,
    validate: Option<Arc<ValidateFn>>,
}

impl fmt::Debug for TransferRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferRequest")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("body", &self.body.as_ref().map(Bytes::len))
            .field("adjust_extension", &self.adjust_extension)
            .field("validate", &self.validate.is_some())
            .finish()
    }
}

impl TransferRequest {
    /// Creates a new `GET` request without validating the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            adjust_extension: None,
            validate: None,
        }
    }

    /// Set the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Add a header sent with this request only.
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Merge headers sent with this request only.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Enable or disable extension adjustment for this request.
    pub fn adjust_extension(mut self, adjust: bool) -> Self {
        self.adjust_extension = Some(adjust);
        self
    }

    /// Install a hook called with every response before its body is read.
    pub fn validate<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ResponseView) -> Validation + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(hook));
        self
    }

    /// The installed validation hook, if any.
    pub fn validator(&self) -> Option<&ValidateFn> {
        self.validate.as_deref()
    }
}

impl TryFrom<&Url> for TransferRequest {
    type Error = Error;

    fn try_from(value: &Url) -> Result<Self, Self::Error> {
        match value.scheme() {
            "http" | "https" => Ok(Self::new(value.as_str())),
            scheme => Err(Error::InvalidUrl(format!(
                "The url \"{}\" uses the unsupported scheme \"{}\"",
                value, scheme
            ))),
        }
    }
}

impl TryFrom<&str> for TransferRequest {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Url::parse(value)
            .map_err(|e| {
                Error::InvalidUrl(format!("The url \"{}\" cannot be parsed: {}", value, e))
            })
            .and_then(|u| TransferRequest::try_from(&u))
    }
}
