//! Per-attempt classification of response status codes.

use reqwest::StatusCode;

/// What a response status means for the current attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// `200`: the whole file follows, starting at byte 0.
    Full,
    /// `206`: the requested range follows.
    Partial,
    /// `416` on a resumed request: nothing is left to fetch.
    AlreadyComplete,
    /// `429` or `5xx`: worth another attempt.
    Retryable,
    /// Anything else.
    Fatal,
}

impl ResponseClass {
    /// Classify `status` for a request that asked for bytes from `offset` on.
    pub fn classify(status: StatusCode, offset: u64) -> Self {
        match status {
            StatusCode::OK => Self::Full,
            StatusCode::PARTIAL_CONTENT => Self::Partial,
            StatusCode::RANGE_NOT_SATISFIABLE if offset > 0 => Self::AlreadyComplete,
            StatusCode::TOO_MANY_REQUESTS => Self::Retryable,
            status if status.is_server_error() => Self::Retryable,
            _ => Self::Fatal,
        }
    }

    /// Byte position the response body starts at.
    pub fn body_offset(&self, requested: u64) -> u64 {
        match self {
            Self::Partial => requested,
            _ => 0,
        }
    }
}

/// Log message for an unusable status, e.g. `'503 Service Unavailable' for 'https://...'`.
pub fn status_message(status: StatusCode, url: &str) -> String {
    format!(
        "'{} {}' for '{}'",
        status.as_u16(),
        status.canonical_reason().unwrap_or_default(),
        url
    )
}
