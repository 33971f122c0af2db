//! Content length extraction utilities.
//!
//! A full (`200 OK`) response announces its size through `Content-Length`,
//! while a partial (`206 Partial Content`) response carries the size of the
//! whole resource after the slash of its `Content-Range` header.

use reqwest::{
    header::{HeaderMap, CONTENT_LENGTH, CONTENT_RANGE},
    StatusCode,
};

/// Size of the complete resource announced by a response, if any.
///
/// # Example
///
/// ```rust
/// use reqwest::header::{HeaderMap, HeaderValue, CONTENT_RANGE};
/// use reqwest::StatusCode;
/// use steady::utils::declared_size;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(CONTENT_RANGE, HeaderValue::from_static("bytes 100-199/200"));
/// assert_eq!(declared_size(StatusCode::PARTIAL_CONTENT, &headers), Some(200));
/// ```
pub fn declared_size(status: StatusCode, headers: &HeaderMap) -> Option<u64> {
    match status {
        StatusCode::PARTIAL_CONTENT => headers
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total),
        _ => parse_content_length(headers),
    }
}

/// Parse the `Content-Length` header, ignoring malformed values.
pub fn parse_content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// Parse Content-Range header to extract total size.
///
/// Content-Range header format: "bytes start-end/total"
///
/// # Example
///
/// ```rust
/// use steady::utils::parse_content_range_total;
///
/// let total = parse_content_range_total("bytes 0-1023/2048");
/// assert_eq!(total, Some(2048));
/// assert_eq!(parse_content_range_total("bytes 0-1023/*"), None);
/// ```
pub fn parse_content_range_total(content_range: &str) -> Option<u64> {
    content_range
        .rsplit_once('/')
        .and_then(|(_, size)| size.trim().parse::<u64>().ok())
}
