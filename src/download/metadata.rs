//! Metadata collected from response headers.

use percent_encoding::percent_decode_str;
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, LAST_MODIFIED};
use std::collections::BTreeMap;
use std::time::SystemTime;

/// Longest suffix still treated as a filename extension.
const MAX_EXTENSION_LEN: usize = 16;

/// Response headers plus the values derived from them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpMetadata {
    /// Every header, keyed by lower-case name. Repeated headers keep their last value.
    pub headers: BTreeMap<String, String>,
    /// Filename stem announced by `Content-Disposition`.
    pub filename: Option<String>,
    /// Lower-case extension announced by `Content-Disposition`.
    pub extension: Option<String>,
    /// Parsed `Last-Modified` date.
    pub date: Option<SystemTime>,
}

impl HttpMetadata {
    /// Collect metadata from a response's headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut metadata = Self {
            headers: headers
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect(),
            date: parse_last_modified(headers),
            ..Self::default()
        };

        if let Some(name) = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(content_disposition_filename)
        {
            let (stem, extension) = split_filename(&decode_filename(name));
            metadata.filename = Some(stem);
            metadata.extension = extension;
        }

        metadata
    }
}

/// Parse the `Last-Modified` header as an HTTP-date.
pub fn parse_last_modified(headers: &HeaderMap) -> Option<SystemTime> {
    headers
        .get(LAST_MODIFIED)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| httpdate::parse_http_date(v.trim()).ok())
}

/// Extract the quoted `filename="..."` parameter of a `Content-Disposition` value.
pub fn content_disposition_filename(value: &str) -> Option<&str> {
    let start = value.find("filename=\"")? + "filename=\"".len();
    let rest = &value[start..];
    let name = &rest[..rest.find('"')?];
    (!name.is_empty()).then_some(name)
}

/// Percent-decode a filename taken from a URL or header.
///
/// Only `%XX` escapes are decoded; `+`, `=` and `&` are kept as they are.
pub(crate) fn decode_filename(name: &str) -> String {
    percent_decode_str(name).decode_utf8_lossy().into_owned()
}

/// Make a single path component out of an untrusted filename part.
///
/// Path separators and characters invalid on common filesystems become `_`.
/// A name made of dots only, such as `..`, has its dots replaced as well.
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        "_".to_string()
    } else if sanitized.chars().all(|c| c == '.') {
        sanitized.replace('.', "_")
    } else {
        sanitized
    }
}

/// Split a filename into its stem and lower-case extension.
///
/// A name without a dot, with a leading dot only, or with an overly long
/// suffix has no extension.
pub fn split_filename(name: &str) -> (String, Option<String>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.len() <= MAX_EXTENSION_LEN => {
            let ext = (!ext.is_empty()).then(|| ext.to_ascii_lowercase());
            (stem.to_string(), ext)
        }
        _ => (name.to_string(), None),
    }
}
