//! File type identification by magic bytes and MIME type.
//!
//! This module holds the two process-wide lookup tables used to keep a
//! destination's filename extension honest:
//!
//! - [`checks`] - an ordered list of `(extension, predicate)` pairs matching
//!   the leading bytes of a payload
//! - [`mime`] - a static MIME type to extension mapping with a fallback to
//!   the `mime_guess` database
//!
//! Both tables are immutable and safe to share between concurrent transfers.
//!
//! # Examples
//!
//! ```rust
//! use steady::signature::{detect_extension, infer_extension_from_mime, match_signature};
//!
//! let header = b"\x89PNG\r\n\x1A\n\0\0\0\rIHDR";
//! assert!(match_signature("png", header));
//! assert!(!match_signature("jpg", header));
//! assert_eq!(detect_extension(header), Some("png"));
//!
//! assert_eq!(infer_extension_from_mime("image/png; charset=binary"), "png");
//! assert_eq!(infer_extension_from_mime("gif"), "gif");
//! ```

pub mod checks;
pub mod mime;

pub use checks::{detect_extension, has_signature, match_signature, SIGNATURE_CHECKS};
pub use mime::{infer_extension_from_mime, DEFAULT_MIME_TYPE, MIME_TYPES};

/// Number of leading bytes the signature predicates look at.
pub const HEADER_LEN: usize = 16;

/// Check `extension` against `header` and return the corrected extension.
///
/// Returns `None` when the extension is confirmed by its own signature, or
/// when no known signature matches the header either. A `"bin"` extension is
/// never self-confirming, so binary payloads always get identified when their
/// leading bytes are recognised.
pub fn corrected_extension(extension: &str, header: &[u8]) -> Option<&'static str> {
    if match_signature(extension, header) {
        return None;
    }
    detect_extension(header)
}
