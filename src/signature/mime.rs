//! MIME type to filename extension mapping.

use tracing::warn;

/// MIME types with a well-known extension, checked before `mime_guess`.
pub static MIME_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/bmp", "bmp"),
    ("image/x-bmp", "bmp"),
    ("image/x-ms-bmp", "bmp"),
    ("image/webp", "webp"),
    ("image/avif", "avif"),
    ("image/svg+xml", "svg"),
    ("image/ico", "ico"),
    ("image/icon", "ico"),
    ("image/x-icon", "ico"),
    ("image/vnd.microsoft.icon", "ico"),
    ("image/x-photoshop", "psd"),
    ("application/x-photoshop", "psd"),
    ("image/vnd.adobe.photoshop", "psd"),
    ("video/webm", "webm"),
    ("video/ogg", "ogg"),
    ("video/mp4", "mp4"),
    ("audio/wav", "wav"),
    ("audio/x-wav", "wav"),
    ("audio/webm", "webm"),
    ("audio/ogg", "ogg"),
    ("audio/mpeg", "mp3"),
    ("application/zip", "zip"),
    ("application/x-zip", "zip"),
    ("application/x-zip-compressed", "zip"),
    ("application/rar", "rar"),
    ("application/x-rar", "rar"),
    ("application/x-rar-compressed", "rar"),
    ("application/x-7z-compressed", "7z"),
    ("application/pdf", "pdf"),
    ("application/x-pdf", "pdf"),
    ("application/x-shockwave-flash", "swf"),
    ("application/ogg", "ogg"),
    ("application/octet-stream", "bin"),
];

/// Content type assumed when a response carries none.
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Map a `Content-Type` value to a filename extension.
///
/// Parameters after `;` are ignored and a bare subtype such as `"png"` is
/// read as `"image/png"`. Types missing from [`MIME_TYPES`] are resolved
/// through `mime_guess`; if that fails too, a warning is logged and `"bin"`
/// is returned.
pub fn infer_extension_from_mime(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let mime = if essence.contains('/') {
        essence
    } else {
        format!("image/{essence}")
    };

    if let Some(ext) = MIME_TYPES
        .iter()
        .find(|(m, _)| *m == mime)
        .map(|(_, ext)| *ext)
    {
        return ext;
    }

    if let Some(ext) =
        mime_guess::get_mime_extensions_str(&mime).and_then(|exts| exts.first().copied())
    {
        return ext;
    }

    warn!("Unknown MIME type '{}'", mime);
    "bin"
}
