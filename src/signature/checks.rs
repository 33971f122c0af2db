//! Magic-byte signatures of the file types steady can identify.
//!
//! See <https://en.wikipedia.org/wiki/List_of_file_signatures>.

/// Predicate over the leading bytes of a payload.
pub type SignatureCheck = fn(&[u8]) -> bool;

/// Known signatures, in the order [`detect_extension`] tries them.
///
/// The first matching entry wins. `"bin"` never matches, so a `.bin` file is
/// always checked against every other signature.
pub static SIGNATURE_CHECKS: &[(&str, SignatureCheck)] = &[
    ("jpg", |s| starts_with(s, b"\xFF\xD8\xFF")),
    ("png", |s| starts_with(s, b"\x89PNG\r\n\x1A\n")),
    ("gif", |s| starts_with(s, b"GIF87a") || starts_with(s, b"GIF89a")),
    ("bmp", |s| starts_with(s, b"BM")),
    ("webp", |s| riff(s, b"WEBP")),
    ("avif", |s| bytes_at(s, 4, b"ftypavif")),
    ("svg", |s| starts_with(s, b"<?xml")),
    ("ico", |s| starts_with(s, b"\x00\x00\x01\x00")),
    ("cur", |s| starts_with(s, b"\x00\x00\x02\x00")),
    ("psd", |s| starts_with(s, b"8BPS")),
    ("webm", |s| starts_with(s, b"\x1A\x45\xDF\xA3")),
    ("ogg", |s| starts_with(s, b"OggS")),
    ("wav", |s| riff(s, b"WAVE")),
    ("mp3", |s| {
        starts_with(s, b"ID3")
            || [b"\xFF\xFB", b"\xFF\xF3", b"\xFF\xF2"]
                .iter()
                .any(|sync| starts_with(s, *sync))
    }),
    ("zip", |s| {
        [b"PK\x03\x04", b"PK\x05\x06", b"PK\x07\x08"]
            .iter()
            .any(|magic| starts_with(s, *magic))
    }),
    ("rar", |s| starts_with(s, b"\x52\x61\x72\x21\x1A\x07")),
    ("7z", |s| starts_with(s, b"\x37\x7A\xBC\xAF\x27\x1C")),
    ("pdf", |s| starts_with(s, b"%PDF-")),
    ("swf", |s| starts_with(s, b"CWS") || starts_with(s, b"FWS")),
    ("bin", |_| false),
];

fn bytes_at(header: &[u8], offset: usize, expected: &[u8]) -> bool {
    header.get(offset..offset + expected.len()) == Some(expected)
}

fn starts_with(header: &[u8], expected: &[u8]) -> bool {
    bytes_at(header, 0, expected)
}

// RIFF containers carry their subtype in bytes 8..12.
fn riff(header: &[u8], subtype: &[u8; 4]) -> bool {
    starts_with(header, b"RIFF") && bytes_at(header, 8, subtype)
}

/// Returns `true` if `extension` has an entry in [`SIGNATURE_CHECKS`].
pub fn has_signature(extension: &str) -> bool {
    SIGNATURE_CHECKS.iter().any(|(ext, _)| *ext == extension)
}

/// Check whether `header` starts with the signature registered for `extension`.
///
/// Unknown extensions never match.
pub fn match_signature(extension: &str, header: &[u8]) -> bool {
    SIGNATURE_CHECKS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .is_some_and(|(_, check)| check(header))
}

/// Find the first known file type whose signature matches `header`.
pub fn detect_extension(header: &[u8]) -> Option<&'static str> {
    SIGNATURE_CHECKS
        .iter()
        .find(|(_, check)| check(header))
        .map(|(ext, _)| *ext)
}
