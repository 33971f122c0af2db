use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use steady::http::{ResponseView, Transport, TransportError, TransportRequest};
use steady::{FileDestination, ProgressSink, Transfer, TransferBuilder};
use tempfile::TempDir;
use tokio::time::Instant;
use wiremock::{Request, Respond, ResponseTemplate};

// Common test constants
pub const TEST_URL: &str = "http://example.org/file";
pub const TEST_USER_AGENT: &str = "steady-test-agent";

// === Sample payloads ===

/// A 1x1 JPEG image.
pub const JPG_DATA: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x01, 0x00, 0x48,
    0x00, 0x48, 0x00, 0x00, 0xFF, 0xDB, 0x00, 0x43, 0x00, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
    0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
    0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
    0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
    0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0xFF, 0xDB, 0x00, 0x43, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
    0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
    0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
    0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
    0x01, 0x01, 0x01, 0x01, 0x01, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x01, 0x00, 0x01, 0x03, 0x01,
    0x11, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01, 0xFF, 0xC4, 0x00, 0x14, 0x00, 0x01, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0A, 0xFF, 0xC4,
    0x00, 0x14, 0x10, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0xFF, 0xC4, 0x00, 0x14, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xC4, 0x00, 0x14, 0x11, 0x01,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0xFF, 0xDA, 0x00, 0x0C, 0x03, 0x01, 0x00, 0x02, 0x11, 0x03, 0x11, 0x00, 0x3F, 0x00, 0x7F, 0x00,
    0xFF, 0xD9,
];

/// A 1x1 PNG image.
pub const PNG_DATA: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x00, 0x00, 0x00, 0x00, 0x3A, 0x7E, 0x9B,
    0x55, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x08, 0x1D, 0x63, 0xF8, 0x0F, 0x00, 0x01,
    0x01, 0x01, 0x00, 0x36, 0x5F, 0x67, 0x80, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

/// A 1x1 GIF image.
pub const GIF_DATA: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x37, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0x2C, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44,
    0x01, 0x00, 0x3B,
];

/// Leading bytes of every file type with a known signature.
pub const SIGNATURE_SAMPLES: &[(&str, &[u8])] = &[
    ("jpg", JPG_DATA),
    ("png", PNG_DATA),
    ("gif", GIF_DATA),
    ("bmp", b"BM"),
    ("webp", b"RIFF????WEBP"),
    ("avif", b"????ftypavif"),
    ("svg", b"<?xml"),
    ("ico", b"\x00\x00\x01\x00"),
    ("cur", b"\x00\x00\x02\x00"),
    ("psd", b"8BPS"),
    ("webm", b"\x1A\x45\xDF\xA3"),
    ("ogg", b"OggS"),
    ("wav", b"RIFF????WAVE"),
    ("mp3", b"ID3"),
    ("zip", b"PK\x03\x04"),
    ("rar", b"\x52\x61\x72\x21\x1A\x07"),
    ("7z", b"\x37\x7A\xBC\xAF\x27\x1C"),
    ("pdf", b"%PDF-"),
    ("swf", b"CWS"),
];

/// Content type served for a sample image.
pub fn mime_type_for(extension: &str) -> &'static str {
    match extension {
        "jpg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

// === Filesystem helpers ===

/// Creates a temporary directory for testing purposes
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Creates a file with the given content
pub fn create_temp_file(path: &Path, content: &[u8]) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(path, content).expect("Failed to write temporary file");
    path.to_path_buf()
}

/// A destination `<dir>/<stem>[.<extension>]`, optionally with a partial download on disk.
pub fn create_destination(
    dir: &Path,
    stem: &str,
    extension: Option<&str>,
    partial: Option<&[u8]>,
) -> FileDestination {
    let destination = FileDestination::new(dir, stem);
    let destination = match extension {
        Some(ext) => destination.with_extension(ext),
        None => destination,
    };
    if let Some(content) = partial {
        use steady::Destination;
        create_temp_file(destination.temp_path(), content);
    }
    destination
}

/// Asserts that a file has the expected content
pub fn assert_file_content(path: &Path, expected: &[u8]) {
    let content = fs::read(path).unwrap_or_else(|e| panic!("Failed to read {:?}: {}", path, e));
    assert_eq!(content, expected, "File content mismatch at path: {:?}", path);
}

/// Asserts that no file exists at the given path
pub fn assert_file_missing(path: &Path) {
    assert!(!path.exists(), "File should not exist at path: {:?}", path);
}

// === Logging ===

/// Route `tracing` output to the test harness, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// === Transfer helpers ===

/// A builder without retries or progress events.
pub fn quiet_builder() -> TransferBuilder {
    TransferBuilder::new().retries(0).progress(None)
}

/// A transfer talking to `transport`.
pub fn transfer_with(builder: TransferBuilder, transport: Arc<ScriptedTransport>) -> Transfer {
    builder.build_with_transport(transport)
}

// === Wiremock responders ===

/// Serves `body`, honouring `Range: bytes=<start>-` requests.
///
/// A start at or past the end of the body is answered with `416`.
pub struct RangeResponder {
    body: Vec<u8>,
    content_type: &'static str,
}

impl RangeResponder {
    pub fn new(body: &[u8], content_type: &'static str) -> Self {
        Self {
            body: body.to_vec(),
            content_type,
        }
    }
}

fn range_start(request: &Request) -> Option<usize> {
    let range = request.headers.get("range")?.to_str().ok()?;
    range
        .strip_prefix("bytes=")?
        .strip_suffix('-')?
        .parse()
        .ok()
}

impl Respond for RangeResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let len = self.body.len();
        match range_start(request) {
            Some(start) if start >= len => ResponseTemplate::new(416)
                .insert_header("Content-Range", format!("bytes */{}", len).as_str()),
            Some(start) => ResponseTemplate::new(206)
                .insert_header(
                    "Content-Range",
                    format!("bytes {}-{}/{}", start, len - 1, len).as_str(),
                )
                .set_body_raw(self.body[start..].to_vec(), self.content_type),
            None => ResponseTemplate::new(200).set_body_raw(self.body.clone(), self.content_type),
        }
    }
}

// === Scripted transport ===

/// One canned reply of a [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub enum Step {
    Respond {
        status: StatusCode,
        headers: HeaderMap,
        chunks: Vec<Result<Bytes, TransportError>>,
    },
    Fail(TransportError),
}

impl Step {
    /// A response whose body is `body` split into `chunk`-sized pieces.
    pub fn ok(status: u16, headers: &[(&str, &str)], body: &[u8], chunk: usize) -> Self {
        Self::Respond {
            status: StatusCode::from_u16(status).expect("valid status"),
            headers: header_map(headers),
            chunks: body
                .chunks(chunk.max(1))
                .map(|c| Ok(Bytes::copy_from_slice(c)))
                .collect(),
        }
    }

    /// A response without a body.
    pub fn status(status: u16) -> Self {
        Self::ok(status, &[], b"", 1)
    }

    /// A response whose body breaks off after `body` with `error`.
    pub fn broken(status: u16, headers: &[(&str, &str)], body: &[u8], error: &str) -> Self {
        let mut step = Self::ok(status, headers, body, body.len());
        if let Self::Respond { chunks, .. } = &mut step {
            chunks.push(Err(TransportError::Body(error.to_string())));
        }
        step
    }
}

pub fn header_map(headers: &[(&str, &str)]) -> HeaderMap {
    headers
        .iter()
        .map(|(name, value)| {
            (
                HeaderName::from_bytes(name.as_bytes()).expect("valid header name"),
                HeaderValue::from_str(value).expect("valid header value"),
            )
        })
        .collect()
}

/// A request as seen by a [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub struct Recorded {
    pub url: String,
    pub headers: HeaderMap,
    pub at: Instant,
}

/// In-memory [`Transport`] replaying a list of steps.
///
/// Once the script runs out the last step repeats.
pub struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    last: Mutex<Option<Step>>,
    requests: Mutex<Vec<Recorded>>,
}

impl ScriptedTransport {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Seconds between consecutive requests.
    pub fn gaps(&self) -> Vec<u64> {
        self.requests()
            .windows(2)
            .map(|pair| (pair[1].at - pair[0].at).as_secs())
            .collect()
    }

    fn next_step(&self) -> Step {
        let mut last = self.last.lock().unwrap();
        if let Some(step) = self.steps.lock().unwrap().pop_front() {
            *last = Some(step);
        }
        last.clone().expect("script must not be empty")
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: TransportRequest<'_>) -> Result<ResponseView, TransportError> {
        self.requests.lock().unwrap().push(Recorded {
            url: request.url.to_string(),
            headers: request.headers.clone(),
            at: Instant::now(),
        });

        match self.next_step() {
            Step::Fail(error) => Err(error),
            Step::Respond {
                status,
                headers,
                chunks,
            } => {
                let body = futures::stream::iter(chunks);
                Ok(ResponseView::new(status, headers, Box::pin(body)))
            }
        }
    }
}

// === Progress ===

/// A progress event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start(PathBuf),
    Progress {
        total: Option<u64>,
        downloaded: u64,
        rate: u64,
    },
}

/// Sink keeping every event it receives.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<Event>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn starts(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Start(_)))
            .count()
    }
}

impl ProgressSink for RecordingProgress {
    fn on_start(&self, path: &Path) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Start(path.to_path_buf()));
    }

    fn on_progress(&self, total: Option<u64>, downloaded: u64, rate: u64) {
        self.events.lock().unwrap().push(Event::Progress {
            total,
            downloaded,
            rate,
        });
    }
}
