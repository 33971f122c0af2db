//! Where downloaded bytes end up.
//!
//! [`Destination`] is the interface the download loop needs from a target
//! file: its partial size, its extension slot, an existence check and a way
//! to open the file it writes to. [`FileDestination`] is the plain
//! filesystem implementation.
//!
//! # Examples
//!
//! ```rust,no_run
//! use steady::download::{Destination, FileDestination};
//!
//! # fn example() -> Result<(), steady::Error> {
//! let mut destination = FileDestination::from_url("downloads", "https://example.com/a/photo.jpg")?;
//! assert_eq!(destination.extension(), Some("jpg"));
//! assert!(destination.path().ends_with("photo.jpg"));
//! assert!(destination.temp_path().ends_with("photo.part"));
//!
//! destination.set_extension("png");
//! assert!(destination.path().ends_with("photo.png"));
//! # Ok(())
//! # }
//! ```

use super::metadata::{decode_filename, sanitize_filename, split_filename, HttpMetadata};
use crate::error::{Error, Result};

use async_trait::async_trait;
use reqwest::Url;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs::{self, File, OpenOptions};
use tracing::debug;

/// How the temporary file is opened for an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Create the file, discarding any previous content.
    Truncate,
    /// Keep existing content so a partial download can be continued.
    Update,
}

/// Target of a download.
#[async_trait]
pub trait Destination: Send + Sync {
    /// Bytes already present from an earlier, interrupted download.
    fn partial_size(&self) -> u64;

    /// Current filename extension, without the dot.
    fn extension(&self) -> Option<&str>;

    /// Replace the extension and rebuild the final path.
    fn set_extension(&mut self, extension: &str);

    /// Whether a file already exists at the final path.
    fn exists(&self) -> bool;

    /// Final location of the file.
    fn path(&self) -> &Path;

    /// File the bytes are written to while downloading.
    fn temp_path(&self) -> &Path;

    /// Whether partial content survives a failed download.
    fn supports_resume(&self) -> bool;

    /// Store header metadata under `key` and rebuild the final path.
    fn set_metadata(&mut self, key: &str, metadata: HttpMetadata);

    /// Mark that nothing was written and there is no temporary file to finalize.
    fn skip_temp(&mut self);

    /// Remember the modification time to apply; the first recorded value wins.
    fn record_mtime(&mut self, mtime: Option<SystemTime>);

    /// Open the temporary file for reading and writing.
    async fn open(&self, mode: OpenMode) -> io::Result<File> {
        let path = self.temp_path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true);
        if mode == OpenMode::Truncate {
            options.truncate(true);
        }
        options.open(path).await
    }
}

/// A file on the local filesystem.
///
/// With part files enabled (the default), bytes are written to
/// `<stem>.part` next to the final file or inside a dedicated part
/// directory. That name ignores the extension so a partial download is found
/// again even after the extension got corrected.
#[derive(Debug, Clone)]
pub struct FileDestination {
    directory: PathBuf,
    stem: String,
    extension: Option<String>,
    part: bool,
    part_directory: Option<PathBuf>,
    filename_from_headers: bool,
    metadata: BTreeMap<String, HttpMetadata>,
    mtime: Option<SystemTime>,
    has_temp: bool,
    path: PathBuf,
    temp_path: PathBuf,
}

impl FileDestination {
    /// Creates a destination `<directory>/<stem>` without an extension.
    ///
    /// The stem is sanitized into a single path component, so the file
    /// always lands inside `directory`.
    pub fn new(directory: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        let mut destination = Self {
            directory: directory.into(),
            stem: sanitize_filename(&stem.into()),
            extension: None,
            part: true,
            part_directory: None,
            filename_from_headers: false,
            metadata: BTreeMap::new(),
            mtime: None,
            has_temp: true,
            path: PathBuf::new(),
            temp_path: PathBuf::new(),
        };
        destination.build_temp_path();
        destination.build_path();
        destination
    }

    /// Creates a destination named after the last path segment of `url`.
    pub fn from_url(directory: impl Into<PathBuf>, url: &str) -> Result<Self> {
        let parsed = Url::parse(url)
            .map_err(|e| Error::InvalidUrl(format!("The url \"{}\" cannot be parsed: {}", url, e)))?;
        let segment = parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::InvalidUrl(format!("The url \"{}\" does not contain a filename", url))
            })?;

        let (stem, extension) = split_filename(&decode_filename(segment));
        let destination = Self::new(directory, stem);
        Ok(match extension {
            Some(ext) => destination.with_extension(&ext),
            None => destination,
        })
    }

    /// Set the initial extension.
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.set_extension(extension);
        self
    }

    /// Write to a `.part` file first (`true`) or directly to the final path.
    pub fn part(mut self, enabled: bool) -> Self {
        self.part = enabled;
        self.build_temp_path();
        self.build_path();
        self
    }

    /// Keep part files in a separate directory.
    pub fn part_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.part_directory = Some(directory.into());
        self.build_temp_path();
        self.build_path();
        self
    }

    /// Rename the file after a `Content-Disposition` filename found in header metadata.
    pub fn filename_from_headers(mut self, enabled: bool) -> Self {
        self.filename_from_headers = enabled;
        self
    }

    /// Current filename stem.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Metadata stored under `key`, if any.
    pub fn metadata(&self, key: &str) -> Option<&HttpMetadata> {
        self.metadata.get(key)
    }

    /// Modification time recorded for the file.
    pub fn mtime(&self) -> Option<SystemTime> {
        self.mtime
    }

    /// Whether a temporary file is waiting to be finalized.
    pub fn has_temp(&self) -> bool {
        self.has_temp
    }

    /// Move the temporary file to its final path and apply the recorded mtime.
    pub async fn finalize(&mut self) -> Result<()> {
        if self.has_temp && self.temp_path != self.path {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).await?;
            }
            debug!("Moving {:?} to {:?}", self.temp_path, self.path);
            fs::rename(&self.temp_path, &self.path).await?;
        }
        self.has_temp = false;

        if let Some(mtime) = self.mtime {
            let file = OpenOptions::new().write(true).open(&self.path).await?;
            file.into_std().await.set_modified(mtime)?;
        }
        Ok(())
    }

    fn filename(&self) -> String {
        match self.extension.as_deref() {
            Some(ext) if !ext.is_empty() => format!("{}.{}", self.stem, ext),
            _ => self.stem.clone(),
        }
    }

    fn build_path(&mut self) {
        self.path = self.directory.join(self.filename());
        if !self.part {
            self.temp_path = self.path.clone();
        }
    }

    fn build_temp_path(&mut self) {
        if self.part {
            let directory = self.part_directory.as_ref().unwrap_or(&self.directory);
            self.temp_path = directory.join(format!("{}.part", self.stem));
        }
    }
}

#[async_trait]
impl Destination for FileDestination {
    fn partial_size(&self) -> u64 {
        if !self.part {
            return 0;
        }
        std::fs::metadata(&self.temp_path)
            .map(|m| m.len())
            .unwrap_or(0)
    }

    fn extension(&self) -> Option<&str> {
        self.extension.as_deref().filter(|ext| !ext.is_empty())
    }

    fn set_extension(&mut self, extension: &str) {
        let extension = extension.trim_start_matches('.');
        self.extension = Some(if extension.is_empty() {
            String::new()
        } else {
            sanitize_filename(extension)
        });
        self.build_path();
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    fn supports_resume(&self) -> bool {
        self.part
    }

    fn set_metadata(&mut self, key: &str, metadata: HttpMetadata) {
        if self.filename_from_headers {
            if let Some(filename) = metadata.filename.as_deref() {
                self.stem = sanitize_filename(filename);
            }
        }
        self.metadata.insert(key.to_string(), metadata);
        self.build_path();
    }

    fn skip_temp(&mut self) {
        self.has_temp = false;
    }

    fn record_mtime(&mut self, mtime: Option<SystemTime>) {
        if self.mtime.is_none() {
            self.mtime = mtime;
        }
    }
}
