//! File-backed log sources.
//!
//! A [`LogSource`] names one JSONL log on disk. Reading is read-once: the
//! whole file is loaded and handed to the parser as bytes.

use crate::model::error::InputError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A readable conversation log.
///
/// Identified by its path, a session id hint (the file stem) and the
/// last-modified time observed when the source was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSource {
    path: PathBuf,
    session_hint: String,
    modified: Option<SystemTime>,
}

impl LogSource {
    /// Create a source without touching the filesystem.
    pub fn new(
        path: impl Into<PathBuf>,
        session_hint: impl Into<String>,
        modified: Option<SystemTime>,
    ) -> Self {
        Self {
            path: path.into(),
            session_hint: session_hint.into(),
            modified,
        }
    }

    /// Create a source for an existing file.
    ///
    /// The session hint is the file stem.
    ///
    /// # Errors
    ///
    /// Returns `InputError::FileNotFound` if the file does not exist.
    /// Returns `InputError::Io` if its metadata cannot be read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|e| io_error(path, e))?;
        Ok(Self::new(
            path,
            file_stem(path),
            metadata.modified().ok(),
        ))
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Session id suggested by the file name.
    pub fn session_hint(&self) -> &str {
        &self.session_hint
    }

    /// Last modification time, when known.
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    /// Read the whole log.
    ///
    /// # Errors
    ///
    /// Returns `InputError::FileNotFound` if the file is gone.
    /// Returns `InputError::Io` for other I/O errors.
    pub fn read(&self) -> Result<Vec<u8>, InputError> {
        fs::read(&self.path).map_err(|e| io_error(&self.path, e))
    }
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(crate) fn io_error(path: &Path, source: io::Error) -> InputError {
    if source.kind() == io::ErrorKind::NotFound {
        InputError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        InputError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
