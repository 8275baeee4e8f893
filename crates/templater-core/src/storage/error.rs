//! Errors raised while reading or writing parameter records

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    /// The configs/ or directives/ directory could not be created
    #[error("Cannot create record directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Permission denied on '{path}'")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Out of disk space writing '{path}'")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot read parameter record '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write parameter record '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A record exists but is not valid JSON for its schema
    #[error("Parameter record '{path}' is corrupted: {details}")]
    CorruptRecord { path: PathBuf, details: String },

    #[error("Record path '{path}' vanished while in use")]
    NotFound { path: PathBuf },

    /// The temporary file was written but could not replace the record
    #[error("Cannot replace '{to}' with '{from}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot encode parameters: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StorageError {
    /// Classify a failed write by its I/O error kind
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path,
                source: error,
            },
            io::ErrorKind::NotFound => StorageError::NotFound { path },
            _ if is_disk_full_error(&error) => StorageError::DiskFull {
                path,
                source: error,
            },
            _ => StorageError::WriteError {
                path,
                source: error,
            },
        }
    }

    /// Same as `from_io` but unclassified failures become `ReadError`
    pub fn from_read(error: io::Error, path: PathBuf) -> Self {
        match StorageError::from_io(error, path) {
            StorageError::WriteError { path, source } => StorageError::ReadError { path, source },
            other => other,
        }
    }

    /// What the user can do about it, naming the file involved
    pub fn recovery_suggestion(&self) -> Option<String> {
        match self {
            StorageError::DiskFull { .. } => {
                Some("Free up disk space, then repeat the command.".to_string())
            }
            StorageError::PermissionDenied { path, .. } => Some(format!(
                "Make '{}' writable, or point data_dir somewhere else with `templater config set data_dir <DIR>`.",
                path.display()
            )),
            StorageError::CorruptRecord { path, .. } => Some(format!(
                "Remove '{}' and annotate the document again.",
                path.display()
            )),
            StorageError::CreateDirectory { path, .. } => Some(format!(
                "Check that the parent of '{}' exists and is writable.",
                path.display()
            )),
            StorageError::AtomicWriteFailed { from, .. } => Some(format!(
                "The previous record is intact. Remove '{}' if it is left behind.",
                from.display()
            )),
            _ => None,
        }
    }

    /// The file the failure is about, if there is one
    pub fn path(&self) -> Option<&Path> {
        match self {
            StorageError::CreateDirectory { path, .. }
            | StorageError::PermissionDenied { path, .. }
            | StorageError::DiskFull { path, .. }
            | StorageError::ReadError { path, .. }
            | StorageError::WriteError { path, .. }
            | StorageError::CorruptRecord { path, .. }
            | StorageError::NotFound { path } => Some(path),
            StorageError::AtomicWriteFailed { to, .. } => Some(to),
            StorageError::Serialize(_) => None,
        }
    }
}

fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

pub type StorageResult<T> = Result<T, StorageError>;
