//! Error types for spreadsheet ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while discovering, opening or indexing documents.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not readable.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to walk directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Workbook Errors ===
    /// Extension is neither `.xls` nor `.xlsx`.
    #[error("unsupported spreadsheet format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// The spreadsheet reader rejected the file.
    #[error("failed to open workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// Workbook contains no worksheet to read.
    #[error("workbook has no worksheet: {path}")]
    NoWorksheet { path: PathBuf },

    /// Zip container of an `.xlsx` file is unreadable.
    #[error("corrupt archive {path}: {message}")]
    Archive { path: PathBuf, message: String },

    /// An XML part inside the archive is malformed.
    #[error("malformed XML part {part} in {path}: {message}")]
    Xml {
        path: PathBuf,
        part: String,
        message: String,
    },

    // === Report / Catalog Errors ===
    /// Matching report CSV could not be read or written.
    #[error("failed to process CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// JSON document (template catalog, file index) is malformed.
    #[error("failed to parse JSON {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl IngestError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn workbook(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Workbook {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
