//! Error types for document extraction.

use std::path::PathBuf;

use pacer_ingest::IngestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The document could not be opened or decoded.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("failed to read extraction schema {path}: {source}")]
    SchemaRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid extraction schema {path}: {source}")]
    SchemaParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ExtractError>;
