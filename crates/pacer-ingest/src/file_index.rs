//! Content-hash index of the input tree.
//!
//! Records which files were seen and their SHA-256 so a later run can list
//! new or modified documents. Extraction itself always runs over the full
//! batch.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::discovery::list_spreadsheet_files;
use crate::error::{IngestError, Result};
use crate::hash::file_sha256_hex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIndexEntry {
    pub hash: String,
    pub last_processed: String,
}

/// Relative path (with `/` separators) to entry.
pub type FileIndex = BTreeMap<String, FileIndexEntry>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileChanges {
    pub new: Vec<String>,
    pub modified: Vec<String>,
}

impl FileChanges {
    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.modified.is_empty()
    }
}

fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|part| part.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Hash every spreadsheet under `root`.
pub fn build_file_index(root: &Path) -> Result<FileIndex> {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut index = FileIndex::new();
    for path in list_spreadsheet_files(root)? {
        let hash = file_sha256_hex(&path)?;
        index.insert(
            relative_key(root, &path),
            FileIndexEntry {
                hash,
                last_processed: timestamp.clone(),
            },
        );
    }
    debug!(file_count = index.len(), "file index built");
    Ok(index)
}

/// Compare the current tree against a stored index.
pub fn find_changes(root: &Path, index: &FileIndex) -> Result<FileChanges> {
    let mut changes = FileChanges::default();
    for path in list_spreadsheet_files(root)? {
        let key = relative_key(root, &path);
        let hash = file_sha256_hex(&path)?;
        match index.get(&key) {
            None => changes.new.push(key),
            Some(entry) if entry.hash != hash => changes.modified.push(key),
            Some(_) => {}
        }
    }
    Ok(changes)
}

/// Load a stored index; a missing file is an empty index.
pub fn load_file_index(path: &Path) -> Result<FileIndex> {
    if !path.exists() {
        return Ok(FileIndex::new());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| IngestError::read(path, e))?;
    serde_json::from_str(&contents).map_err(|e| IngestError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn save_file_index(path: &Path, index: &FileIndex) -> Result<()> {
    let json = serde_json::to_string_pretty(index).map_err(|e| IngestError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    std::fs::write(path, json).map_err(|e| IngestError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
