//! Recursive discovery of report spreadsheets.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{IngestError, Result};
use crate::grid::GridFormat;

/// Prefix office editors give their lock files.
const LOCK_FILE_PREFIX: &str = "~$";

pub fn is_lock_file(filename: &str) -> bool {
    filename.starts_with(LOCK_FILE_PREFIX)
}

/// Lists every `.xls`/`.xlsx` file under `dir`, skipping editor lock files.
///
/// Returns paths sorted so downstream processing is deterministic.
pub fn list_spreadsheet_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry_result in WalkDir::new(dir) {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: e.path().unwrap_or(dir).to_path_buf(),
            source: e.into(),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let is_lock = entry.file_name().to_str().is_some_and(is_lock_file);
        if is_lock {
            continue;
        }

        if GridFormat::from_path(entry.path()).is_some() {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}
