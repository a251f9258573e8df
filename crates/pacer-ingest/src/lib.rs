//! Spreadsheet ingestion for device programmer reports.
//!
//! - [`grid`]: uniform `(row, column)` view over `.xls` and `.xlsx` files
//! - [`discovery`]: recursive listing of candidate spreadsheets
//! - [`classify`] / [`matching_report`]: filename to template classification
//! - [`file_index`]: content hashes for change detection

pub mod cell;
pub mod classify;
pub mod discovery;
pub mod error;
pub mod file_index;
pub mod grid;
pub mod hash;
pub mod matching_report;

pub use cell::CellValue;
pub use classify::{
    DeviceFeatures, TemplateCatalog, TemplateInfo, classify_file, classify_files,
    parse_filename_features,
};
pub use discovery::{is_lock_file, list_spreadsheet_files};
pub use error::{IngestError, Result};
pub use file_index::{
    FileChanges, FileIndex, FileIndexEntry, build_file_index, find_changes, load_file_index,
    save_file_index,
};
pub use grid::{Grid, GridFormat, MemoryGrid, XlsGrid, XlsxGrid, open_grid};
pub use hash::file_sha256_hex;
pub use matching_report::{read_matching_report, selected_documents, write_matching_report};
