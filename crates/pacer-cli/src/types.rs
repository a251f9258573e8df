use std::path::PathBuf;

use pacer_core::ReconcileReport;
use pacer_ingest::FileChanges;

#[derive(Debug)]
pub struct FailedDocument {
    pub filename: String,
    pub error: String,
}

#[derive(Debug)]
pub struct RunResult {
    pub output_dir: PathBuf,
    pub report_path: PathBuf,
    /// Spreadsheets found and classified.
    pub discovered: usize,
    /// Documents the matching report selected.
    pub selected: usize,
    pub failed: Vec<FailedDocument>,
    pub reconcile: ReconcileReport,
    pub patient_files: usize,
    pub indexed_files: usize,
    pub bundle: Option<PathBuf>,
}

#[derive(Debug)]
pub struct MatchResult {
    pub report_path: PathBuf,
    /// Status text and number of documents with it.
    pub statuses: Vec<(String, usize)>,
    pub total: usize,
}

#[derive(Debug)]
pub struct ExtractResult {
    pub selected: usize,
    pub failed: Vec<FailedDocument>,
}

#[derive(Debug)]
pub struct BundleResult {
    pub path: PathBuf,
    pub patients: usize,
}

#[derive(Debug)]
pub struct ChangesResult {
    pub index_path: PathBuf,
    pub changes: FileChanges,
}
