//! Pipeline stages shared by the subcommands.
//!
//! Each stage reads its inputs from disk and returns plain values so the
//! commands can chain them and print summaries.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use pacer_core::{ReconcileReport, RecordVerdict, check_record, reconcile};
use pacer_extract::{DocumentExtractor, ExtractionSchema};
use pacer_ingest::{
    FileChanges, TemplateCatalog, build_file_index, classify_files, find_changes,
    list_spreadsheet_files, load_file_index, read_matching_report, save_file_index,
    selected_documents, write_matching_report,
};
use pacer_model::{Bundle, ClassificationRow, ExtractedRecord};
use pacer_output::{build_bundle, write_bundle, write_patient_files};
use tracing::{debug, info, info_span};

use crate::logging::redact_value;

/// Matching report file name inside the output directory.
pub const MATCHING_REPORT_FILE: &str = "matching_report.csv";
/// File index name inside the output directory.
pub const FILE_INDEX_FILE: &str = "processed_files.json";

pub fn default_report_path(output_dir: &Path) -> PathBuf {
    output_dir.join(MATCHING_REPORT_FILE)
}

pub fn file_index_path(output_dir: &Path) -> PathBuf {
    output_dir.join(FILE_INDEX_FILE)
}

/// Classify every spreadsheet under `data_dir` and write the matching
/// report.
pub fn match_documents(
    data_dir: &Path,
    templates: &Path,
    report_path: &Path,
) -> Result<Vec<ClassificationRow>> {
    let span = info_span!("match");
    let _guard = span.enter();
    let start = Instant::now();

    let catalog = TemplateCatalog::load(templates)
        .with_context(|| format!("load template catalog {}", templates.display()))?;
    let files = list_spreadsheet_files(data_dir)
        .with_context(|| format!("scan data directory {}", data_dir.display()))?;
    let rows = classify_files(&files, &catalog);

    if let Some(parent) = report_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create report directory {}", parent.display()))?;
    }
    write_matching_report(report_path, &rows).context("write matching report")?;

    info!(
        count = rows.len(),
        templates = catalog.len(),
        duration_ms = start.elapsed().as_millis(),
        "matching complete"
    );
    Ok(rows)
}

/// Build the extractor, applying schema overrides when given.
pub fn load_extractor(schema: Option<&Path>) -> Result<DocumentExtractor> {
    let schema = match schema {
        Some(path) => ExtractionSchema::from_toml_path(path).context("load extraction schema")?,
        None => ExtractionSchema::default(),
    };
    Ok(DocumentExtractor::new(schema))
}

/// Paths the matching report selects for extraction, in report order.
pub fn selected_paths(report_path: &Path) -> Result<Vec<PathBuf>> {
    let rows = read_matching_report(report_path)
        .with_context(|| format!("read matching report {}", report_path.display()))?;
    Ok(selected_documents(&rows)
        .into_iter()
        .map(|row| PathBuf::from(&row.full_path))
        .collect())
}

/// Extract every selected document; failures become failed records.
pub fn extract_documents(
    extractor: &DocumentExtractor,
    paths: &[PathBuf],
    mut on_document: impl FnMut(&ExtractedRecord),
) -> Vec<ExtractedRecord> {
    extractor.extract_batch(paths.iter().map(PathBuf::as_path), |record| {
        debug!(
            filename = redact_value(&record.meta.filename),
            failed = record.is_failed(),
            "document processed"
        );
        on_document(record);
    })
}

/// Group records into patients, logging excluded documents.
pub fn reconcile_records(records: Vec<ExtractedRecord>) -> ReconcileReport {
    for record in &records {
        let verdict = check_record(record);
        if !matches!(verdict, RecordVerdict::Accepted) {
            debug!(
                filename = redact_value(&record.meta.filename),
                ?verdict,
                "record excluded from patient grouping"
            );
        }
    }
    reconcile(records)
}

pub fn write_patients(output_dir: &Path, report: &ReconcileReport) -> Result<Vec<PathBuf>> {
    write_patient_files(output_dir, &report.groups)
}

/// Rebuild and store the content hash index. Returns the number of files.
pub fn refresh_file_index(data_dir: &Path, output_dir: &Path) -> Result<usize> {
    let index = build_file_index(data_dir)
        .with_context(|| format!("index data directory {}", data_dir.display()))?;
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("create output directory {}", output_dir.display()))?;
    save_file_index(&file_index_path(output_dir), &index).context("save file index")?;
    Ok(index.len())
}

/// Files added or modified since the stored index was written.
pub fn detect_changes(data_dir: &Path, output_dir: &Path) -> Result<FileChanges> {
    let index = load_file_index(&file_index_path(output_dir)).context("load file index")?;
    find_changes(data_dir, &index)
        .with_context(|| format!("scan data directory {}", data_dir.display()))
}

pub fn publish_bundle(patient_dir: &Path, bundle_path: &Path) -> Result<Bundle> {
    let bundle = build_bundle(patient_dir)?;
    write_bundle(bundle_path, &bundle)?;
    Ok(bundle)
}
