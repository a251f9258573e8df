use std::collections::BTreeMap;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use pacer_cli::pipeline::{
    default_report_path, detect_changes, extract_documents, file_index_path, load_extractor,
    match_documents, publish_bundle, reconcile_records, refresh_file_index, selected_paths,
    write_patients,
};
use pacer_model::{ClassificationRow, ExtractedRecord};
use tracing::{info, info_span};

use crate::cli::{BundleArgs, ExtractArgs, IndexArgs, MatchArgs, OutputArgs, RunArgs};
use crate::types::{
    BundleResult, ChangesResult, ExtractResult, FailedDocument, MatchResult, RunResult,
};

fn report_path(output: &OutputArgs) -> PathBuf {
    output
        .report
        .clone()
        .unwrap_or_else(|| default_report_path(&output.output_dir))
}

fn progress_bar(len: usize) -> Result<ProgressBar> {
    if !io::stderr().is_terminal() {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} extracting [{bar:40}] {pos}/{len} ({eta})")
            .context("progress bar template")?
            .progress_chars("=> "),
    );
    Ok(bar)
}

/// Extract the selected documents behind a progress bar.
fn extract_selected(report: &Path, schema: Option<&Path>) -> Result<(usize, Vec<ExtractedRecord>)> {
    let extractor = load_extractor(schema)?;
    let paths = selected_paths(report)?;
    let bar = progress_bar(paths.len())?;
    let records = extract_documents(&extractor, &paths, |_| bar.inc(1));
    bar.finish_and_clear();
    Ok((paths.len(), records))
}

fn failed_documents(records: &[ExtractedRecord]) -> Vec<FailedDocument> {
    records
        .iter()
        .filter_map(|record| {
            record.meta.error.as_ref().map(|error| FailedDocument {
                filename: record.meta.filename.clone(),
                error: error.clone(),
            })
        })
        .collect()
}

fn status_counts(rows: &[ClassificationRow]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for row in rows {
        *counts.entry(row.status.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(status, count)| (status.to_string(), count))
        .collect()
}

pub fn run_full(args: &RunArgs) -> Result<RunResult> {
    let span = info_span!("run", output_dir = %args.output.output_dir.display());
    let _guard = span.enter();
    let output_dir = args.output.output_dir.clone();
    let report = report_path(&args.output);

    // Stage 1: classify filenames against the template catalog.
    let rows = match_documents(&args.data_dir, &args.templates, &report)?;

    // Stage 2: extract every selected document.
    let (selected, records) = extract_selected(&report, args.schema.as_deref())?;
    let failed = failed_documents(&records);

    // Stage 3: group by patient and write one file each.
    let reconcile = reconcile_records(records);
    let written = write_patients(&output_dir, &reconcile)?;

    // Stage 4: refresh the content index for change detection.
    let indexed_files = refresh_file_index(&args.data_dir, &output_dir)?;

    let bundle = match &args.bundle {
        Some(path) => {
            publish_bundle(&output_dir, path)?;
            Some(path.clone())
        }
        None => None,
    };

    info!(
        patients = reconcile.groups.len(),
        failed = failed.len(),
        "run complete"
    );
    Ok(RunResult {
        output_dir,
        report_path: report,
        discovered: rows.len(),
        selected,
        failed,
        reconcile,
        patient_files: written.len(),
        indexed_files,
        bundle,
    })
}

pub fn run_match(args: &MatchArgs) -> Result<MatchResult> {
    let report = report_path(&args.output);
    let rows = match_documents(&args.data_dir, &args.templates, &report)?;
    Ok(MatchResult {
        report_path: report,
        statuses: status_counts(&rows),
        total: rows.len(),
    })
}

pub fn run_extract(args: &ExtractArgs) -> Result<ExtractResult> {
    let report = report_path(&args.output);
    let (selected, records) = extract_selected(&report, args.schema.as_deref())?;
    Ok(ExtractResult {
        selected,
        failed: failed_documents(&records),
    })
}

pub fn run_bundle(args: &BundleArgs) -> Result<BundleResult> {
    let bundle = publish_bundle(&args.output_dir, &args.bundle)
        .with_context(|| format!("bundle patient files in {}", args.output_dir.display()))?;
    Ok(BundleResult {
        path: args.bundle.clone(),
        patients: bundle.index.len(),
    })
}

pub fn run_index(args: &IndexArgs) -> Result<usize> {
    refresh_file_index(&args.data_dir, &args.output_dir)
}

pub fn run_changes(args: &IndexArgs) -> Result<ChangesResult> {
    Ok(ChangesResult {
        index_path: file_index_path(&args.output_dir),
        changes: detect_changes(&args.data_dir, &args.output_dir)?,
    })
}
