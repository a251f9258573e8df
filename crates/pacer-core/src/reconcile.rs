//! Grouping validated records into per-patient timelines.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use pacer_model::{ExtractedRecord, PatientGroup};
use tracing::{debug, info, info_span};

use crate::dates::parse_programming_date;
use crate::names::{derive_name_from_filename, names_match};

/// Name used when the earliest record carries none.
pub const UNKNOWN_NAME: &str = "未知";

/// Outcome of checking one record before grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordVerdict {
    /// Grouped under this registration identifier.
    Accepted,
    /// Extraction itself failed.
    Failed,
    /// Filename and header name disagree, or either is missing.
    IdentityMismatch,
    /// Valid identity but no registration identifier.
    MissingIdentifier,
}

/// Classify a record for reconciliation.
pub fn check_record(record: &ExtractedRecord) -> RecordVerdict {
    if record.is_failed() {
        return RecordVerdict::Failed;
    }
    let filename = record.meta.filename.as_str();
    let header_name = record.patient_name().unwrap_or_default();
    if filename.is_empty() || header_name.is_empty() {
        return RecordVerdict::IdentityMismatch;
    }
    if !names_match(&derive_name_from_filename(filename), header_name) {
        return RecordVerdict::IdentityMismatch;
    }
    if record.registration_id().is_none() {
        return RecordVerdict::MissingIdentifier;
    }
    RecordVerdict::Accepted
}

/// Stable ascending sort by programming date; undated records go last in
/// their original order.
pub fn sort_by_programming_date(records: &mut [ExtractedRecord]) {
    records.sort_by_key(|record| {
        parse_programming_date(record.programming_date()).unwrap_or(NaiveDate::MAX)
    });
}

/// Patient timelines plus audit counts for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Keyed by registration identifier.
    pub groups: BTreeMap<String, PatientGroup>,
    pub total: usize,
    pub failed: usize,
    pub identity_mismatches: usize,
    pub missing_identifier: usize,
    pub multi_visit: usize,
}

impl ReconcileReport {
    /// Records excluded for any reason.
    pub fn excluded(&self) -> usize {
        self.failed + self.identity_mismatches + self.missing_identifier
    }
}

/// Validate, group and order a batch of records.
///
/// Input order only matters between undated records of the same patient.
pub fn reconcile(records: Vec<ExtractedRecord>) -> ReconcileReport {
    let span = info_span!("reconcile");
    let _guard = span.enter();

    let mut report = ReconcileReport {
        total: records.len(),
        ..ReconcileReport::default()
    };
    let mut buckets: BTreeMap<String, Vec<ExtractedRecord>> = BTreeMap::new();
    for record in records {
        match check_record(&record) {
            RecordVerdict::Accepted => {
                if let Some(id) = record.registration_id() {
                    buckets.entry(id.to_string()).or_default().push(record);
                }
            }
            RecordVerdict::Failed => report.failed += 1,
            RecordVerdict::IdentityMismatch => report.identity_mismatches += 1,
            RecordVerdict::MissingIdentifier => report.missing_identifier += 1,
        }
    }

    for (registration_id, mut visits) in buckets {
        sort_by_programming_date(&mut visits);
        let name = visits
            .first()
            .and_then(ExtractedRecord::patient_name)
            .unwrap_or(UNKNOWN_NAME)
            .to_string();
        let group = PatientGroup {
            registration_id: registration_id.clone(),
            name,
            visit_count: visits.len(),
            records: visits,
        };
        if group.is_multi_visit() {
            report.multi_visit += 1;
        }
        report.groups.insert(registration_id, group);
    }

    debug!(
        failed = report.failed,
        identity_mismatches = report.identity_mismatches,
        missing_identifier = report.missing_identifier,
        "records excluded"
    );
    info!(
        count = report.total,
        patients = report.groups.len(),
        multi_visit = report.multi_visit,
        "reconciliation complete"
    );
    report
}
