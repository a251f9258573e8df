//! Per-document orchestration and batch extraction.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::time::Instant;

use pacer_ingest::{Grid, open_grid};
use pacer_model::{BasicParams, ExtractedRecord, RecordMeta, TestParams};
use tracing::{debug, info, info_span, warn};

use crate::anchors::locate_sections;
use crate::error::Result;
use crate::fields::{extract_event_fields, extract_fields};
use crate::footer::mine_footer;
use crate::schema::{ExtractionSchema, IgnoreSet};
use crate::tables::{extract_table, extract_zone_table};

/// Runs every extraction stage over documents with one fixed schema.
#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    schema: ExtractionSchema,
    ignore: IgnoreSet,
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new(ExtractionSchema::default())
    }
}

impl DocumentExtractor {
    pub fn new(schema: ExtractionSchema) -> Self {
        let ignore = IgnoreSet::from_schema(&schema);
        Self { schema, ignore }
    }

    pub fn schema(&self) -> &ExtractionSchema {
        &self.schema
    }

    /// Extract a record from an already opened grid.
    pub fn extract_grid(&self, grid: &dyn Grid, meta: RecordMeta) -> ExtractedRecord {
        let schema = &self.schema;
        let ignore = &self.ignore;
        let anchors = locate_sections(grid, schema);
        let ranges = anchors.ranges(grid.row_count());
        debug!(
            rows = grid.row_count(),
            cols = grid.col_count(),
            basic = ?anchors.basic,
            antitachy = ?anchors.antitachy,
            test = ?anchors.test,
            event = ?anchors.event,
            "section anchors"
        );

        let header = extract_fields(grid, ranges.header.clone(), schema, ignore).fields;
        let basic_params = BasicParams {
            settings: extract_fields(grid, ranges.basic.clone(), schema, ignore).fields,
            measurements: extract_table(grid, ranges.basic.clone(), &schema.basic_table),
        };
        let antitachy_params = ranges
            .antitachy
            .clone()
            .map(|rows| extract_zone_table(grid, rows, &schema.zone_table))
            .filter(|zones| !zones.is_empty());
        let test_params = TestParams {
            battery_and_leads: extract_fields(grid, ranges.test.clone(), schema, ignore).fields,
            threshold_tests: extract_table(grid, ranges.test.clone(), &schema.test_table),
        };

        let events = extract_fields(grid, ranges.events.clone(), schema, ignore);
        let mut events_and_footer = events.fields;
        events_and_footer.extend(extract_event_fields(
            grid,
            ranges.events.clone(),
            schema,
            ignore,
        ));
        let footer_meta = events
            .conclusion_row
            .map(|row| mine_footer(grid, row))
            .unwrap_or_default();

        ExtractedRecord {
            meta,
            header: Some(header),
            basic_params: Some(basic_params),
            antitachy_params,
            test_params: Some(test_params),
            events_and_footer: Some(events_and_footer),
            footer_meta: Some(footer_meta),
        }
    }

    /// Open and extract one document.
    pub fn extract_document(&self, path: &Path) -> Result<ExtractedRecord> {
        let grid = open_grid(path)?;
        let meta = RecordMeta {
            filename: file_name(path),
            path: Some(path.display().to_string()),
            error: None,
        };
        Ok(self.extract_grid(grid.as_ref(), meta))
    }

    /// Like [`Self::extract_document`], but a failure becomes a failed
    /// record instead of an error.
    ///
    /// Workbook readers can panic on malformed archives; such a panic is
    /// contained to the document that caused it.
    pub fn process_document(&self, path: &Path) -> ExtractedRecord {
        match panic::catch_unwind(AssertUnwindSafe(|| self.extract_document(path))) {
            Ok(Ok(record)) => record,
            Ok(Err(error)) => {
                // Paths carry patient names; the error text stays in the record.
                warn!("document extraction failed");
                ExtractedRecord::failed(file_name(path), error.to_string())
            }
            Err(payload) => {
                warn!("workbook reader panicked");
                ExtractedRecord::failed(
                    file_name(path),
                    format!("malformed workbook: {}", panic_message(payload.as_ref())),
                )
            }
        }
    }

    /// Extract documents in order; `on_document` sees each record as it is
    /// produced.
    pub fn extract_batch<'a, I>(
        &self,
        paths: I,
        mut on_document: impl FnMut(&ExtractedRecord),
    ) -> Vec<ExtractedRecord>
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let span = info_span!("extract");
        let _guard = span.enter();
        let start = Instant::now();

        let mut records = Vec::new();
        for path in paths {
            let record = self.process_document(path);
            on_document(&record);
            records.push(record);
        }

        let failed = records.iter().filter(|r| r.is_failed()).count();
        info!(
            count = records.len(),
            failed,
            duration_ms = start.elapsed().as_millis(),
            "extraction complete"
        );
        records
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("reader panicked")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
