//! Data model shared by the device report pipeline.
//!
//! Types here are plain serializable values: an [`ExtractedRecord`] is
//! produced once per spreadsheet, a [`PatientGroup`] is derived from many
//! records, and a [`ClassificationRow`] is one line of the matching report.

pub mod bundle;
pub mod classification;
pub mod patient;
pub mod record;

pub use bundle::{Bundle, BundleIndexEntry};
pub use classification::{ClassificationRow, MatchStatus};
pub use patient::PatientGroup;
pub use record::{
    BasicParams, ExtractedRecord, FieldMap, FooterMeta, RecordMeta, TestParams, header_fields,
};
