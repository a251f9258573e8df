//! Patient-level reconciliation of extracted records.
//!
//! Records are validated against their source filename, grouped by
//! registration identifier and ordered by programming date.

pub mod dates;
pub mod names;
pub mod reconcile;

pub use dates::parse_programming_date;
pub use names::{derive_name_from_filename, names_match};
pub use reconcile::{
    ReconcileReport, RecordVerdict, UNKNOWN_NAME, check_record, reconcile, sort_by_programming_date,
};
