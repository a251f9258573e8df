//! Extraction engine for device programmer reports.
//!
//! A document is read through a [`pacer_ingest::Grid`] and split into
//! sections by marker keywords ([`anchors`]). Each section is read with the
//! highlight-driven key-value pass ([`fields`]) and the fixed-schema table
//! readers ([`tables`]); the signature block below the conclusion line is
//! mined by [`footer`]. [`DocumentExtractor`] ties the stages together and
//! turns per-document failures into failed records.

pub mod anchors;
pub mod assemble;
pub mod error;
pub mod fields;
pub mod footer;
pub mod schema;
pub mod tables;

pub use anchors::{Anchors, SectionRanges, locate_sections};
pub use assemble::DocumentExtractor;
pub use error::{ExtractError, Result};
pub use fields::{KeyValues, extract_event_fields, extract_fields, find_value};
pub use footer::{mine_footer, serial_to_date};
pub use schema::{ExtractionSchema, IgnoreSet, SectionMarkers, TableSchema, ZoneTableSchema};
pub use tables::{extract_table, extract_zone_table};
