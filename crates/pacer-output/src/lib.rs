//! Output writers: one JSON document per patient and a script bundle for
//! the dashboard.

pub mod bundle;
pub mod patient_files;

pub use bundle::{BUNDLE_VARIABLE, build_bundle, render_bundle, write_bundle};
pub use patient_files::{safe_file_stem, write_patient_files};
