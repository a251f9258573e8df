//! Dashboard bundle: a patient index plus every patient document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::patient::PatientGroup;

/// Summary line shown in the dashboard's patient list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleIndexEntry {
    pub id: String,
    pub name: String,
    pub count: usize,
    pub brand: String,
    pub model: String,
    pub implant_date: String,
    pub file_name: String,
}

/// Everything the front-end loads in one script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    pub index: Vec<BundleIndexEntry>,
    /// Full patient documents keyed by their JSON file name.
    pub records: BTreeMap<String, PatientGroup>,
}
