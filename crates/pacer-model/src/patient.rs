use serde::{Deserialize, Serialize};

use crate::record::ExtractedRecord;

/// Chronological timeline of every validated visit for one patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientGroup {
    #[serde(rename = "登记号")]
    pub registration_id: String,
    #[serde(rename = "姓名")]
    pub name: String,
    #[serde(rename = "程控次数")]
    pub visit_count: usize,
    /// Ordered by programming date; undated visits come last.
    #[serde(rename = "程控记录")]
    pub records: Vec<ExtractedRecord>,
}

impl PatientGroup {
    pub fn is_multi_visit(&self) -> bool {
        self.visit_count > 1
    }

    /// Most recent visit (last in chronological order).
    pub fn latest(&self) -> Option<&ExtractedRecord> {
        self.records.last()
    }
}
