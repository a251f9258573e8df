//! Per-document extraction result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Label to value mapping for one document section.
///
/// Sorted so serialized output is stable across runs.
pub type FieldMap = BTreeMap<String, String>;

/// Header labels the reconciliation and bundle stages read.
pub mod header_fields {
    /// Patient name as printed in the report header.
    pub const NAME: &str = "姓名";
    /// Registration identifier used to group visits.
    pub const REGISTRATION_ID: &str = "登记号";
    pub const BRAND: &str = "品牌";
    pub const MODEL: &str = "型号";
    pub const IMPLANT_DATE: &str = "植入日期";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Set only when extraction of the document failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicParams {
    pub settings: FieldMap,
    pub measurements: FieldMap,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestParams {
    pub battery_and_leads: FieldMap,
    pub threshold_tests: FieldMap,
}

/// Signature block mined below the conclusion line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterMeta {
    #[serde(rename = "签名行内容")]
    pub signature_line: String,
    #[serde(rename = "程控日期")]
    pub programming_date: String,
}

/// Structured result for one spreadsheet.
///
/// A failed extraction keeps only [`RecordMeta`] with `error` populated; all
/// section fields are `None` and are omitted from the serialized form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub meta: RecordMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<FieldMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_params: Option<BasicParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub antitachy_params: Option<FieldMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_params: Option<TestParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events_and_footer: Option<FieldMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_meta: Option<FooterMeta>,
}

impl ExtractedRecord {
    /// Record for a document that could not be extracted.
    pub fn failed(filename: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            meta: RecordMeta {
                filename: filename.into(),
                path: None,
                error: Some(error.into()),
            },
            ..Self::default()
        }
    }

    pub fn is_failed(&self) -> bool {
        self.meta.error.is_some()
    }

    /// Header value for `label`, if the header section has it.
    pub fn header_field(&self, label: &str) -> Option<&str> {
        self.header
            .as_ref()
            .and_then(|header| header.get(label))
            .map(String::as_str)
    }

    /// Non-empty registration identifier from the header.
    pub fn registration_id(&self) -> Option<&str> {
        self.header_field(header_fields::REGISTRATION_ID)
            .filter(|id| !id.is_empty())
    }

    pub fn patient_name(&self) -> Option<&str> {
        self.header_field(header_fields::NAME)
    }

    /// Recovered programming date text; empty when none was found.
    pub fn programming_date(&self) -> &str {
        self.footer_meta
            .as_ref()
            .map_or("", |footer| footer.programming_date.as_str())
    }
}
