//! Rows of the filename classification (matching) report.

use serde::{Deserialize, Serialize};

/// Outcome of matching a filename against the template catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Match,
    NoMatch,
    /// Vitatron-branded report handled by the Medtronic templates.
    VitatronAsMedtronic,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Match => "Match",
            Self::NoMatch => "No Match",
            Self::VitatronAsMedtronic => "Match (Vitatron->Medtronic)",
        }
    }
}

/// One line of the matching report CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRow {
    #[serde(rename = "Filename")]
    pub filename: String,
    #[serde(rename = "Full Path")]
    pub full_path: String,
    #[serde(rename = "Detected Brand")]
    pub detected_brand: String,
    #[serde(rename = "Detected Type")]
    pub detected_type: String,
    #[serde(rename = "Matched Template")]
    pub matched_template: String,
    #[serde(rename = "Status")]
    pub status: String,
}

impl ClassificationRow {
    /// Whether extraction should pick up this document.
    ///
    /// Status is matched by substring, so every status containing "Match"
    /// qualifies; editor lock files are always skipped.
    pub fn is_selected_for_extraction(&self) -> bool {
        self.status.contains("Match") && !self.filename.starts_with("~$")
    }
}
