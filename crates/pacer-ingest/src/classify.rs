//! Filename-based brand and device type classification.
//!
//! Report files are named after the patient plus a brand and a report type
//! (`张三CRT-D报告单（美敦力）.xls`). The classifier reads those keywords and
//! looks up a matching template in the catalog.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::{Deserializer, MapAccess, Visitor};

use pacer_model::{ClassificationRow, MatchStatus};

use crate::error::{IngestError, Result};

pub const BRAND_MEDTRONIC: &str = "美敦力";
pub const BRAND_MEDTRONIC_MICRA: &str = "美敦力Micra AV";
pub const BRAND_ABBOTT: &str = "雅培";
pub const BRAND_BIOTRONIK: &str = "百多力";
pub const BRAND_BOSTON: &str = "波科";
pub const BRAND_CHUANGLING: &str = "创领";
pub const BRAND_CONDUCTION: &str = "传导束起搏";

pub const TYPE_PACEMAKER: &str = "起搏器报告单";
pub const TYPE_EV_ICD: &str = "EV-ICD报告单";
pub const TYPE_CRT_D: &str = "CRT-D报告单";
pub const TYPE_CRT_P: &str = "CRT-P报告单";
pub const TYPE_ICD: &str = "ICD报告单";

const UNKNOWN_BRAND: &str = "Unknown Brand";
const NO_TEMPLATE: &str = "N/A";

/// Brand and report type read from a filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceFeatures {
    pub brand: Option<&'static str>,
    pub device_type: &'static str,
}

pub fn parse_filename_features(filename: &str) -> DeviceFeatures {
    let name = filename.to_uppercase();
    let has = |keyword: &str| name.contains(keyword);

    let brand = if has("美敦力") || has("MEDTRONIC") {
        if has("MICRA") {
            Some(BRAND_MEDTRONIC_MICRA)
        } else {
            Some(BRAND_MEDTRONIC)
        }
    } else if has("雅培") || has("ABBOTT") || has("ST.JUDE") {
        Some(BRAND_ABBOTT)
    } else if has("百多力") || has("BIOTRONIK") {
        Some(BRAND_BIOTRONIK)
    } else if has("波科") || has("BOSTON") {
        Some(BRAND_BOSTON)
    } else if has("创领") {
        Some(BRAND_CHUANGLING)
    } else if has("传导束") {
        Some(BRAND_CONDUCTION)
    } else {
        None
    };

    // Most specific device class first.
    let device_type = if has("EV-ICD") {
        TYPE_EV_ICD
    } else if has("CRT-D") || has("CRTD") {
        TYPE_CRT_D
    } else if has("CRT-P") || has("CRTP") {
        TYPE_CRT_P
    } else if has("ICD") {
        TYPE_ICD
    } else {
        TYPE_PACEMAKER
    };

    DeviceFeatures { brand, device_type }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateInfo {
    pub brand: String,
    #[serde(rename = "type")]
    pub device_type: String,
}

/// Template definitions keyed by template filename, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateCatalog {
    entries: Vec<(String, TemplateInfo)>,
}

impl TemplateCatalog {
    pub fn new(entries: Vec<(String, TemplateInfo)>) -> Self {
        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| IngestError::read(path, e))?;
        serde_json::from_str(&contents).map_err(|e| IngestError::Json {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First template with the same brand and report type.
    ///
    /// A plain Medtronic report never matches a Micra template.
    pub fn find_best(&self, features: &DeviceFeatures) -> Option<&str> {
        let brand = features.brand?;
        self.entries
            .iter()
            .find(|(_, info)| {
                info.brand == brand && info.device_type == features.device_type
            })
            .map(|(name, _)| name.as_str())
    }
}

impl<'de> Deserialize<'de> for TemplateCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = TemplateCatalog;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of template filename to {brand, type}")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, info)) = map.next_entry::<String, TemplateInfo>()? {
                    entries.push((name, info));
                }
                Ok(TemplateCatalog { entries })
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}

/// Classify one file for the matching report.
pub fn classify_file(path: &Path, catalog: &TemplateCatalog) -> ClassificationRow {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let features = parse_filename_features(&filename);
    let template = catalog.find_best(&features);

    let mut status = if template.is_some() {
        MatchStatus::Match
    } else {
        MatchStatus::NoMatch
    };
    if filename.to_uppercase().contains("VITATRON") && features.brand == Some(BRAND_MEDTRONIC) {
        status = MatchStatus::VitatronAsMedtronic;
    }

    ClassificationRow {
        full_path: path.display().to_string(),
        detected_brand: features.brand.unwrap_or(UNKNOWN_BRAND).to_string(),
        detected_type: features.device_type.to_string(),
        matched_template: template.unwrap_or(NO_TEMPLATE).to_string(),
        status: status.as_str().to_string(),
        filename,
    }
}

pub fn classify_files(paths: &[PathBuf], catalog: &TemplateCatalog) -> Vec<ClassificationRow> {
    paths.iter().map(|path| classify_file(path, catalog)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> TemplateCatalog {
        serde_json::from_str(
            r#"{
                "美敦力起搏器模板.xls": {"brand": "美敦力", "type": "起搏器报告单"},
                "Micra模板.xls": {"brand": "美敦力Micra AV", "type": "起搏器报告单"},
                "雅培ICD模板.xlsx": {"brand": "雅培", "type": "ICD报告单"},
                "雅培ICD模板2.xlsx": {"brand": "雅培", "type": "ICD报告单"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn brand_and_type_priority() {
        let features = parse_filename_features("王五CRT-D报告单（美敦力）.xls");
        assert_eq!(features.brand, Some(BRAND_MEDTRONIC));
        assert_eq!(features.device_type, TYPE_CRT_D);

        let features = parse_filename_features("ev-icd report boston.xlsx");
        assert_eq!(features.brand, Some(BRAND_BOSTON));
        assert_eq!(features.device_type, TYPE_EV_ICD);

        let features = parse_filename_features("赵六micra medtronic.xls");
        assert_eq!(features.brand, Some(BRAND_MEDTRONIC_MICRA));
        assert_eq!(features.device_type, TYPE_PACEMAKER);
    }

    #[test]
    fn catalog_keeps_file_order() {
        let features = DeviceFeatures {
            brand: Some(BRAND_ABBOTT),
            device_type: TYPE_ICD,
        };
        assert_eq!(catalog().find_best(&features), Some("雅培ICD模板.xlsx"));
        assert_eq!(catalog().len(), 4);
    }

    #[test]
    fn vitatron_is_flagged_even_without_template() {
        let row = classify_file(
            Path::new("/data/孙七CRT-P报告单 Vitatron 美敦力.xls"),
            &catalog(),
        );
        assert_eq!(row.detected_brand, BRAND_MEDTRONIC);
        assert_eq!(row.matched_template, "N/A");
        assert_eq!(row.status, "Match (Vitatron->Medtronic)");
    }

    #[test]
    fn unknown_brand_has_no_template() {
        let row = classify_file(Path::new("/data/周八起搏器报告单.xls"), &catalog());
        assert_eq!(row.detected_brand, "Unknown Brand");
        assert_eq!(row.status, "No Match");
    }
}
