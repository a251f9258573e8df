//! Marker keywords, table layouts and the derived ignore set.
//!
//! The schema is immutable once built and handed to every stage
//! explicitly. `Default` carries the layouts of the supported report
//! templates; a TOML file can override any part of it.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, Result};

/// Keywords whose rows open each document section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionMarkers {
    pub basic: String,
    /// Only present on defibrillator-class reports.
    pub antitachy: String,
    pub test: String,
    pub event: String,
}

impl Default for SectionMarkers {
    fn default() -> Self {
        Self {
            basic: "基本工作参数".to_string(),
            antitachy: "抗心动过速参数".to_string(),
            test: "测试参数".to_string(),
            event: "事件记录".to_string(),
        }
    }
}

/// Row-by-column table located by header text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Matched by substring, first unresolved header wins.
    pub columns: Vec<String>,
    /// Matched exactly.
    pub rows: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn chamber_rows() -> Vec<String> {
    strings(&["心房", "右心室", "左心室"])
}

impl TableSchema {
    pub fn basic_parameters() -> Self {
        Self {
            columns: strings(&[
                "输出电压",
                "输出脉宽",
                "阈值管理",
                "感知灵敏度",
                "起搏极性",
                "感知极性",
                "备注",
            ]),
            rows: chamber_rows(),
        }
    }

    pub fn test_parameters() -> Self {
        Self {
            columns: strings(&["阈值", "脉宽", "感知", "阻抗", "起搏极性", "感知极性", "起搏比例"]),
            rows: chamber_rows(),
        }
    }
}

/// Tachycardia therapy table: detection zones by rate and therapy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneTableSchema {
    pub columns: Vec<String>,
    pub zones: Vec<String>,
    pub rate_column: String,
    pub therapy_column: String,
    /// Column headers are only searched in this many leading rows.
    pub header_rows: usize,
    /// Zone labels are only searched in this many leading columns.
    pub zone_columns: usize,
}

impl Default for ZoneTableSchema {
    fn default() -> Self {
        Self {
            columns: strings(&["分区", "检测频率", "治疗"]),
            zones: strings(&["VF", "F-VT", "VT-2", "VT-1"]),
            rate_column: "检测频率".to_string(),
            therapy_column: "治疗".to_string(),
            header_rows: 5,
            zone_columns: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSchema {
    pub markers: SectionMarkers,
    /// Markers are only searched in this many leading columns.
    pub marker_columns: usize,
    /// How far right a label's value may sit.
    pub lookahead: usize,
    /// Label text that marks the row above the signature block.
    pub conclusion_label: String,
    pub basic_table: TableSchema,
    pub test_table: TableSchema,
    pub zone_table: ZoneTableSchema,
    /// Units that may follow a column header, e.g. `阈值(V)`.
    pub unit_suffixes: Vec<String>,
}

impl Default for ExtractionSchema {
    fn default() -> Self {
        Self {
            markers: SectionMarkers::default(),
            marker_columns: 5,
            lookahead: 7,
            conclusion_label: "结论".to_string(),
            basic_table: TableSchema::basic_parameters(),
            test_table: TableSchema::test_parameters(),
            zone_table: ZoneTableSchema::default(),
            unit_suffixes: strings(&["V", "ms", "mV", "Ω", "%"]),
        }
    }
}

impl ExtractionSchema {
    /// Load a schema from TOML; omitted keys keep their defaults.
    pub fn from_toml_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ExtractError::SchemaRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&contents).map_err(|e| ExtractError::SchemaParse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Labels the key-value pass must never emit.
///
/// Table headers and section markers are highlighted like field labels in
/// the reports, so they would otherwise show up as spurious keys.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    labels: HashSet<String>,
}

impl IgnoreSet {
    pub fn from_schema(schema: &ExtractionSchema) -> Self {
        let tables = [&schema.basic_table, &schema.test_table];
        let mut labels: HashSet<String> = tables
            .iter()
            .flat_map(|table| table.columns.iter().chain(&table.rows))
            .cloned()
            .collect();
        labels.extend([
            schema.markers.basic.clone(),
            schema.markers.test.clone(),
            schema.markers.event.clone(),
        ]);
        for column in tables.iter().flat_map(|table| &table.columns) {
            for unit in &schema.unit_suffixes {
                labels.insert(format!("{column}({unit})"));
                labels.insert(format!("{column}（{unit}）"));
            }
        }
        Self { labels }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Empty labels, members, and members followed by any parenthesised
    /// suffix are ignored.
    pub fn is_ignored(&self, label: &str) -> bool {
        if label.is_empty() {
            return true;
        }
        let stem = label
            .split('（')
            .next()
            .and_then(|s| s.split('(').next())
            .unwrap_or(label)
            .trim();
        self.contains(stem) || self.contains(label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_headers_with_unit_suffixes() {
        let ignore = IgnoreSet::from_schema(&ExtractionSchema::default());
        assert!(ignore.is_ignored("阈值"));
        assert!(ignore.is_ignored("阈值(V)"));
        assert!(ignore.is_ignored("阈值（V）"));
        assert!(ignore.is_ignored("阻抗（Ω）"));
        assert!(ignore.is_ignored("心房"));
        assert!(ignore.is_ignored("基本工作参数"));
        assert!(ignore.is_ignored(""));
        assert!(!ignore.is_ignored("姓名"));
        assert!(!ignore.is_ignored("电池电压"));
    }

    #[test]
    fn antitachy_marker_is_not_ignored() {
        let ignore = IgnoreSet::from_schema(&ExtractionSchema::default());
        assert!(!ignore.contains("抗心动过速参数"));
    }

    #[test]
    fn any_parenthesised_suffix_reduces_to_stem() {
        let ignore = IgnoreSet::from_schema(&ExtractionSchema::default());
        assert!(ignore.is_ignored("感知灵敏度(双极)"));
        assert!(ignore.is_ignored("备注（手动）"));
    }

    #[test]
    fn toml_overrides_keep_other_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("schema.toml");
        std::fs::write(
            &path,
            "lookahead = 4\n\n[markers]\nevent = \"事件\"\n\n[zone_table]\nzones = [\"VF\", \"VT\"]\n",
        )
        .unwrap();
        let schema = ExtractionSchema::from_toml_path(&path).unwrap();
        assert_eq!(schema.lookahead, 4);
        assert_eq!(schema.markers.event, "事件");
        assert_eq!(schema.markers.basic, "基本工作参数");
        assert_eq!(schema.zone_table.zones, vec!["VF", "VT"]);
        assert_eq!(schema.zone_table.header_rows, 5);
        assert_eq!(schema.basic_table, TableSchema::basic_parameters());
    }

    #[test]
    fn malformed_toml_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("schema.toml");
        std::fs::write(&path, "lookahead = \"wide\"").unwrap();
        let result = ExtractionSchema::from_toml_path(&path);
        assert!(matches!(result, Err(ExtractError::SchemaParse { .. })));
    }
}
