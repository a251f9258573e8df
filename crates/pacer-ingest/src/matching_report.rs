//! Matching report CSV: the hand-off between classification and extraction.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use pacer_model::ClassificationRow;

use crate::error::{IngestError, Result};

const UTF8_BOM: &str = "\u{feff}";

/// Write the report with a byte-order mark so spreadsheet tools detect UTF-8.
pub fn write_matching_report(path: &Path, rows: &[ClassificationRow]) -> Result<()> {
    let csv_error = |source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::create(path).map_err(|e| IngestError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    file.write_all(UTF8_BOM.as_bytes())
        .map_err(|e| IngestError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    writer.flush().map_err(|e| IngestError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

pub fn read_matching_report(path: &Path) -> Result<Vec<ClassificationRow>> {
    let contents = std::fs::read_to_string(path).map_err(|e| IngestError::read(path, e))?;
    let body = contents.strip_prefix(UTF8_BOM).unwrap_or(&contents);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(body.as_bytes());
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<ClassificationRow>, _>>()
        .map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

/// Rows extraction should process, in report order.
pub fn selected_documents(rows: &[ClassificationRow]) -> Vec<&ClassificationRow> {
    rows.iter()
        .filter(|row| row.is_selected_for_extraction())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(filename: &str, status: &str) -> ClassificationRow {
        ClassificationRow {
            filename: filename.to_string(),
            full_path: format!("/data/{filename}"),
            detected_brand: "雅培".to_string(),
            detected_type: "ICD报告单".to_string(),
            matched_template: "雅培ICD模板.xlsx".to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn report_round_trips_through_bom() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("matching_report.csv");
        let rows = vec![row("张三ICD报告单(雅培).xlsx", "Match"), row("~$x.xls", "Match")];
        write_matching_report(&path, &rows).unwrap();

        let raw = std::fs::read(&path).unwrap();
        assert!(raw.starts_with(UTF8_BOM.as_bytes()));
        let text = String::from_utf8(raw).unwrap();
        assert!(text.contains("Filename,Full Path,Detected Brand"));

        let read = read_matching_report(&path).unwrap();
        assert_eq!(read, rows);
        let selected = selected_documents(&read);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].filename, "张三ICD报告单(雅培).xlsx");
    }
}
