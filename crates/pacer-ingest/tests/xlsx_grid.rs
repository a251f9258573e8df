//! Reads a hand-assembled `.xlsx` through the public grid API.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use pacer_ingest::{CellValue, Grid, GridFormat, XlsxGrid, open_grid};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<bookViews><workbookView activeTab="1"/></bookViews>
<sheets>
<sheet name="模板" sheetId="1" r:id="rId1"/>
<sheet name="报告" sheetId="2" r:id="rId2"/>
</sheets>
</workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="1"><font><sz val="11"/></font></fonts>
<fills count="3">
<fill><patternFill patternType="none"/></fill>
<fill><patternFill patternType="gray125"/></fill>
<fill><patternFill patternType="solid"><fgColor theme="4" tint="0.79"/><bgColor indexed="64"/></patternFill></fill>
</fills>
<borders count="1"><border/></borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="2">
<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
<xf numFmtId="0" fontId="0" fillId="2" borderId="0" xfId="0" applyFill="1"/>
</cellXfs>
</styleSheet>"#;

const TEMPLATE_SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>模板</t></is></c></row>
</sheetData>
</worksheet>"#;

const REPORT_SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="1">
<c r="A1" s="1" t="inlineStr"><is><t>姓名</t></is></c>
<c r="B1" t="inlineStr"><is><t>张三</t></is></c>
</row>
<row r="2">
<c r="A2" s="1" t="inlineStr"><is><t>基础频率</t></is></c>
<c r="B2"><v>60</v></c>
</row>
<row r="3">
<c r="C3" s="1"/>
</row>
</sheetData>
</worksheet>"#;

fn write_workbook(path: &Path) {
    let file = File::create(path).expect("create workbook");
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, body) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("xl/workbook.xml", WORKBOOK),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
        ("xl/styles.xml", STYLES),
        ("xl/worksheets/sheet1.xml", TEMPLATE_SHEET),
        ("xl/worksheets/sheet2.xml", REPORT_SHEET),
    ] {
        zip.start_file(name, options).expect("start part");
        zip.write_all(body.as_bytes()).expect("write part");
    }
    zip.finish().expect("finish archive");
}

#[test]
fn reads_active_sheet_values_and_label_fills() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let path = dir.path().join("张三起搏器报告单（美敦力）.xlsx");
    write_workbook(&path);

    let grid = XlsxGrid::open(&path).expect("open workbook");
    assert_eq!(grid.cell_value(0, 0).label(), "姓名");
    assert_eq!(grid.cell_value(0, 1).cleaned(), "张三");
    assert_eq!(grid.cell_value(1, 1), &CellValue::Integer(60));
    assert_eq!(grid.cell_value(1, 1).label(), "60");

    assert!(grid.is_highlighted(0, 0));
    assert!(grid.is_highlighted(1, 0));
    assert!(!grid.is_highlighted(0, 1));

    // Styled-only cells still count toward the dimensions.
    assert!(grid.is_highlighted(2, 2));
    assert_eq!(grid.row_count(), 3);
    assert_eq!(grid.col_count(), 3);
}

#[test]
fn open_grid_dispatches_by_extension() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let path = dir.path().join("report.xlsx");
    write_workbook(&path);
    assert_eq!(GridFormat::from_path(&path), Some(GridFormat::Zipped));

    let grid = open_grid(&path).expect("open grid");
    assert_eq!(grid.cell_value(1, 0).label(), "基础频率");
    assert!(grid.cell_value(40, 40).is_empty());
    assert!(!grid.is_highlighted(40, 40));
}

#[test]
fn corrupt_archive_is_reported() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let path = dir.path().join("broken.xlsx");
    std::fs::write(&path, b"not a zip").expect("write");
    assert!(XlsxGrid::open(&path).is_err());
}
