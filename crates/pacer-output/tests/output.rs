//! Patient files and bundle generation on a real directory.

use std::collections::BTreeMap;

use pacer_model::{ExtractedRecord, FieldMap, FooterMeta, PatientGroup, RecordMeta};
use pacer_output::{build_bundle, render_bundle, write_bundle, write_patient_files};

fn visit(filename: &str, date: &str, model: &str) -> ExtractedRecord {
    let header: FieldMap = [
        ("姓名", "张三"),
        ("登记号", "0001"),
        ("品牌", "美敦力"),
        ("型号", model),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    ExtractedRecord {
        meta: RecordMeta {
            filename: filename.to_string(),
            path: Some(format!("/data/{filename}")),
            error: None,
        },
        header: Some(header),
        footer_meta: Some(FooterMeta {
            signature_line: String::new(),
            programming_date: date.to_string(),
        }),
        ..ExtractedRecord::default()
    }
}

fn groups() -> BTreeMap<String, PatientGroup> {
    let zhang = PatientGroup {
        registration_id: "0001".to_string(),
        name: "张三".to_string(),
        visit_count: 2,
        records: vec![
            visit("张三起搏器报告单.xls", "2020-03-01", "Adapta"),
            visit("张三起搏器报告单(2).xls", "2021/05/10", "Azure"),
        ],
    };
    let wang = PatientGroup {
        registration_id: "A/7".to_string(),
        name: "王五".to_string(),
        visit_count: 1,
        records: vec![ExtractedRecord {
            header: Some(FieldMap::new()),
            ..visit("王五ICD报告单.xlsx", "", "")
        }],
    };
    BTreeMap::from([("0001".to_string(), zhang), ("A/7".to_string(), wang)])
}

#[test]
fn patient_files_use_report_keys() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let written = write_patient_files(dir.path(), &groups()).expect("write");
    assert_eq!(written.len(), 2);
    assert!(dir.path().join("A7.json").exists());

    let text = std::fs::read_to_string(dir.path().join("0001.json")).expect("read");
    assert!(text.starts_with("{\n  \"登记号\": \"0001\",\n  \"姓名\": \"张三\",\n  \"程控次数\": 2,"));
    let value: serde_json::Value = serde_json::from_str(&text).expect("parse");
    assert_eq!(value["程控记录"][1]["footer_meta"]["程控日期"], "2021/05/10");
}

#[test]
fn rewriting_is_byte_identical() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    write_patient_files(dir.path(), &groups()).expect("first write");
    let first = std::fs::read(dir.path().join("0001.json")).expect("read");
    write_patient_files(dir.path(), &groups()).expect("second write");
    let second = std::fs::read(dir.path().join("0001.json")).expect("read");
    assert_eq!(first, second);
}

#[test]
fn bundle_indexes_latest_visit() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    write_patient_files(dir.path(), &groups()).expect("write");
    std::fs::write(dir.path().join("processed_files.json"), "{}").expect("write index");

    let bundle = build_bundle(dir.path()).expect("bundle");
    assert_eq!(bundle.index.len(), 2);
    assert_eq!(bundle.records.len(), 2);

    let zhang = &bundle.index[0];
    assert_eq!(zhang.id, "0001");
    assert_eq!(zhang.model, "Azure");
    assert_eq!(zhang.file_name, "0001.json");
    assert_eq!(zhang.implant_date, "");

    let wang = &bundle.index[1];
    assert_eq!(wang.brand, "Unknown");
    assert_eq!(wang.model, "Unknown");

    let script = render_bundle(&bundle).expect("render");
    insta::assert_snapshot!(&script[..script.find('[').expect("index array")], @r#"window.PACEMAKER_DATA = {"index":"#);
    assert!(script.ends_with("}};"));

    let out = dir.path().join("dashboard").join("data_bundle.js");
    write_bundle(&out, &bundle).expect("write bundle");
    assert_eq!(std::fs::read_to_string(out).expect("read bundle"), script);
}
