//! Property tests: ignored labels never surface as field keys.

use pacer_extract::{ExtractionSchema, IgnoreSet, extract_event_fields, extract_fields};
use pacer_ingest::MemoryGrid;
use proptest::prelude::*;

fn header_label() -> impl Strategy<Value = String> {
    let schema = ExtractionSchema::default();
    let mut headers: Vec<String> = schema.basic_table.columns.clone();
    headers.extend(schema.test_table.columns.clone());
    headers.extend(schema.basic_table.rows.clone());
    let units = schema.unit_suffixes.clone();
    (
        proptest::sample::select(headers),
        proptest::sample::select(units),
        0..3usize,
    )
        .prop_map(|(header, unit, style)| match style {
            0 => header,
            1 => format!("{header}({unit})"),
            _ => format!("{header}（{unit}）"),
        })
}

proptest! {
    #[test]
    fn ignored_labels_are_never_keys(label in header_label(), value in "[a-z0-9]{1,6}") {
        let schema = ExtractionSchema::default();
        let ignore = IgnoreSet::from_schema(&schema);
        prop_assert!(ignore.is_ignored(&label));

        let grid = MemoryGrid::new()
            .with_label(0, 0, &label)
            .with_value(0, 1, value.as_str())
            .with_label(1, 0, "备用字段")
            .with_value(1, 1, value.as_str());
        let fields = extract_fields(&grid, 0..2, &schema, &ignore).fields;
        prop_assert!(!fields.contains_key(&label));
        prop_assert_eq!(fields.get("备用字段"), Some(&value));

        let events = extract_event_fields(&grid, 0..2, &schema, &ignore);
        prop_assert!(!events.contains_key(&label));
    }
}
