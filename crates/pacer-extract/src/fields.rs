//! Highlight-driven key-value extraction.
//!
//! Label cells are filled with the template's label colour; a label's value
//! is the first non-empty cell to its right, found by [`find_value`].

use std::ops::Range;

use pacer_ingest::Grid;
use pacer_model::FieldMap;

use crate::schema::{ExtractionSchema, IgnoreSet};

/// Result of one key-value pass over a row range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValues {
    pub fields: FieldMap,
    /// Last row whose label contains the conclusion text.
    pub conclusion_row: Option<usize>,
}

/// Value for the label at `(row, label_col)`.
///
/// Scans up to `lookahead` cells to the right and skips blanks left by
/// merged cells. A highlighted non-empty cell belongs to the next field, so
/// reaching one ends the search with an empty value.
pub fn find_value(grid: &dyn Grid, row: usize, label_col: usize, lookahead: usize) -> String {
    for col in (label_col + 1..=label_col + lookahead).take_while(|&c| c < grid.col_count()) {
        let value = grid.cell_value(row, col).cleaned();
        if value.is_empty() {
            continue;
        }
        if grid.is_highlighted(row, col) {
            break;
        }
        return value;
    }
    String::new()
}

/// Pair every highlighted label in `rows` with its value.
///
/// Later occurrences of a label overwrite earlier ones. The conclusion row
/// is recorded even when the conclusion label itself is ignored.
pub fn extract_fields(
    grid: &dyn Grid,
    rows: Range<usize>,
    schema: &ExtractionSchema,
    ignore: &IgnoreSet,
) -> KeyValues {
    let mut result = KeyValues::default();
    for row in rows {
        for col in 0..grid.col_count() {
            if !grid.is_highlighted(row, col) {
                continue;
            }
            let label = grid.cell_value(row, col).label();
            if label.contains(schema.conclusion_label.as_str()) {
                result.conclusion_row = Some(row);
            }
            if !ignore.is_ignored(&label) {
                let value = find_value(grid, row, col, schema.lookahead);
                result.fields.insert(label, value);
            }
        }
    }
    result
}

/// Looser pass for event logs.
///
/// Within each row holding at least two non-empty cells, every non-empty
/// cell except the last one is a label candidate when it is highlighted.
/// Keys use the cleaned value text rather than the label text.
pub fn extract_event_fields(
    grid: &dyn Grid,
    rows: Range<usize>,
    schema: &ExtractionSchema,
    ignore: &IgnoreSet,
) -> FieldMap {
    let mut fields = FieldMap::new();
    for row in rows {
        let filled: Vec<(usize, String)> = (0..grid.col_count())
            .map(|col| (col, grid.cell_value(row, col).cleaned()))
            .filter(|(_, value)| !value.is_empty())
            .collect();
        let Some((_, candidates)) = filled.split_last() else {
            continue;
        };
        for (col, key) in candidates {
            if grid.is_highlighted(row, *col) && !ignore.is_ignored(key) {
                let value = find_value(grid, row, *col, schema.lookahead);
                fields.insert(key.clone(), value);
            }
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacer_ingest::MemoryGrid;

    fn setup() -> (ExtractionSchema, IgnoreSet) {
        let schema = ExtractionSchema::default();
        let ignore = IgnoreSet::from_schema(&schema);
        (schema, ignore)
    }

    #[test]
    fn lookahead_skips_merged_blanks() {
        let grid = MemoryGrid::from_markup(&[&["*电池状态", "", "", "OK"]]);
        assert_eq!(find_value(&grid, 0, 0, 7), "OK");
    }

    #[test]
    fn lookahead_stops_at_next_label() {
        let grid = MemoryGrid::from_markup(&[&["*A", "", "", "*B", "valueForB"]]);
        assert_eq!(find_value(&grid, 0, 0, 7), "");
        assert_eq!(find_value(&grid, 0, 3, 7), "valueForB");
    }

    #[test]
    fn lookahead_is_bounded() {
        let grid = MemoryGrid::new()
            .with_label(0, 0, "电池状态")
            .with_value(0, 8, "OK");
        assert_eq!(find_value(&grid, 0, 0, 7), "");
        assert_eq!(find_value(&grid, 0, 0, 8), "OK");
    }

    #[test]
    fn highlighted_blank_does_not_stop_search() {
        let mut grid = MemoryGrid::from_markup(&[&["*起搏模式", "", "DDD"]]);
        grid.set_highlighted(0, 1);
        assert_eq!(find_value(&grid, 0, 0, 7), "DDD");
    }

    #[test]
    fn extracts_labels_and_skips_ignored_headers() {
        let (schema, ignore) = setup();
        let grid = MemoryGrid::from_markup(&[
            &["*姓名", "张三", "*登记号", "0001"],
            &["*输出电压(V)", "3.5", "*心房", "2.0"],
            &["*基础频率", "", "60"],
        ])
        .with_value(2, 2, 60.0);
        let result = extract_fields(&grid, 0..3, &schema, &ignore);
        assert_eq!(result.fields.len(), 3);
        assert_eq!(result.fields["姓名"], "张三");
        assert_eq!(result.fields["登记号"], "0001");
        assert_eq!(result.fields["基础频率"], "60");
        assert_eq!(result.conclusion_row, None);
    }

    #[test]
    fn records_last_conclusion_row() {
        let (schema, ignore) = setup();
        let grid = MemoryGrid::from_markup(&[
            &["*结论", "正常"],
            &["x"],
            &["*程控结论", "参数未调整"],
        ]);
        let result = extract_fields(&grid, 0..3, &schema, &ignore);
        assert_eq!(result.conclusion_row, Some(2));
        assert_eq!(result.fields["程控结论"], "参数未调整");
    }

    #[test]
    fn range_limits_rows() {
        let (schema, ignore) = setup();
        let grid = MemoryGrid::from_markup(&[&["*姓名", "张三"], &["*型号", "Adapta"]]);
        let result = extract_fields(&grid, 1..2, &schema, &ignore);
        assert_eq!(result.fields.keys().collect::<Vec<_>>(), vec!["型号"]);
    }

    #[test]
    fn event_pass_keys_use_cleaned_values() {
        let (schema, ignore) = setup();
        let grid = MemoryGrid::from_markup(&[
            &["*房性心律失常", "3次"],
            &["*单独标签"],
            &["*室性事件", "*心房", "0"],
        ]);
        let fields = extract_event_fields(&grid, 0..3, &schema, &ignore);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["房性心律失常"], "3次");
        assert_eq!(fields["室性事件"], "");
    }
}
