//! Signature block mining below the conclusion line.

use std::sync::LazyLock;

use chrono::{Days, NaiveDate};
use pacer_ingest::Grid;
use pacer_model::FooterMeta;
use regex::Regex;

/// Year, month, day separated by 年/月, slash, dot or dash, optional 日.
static TEXT_DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}\s*[-./年]\s*\d{1,2}\s*[-./月]\s*\d{1,2}\s*[日]?")
        .expect("Invalid footer date regex")
});

/// Minimum number of rows scanned below the conclusion.
const MIN_WINDOW: usize = 2;
/// Upper bound on the scan window.
const MAX_WINDOW: usize = 50;

/// Serial range treated as a document date (roughly 2009 to 2050).
const SERIAL_MIN: f64 = 40000.0;
const SERIAL_MAX: f64 = 55000.0;

/// Convert a spreadsheet date serial to `YYYY年MM月DD日`.
///
/// Only values strictly inside the document date range qualify; the
/// fractional time-of-day part is dropped.
pub fn serial_to_date(value: f64) -> Option<String> {
    if !(value > SERIAL_MIN && value < SERIAL_MAX) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = epoch.checked_add_days(Days::new(value.floor() as u64))?;
    Some(date.format("%Y年%m月%d日").to_string())
}

fn row_line(grid: &dyn Grid, row: usize) -> String {
    (0..grid.col_count())
        .map(|col| grid.cell_value(row, col).cleaned())
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Number of rows below the conclusion to read.
///
/// Starts at [`MIN_WINDOW`] and grows one row at a time until the window
/// holds a non-blank row or exceeds the rows left in the grid.
fn window_size(grid: &dyn Grid, first_row: usize, remaining: usize) -> usize {
    let limit = remaining.min(MAX_WINDOW);
    let mut size = MIN_WINDOW;
    while size <= limit {
        let has_content = (first_row..first_row + size).any(|row| !row_line(grid, row).is_empty());
        if has_content {
            break;
        }
        size += 1;
    }
    size
}

/// Collect the signature text and programming date below `conclusion_row`.
///
/// Non-empty rows are joined with `" | "`. The first date found wins: a
/// numeric date serial is preferred over a textual date in the same row,
/// and rows are scanned top to bottom.
pub fn mine_footer(grid: &dyn Grid, conclusion_row: usize) -> FooterMeta {
    let row_count = grid.row_count();
    let first_row = conclusion_row + 1;
    let size = window_size(grid, first_row, row_count.saturating_sub(conclusion_row));
    let last_row = (first_row + size).min(row_count);

    let mut lines = Vec::new();
    let mut date: Option<String> = None;
    for row in first_row..last_row {
        if date.is_none() {
            date = (0..grid.col_count())
                .filter_map(|col| grid.cell_value(row, col).as_number())
                .find_map(serial_to_date);
        }
        let line = row_line(grid, row);
        if line.is_empty() {
            continue;
        }
        if date.is_none() {
            date = TEXT_DATE_REGEX
                .find(&line)
                .map(|found| found.as_str().to_string());
        }
        lines.push(line);
    }

    FooterMeta {
        signature_line: lines.join(" | "),
        programming_date: date.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacer_ingest::MemoryGrid;

    #[test]
    fn converts_serials_in_range() {
        assert_eq!(serial_to_date(43891.0).as_deref(), Some("2020年03月01日"));
        assert_eq!(serial_to_date(43891.75).as_deref(), Some("2020年03月01日"));
        assert_eq!(serial_to_date(40000.0), None);
        assert_eq!(serial_to_date(60.0), None);
        assert_eq!(serial_to_date(f64::NAN), None);
    }

    #[test]
    fn joins_rows_and_reads_text_date() {
        let grid = MemoryGrid::from_markup(&[
            &["*结论", "参数正常"],
            &["程控医生:", "李医生"],
            &["日期:", "2021/05/10"],
        ]);
        let footer = mine_footer(&grid, 0);
        insta::assert_snapshot!(footer.signature_line, @"程控医生: 李医生 | 日期: 2021/05/10");
        assert_eq!(footer.programming_date, "2021/05/10");
    }

    #[test]
    fn serial_beats_text_in_same_row() {
        let grid = MemoryGrid::from_markup(&[&["*结论"], &["2019年1月2日"]]).with_value(1, 1, 43891.0);
        let footer = mine_footer(&grid, 0);
        assert_eq!(footer.programming_date, "2020年03月01日");
        assert_eq!(footer.signature_line, "2019年1月2日 43891");
    }

    #[test]
    fn earlier_text_date_beats_later_serial() {
        let grid = MemoryGrid::from_markup(&[&["*结论"], &["2019年1月2日 签名"]])
            .with_value(2, 0, 43891.0);
        let footer = mine_footer(&grid, 0);
        assert_eq!(footer.programming_date, "2019年1月2日");
    }

    #[test]
    fn window_grows_past_blank_padding() {
        let grid = MemoryGrid::new()
            .with_label(0, 0, "结论")
            .with_value(6, 1, "医师签名: 王医生")
            .with_value(7, 1, "尾行");
        let footer = mine_footer(&grid, 0);
        assert_eq!(footer.signature_line, "医师签名: 王医生");
        assert_eq!(footer.programming_date, "");
    }

    #[test]
    fn empty_tail_yields_empty_footer() {
        let grid = MemoryGrid::new().with_label(0, 0, "结论").with_size(3, 2);
        let footer = mine_footer(&grid, 0);
        assert_eq!(footer, FooterMeta::default());
    }
}
