//! Section anchors: the rows that open each part of a report.

use std::ops::Range;

use pacer_ingest::Grid;

use crate::schema::ExtractionSchema;

/// Row index of each section marker, if found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Anchors {
    pub basic: Option<usize>,
    pub antitachy: Option<usize>,
    pub test: Option<usize>,
    pub event: Option<usize>,
}

/// Row ranges derived from [`Anchors`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRanges {
    pub header: Range<usize>,
    pub basic: Range<usize>,
    /// Present only when the antitachycardia marker was found.
    pub antitachy: Option<Range<usize>>,
    pub test: Range<usize>,
    pub events: Range<usize>,
}

/// Scan the leading columns of every row for the section markers.
///
/// A cell is tested against the markers in order basic, antitachy, test,
/// event and only the first contained marker counts. When a marker occurs
/// more than once the last row wins.
pub fn locate_sections(grid: &dyn Grid, schema: &ExtractionSchema) -> Anchors {
    let markers = &schema.markers;
    let columns = schema.marker_columns.min(grid.col_count());
    let mut anchors = Anchors::default();
    for row in 0..grid.row_count() {
        for col in 0..columns {
            let text = grid.cell_value(row, col).label();
            if text.contains(markers.basic.as_str()) {
                anchors.basic = Some(row);
            } else if text.contains(markers.antitachy.as_str()) {
                anchors.antitachy = Some(row);
            } else if text.contains(markers.test.as_str()) {
                anchors.test = Some(row);
            } else if text.contains(markers.event.as_str()) {
                anchors.event = Some(row);
            }
        }
    }
    anchors
}

fn span(start: usize, end: usize) -> Range<usize> {
    start..end.max(start)
}

impl Anchors {
    /// Missing anchors fall back to `row_count`, which empties every
    /// section that would start there.
    pub fn ranges(&self, row_count: usize) -> SectionRanges {
        let basic = self.basic.unwrap_or(row_count);
        let test = self.test.unwrap_or(row_count);
        let event = self.event.unwrap_or(row_count);
        let basic_end = self.antitachy.unwrap_or(test);
        SectionRanges {
            header: 0..basic,
            basic: span(basic, basic_end),
            antitachy: self.antitachy.map(|start| span(start, test)),
            test: span(test, event),
            events: span(event, row_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacer_ingest::MemoryGrid;

    #[test]
    fn finds_markers_in_leading_columns() {
        let grid = MemoryGrid::from_markup(&[
            &["*姓名", "张三"],
            &["二、基本工作参数"],
            &["", "", "", "", "", "测试参数"],
            &["三、测试参数"],
            &["四、事件记录"],
        ]);
        let anchors = locate_sections(&grid, &ExtractionSchema::default());
        assert_eq!(
            anchors,
            Anchors {
                basic: Some(1),
                antitachy: None,
                test: Some(3),
                event: Some(4),
            }
        );
    }

    #[test]
    fn repeated_marker_keeps_last_row() {
        let grid = MemoryGrid::from_markup(&[&["事件记录"], &["x"], &["事件记录"]]);
        let anchors = locate_sections(&grid, &ExtractionSchema::default());
        assert_eq!(anchors.event, Some(2));
    }

    #[test]
    fn missing_sections_collapse_to_grid_end() {
        let anchors = Anchors {
            basic: Some(4),
            ..Anchors::default()
        };
        let ranges = anchors.ranges(20);
        assert_eq!(ranges.header, 0..4);
        assert_eq!(ranges.basic, 4..20);
        assert_eq!(ranges.antitachy, None);
        assert!(ranges.test.is_empty());
        assert!(ranges.events.is_empty());
    }

    #[test]
    fn antitachy_splits_basic_from_test() {
        let anchors = Anchors {
            basic: Some(5),
            antitachy: Some(12),
            test: Some(18),
            event: Some(30),
        };
        let ranges = anchors.ranges(40);
        assert_eq!(ranges.basic, 5..12);
        assert_eq!(ranges.antitachy, Some(12..18));
        assert_eq!(ranges.test, 18..30);
        assert_eq!(ranges.events, 30..40);
    }

    #[test]
    fn anchor_on_first_row_is_kept() {
        let anchors = Anchors {
            basic: Some(0),
            ..Anchors::default()
        };
        let ranges = anchors.ranges(3);
        assert!(ranges.header.is_empty());
        assert_eq!(ranges.basic, 0..3);
    }
}
