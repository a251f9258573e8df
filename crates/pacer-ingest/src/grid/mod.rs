//! Uniform grid view over the two spreadsheet encodings.
//!
//! Both readers load the first relevant worksheet eagerly into a
//! [`CellTable`] plus a set of highlighted coordinates, so a [`Grid`] is
//! immutable and never touches the file again after construction.
//! Coordinates are zero-based everywhere; each reader converts from its
//! format's own convention.

mod biff;
mod memory;
mod xls;
mod xlsx;

use std::collections::HashSet;
use std::path::Path;

use calamine::{Data, Range};

use crate::cell::CellValue;
use crate::error::{IngestError, Result};

pub use memory::MemoryGrid;
pub use xls::XlsGrid;
pub use xlsx::XlsxGrid;

static EMPTY: CellValue = CellValue::Empty;

/// Read-only view of one worksheet.
pub trait Grid {
    fn row_count(&self) -> usize;

    fn col_count(&self) -> usize;

    /// Cell value, or [`CellValue::Empty`] outside the grid.
    fn cell_value(&self, row: usize, col: usize) -> &CellValue;

    /// Whether the cell is filled with the label colour.
    ///
    /// Returns `false` for out-of-bounds cells and cells without usable
    /// formatting.
    fn is_highlighted(&self, row: usize, col: usize) -> bool;
}

/// On-disk encoding, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridFormat {
    /// BIFF8 `.xls` inside a compound file.
    Legacy,
    /// Office Open XML `.xlsx`.
    Zipped,
}

impl GridFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("xls") {
            Some(Self::Legacy)
        } else if ext.eq_ignore_ascii_case("xlsx") {
            Some(Self::Zipped)
        } else {
            None
        }
    }
}

/// Open a spreadsheet with the reader matching its extension.
pub fn open_grid(path: &Path) -> Result<Box<dyn Grid>> {
    match GridFormat::from_path(path) {
        Some(GridFormat::Legacy) => Ok(Box::new(XlsGrid::open(path)?)),
        Some(GridFormat::Zipped) => Ok(Box::new(XlsxGrid::open(path)?)),
        None => Err(IngestError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Dense cell storage shared by the file-backed readers.
#[derive(Debug, Clone, Default)]
pub(crate) struct CellTable {
    rows: Vec<Vec<CellValue>>,
    row_count: usize,
    col_count: usize,
    highlighted: HashSet<(usize, usize)>,
}

impl CellTable {
    /// Copy a calamine range into absolute coordinates.
    pub(crate) fn from_range(range: &Range<Data>, convert: impl Fn(&Data) -> CellValue) -> Self {
        let (start_row, start_col) = range
            .start()
            .map_or((0, 0), |(r, c)| (r as usize, c as usize));
        let (row_count, col_count) = range
            .end()
            .map_or((0, 0), |(r, c)| (r as usize + 1, c as usize + 1));
        let mut rows = vec![Vec::new(); row_count];
        for (rel_row, rel_col, data) in range.used_cells() {
            let value = convert(data);
            if value.is_empty() {
                continue;
            }
            let (row, col) = (start_row + rel_row, start_col + rel_col);
            let cells = &mut rows[row];
            if cells.len() <= col {
                cells.resize(col + 1, CellValue::Empty);
            }
            cells[col] = value;
        }
        Self {
            rows,
            row_count,
            col_count,
            highlighted: HashSet::new(),
        }
    }

    /// Grow the reported dimensions to cover formatted-only cells.
    pub(crate) fn extend_to(&mut self, row_count: usize, col_count: usize) {
        self.row_count = self.row_count.max(row_count);
        self.col_count = self.col_count.max(col_count);
    }

    pub(crate) fn set_highlighted(&mut self, cells: HashSet<(usize, usize)>) {
        self.highlighted = cells;
    }

    pub(crate) fn row_count(&self) -> usize {
        self.row_count
    }

    pub(crate) fn col_count(&self) -> usize {
        self.col_count
    }

    pub(crate) fn get(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .unwrap_or(&EMPTY)
    }

    pub(crate) fn is_highlighted(&self, row: usize, col: usize) -> bool {
        row < self.row_count && col < self.col_count && self.highlighted.contains(&(row, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_is_chosen_by_extension() {
        assert_eq!(
            GridFormat::from_path(Path::new("a/张三起搏器报告单.XLS")),
            Some(GridFormat::Legacy)
        );
        assert_eq!(
            GridFormat::from_path(Path::new("b.xlsx")),
            Some(GridFormat::Zipped)
        );
        assert_eq!(GridFormat::from_path(Path::new("c.csv")), None);
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let result = open_grid(Path::new("notes.txt"));
        assert!(matches!(result, Err(IngestError::UnsupportedFormat { .. })));
    }

    #[test]
    fn cell_table_is_bounds_safe() {
        let mut table = CellTable::default();
        table.extend_to(2, 2);
        table.set_highlighted(HashSet::from([(1, 1), (5, 5)]));
        assert!(table.get(10, 10).is_empty());
        assert!(table.is_highlighted(1, 1));
        assert!(!table.is_highlighted(5, 5));
    }
}
