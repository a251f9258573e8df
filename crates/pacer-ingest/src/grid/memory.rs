use std::collections::{BTreeMap, HashSet};

use super::{EMPTY, Grid};
use crate::cell::CellValue;

/// In-memory grid for fixtures and synthetic documents.
///
/// Dimensions grow to cover every cell that was set or highlighted.
#[derive(Debug, Clone, Default)]
pub struct MemoryGrid {
    cells: BTreeMap<(usize, usize), CellValue>,
    highlighted: HashSet<(usize, usize)>,
    row_count: usize,
    col_count: usize,
}

impl MemoryGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from rows of text; a leading `*` marks a highlighted cell and
    /// an empty string leaves the cell blank.
    ///
    /// ```
    /// use pacer_ingest::{Grid, MemoryGrid};
    ///
    /// let grid = MemoryGrid::from_markup(&[&["*姓名", "张三"]]);
    /// assert!(grid.is_highlighted(0, 0));
    /// assert_eq!(grid.cell_value(0, 1).cleaned(), "张三");
    /// ```
    pub fn from_markup(rows: &[&[&str]]) -> Self {
        let mut grid = Self::new();
        for (row, cells) in rows.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                match cell.strip_prefix('*') {
                    Some(label) => {
                        grid.set_value(row, col, label);
                        grid.set_highlighted(row, col);
                    }
                    None if cell.is_empty() => grid.touch(row, col),
                    None => grid.set_value(row, col, *cell),
                }
            }
        }
        grid
    }

    pub fn with_size(mut self, row_count: usize, col_count: usize) -> Self {
        self.touch(row_count.saturating_sub(1), col_count.saturating_sub(1));
        self
    }

    pub fn with_value(mut self, row: usize, col: usize, value: impl Into<CellValue>) -> Self {
        self.set_value(row, col, value);
        self
    }

    pub fn with_label(mut self, row: usize, col: usize, text: &str) -> Self {
        self.set_value(row, col, text);
        self.set_highlighted(row, col);
        self
    }

    pub fn set_value(&mut self, row: usize, col: usize, value: impl Into<CellValue>) {
        self.touch(row, col);
        self.cells.insert((row, col), value.into());
    }

    pub fn set_highlighted(&mut self, row: usize, col: usize) {
        self.touch(row, col);
        self.highlighted.insert((row, col));
    }

    fn touch(&mut self, row: usize, col: usize) {
        self.row_count = self.row_count.max(row + 1);
        self.col_count = self.col_count.max(col + 1);
    }
}

impl Grid for MemoryGrid {
    fn row_count(&self) -> usize {
        self.row_count
    }

    fn col_count(&self) -> usize {
        self.col_count
    }

    fn cell_value(&self, row: usize, col: usize) -> &CellValue {
        self.cells.get(&(row, col)).unwrap_or(&EMPTY)
    }

    fn is_highlighted(&self, row: usize, col: usize) -> bool {
        self.highlighted.contains(&(row, col))
    }
}
