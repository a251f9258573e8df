//! Fixed-schema tables located by their header text.

use std::collections::HashMap;
use std::ops::Range;

use pacer_ingest::Grid;
use pacer_model::FieldMap;

use crate::schema::{TableSchema, ZoneTableSchema};

/// Value at `(row, col)`, or the cell to its right when that one is empty.
///
/// Header and value are sometimes split across adjacent merged cells.
fn value_or_right(grid: &dyn Grid, row: usize, col: usize) -> String {
    let value = grid.cell_value(row, col).cleaned();
    if value.is_empty() {
        grid.cell_value(row, col + 1).cleaned()
    } else {
        value
    }
}

/// Bind each column header to the first column whose label contains it.
fn resolve_columns<'a>(
    grid: &dyn Grid,
    rows: Range<usize>,
    headers: &'a [String],
) -> HashMap<&'a str, usize> {
    let mut columns = HashMap::new();
    for row in rows {
        for col in 0..grid.col_count() {
            let text = grid.cell_value(row, col).label();
            for header in headers {
                if text.contains(header.as_str()) {
                    columns.entry(header.as_str()).or_insert(col);
                }
            }
        }
    }
    columns
}

/// Read every `row header × column header` intersection.
///
/// Keys are `"{row}_{column}"`. Column headers match by substring and row
/// headers exactly; in both cases the first match in scan order wins.
pub fn extract_table(grid: &dyn Grid, rows: Range<usize>, table: &TableSchema) -> FieldMap {
    let columns = resolve_columns(grid, rows.clone(), &table.columns);
    let mut row_positions: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        for col in 0..grid.col_count() {
            let text = grid.cell_value(row, col).label();
            if let Some(header) = table.rows.iter().find(|header| **header == text) {
                row_positions.entry(header.as_str()).or_insert(row);
            }
        }
    }

    let mut data = FieldMap::new();
    for (row_header, &row) in &row_positions {
        for (col_header, &col) in &columns {
            data.insert(
                format!("{row_header}_{col_header}"),
                value_or_right(grid, row, col),
            );
        }
    }
    data
}

/// Read the tachycardia zone table.
///
/// Zones are matched exactly in the leading columns of any row in range;
/// every zone row yields a rate and a therapy entry, empty when the
/// corresponding column header was not found.
pub fn extract_zone_table(grid: &dyn Grid, rows: Range<usize>, table: &ZoneTableSchema) -> FieldMap {
    let header_end = rows.end.min(rows.start + table.header_rows);
    let columns = resolve_columns(grid, rows.start..header_end, &table.columns);
    let read = |row: usize, header: &str| {
        columns
            .get(header)
            .map(|&col| value_or_right(grid, row, col))
            .unwrap_or_default()
    };

    let mut data = FieldMap::new();
    let zone_columns = table.zone_columns.min(grid.col_count());
    for row in rows {
        for col in 0..zone_columns {
            let text = grid.cell_value(row, col).label();
            for zone in table.zones.iter().filter(|zone| **zone == text) {
                data.insert(
                    format!("{zone}_{}", table.rate_column),
                    read(row, &table.rate_column),
                );
                data.insert(
                    format!("{zone}_{}", table.therapy_column),
                    read(row, &table.therapy_column),
                );
            }
        }
    }
    data
}
