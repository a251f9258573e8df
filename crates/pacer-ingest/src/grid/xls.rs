//! Legacy `.xls` (BIFF8) reader.

use std::io::Read;
use std::path::Path;

use calamine::{Data, Reader, Xls};
use tracing::debug;

use super::biff::{read_globals, read_sheet_formats};
use super::{CellTable, Grid};
use crate::cell::CellValue;
use crate::error::{IngestError, Result};

/// Palette index the report templates use for label cells.
const LABEL_PALETTE_INDEX: u16 = 31;

/// First worksheet of a legacy workbook.
#[derive(Debug, Clone)]
pub struct XlsGrid {
    table: CellTable,
}

impl XlsGrid {
    pub fn open(path: &Path) -> Result<Self> {
        let mut workbook: Xls<_> =
            calamine::open_workbook(path).map_err(|e| IngestError::workbook(path, e))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| IngestError::NoWorksheet {
                path: path.to_path_buf(),
            })?
            .map_err(|e| IngestError::workbook(path, e))?;
        let mut table = CellTable::from_range(&range, legacy_value);

        let stream = read_workbook_stream(path)?;
        let globals = read_globals(&stream);
        if let Some(offset) = globals.first_sheet_offset {
            let colours = globals.pattern_colours;
            let formats = read_sheet_formats(&stream, offset, |xf| {
                colours.get(xf as usize).copied().flatten() == Some(LABEL_PALETTE_INDEX)
            });
            table.extend_to(formats.row_count, formats.col_count);
            table.set_highlighted(formats.marked);
        } else {
            debug!(path = %path.display(), "no worksheet formatting found");
        }
        Ok(Self { table })
    }
}

impl Grid for XlsGrid {
    fn row_count(&self) -> usize {
        self.table.row_count()
    }

    fn col_count(&self) -> usize {
        self.table.col_count()
    }

    fn cell_value(&self, row: usize, col: usize) -> &CellValue {
        self.table.get(row, col)
    }

    fn is_highlighted(&self, row: usize, col: usize) -> bool {
        self.table.is_highlighted(row, col)
    }
}

/// Legacy workbooks store dates as plain serial numbers; keep them numeric.
fn legacy_value(data: &Data) -> CellValue {
    match data {
        Data::Int(value) => CellValue::Number(*value as f64),
        Data::Float(value) => CellValue::Number(*value),
        Data::DateTime(value) => CellValue::Number(value.as_f64()),
        Data::Bool(value) => CellValue::Number(if *value { 1.0 } else { 0.0 }),
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => {
            CellValue::Text(text.clone())
        }
        _ => CellValue::Empty,
    }
}

fn read_workbook_stream(path: &Path) -> Result<Vec<u8>> {
    let mut compound = cfb::open(path).map_err(|e| IngestError::workbook(path, e))?;
    // BIFF5 files name the stream "Book".
    let name = if compound.is_stream("/Workbook") {
        "/Workbook"
    } else {
        "/Book"
    };
    let mut stream = compound
        .open_stream(name)
        .map_err(|e| IngestError::workbook(path, e))?;
    let mut bytes = Vec::new();
    stream
        .read_to_end(&mut bytes)
        .map_err(|e| IngestError::read(path, e))?;
    Ok(bytes)
}
