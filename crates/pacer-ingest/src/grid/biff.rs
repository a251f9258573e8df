//! Minimal BIFF8 record walker for cell formatting.
//!
//! calamine exposes cell values but not the XF (extended format) index
//! behind each cell, so the legacy reader walks the raw `Workbook` stream
//! for two things: the XF table in the workbook globals and the XF index of
//! every cell record in the first worksheet.

use std::collections::HashSet;

const RECORD_EOF: u16 = 0x000A;
const RECORD_BOF: u16 = 0x0809;
const RECORD_BOUNDSHEET: u16 = 0x0085;
const RECORD_XF: u16 = 0x00E0;
const RECORD_MULRK: u16 = 0x00BD;
const RECORD_MULBLANK: u16 = 0x00BE;

/// Sheet type byte of a BOUNDSHEET record for an ordinary worksheet.
const SHEET_TYPE_WORKSHEET: u8 = 0x00;

#[derive(Debug, Clone, Copy)]
pub(crate) struct BiffRecord<'a> {
    pub(crate) id: u16,
    pub(crate) offset: usize,
    pub(crate) data: &'a [u8],
}

/// Iterator over `(id, len, data)` records; stops at the first truncated one.
pub(crate) struct BiffRecords<'a> {
    stream: &'a [u8],
    pos: usize,
}

impl<'a> BiffRecords<'a> {
    pub(crate) fn from_offset(stream: &'a [u8], pos: usize) -> Self {
        Self { stream, pos }
    }
}

impl<'a> Iterator for BiffRecords<'a> {
    type Item = BiffRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let header = self.stream.get(self.pos..self.pos + 4)?;
        let id = u16::from_le_bytes([header[0], header[1]]);
        let len = u16::from_le_bytes([header[2], header[3]]) as usize;
        let start = self.pos + 4;
        let data = self.stream.get(start..start + len)?;
        let record = BiffRecord {
            id,
            offset: self.pos,
            data,
        };
        self.pos = start + len;
        Some(record)
    }
}

/// What the workbook globals tell us about formatting.
#[derive(Debug, Default)]
pub(crate) struct Globals {
    /// Pattern colour index of each XF record, in XF order.
    pub(crate) pattern_colours: Vec<Option<u16>>,
    /// Stream offset of the first worksheet's BOF record.
    pub(crate) first_sheet_offset: Option<usize>,
}

pub(crate) fn read_globals(stream: &[u8]) -> Globals {
    let mut globals = Globals::default();
    for record in BiffRecords::from_offset(stream, 0) {
        match record.id {
            RECORD_XF => globals
                .pattern_colours
                .push(xf_pattern_colour(record.data)),
            RECORD_BOUNDSHEET if globals.first_sheet_offset.is_none() => {
                if record.data.len() >= 6 && record.data[5] == SHEET_TYPE_WORKSHEET {
                    let offset = u32::from_le_bytes([
                        record.data[0],
                        record.data[1],
                        record.data[2],
                        record.data[3],
                    ]);
                    globals.first_sheet_offset = Some(offset as usize);
                }
            }
            RECORD_EOF => break,
            _ => {}
        }
    }
    globals
}

/// Pattern colour index: low 7 bits of the fill word at XF offset 18.
fn xf_pattern_colour(data: &[u8]) -> Option<u16> {
    let word = data.get(18..20)?;
    Some(u16::from_le_bytes([word[0], word[1]]) & 0x7F)
}

/// Cells of one worksheet whose XF satisfies `is_marked`, plus the extent
/// of every cell record seen.
#[derive(Debug, Default)]
pub(crate) struct SheetFormats {
    pub(crate) marked: HashSet<(usize, usize)>,
    pub(crate) row_count: usize,
    pub(crate) col_count: usize,
}

pub(crate) fn read_sheet_formats(
    stream: &[u8],
    start: usize,
    is_marked: impl Fn(u16) -> bool,
) -> SheetFormats {
    let mut formats = SheetFormats::default();
    let mut visit = |row: usize, col: usize, xf: u16| {
        formats.row_count = formats.row_count.max(row + 1);
        formats.col_count = formats.col_count.max(col + 1);
        if is_marked(xf) {
            formats.marked.insert((row, col));
        }
    };

    for record in BiffRecords::from_offset(stream, start) {
        if record.offset != start && record.id == RECORD_BOF {
            break;
        }
        let data = record.data;
        match record.id {
            0x0006 // FORMULA
            | 0x0201 // BLANK
            | 0x0203 // NUMBER
            | 0x0204 // LABEL
            | 0x0205 // BOOLERR
            | 0x027E // RK
            | 0x00D6 // RSTRING
            | 0x00FD => { // LABELSST
                if data.len() < 6 {
                    continue;
                }
                let row = u16::from_le_bytes([data[0], data[1]]) as usize;
                let col = u16::from_le_bytes([data[2], data[3]]) as usize;
                let xf = u16::from_le_bytes([data[4], data[5]]);
                visit(row, col, xf);
            }
            RECORD_MULRK | RECORD_MULBLANK => {
                if data.len() < 6 {
                    continue;
                }
                let row = u16::from_le_bytes([data[0], data[1]]) as usize;
                let first_col = u16::from_le_bytes([data[2], data[3]]) as usize;
                let last_col =
                    u16::from_le_bytes([data[data.len() - 2], data[data.len() - 1]]) as usize;
                // MULRK carries (xf, rk) pairs, MULBLANK bare xf indices.
                let stride = if record.id == RECORD_MULRK { 6 } else { 2 };
                let body = &data[4..data.len() - 2];
                for (idx, chunk) in body.chunks_exact(stride).enumerate() {
                    let col = first_col + idx;
                    if col > last_col {
                        break;
                    }
                    visit(row, col, u16::from_le_bytes([chunk[0], chunk[1]]));
                }
            }
            RECORD_EOF => break,
            _ => {}
        }
    }
    formats
}
