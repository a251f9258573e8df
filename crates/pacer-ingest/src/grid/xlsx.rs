//! Office Open XML `.xlsx` reader.
//!
//! Values come from calamine. Fill colours are read straight from the
//! archive: `xl/styles.xml` maps a cell style index to a fill, and the
//! active worksheet part maps cell references to style indices.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use calamine::{Data, Reader, Xlsx};
use quick_xml::Reader as XmlReader;
use quick_xml::events::{BytesStart, Event};
use zip::ZipArchive;

use super::{CellTable, Grid};
use crate::cell::CellValue;
use crate::error::{IngestError, Result};

/// Theme colour slot the report templates use for label cells.
const LABEL_THEME_INDEX: u32 = 4;

/// Active worksheet of a zipped workbook.
#[derive(Debug, Clone)]
pub struct XlsxGrid {
    table: CellTable,
}

impl XlsxGrid {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| IngestError::read(path, e))?;
        let mut archive = ZipArchive::new(file).map_err(|e| IngestError::Archive {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let layout = read_workbook_layout(&mut archive, path)?;

        let mut workbook: Xlsx<_> =
            calamine::open_workbook(path).map_err(|e| IngestError::workbook(path, e))?;
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .get(layout.active_tab)
            .or_else(|| sheet_names.first())
            .cloned()
            .ok_or_else(|| IngestError::NoWorksheet {
                path: path.to_path_buf(),
            })?;
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| IngestError::workbook(path, e))?;
        let mut table = CellTable::from_range(&range, zipped_value);

        let label_styles = read_label_styles(&mut archive, path)?;
        if let Some(part) = layout.active_part() {
            let formats = read_sheet_styles(&mut archive, path, part, &label_styles)?;
            table.extend_to(formats.row_count, formats.col_count);
            table.set_highlighted(formats.marked);
        }
        Ok(Self { table })
    }
}

impl Grid for XlsxGrid {
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

fn zipped_value(data: &Data) -> CellValue {
    match data {
        Data::Int(value) => CellValue::Integer(*value),
        Data::Float(value) => {
            integral(*value).map_or(CellValue::Number(*value), CellValue::Integer)
        }
        Data::DateTime(value) => value
            .as_datetime()
            .map_or(CellValue::Number(value.as_f64()), CellValue::DateTime),
        Data::Bool(value) => CellValue::Bool(*value),
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => {
            CellValue::Text(text.clone())
        }
        _ => CellValue::Empty,
    }
}

/// Whole-number floats; the zipped format stores `3` and `3.0` alike.
fn integral(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15).then_some(value as i64)
}

/// Sheet parts in workbook order plus the active tab.
#[derive(Debug, Default)]
struct WorkbookLayout {
    parts: Vec<Option<String>>,
    active_tab: usize,
}

impl WorkbookLayout {
    fn active_part(&self) -> Option<&str> {
        self.parts
            .get(self.active_tab)
            .or_else(|| self.parts.first())
            .and_then(Option::as_deref)
    }
}

fn read_workbook_layout<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &Path,
) -> Result<WorkbookLayout> {
    let mut sheet_ids = Vec::new();
    let mut active_tab = 0usize;
    for_each_element(archive, path, "xl/workbook.xml", |element| {
        match element.local_name().as_ref() {
            b"sheet" => sheet_ids.push(attribute(element, b"id").unwrap_or_default()),
            b"workbookView" => {
                active_tab = attribute(element, b"activeTab")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0);
            }
            _ => {}
        }
    })?;

    let mut targets: HashMap<String, String> = HashMap::new();
    for_each_element(archive, path, "xl/_rels/workbook.xml.rels", |element| {
        if element.local_name().as_ref() == b"Relationship"
            && let (Some(id), Some(target)) =
                (attribute(element, b"Id"), attribute(element, b"Target"))
        {
            targets.insert(id, target);
        }
    })?;

    let parts = sheet_ids
        .iter()
        .map(|id| targets.get(id).map(|target| part_path(target)))
        .collect();
    Ok(WorkbookLayout { parts, active_tab })
}

/// Relationship targets are relative to `xl/` unless absolute.
fn part_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{target}"),
    }
}

/// Indices into `cellXfs` whose fill uses the label theme colour.
fn read_label_styles<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &Path,
) -> Result<HashSet<usize>> {
    let mut label_fills: Vec<bool> = Vec::new();
    let mut xf_fills: Vec<usize> = Vec::new();
    let mut in_fills = false;
    let mut in_cell_xfs = false;
    let mut current_fill: Option<bool> = None;

    for_each_event(archive, path, "xl/styles.xml", |event| match event {
        XmlEvent::Start(element) => match element.local_name().as_ref() {
            b"fills" => in_fills = true,
            b"cellXfs" => in_cell_xfs = true,
            b"fill" if in_fills => current_fill = Some(false),
            b"fgColor" => mark_theme_fill(element, &mut current_fill),
            b"xf" if in_cell_xfs => xf_fills.push(fill_id(element)),
            _ => {}
        },
        XmlEvent::Empty(element) => match element.local_name().as_ref() {
            b"fill" if in_fills => label_fills.push(false),
            b"fgColor" => mark_theme_fill(element, &mut current_fill),
            b"xf" if in_cell_xfs => xf_fills.push(fill_id(element)),
            _ => {}
        },
        XmlEvent::End(name) => match name {
            b"fills" => in_fills = false,
            b"cellXfs" => in_cell_xfs = false,
            b"fill" => {
                if let Some(is_label) = current_fill.take() {
                    label_fills.push(is_label);
                }
            }
            _ => {}
        },
    })?;

    Ok(xf_fills
        .iter()
        .enumerate()
        .filter(|(_, fill)| label_fills.get(**fill).copied().unwrap_or(false))
        .map(|(xf, _)| xf)
        .collect())
}

fn mark_theme_fill(element: &BytesStart<'_>, current_fill: &mut Option<bool>) {
    if let Some(is_label) = current_fill.as_mut() {
        let theme = attribute(element, b"theme").and_then(|v| v.parse::<u32>().ok());
        if theme == Some(LABEL_THEME_INDEX) {
            *is_label = true;
        }
    }
}

fn fill_id(element: &BytesStart<'_>) -> usize {
    attribute(element, b"fillId")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

#[derive(Debug, Default)]
struct SheetStyles {
    marked: HashSet<(usize, usize)>,
    row_count: usize,
    col_count: usize,
}

fn read_sheet_styles<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &Path,
    part: &str,
    label_styles: &HashSet<usize>,
) -> Result<SheetStyles> {
    let mut styles = SheetStyles::default();
    let mut current_row: Option<usize> = None;
    let mut next_col = 0usize;
    for_each_element(archive, path, part, |element| {
        match element.local_name().as_ref() {
            b"row" => {
                let row = attribute(element, b"r")
                    .and_then(|v| v.parse::<usize>().ok())
                    .map(|r| r.saturating_sub(1));
                current_row = Some(row.unwrap_or_else(|| current_row.map_or(0, |r| r + 1)));
                next_col = 0;
            }
            b"c" => {
                let (row, col) = attribute(element, b"r")
                    .and_then(|r| parse_cell_ref(&r))
                    .unwrap_or((current_row.unwrap_or(0), next_col));
                next_col = col + 1;
                styles.row_count = styles.row_count.max(row + 1);
                styles.col_count = styles.col_count.max(col + 1);
                let style = attribute(element, b"s")
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(0);
                if label_styles.contains(&style) {
                    styles.marked.insert((row, col));
                }
            }
            _ => {}
        }
    })?;
    Ok(styles)
}

/// `"B12"` to zero-based `(11, 1)`.
pub(crate) fn parse_cell_ref(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() {
        return None;
    }
    let mut col = 0usize;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = ch.to_ascii_uppercase() as usize - 'A' as usize + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
    }
    let row: usize = digits.parse().ok()?;
    Some((row.checked_sub(1)?, col - 1))
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

enum XmlEvent<'a, 'b> {
    Start(&'a BytesStart<'b>),
    Empty(&'a BytesStart<'b>),
    End(&'a [u8]),
}

fn for_each_event<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &Path,
    part: &str,
    mut handle: impl FnMut(XmlEvent<'_, '_>),
) -> Result<()> {
    // Optional parts (styles, relationships) may be absent.
    let Some(index) = archive.index_for_name(part) else {
        return Ok(());
    };
    let entry = archive.by_index(index).map_err(|e| IngestError::Archive {
        path: path.to_path_buf(),
        message: format!("{part}: {e}"),
    })?;
    let mut reader = XmlReader::from_reader(BufReader::new(entry));
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| IngestError::Xml {
            path: path.to_path_buf(),
            part: part.to_string(),
            message: e.to_string(),
        })?;
        match &event {
            Event::Start(element) => handle(XmlEvent::Start(element)),
            Event::Empty(element) => handle(XmlEvent::Empty(element)),
            Event::End(element) => handle(XmlEvent::End(element.local_name().into_inner())),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

/// Visit every opening or self-closing element of an archive part.
fn for_each_element<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &Path,
    part: &str,
    mut handle: impl FnMut(&BytesStart<'_>),
) -> Result<()> {
    for_each_event(archive, path, part, |event| match event {
        XmlEvent::Start(element) | XmlEvent::Empty(element) => handle(element),
        XmlEvent::End(_) => {}
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cell_references() {
        assert_eq!(parse_cell_ref("A1"), Some((0, 0)));
        assert_eq!(parse_cell_ref("B12"), Some((11, 1)));
        assert_eq!(parse_cell_ref("AA3"), Some((2, 26)));
        assert_eq!(parse_cell_ref("12"), None);
        assert_eq!(parse_cell_ref("A0"), None);
    }

    #[test]
    fn whole_numbers_become_integers() {
        assert_eq!(zipped_value(&Data::Float(3.0)), CellValue::Integer(3));
        assert_eq!(zipped_value(&Data::Float(2.5)), CellValue::Number(2.5));
        assert_eq!(zipped_value(&Data::Int(-4)), CellValue::Integer(-4));
    }

    #[test]
    fn overlong_column_letters_are_rejected() {
        assert_eq!(parse_cell_ref("AAAAAAAAAAAAAAAAAAAA1"), None);
        assert_eq!(parse_cell_ref("XFD1048576"), Some((1_048_575, 16_383)));
    }

    #[test]
    fn relationship_targets_resolve_under_xl() {
        assert_eq!(part_path("worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(part_path("/xl/worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
    }
}
