use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use crate::types::{
    BundleResult, ChangesResult, ExtractResult, FailedDocument, MatchResult, RunResult,
};

pub fn print_run_summary(result: &RunResult) {
    println!("Output: {}", result.output_dir.display());
    println!("Matching report: {}", result.report_path.display());
    if let Some(path) = &result.bundle {
        println!("Bundle: {}", path.display());
    }
    let report = &result.reconcile;
    let mut table = count_table();
    add_count_row(&mut table, "Spreadsheets discovered", result.discovered, None);
    add_count_row(&mut table, "Documents extracted", result.selected, None);
    add_count_row(&mut table, "Failed extractions", report.failed, Some(Color::Red));
    add_count_row(
        &mut table,
        "Identity mismatches",
        report.identity_mismatches,
        Some(Color::Yellow),
    );
    add_count_row(
        &mut table,
        "Missing registration number",
        report.missing_identifier,
        Some(Color::Yellow),
    );
    add_count_row(&mut table, "Patients", report.groups.len(), None);
    add_count_row(&mut table, "Multi-visit patients", report.multi_visit, None);
    add_count_row(&mut table, "Patient files written", result.patient_files, None);
    add_count_row(&mut table, "Files indexed", result.indexed_files, None);
    println!("{table}");
    print_failed_table(&result.failed);
}

pub fn print_match_summary(result: &MatchResult) {
    println!("Matching report: {}", result.report_path.display());
    let mut table = count_table();
    for (status, count) in &result.statuses {
        let color = (status == "No Match").then_some(Color::Yellow);
        add_count_row(&mut table, status, *count, color);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(result.total).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

pub fn print_extract_summary(result: &ExtractResult) {
    let mut table = count_table();
    add_count_row(&mut table, "Documents extracted", result.selected, None);
    add_count_row(&mut table, "Failed extractions", result.failed.len(), Some(Color::Red));
    println!("{table}");
    print_failed_table(&result.failed);
}

pub fn print_bundle_summary(result: &BundleResult) {
    println!(
        "Bundle with {} patients written to {}",
        result.patients,
        result.path.display()
    );
}

pub fn print_changes(result: &ChangesResult) {
    println!("Compared against {}", result.index_path.display());
    if result.changes.is_empty() {
        println!("No new or modified spreadsheets.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Change"), header_cell("File")]);
    apply_table_style(&mut table);
    for file in &result.changes.new {
        table.add_row(vec![Cell::new("new").fg(Color::Green), Cell::new(file)]);
    }
    for file in &result.changes.modified {
        table.add_row(vec![Cell::new("modified").fg(Color::Yellow), Cell::new(file)]);
    }
    println!("{table}");
}

fn print_failed_table(failed: &[FailedDocument]) {
    if failed.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Document"), header_cell("Error")]);
    apply_table_style(&mut table);
    table.set_constraints(vec![
        ColumnConstraint::UpperBoundary(Width::Percentage(40)),
        ColumnConstraint::UpperBoundary(Width::Percentage(60)),
    ]);
    for document in failed {
        table.add_row(vec![
            Cell::new(&document.filename),
            Cell::new(&document.error).fg(Color::Red),
        ]);
    }
    println!();
    println!("Failed documents:");
    println!("{table}");
}

fn count_table() -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Stage"), header_cell("Count")]);
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    if let Some(column) = table.column_mut(1) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    table
}

fn add_count_row(table: &mut Table, label: &str, count: usize, highlight: Option<Color>) {
    let count_cell = match highlight {
        Some(color) if count > 0 => Cell::new(count).fg(color).add_attribute(Attribute::Bold),
        Some(_) => dim_cell(count),
        None => Cell::new(count),
    };
    table.add_row(vec![Cell::new(label), count_cell]);
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
