//! End-of-run console summaries.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use clinmig_match::RepairOutcome;
use clinmig_model::RunReport;

use clinmig_cli::report::DedupeReport;

/// How many unmatched names the console shows; the artifact has them all.
const UNMATCHED_DISPLAY_CAP: usize = 20;
/// How many error messages the console shows.
const ERROR_DISPLAY_CAP: usize = 10;

pub fn print_run_summary(report: &RunReport) {
    println!("Source: {}", report.source);
    println!("Mode: {}", report.mode.as_str());
    let stats = &report.stats;
    let mut table = new_table();
    table.set_header(vec![header_cell("Outcome"), header_cell("Rows")]);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Total processed"), Cell::new(stats.total)]);
    table.add_row(vec![
        Cell::new("Succeeded"),
        count_cell(stats.succeeded, Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("Skipped"),
        count_cell(stats.skipped, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Patient not found"),
        count_cell(stats.patient_not_found, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Invalid date"),
        count_cell(stats.invalid_date, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Duplicate"),
        count_cell(stats.duplicate, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Field warnings"),
        count_cell(stats.warning_total(), Color::Yellow),
    ]);
    table.add_row(vec![Cell::new("Errors"), count_cell(stats.errors, Color::Red)]);
    println!("{table}");

    if !stats.field_warnings.is_empty() {
        println!("Field warnings:");
        for (field, count) in &stats.field_warnings {
            println!("- {field}: {count}");
        }
    }
    if !stats.unmatched_names.is_empty() {
        println!("Unmatched patient names ({}):", stats.unmatched_names.len());
        for name in stats.unmatched_names.iter().take(UNMATCHED_DISPLAY_CAP) {
            println!("- {name}");
        }
        let hidden = stats.unmatched_names.len().saturating_sub(UNMATCHED_DISPLAY_CAP);
        if hidden > 0 {
            println!("... and {hidden} more (see the report file)");
        }
    }
    if !stats.error_messages.is_empty() {
        eprintln!("Errors ({}):", stats.error_messages.len());
        for message in stats.error_messages.iter().take(ERROR_DISPLAY_CAP) {
            eprintln!("- {message}");
        }
        let hidden = stats.error_messages.len().saturating_sub(ERROR_DISPLAY_CAP);
        if hidden > 0 {
            eprintln!("... and {hidden} more (see the report file)");
        }
    }
}

pub fn print_dedupe_summary(report: &DedupeReport) {
    println!("Active patients scanned: {}", report.total_patients);
    if report.groups.is_empty() {
        println!("No duplicate groups found.");
        return;
    }
    let mut table = new_table();
    table.set_header(vec![
        header_cell("Criterion"),
        header_cell("Members"),
        header_cell("Patients"),
    ]);
    align_column(&mut table, 1, CellAlignment::Right);
    for group in &report.groups {
        table.add_row(vec![
            Cell::new(group.criterion.as_str()),
            Cell::new(group.patient_ids.len()),
            Cell::new(group.names.join(", ")),
        ]);
    }
    println!("{table}");
    println!(
        "{} groups (national id: {}, birth date: {}, combined: {})",
        report.groups.len(),
        report.national_id_groups,
        report.birth_date_groups,
        report.combined_groups
    );
}

pub fn print_repair_summary(outcome: &RepairOutcome) {
    let mut table = new_table();
    table.set_header(vec![header_cell("Outcome"), header_cell("Codes")]);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Legacy codes found"), Cell::new(outcome.scanned)]);
    table.add_row(vec![
        Cell::new("Repaired"),
        count_cell(outcome.repaired, Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("Skipped (no patient)"),
        count_cell(outcome.skipped, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Errors"),
        count_cell(outcome.errors.len(), Color::Red),
    ]);
    println!("{table}");
    for message in &outcome.errors {
        eprintln!("- {message}");
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        Cell::new(count).fg(Color::DarkGrey)
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
