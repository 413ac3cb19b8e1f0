// sieve/src/summary.rs

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use sieve_core::application::RunReport;

pub fn print_report(report: &RunReport) {
    for (kind, origin) in &report.sources {
        let rows = report.raw_rows.get(kind).copied().unwrap_or_default();
        println!("   {kind}: {origin} ({rows} rows)");
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            header_cell("Table"),
            header_cell("Accepted"),
            header_cell("Quarantined"),
        ]);
    for summary in &report.tables {
        table.add_row(vec![
            Cell::new(summary.table).fg(Color::Blue),
            Cell::new(summary.accepted).set_alignment(CellAlignment::Right),
            count_cell(summary.quarantined),
        ]);
    }
    println!("{table}");

    if report.quarantine_reasons.is_empty() {
        return;
    }
    let mut reasons = Table::new();
    reasons
        .load_preset(UTF8_FULL_CONDENSED)
        .set_header(vec![header_cell("Quarantine reason"), header_cell("Rows")]);
    for (reason, count) in &report.quarantine_reasons {
        reasons.add_row(vec![Cell::new(reason), count_cell(*count)]);
    }
    println!("{reasons}");
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize) -> Cell {
    let cell = Cell::new(count).set_alignment(CellAlignment::Right);
    if count > 0 {
        cell.fg(Color::Yellow)
    } else {
        cell.fg(Color::DarkGrey)
    }
}
