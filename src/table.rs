//! Plain-text tables for terminal output.
//!
//! Numeric cells are right-aligned, everything else is left-aligned. Control
//! whitespace inside a cell is flattened to spaces so each row stays on one line.

use std::fmt::Write as _;

use crate::data::parse_decimal;

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", join_cells(headers, &widths, false));
    let rule = widths.iter().map(|w| "-".repeat((*w).max(3))).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", rule.join("  "));
    for row in rows {
        let _ = writeln!(output, "{}", join_cells(row, &widths, true));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn join_cells(cells: &[String], widths: &[usize], align_numbers: bool) -> String {
    let line = widths
        .iter()
        .enumerate()
        .map(|(idx, width)| {
            let cell = flatten(cells.get(idx).map(String::as_str).unwrap_or(""));
            if align_numbers && parse_decimal(&cell).is_some() {
                format!("{cell:>width$}")
            } else {
                format!("{cell:<width$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn flatten(cell: &str) -> String {
    cell.chars()
        .map(|ch| if matches!(ch, '\n' | '\r' | '\t') { ' ' } else { ch })
        .collect()
}
