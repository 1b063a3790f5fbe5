//! Read-only Markdown rendering of KPI tables.
//!
//! This is the fallback surface for hosts without an interactive table
//! editor: the table is printed, and changes go through explicit actions.
//! Status is rendered as its plain name; colouring is left to the host.

use crate::model::{KpiRecord, KpiTable, TableShape};

/// Render `table` as a GFM table with the column headers of its shape.
///
/// Rows are prefixed with their id so actions can address them.
pub fn table_markdown(table: &KpiTable) -> String {
    let headers = table.shape.headers();
    let mut out = String::new();

    out.push_str("| ID | ");
    out.push_str(&headers.join(" | "));
    out.push_str(" |\n|");
    out.push_str(&" --- |".repeat(headers.len() + 1));
    out.push('\n');

    for row in table {
        let cells = cells(table.shape, row);
        out.push_str(&format!("| {} | ", row.id.get()));
        out.push_str(
            &cells
                .iter()
                .map(|c| escape_cell(c))
                .collect::<Vec<_>>()
                .join(" | "),
        );
        out.push_str(" |\n");
    }
    out
}

fn cells(shape: TableShape, row: &KpiRecord) -> [&str; 4] {
    let second = match shape {
        TableShape::Extracted => row.description.as_str(),
        TableShape::Recommended => row.owner.as_deref().unwrap_or("-"),
    };
    [row.name.as_str(), second, row.target.as_str(), row.status.as_str()]
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}
