//! Table formatting utilities for CLI output.

use comfy_table::{ContentArrangement, Table, presets};
use serde::Serialize;

/// One placeholder found in a template.
#[derive(Debug, Clone, Serialize)]
pub struct FieldRow {
    /// Where the placeholder lives (e.g. "complex field", "shared string 3").
    pub location: String,
    /// The field expression.
    pub expression: String,
    /// Format modifiers, in declaration order.
    pub modifiers: Vec<String>,
    /// Parse error for the expression, if any.
    pub error: Option<String>,
}

/// Format located fields as an ASCII table.
pub fn format_fields_table(rows: &[FieldRow]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_BORDERS_ONLY);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Location", "Expression", "Modifiers", "Status"]);

    for row in rows {
        table.add_row(vec![
            row.location.clone(),
            row.expression.clone(),
            row.modifiers.join(", "),
            row.error.clone().unwrap_or_else(|| "ok".to_string()),
        ]);
    }

    table
}
