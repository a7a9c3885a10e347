//! Markdown rendering for card details.
//!
//! CDS Hooks renders `Card.detail` as GitHub-flavoured markdown. Cell text comes from the FHIR
//! server, so characters that would break a table row are escaped.

use crate::constants::{NO_EXPIRATION_TEXT, TABLE_HEADERS};
use fhir::ImmunizationEntry;

/// Escape text for use inside a table cell.
///
/// - `|` → `\|` (would start a new column)
/// - line breaks → single space (would end the row)
pub fn escape_cell(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_break = false;
    for ch in text.chars() {
        match ch {
            '\r' | '\n' => {
                if !last_was_break {
                    out.push(' ');
                }
                last_was_break = true;
                continue;
            }
            '|' => out.push_str("\\|"),
            other => out.push(other),
        }
        last_was_break = false;
    }
    out
}

/// Render a pipe table. Header and cell text are escaped.
pub fn render_table<S: AsRef<str>>(headers: &[&str], rows: &[Vec<S>]) -> String {
    let mut output = String::new();

    output.push('|');
    for header in headers {
        output.push_str(&format!(" {} |", escape_cell(header)));
    }
    output.push('\n');

    output.push('|');
    for _ in headers {
        output.push_str(" --- |");
    }
    output.push('\n');

    for row in rows {
        output.push('|');
        for cell in row {
            output.push_str(&format!(" {} |", escape_cell(cell.as_ref())));
        }
        output.push('\n');
    }

    output
}

/// Render the `Vaccination | Expiration Date` table, one row per entry, in the given order.
pub fn immunization_table(entries: &[ImmunizationEntry]) -> String {
    let rows: Vec<Vec<&str>> = entries
        .iter()
        .map(|entry| {
            vec![
                entry.vaccine.as_str(),
                entry
                    .expiration_date
                    .as_deref()
                    .unwrap_or(NO_EXPIRATION_TEXT),
            ]
        })
        .collect();

    render_table(&TABLE_HEADERS, &rows)
}
