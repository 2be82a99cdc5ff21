//! CSV export of the schedule table.
//!
//! # Responsibility
//! - Serialize the canonical grid into a UTF-8 CSV string for the
//!   export collaborator.
//!
//! # Invariants
//! - Header is the fixed key columns followed by participant names in
//!   column order; the `EndTime` column appears only when at least one
//!   slot carries an end time.
//! - Cells that could be read as spreadsheet formulas are neutralized.

use crate::model::table::{ScheduleTable, DATE_FIELD, END_TIME_FIELD, START_TIME_FIELD};

/// Renders the table as CSV, one line per slot row.
pub fn table_to_csv(table: &ScheduleTable) -> String {
    let with_end_times = table.slots().iter().any(|key| key.end_time.is_some());

    let mut header: Vec<String> = vec![DATE_FIELD.to_string(), START_TIME_FIELD.to_string()];
    if with_end_times {
        header.push(END_TIME_FIELD.to_string());
    }
    for column in table.users() {
        header.push(column.name.clone());
    }

    let mut lines = Vec::with_capacity(table.slot_count() + 1);
    lines.push(
        header
            .iter()
            .map(|cell| csv_escape(cell))
            .collect::<Vec<_>>()
            .join(","),
    );

    for (row, key) in table.slots().iter().enumerate() {
        let mut cells: Vec<String> = vec![key.date_label(), key.start_label()];
        if with_end_times {
            cells.push(key.end_label().unwrap_or_default());
        }
        for column in table.users() {
            cells.push(
                column
                    .statuses
                    .get(row)
                    .copied()
                    .unwrap_or_default()
                    .label()
                    .to_string(),
            );
        }
        lines.push(
            cells
                .iter()
                .map(|cell| csv_escape(cell))
                .collect::<Vec<_>>()
                .join(","),
        );
    }

    lines.join("\n")
}

fn csv_escape(value: &str) -> String {
    let safe = neutralize_formula(value);
    if safe.contains(',') || safe.contains('"') || safe.contains('\n') || safe.contains('\r') {
        format!("\"{}\"", safe.replace('"', "\"\""))
    } else {
        safe
    }
}

// Spreadsheets treat leading = + - @ as formula starts.
fn neutralize_formula(value: &str) -> String {
    let trimmed = value.trim_start();
    let is_formula = !trimmed.starts_with('\'')
        && matches!(trimmed.chars().next(), Some('=') | Some('+') | Some('-') | Some('@'));
    if is_formula {
        format!("'{value}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{csv_escape, neutralize_formula};

    #[test]
    fn escape_quotes_fields_with_separators() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn formula_prefixes_are_neutralized() {
        assert_eq!(neutralize_formula("=SUM(A1)"), "'=SUM(A1)");
        assert_eq!(neutralize_formula("@cmd"), "'@cmd");
        assert_eq!(neutralize_formula("'=quoted"), "'=quoted");
        assert_eq!(neutralize_formula("safe"), "safe");
    }
}
