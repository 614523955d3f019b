use crate::error::ValidationError;
use crate::loader::load_table;
use crate::types::{RawTable, REQUIRED_COLUMNS};
use crate::util::parse_date_safe;

/// How many leading rows the quick precheck samples for date validity.
const DATE_SAMPLE_ROWS: usize = 5;

/// Check a decoded table against the required-column contract.
///
/// Returns every applicable failure. Missing columns are reported first; the
/// empty-dataset check only runs once all columns are present.
pub fn validate(table: &RawTable) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let missing = missing_columns(table);
    if !missing.is_empty() {
        errors.push(ValidationError::MissingColumns(missing));
        return errors;
    }
    if table.rows.is_empty() {
        errors.push(ValidationError::EmptyDataset);
    }
    errors
}

/// Required columns absent from the table, in contract order.
pub fn missing_columns(table: &RawTable) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|c| !table.has_column(c))
        .map(|c| c.to_string())
        .collect()
}

/// Cheap structural look at a file without cleaning or computing anything.
///
/// Unlike [`validate`], every check runs, and the first few `date` cells are
/// sampled so an obviously wrong date layout surfaces before a full run.
pub fn precheck(bytes: &[u8]) -> (bool, Vec<String>) {
    let table = match load_table(bytes) {
        Ok(t) => t,
        Err(e) => return (false, vec![ValidationError::UnreadableInput(e.to_string()).to_string()]),
    };

    let mut issues = Vec::new();
    let missing = missing_columns(&table);
    if !missing.is_empty() {
        issues.push(format!("Missing columns: {}", missing.join(", ")));
    }
    if table.rows.is_empty() {
        issues.push("File is empty".to_string());
    }
    if table.has_column("date")
        && table
            .rows
            .iter()
            .take(DATE_SAMPLE_ROWS)
            .any(|r| parse_date_safe(r.date.as_deref()).is_none())
    {
        issues.push("Invalid date format detected".to_string());
    }
    (issues.is_empty(), issues)
}
