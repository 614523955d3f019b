use crate::error::LoadError;
use crate::types::{RawRecord, RawTable};
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

/// Decode a delimited byte stream into a [`RawTable`].
///
/// Only structural problems fail here: undecodable bytes, a missing header
/// row, or a row wider than its header. Short rows are kept and their absent
/// cells read as missing. Column presence is the validator's business.
pub fn load_table(bytes: &[u8]) -> Result<RawTable, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let headers = normalize_headers(rdr.headers()?);
    if headers.is_empty() {
        return Err(LoadError::NoHeader);
    }
    let columns: Vec<String> = headers.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while rdr.read_record(&mut record)? {
        if record.len() > headers.len() {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(LoadError::RowTooWide {
                line,
                found: record.len(),
                expected: headers.len(),
            });
        }
        while record.len() < headers.len() {
            record.push_field("");
        }
        let row: RawRecord = record.deserialize(Some(&headers))?;
        rows.push(row);
    }

    debug!(columns = columns.len(), rows = rows.len(), "decoded table");
    Ok(RawTable { columns, rows })
}

// An all-blank header line counts as no header at all; a leading BOM is not
// part of the first column name.
fn normalize_headers(raw: &StringRecord) -> StringRecord {
    let names: Vec<&str> = raw
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
            h.trim()
        })
        .collect();
    if names.iter().all(|h| h.is_empty()) {
        return StringRecord::new();
    }
    StringRecord::from(names)
}
