use thiserror::Error;

/// Reasons the raw byte stream could not be turned into a table at all.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("input contains no header row")]
    NoHeader,

    #[error("row {line} has {found} fields but the header declares {expected}")]
    RowTooWide {
        line: u64,
        found: usize,
        expected: usize,
    },
}

/// A single reason a table was rejected before cleaning.
///
/// The `Display` text is what ends up in the `validation_errors` list of the
/// error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("File read error: {0}")]
    UnreadableInput(String),
}

/// Unexpected faults after validation has passed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("total {field} is not a finite number")]
    NonFiniteTotal { field: &'static str },

    #[error("total {field} exceeds the supported integer range")]
    TotalOverflow { field: &'static str },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("narrative response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("narrative response has no choices")]
    NoChoices,

    #[error("narrative response is malformed: {0}")]
    Shape(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}
