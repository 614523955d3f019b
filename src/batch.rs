use crate::metrics::rates_from_totals;
use crate::pipeline::run_file;
use crate::types::{Envelope, PeriodSummary, Rates, Status, Totals};
use crate::util::round2;
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FileResult {
    Success {
        file: String,
        status: Status,
        summary: PeriodSummary,
    },
    Error {
        file: String,
        status: Status,
        errors: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub files_processed: usize,
    pub files_failed: usize,
    pub totals: Totals,
    pub rates: Rates,
    pub file_results: Vec<FileResult>,
}

/// Run every file through the pipeline independently and combine the
/// successful ones. Rates are recomputed from the combined totals.
pub fn process_files<P: AsRef<Path>>(paths: &[P]) -> BatchSummary {
    let mut totals = Totals::default();
    let mut files_processed = 0usize;
    let mut files_failed = 0usize;
    let mut file_results = Vec::with_capacity(paths.len());

    for path in paths {
        let file = path.as_ref().display().to_string();
        match run_file(path) {
            Envelope::Success { data, summary, .. } => {
                files_processed += 1;
                totals.spend += data.totals.spend;
                totals.clicks = totals.clicks.saturating_add(data.totals.clicks);
                totals.impressions = totals.impressions.saturating_add(data.totals.impressions);
                totals.conversions = totals.conversions.saturating_add(data.totals.conversions);
                file_results.push(FileResult::Success {
                    file,
                    status: Status::Success,
                    summary,
                });
            }
            Envelope::Rejected {
                validation_errors, ..
            } => {
                files_failed += 1;
                file_results.push(FileResult::Error {
                    file,
                    status: Status::Error,
                    errors: validation_errors,
                });
            }
            Envelope::Failed { message, .. } => {
                files_failed += 1;
                file_results.push(FileResult::Error {
                    file,
                    status: Status::Error,
                    errors: vec![message],
                });
            }
        }
    }

    totals.spend = round2(totals.spend);
    let rates = rates_from_totals(&totals, totals.spend);
    info!(files_processed, files_failed, "batch finished");

    BatchSummary {
        files_processed,
        files_failed,
        totals,
        rates,
        file_results,
    }
}
