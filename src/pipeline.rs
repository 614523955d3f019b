// Orchestrates one run: load → validate → clean → compute → envelope.
//
// Validation failures and internal faults are both turned into an error
// envelope here and nowhere else; callers always get a well-formed result.
use crate::cleaner::clean;
use crate::error::{Result, ValidationError};
use crate::loader::load_table;
use crate::metrics::calculate;
use crate::types::{AggregateMetrics, CleanRecord, Envelope, PeriodSummary, RawTable, Totals};
use crate::util::round2;
use crate::validator::validate;
use std::path::Path;
use tracing::{error, info, info_span, warn};

/// Everything a run produced. `records` is empty unless the run succeeded.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub envelope: Envelope,
    pub records: Vec<CleanRecord>,
}

impl PipelineOutput {
    fn without_records(envelope: Envelope) -> Self {
        Self {
            envelope,
            records: Vec::new(),
        }
    }
}

/// Run the pipeline over a CSV byte stream and return only the envelope.
pub fn run(bytes: &[u8]) -> Envelope {
    execute(bytes).envelope
}

/// Read a file and run the pipeline on its contents. An unreadable file is
/// reported the same way as undecodable bytes.
pub fn run_file(path: impl AsRef<Path>) -> Envelope {
    let path = path.as_ref();
    match std::fs::read(path) {
        Ok(bytes) => run(&bytes),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read input file");
            Envelope::rejected(vec![ValidationError::UnreadableInput(e.to_string()).to_string()])
        }
    }
}

/// Run the pipeline and keep the clean records alongside the envelope.
pub fn execute(bytes: &[u8]) -> PipelineOutput {
    let span = info_span!("pipeline", bytes = bytes.len());
    let _guard = span.enter();

    let table = match load_table(bytes) {
        Ok(t) => t,
        Err(e) => {
            warn!(error = %e, "input rejected as unreadable");
            return PipelineOutput::without_records(Envelope::rejected(vec![
                ValidationError::UnreadableInput(e.to_string()).to_string(),
            ]));
        }
    };

    let errors = validate(&table);
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        warn!(errors = ?messages, "input failed validation");
        return PipelineOutput::without_records(Envelope::rejected(messages));
    }

    match compute(&table) {
        Ok((data, summary, records)) => {
            info!(
                data_points = data.data_points,
                dropped = table.rows.len() - records.len(),
                "pipeline completed"
            );
            PipelineOutput {
                envelope: Envelope::success(data, summary),
                records,
            }
        }
        Err(e) => {
            error!(error = %e, "pipeline aborted");
            PipelineOutput::without_records(Envelope::failed(format!("Processing failed: {e}")))
        }
    }
}

fn compute(table: &RawTable) -> Result<(AggregateMetrics, PeriodSummary, Vec<CleanRecord>)> {
    let cleaned = clean(&table.rows);
    let metrics = calculate(&cleaned.records)?;
    let summary = period_summary(&cleaned.records, &metrics.totals);
    Ok((metrics, summary, cleaned.records))
}

/// Reporting period and the conversions-per-spend ROI proxy.
///
/// `roi` is `conversions * 100 / max(spend, 1)`, and exactly `0` when there
/// was no spend at all. Spend is the unrounded sum over `records`, so a
/// fraction of a cent still counts as spend.
pub fn period_summary(records: &[CleanRecord], totals: &Totals) -> PeriodSummary {
    let period_start = records.iter().map(|r| r.date).min();
    let period_end = records.iter().map(|r| r.date).max();
    let spend: f64 = records.iter().map(|r| r.spend).sum();
    let roi = if spend > 0.0 {
        round2(totals.conversions as f64 * 100.0 / spend.max(1.0))
    } else {
        0.0
    };
    PeriodSummary {
        period_start,
        period_end,
        roi,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Status;
    use chrono::NaiveDate;
    use serde_json::json;

    const HEADER: &str = "date,spend,clicks,impressions,conversions\n";

    fn csv(rows: &str) -> Vec<u8> {
        format!("{HEADER}{rows}").into_bytes()
    }

    #[test]
    fn success_envelope_shape() {
        let env = run(&csv(
            "2024-01-01,100.50,1000,10000,50\n\
             2024-01-02,200.75,2000,20000,100\n\
             2024-01-03,150.25,1500,15000,75\n",
        ));
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["status"], "success");
        assert_eq!(
            v["data"]["totals"],
            json!({"spend": 451.5, "clicks": 4500, "impressions": 45000, "conversions": 225})
        );
        assert_eq!(v["data"]["rates"]["ctr"], 10.0);
        assert_eq!(v["data"]["rates"]["conversion_rate"], 5.0);
        assert_eq!(
            v["data"]["best_day"],
            json!({"date": "2024-01-02", "conversions": 100, "spend": 200.75})
        );
        assert_eq!(v["data"]["data_points"], 3);
        assert_eq!(
            v["summary"],
            json!({"period_start": "2024-01-01", "period_end": "2024-01-03", "roi": 49.83})
        );
    }

    #[test]
    fn validation_failure_skips_computation() {
        let env = run(b"date,spend\n2024-01-01,5\n");
        assert_eq!(env.status(), Status::Error);
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({
                "status": "error",
                "validation_errors": ["Missing required columns: clicks, impressions, conversions"]
            })
        );
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let env = run(HEADER.as_bytes());
        assert_eq!(env, Envelope::rejected(vec!["Empty dataset".to_string()]));
    }

    #[test]
    fn unreadable_bytes_are_rejected_before_column_checks() {
        let env = run(&[0xc3, 0x28, b',', b'x', b'\n']);
        match env {
            Envelope::Rejected {
                validation_errors, ..
            } => {
                assert_eq!(validation_errors.len(), 1);
                assert!(validation_errors[0].starts_with("File read error:"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn all_dates_invalid_is_an_empty_success() {
        let out = execute(&csv("nope,1,1,1,1\nnever,2,2,2,2\n"));
        let v = serde_json::to_value(&out.envelope).unwrap();
        assert_eq!(v["status"], "success");
        assert_eq!(
            v["data"]["totals"],
            json!({"spend": 0.0, "clicks": 0, "impressions": 0, "conversions": 0})
        );
        assert_eq!(v["data"]["best_day"], serde_json::Value::Null);
        assert_eq!(v["data"]["worst_day"], serde_json::Value::Null);
        assert_eq!(v["data"]["data_points"], 0);
        assert_eq!(v["summary"]["period_start"], serde_json::Value::Null);
        assert_eq!(v["summary"]["roi"], 0.0);
        assert!(out.records.is_empty());
    }

    #[test]
    fn internal_fault_becomes_message_envelope() {
        let big = "9".repeat(308);
        let env = run(&csv(&format!("2024-01-01,{big},1,1,1\n2024-01-02,{big},1,1,1\n")));
        match env {
            Envelope::Failed { status, message } => {
                assert_eq!(status, Status::Error);
                assert_eq!(message, "Processing failed: total spend is not a finite number");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn roi_uses_floor_of_one_for_small_spend() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let records = vec![CleanRecord {
            date: day,
            spend: 0.5,
            clicks: 0.0,
            impressions: 0.0,
            conversions: 3.0,
        }];
        let totals = Totals {
            spend: 0.5,
            clicks: 0,
            impressions: 0,
            conversions: 3,
        };
        let summary = period_summary(&records, &totals);
        assert_eq!(summary.roi, 300.0);
        assert_eq!(summary.period_start, Some(day));
        assert_eq!(summary.period_end, Some(day));

        let unspent = vec![CleanRecord {
            spend: 0.0,
            ..records[0].clone()
        }];
        let zero = Totals { spend: 0.0, ..totals };
        assert_eq!(period_summary(&unspent, &zero).roi, 0.0);
    }

    #[test]
    fn sub_cent_spend_still_counts_for_roi() {
        let v = serde_json::to_value(run(&csv("2024-01-01,0.004,10,100,5\n"))).unwrap();
        assert_eq!(v["data"]["totals"]["spend"], 0.0);
        assert_eq!(v["summary"]["roi"], 500.0);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let input = csv("2024-01-02,5,oops,100,2\n01/01/2024,-3,10,0,1\nbad,1,1,1,1\n");
        let a = serde_json::to_string(&run(&input)).unwrap();
        let b = serde_json::to_string(&run(&input)).unwrap();
        assert_eq!(a, b);
    }
}
