use campaign_report::batch::{process_files, FileResult};
use campaign_report::metrics::{daily_breakdown, daily_export};
use campaign_report::types::DailyExport;
use campaign_report::output::{write_csv, write_json};
use campaign_report::{execute, run, run_file, Envelope, Status};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const HEADER: &str = "date,spend,clicks,impressions,conversions\n";

fn csv(rows: &str) -> Vec<u8> {
    format!("{HEADER}{rows}").into_bytes()
}

fn to_json(env: &Envelope) -> Value {
    serde_json::to_value(env).expect("envelope serializes")
}

fn write_fixture(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write fixture");
    path
}

#[test]
fn missing_columns_are_named_regardless_of_row_count() {
    for rows in ["", "2024-01-01,1\n", "2024-01-01,1\n2024-01-02,2\n2024-01-03,3\n"] {
        let input = format!("date,spend\n{rows}");
        let v = to_json(&run(input.as_bytes()));
        assert_eq!(v["status"], "error");
        assert_eq!(
            v["validation_errors"],
            json!(["Missing required columns: clicks, impressions, conversions"])
        );
    }
}

#[test]
fn bad_numeric_cells_zero_the_field_and_keep_the_row() {
    let v = to_json(&run(&csv(
        "2024-01-01,999999.99,invalid,text,\n\
         2024-01-02,10,5,50,1\n",
    )));
    assert_eq!(v["status"], "success");
    assert_eq!(v["data"]["data_points"], 2);
    assert_eq!(
        v["data"]["totals"],
        json!({"spend": 1000009.99, "clicks": 5, "impressions": 50, "conversions": 1})
    );
}

#[test]
fn rows_with_bad_dates_vanish_from_every_output() {
    let with_bad = to_json(&run(&csv(
        "2024-01-01,10,5,50,1\n\
         garbage,5000,9000,90000,900\n\
         2024-01-02,20,10,100,2\n",
    )));
    let without = to_json(&run(&csv("2024-01-01,10,5,50,1\n2024-01-02,20,10,100,2\n")));
    assert_eq!(with_bad, without);
    assert_eq!(with_bad["data"]["best_day"]["date"], "2024-01-02");
}

#[test]
fn zero_denominators_never_fail() {
    let v = to_json(&run(&csv("2024-01-01,25,0,0,0\n")));
    assert_eq!(
        v["data"]["rates"],
        json!({"ctr": 0.0, "conversion_rate": 0.0, "cost_per_click": 0.0, "cost_per_acquisition": 0.0})
    );
}

#[test]
fn zero_impression_row_does_not_poison_aggregate_ctr() {
    let v = to_json(&run(&csv(
        "2024-01-01,100.50,0,10000,50\n\
         2024-01-02,200.75,2000,0,100\n",
    )));
    assert_eq!(v["status"], "success");
    assert_eq!(v["data"]["rates"]["ctr"], 20.0);
    assert_eq!(v["data"]["rates"]["conversion_rate"], 7.5);
}

#[test]
fn tie_breaks_are_asymmetric() {
    let v = to_json(&run(&csv(
        "2024-01-04,1,1,1,7\n\
         2024-01-02,1,1,1,7\n\
         2024-01-01,1,1,1,2\n\
         2024-01-03,1,1,1,2\n",
    )));
    assert_eq!(v["data"]["best_day"]["date"], "2024-01-02");
    assert_eq!(v["data"]["worst_day"]["date"], "2024-01-03");
}

#[test]
fn empty_after_cleaning_is_a_zeroed_success() {
    let out = execute(&csv("n/a,1,1,1,1\n,2,2,2,2\n"));
    assert_eq!(out.envelope.status(), Status::Success);
    let v = to_json(&out.envelope);
    assert_eq!(v["data"]["data_points"], 0);
    assert_eq!(v["data"]["best_day"], Value::Null);
    assert_eq!(v["data"]["totals"]["conversions"], 0);
    assert!(daily_breakdown(&out.records).is_empty());
}

#[test]
fn identical_input_gives_identical_output() {
    let input = csv("2024-01-03,3.333,7,70,1\n2024-01-01,-4,x,10,2\n");
    let first = serde_json::to_vec(&run(&input)).unwrap();
    for _ in 0..3 {
        assert_eq!(serde_json::to_vec(&run(&input)).unwrap(), first);
    }
}

#[test]
fn run_file_reports_unreadable_paths() {
    let dir = TempDir::new().unwrap();
    let env = run_file(dir.path().join("missing.csv"));
    match env {
        Envelope::Rejected {
            validation_errors, ..
        } => assert!(validation_errors[0].starts_with("File read error:")),
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn batch_combines_successful_files() {
    let dir = TempDir::new().unwrap();
    let a = write_fixture(&dir, "a.csv", "date,spend,clicks,impressions,conversions\n2024-01-01,100,1000,10000,50\n");
    let b = write_fixture(&dir, "b.csv", "date,spend,clicks,impressions,conversions\n2024-02-01,50,1000,10000,25\n");
    let bad = write_fixture(&dir, "bad.csv", "date,spend\n2024-01-01,1\n");
    let gone = dir.path().join("gone.csv");

    let summary = process_files(&[a, b, bad, gone]);
    assert_eq!(summary.files_processed, 2);
    assert_eq!(summary.files_failed, 2);
    assert_eq!(summary.totals.spend, 150.0);
    assert_eq!(summary.totals.clicks, 2000);
    assert_eq!(summary.totals.conversions, 75);
    assert_eq!(summary.rates.ctr, 10.0);
    assert_eq!(summary.rates.conversion_rate, 3.75);
    assert_eq!(summary.rates.cost_per_acquisition, 2.0);

    match &summary.file_results[2] {
        FileResult::Error { errors, status, .. } => {
            assert_eq!(*status, Status::Error);
            assert_eq!(errors[0], "Missing required columns: clicks, impressions, conversions");
        }
        other => panic!("expected error entry, got {other:?}"),
    }
    let v = serde_json::to_value(&summary).unwrap();
    assert_eq!(v["file_results"][0]["status"], "success");
    assert_eq!(v["file_results"][0]["summary"]["period_start"], "2024-01-01");
}

#[test]
fn report_files_are_written() {
    let dir = TempDir::new().unwrap();
    let out = execute(&csv("2024-01-02,1500,10,100,1\n2024-01-01,2.5,5,50,2\n"));

    let json_path = dir.path().join("report.json");
    write_json(&json_path, &out.envelope).unwrap();
    let written: Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(written, to_json(&out.envelope));

    let csv_path = dir.path().join("daily.csv");
    write_csv(&csv_path, &daily_export(&out.records)).unwrap();
    let text = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(
        text.lines().next(),
        Some("Date,Spend,Clicks,Impressions,Conversions,CTR,CPC")
    );
    assert!(!text.contains('"'), "numeric export must not quote cells: {text}");

    let mut rdr = csv::Reader::from_path(&csv_path).unwrap();
    let rows: Vec<DailyExport> = rdr.deserialize().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows, daily_export(&out.records));
    assert_eq!(rows[0].date.to_string(), "2024-01-01");
    assert_eq!(rows[0].ctr, 10.0);
    assert_eq!(rows[1].spend, 1500.0);
    assert_eq!(rows[1].cpc, 150.0);

    // the formatted strings are for the terminal preview only
    assert_eq!(daily_breakdown(&out.records)[1].spend, "1,500.00");
}
