// Interactive CLI around the report pipeline.
//
// - Option [1] reads the configured CSV into memory.
// - Option [2] runs the pipeline on it, writes the JSON report and the daily
//   breakdown CSV, and prints previews.
// - After a report the user can go back to the menu or exit.
use campaign_report::config::AppConfig;
use campaign_report::metrics::{daily_breakdown, daily_export};
use campaign_report::narrative::{Narrator, OpenAiNarrator};
use campaign_report::output;
use campaign_report::report::build_report;
use campaign_report::types::Envelope;
use campaign_report::util;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

// The loaded file stays in memory so reports can be regenerated without
// re-reading it.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { input: None }));

struct AppState {
    input: Option<Vec<u8>>,
}

fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Returns `true` if the user chose `Y`, `false` for `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Report Selection (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn handle_load(config: &AppConfig) {
    let path = &config.csv_path;
    match std::fs::read(path) {
        Ok(bytes) => {
            let lines = bytes.iter().filter(|b| **b == b'\n').count();
            println!(
                "Loaded {} ({} bytes, ~{} data rows)\n",
                path.display(),
                util::format_int(bytes.len() as u64),
                util::format_int(lines.saturating_sub(1) as u64)
            );
            info!(path = %path.display(), bytes = bytes.len(), "input loaded");
            let mut state = APP_STATE.lock().unwrap_or_else(|e| e.into_inner());
            state.input = Some(bytes);
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to load input");
            eprintln!("Failed to load file {}: {}\n", path.display(), e);
        }
    }
}

fn handle_generate_report(config: &AppConfig, narrator: Option<&dyn Narrator>) {
    let input = {
        let state = APP_STATE.lock().unwrap_or_else(|e| e.into_inner());
        state.input.clone()
    };
    let Some(input) = input else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };

    println!("Generating report...\n");
    let report = build_report(&input, narrator);

    let json_path = config.output_dir.join("campaign_report.json");
    if let Err(e) = output::write_json(&json_path, &report) {
        eprintln!("Write error: {}", e);
    }

    match &report.envelope {
        Envelope::Success { data, summary, .. } => {
            println!("Campaign Performance Summary\n");
            output::preview_table_rows(&output::kpi_rows(data, summary), usize::MAX);

            let csv_path = config.output_dir.join("daily_breakdown.csv");
            if let Err(e) = output::write_csv(&csv_path, &daily_export(&report.records)) {
                eprintln!("Write error: {}", e);
            }
            println!("Daily Breakdown\n");
            output::preview_table_rows(&daily_breakdown(&report.records), config.preview_rows);
            println!("(Full table exported to {})\n", csv_path.display());

            if let Some(narrative) = &report.narrative {
                println!("Executive Summary:\n{}\n", narrative.executive_summary);
                println!("Key Insights:");
                for insight in &narrative.key_insights {
                    println!("- {}", insight);
                }
                println!("\nRecommendations:");
                for rec in &narrative.recommendations {
                    println!("- {}", rec);
                }
                println!();
            }
        }
        Envelope::Rejected {
            validation_errors, ..
        } => {
            println!("The file was rejected:");
            for e in validation_errors {
                println!("- {}", e);
            }
            println!();
        }
        Envelope::Failed { message, .. } => {
            println!("Report generation failed: {}\n", message);
        }
    }
    println!("Report saved to {}\n", json_path.display());
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            eprintln!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };

    let narrator = match config.narrative.clone().map(OpenAiNarrator::new).transpose() {
        Ok(n) => n,
        Err(e) => {
            warn!(error = %e, "narrative client unavailable, reports will use the fallback");
            None
        }
    };

    loop {
        println!("Campaign Report Generator:");
        println!("[1] Load the file");
        println!("[2] Generate Report\n");
        match read_choice().as_str() {
            "1" => handle_load(&config),
            "2" => {
                println!();
                handle_generate_report(&config, narrator.as_ref().map(|n| n as &dyn Narrator));
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1 or 2.\n"),
        }
    }
}
