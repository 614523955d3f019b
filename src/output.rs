use crate::error::Result;
use crate::types::{AggregateMetrics, KpiRow, PeriodSummary};
use crate::util::{format_int, format_number};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Headline KPIs as display rows, in report order.
pub fn kpi_rows(metrics: &AggregateMetrics, summary: &PeriodSummary) -> Vec<KpiRow> {
    let row = |metric: &str, value: String| KpiRow {
        metric: metric.to_string(),
        value,
    };
    let day = |d: &Option<crate::types::DaySnapshot>| match d {
        Some(s) => format!("{} ({} conversions)", s.date, format_int(s.conversions)),
        None => "n/a".to_string(),
    };
    let period = match (summary.period_start, summary.period_end) {
        (Some(start), Some(end)) => format!("{start} to {end}"),
        _ => "n/a".to_string(),
    };

    vec![
        row("Period", period),
        row("Total Spend", format_number(metrics.totals.spend, 2)),
        row("Impressions", format_int(metrics.totals.impressions)),
        row("Clicks", format_int(metrics.totals.clicks)),
        row("Conversions", format_int(metrics.totals.conversions)),
        row("CTR (%)", format_number(metrics.rates.ctr, 2)),
        row("Conversion Rate (%)", format_number(metrics.rates.conversion_rate, 2)),
        row("Cost Per Click", format_number(metrics.rates.cost_per_click, 2)),
        row("Cost Per Acquisition", format_number(metrics.rates.cost_per_acquisition, 2)),
        row("Best Day", day(&metrics.best_day)),
        row("Worst Day", day(&metrics.worst_day)),
        row("ROI (conv. per 100 spend)", format_number(summary.roi, 2)),
        row("Data Points", format_int(metrics.data_points as u64)),
    ]
}

/// Render the first `max_rows` rows as a markdown table.
pub fn render_table_rows<T>(rows: &[T], max_rows: usize) -> Option<String>
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return None;
    }
    Some(Table::new(slice).with(Style::markdown()).to_string())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    match render_table_rows(rows, max_rows) {
        Some(table) => println!("{}\n", table),
        None => println!("(no rows)\n"),
    }
}
