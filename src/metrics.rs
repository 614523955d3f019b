use crate::error::{PipelineError, Result};
use crate::types::{
    AggregateMetrics, CleanRecord, DailyAverages, DailyExport, DailyRow, DaySnapshot, Rates,
    Totals,
};
use crate::util::{average, format_number, round2, safe_ratio};

/// Aggregate clean records into totals, ratio-of-totals rates, best/worst
/// day and per-row averages.
///
/// An empty slice is not an error: everything comes back zeroed and both
/// day snapshots are `None`.
pub fn calculate(records: &[CleanRecord]) -> Result<AggregateMetrics> {
    let totals = sum_totals(records)?;
    let rates = rates_from_totals(&totals, raw_spend(records));
    let (best_day, worst_day) = best_and_worst(records);

    Ok(AggregateMetrics {
        totals,
        rates,
        best_day,
        worst_day,
        data_points: records.len(),
        averages: daily_averages(records),
    })
}

/// Ratios over aggregated totals. `spend` is passed separately so callers
/// can use the unrounded sum.
pub fn rates_from_totals(totals: &Totals, spend: f64) -> Rates {
    let clicks = totals.clicks as f64;
    let impressions = totals.impressions as f64;
    let conversions = totals.conversions as f64;
    Rates {
        ctr: round2(safe_ratio(clicks, impressions) * 100.0),
        conversion_rate: round2(safe_ratio(conversions, clicks) * 100.0),
        cost_per_click: round2(safe_ratio(spend, clicks)),
        cost_per_acquisition: round2(safe_ratio(spend, conversions)),
    }
}

fn raw_spend(records: &[CleanRecord]) -> f64 {
    records.iter().map(|r| r.spend).sum()
}

fn sum_totals(records: &[CleanRecord]) -> Result<Totals> {
    let mut spend = 0.0;
    let mut clicks = 0.0;
    let mut impressions = 0.0;
    let mut conversions = 0.0;
    for r in records {
        spend += r.spend;
        clicks += r.clicks;
        impressions += r.impressions;
        conversions += r.conversions;
    }
    if !spend.is_finite() {
        return Err(PipelineError::NonFiniteTotal { field: "spend" });
    }
    Ok(Totals {
        spend: round2(spend),
        clicks: to_count(clicks, "clicks")?,
        impressions: to_count(impressions, "impressions")?,
        conversions: to_count(conversions, "conversions")?,
    })
}

// Integer totals are truncated, never rounded.
fn to_count(v: f64, field: &'static str) -> Result<u64> {
    if !v.is_finite() {
        return Err(PipelineError::NonFiniteTotal { field });
    }
    if v >= u64::MAX as f64 {
        return Err(PipelineError::TotalOverflow { field });
    }
    Ok(v.trunc() as u64)
}

/// Best = most conversions, earliest date on ties.
/// Worst = fewest conversions, latest date on ties.
fn best_and_worst(records: &[CleanRecord]) -> (Option<DaySnapshot>, Option<DaySnapshot>) {
    let mut by_date: Vec<&CleanRecord> = records.iter().collect();
    // stable: equal dates keep source order
    by_date.sort_by_key(|r| r.date);

    let mut best: Option<&CleanRecord> = None;
    let mut worst: Option<&CleanRecord> = None;
    for r in by_date {
        if best.map_or(true, |b| r.conversions > b.conversions) {
            best = Some(r);
        }
        if worst.map_or(true, |w| r.conversions <= w.conversions) {
            worst = Some(r);
        }
    }
    (best.map(snapshot), worst.map(snapshot))
}

fn snapshot(r: &CleanRecord) -> DaySnapshot {
    DaySnapshot {
        date: r.date,
        conversions: r.conversions.trunc() as u64,
        spend: round2(r.spend),
    }
}

fn daily_averages(records: &[CleanRecord]) -> DailyAverages {
    let spends: Vec<f64> = records.iter().map(|r| r.spend).collect();
    let conversions: Vec<f64> = records.iter().map(|r| r.conversions).collect();
    let ctrs: Vec<f64> = records
        .iter()
        .filter_map(|r| row_ratio(r.clicks * 100.0, r.impressions))
        .collect();
    let cpcs: Vec<f64> = records
        .iter()
        .filter_map(|r| row_ratio(r.spend, r.clicks))
        .collect();
    DailyAverages {
        avg_daily_spend: round2(average(&spends)),
        avg_daily_conversions: round2(average(&conversions)),
        avg_ctr: round2(average(&ctrs)),
        avg_cpc: round2(average(&cpcs)),
    }
}

// Per-row ratio, or `None` when the denominator is not positive or the
// result overflows (e.g. subnormal impressions).
fn row_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator > 0.0 {
        Some(numerator / denominator).filter(|v| v.is_finite())
    } else {
        None
    }
}

/// One numeric row per clean record, in date order.
pub fn daily_export(records: &[CleanRecord]) -> Vec<DailyExport> {
    let mut by_date: Vec<&CleanRecord> = records.iter().collect();
    by_date.sort_by_key(|r| r.date);
    by_date
        .into_iter()
        .map(|r| DailyExport {
            date: r.date,
            spend: round2(r.spend),
            clicks: r.clicks,
            impressions: r.impressions,
            conversions: r.conversions,
            ctr: round2(row_ratio(r.clicks * 100.0, r.impressions).unwrap_or(0.0)),
            cpc: round2(row_ratio(r.spend, r.clicks).unwrap_or(0.0)),
        })
        .collect()
}

/// [`daily_export`] rendered for display, with thousands separators.
pub fn daily_breakdown(records: &[CleanRecord]) -> Vec<DailyRow> {
    daily_export(records)
        .iter()
        .map(|d| DailyRow {
            date: d.date.format("%Y-%m-%d").to_string(),
            spend: format_number(d.spend, 2),
            clicks: format_number(d.clicks, 0),
            impressions: format_number(d.impressions, 0),
            conversions: format_number(d.conversions, 0),
            ctr: format_number(d.ctr, 2),
            cpc: format_number(d.cpc, 2),
        })
        .collect()
}
