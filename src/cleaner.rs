use crate::types::{CleanRecord, RawRecord};
use crate::util::{parse_date_safe, parse_f64_safe};
use tracing::debug;

/// Outcome of a cleaning pass: the kept records plus counters for logging.
#[derive(Debug, Clone, Default)]
pub struct CleanReport {
    pub records: Vec<CleanRecord>,
    pub dropped_invalid_date: usize,
    pub coerced_numeric: usize,
    pub clamped_negative: usize,
}

/// Turn validated raw rows into clean records.
///
/// Rows whose date does not parse are dropped. Unparseable metric cells
/// become zero and negative ones are clamped to zero; the row survives.
/// Source order is preserved.
pub fn clean(rows: &[RawRecord]) -> CleanReport {
    let mut report = CleanReport {
        records: Vec::with_capacity(rows.len()),
        ..CleanReport::default()
    };

    for row in rows {
        let Some(date) = parse_date_safe(row.date.as_deref()) else {
            report.dropped_invalid_date += 1;
            continue;
        };

        let mut metric = |cell: Option<&str>| -> f64 {
            match parse_f64_safe(cell) {
                Some(v) if v < 0.0 => {
                    report.clamped_negative += 1;
                    0.0
                }
                Some(v) => v,
                None => {
                    report.coerced_numeric += 1;
                    0.0
                }
            }
        };

        let spend = metric(row.spend.as_deref());
        let clicks = metric(row.clicks.as_deref());
        let impressions = metric(row.impressions.as_deref());
        let conversions = metric(row.conversions.as_deref());

        report.records.push(CleanRecord {
            date,
            spend,
            clicks,
            impressions,
            conversions,
        });
    }

    debug!(
        kept = report.records.len(),
        dropped_invalid_date = report.dropped_invalid_date,
        coerced_numeric = report.coerced_numeric,
        clamped_negative = report.clamped_negative,
        "cleaned rows"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw(date: &str, spend: &str, clicks: &str, impressions: &str, conversions: &str) -> RawRecord {
        let cell = |s: &str| if s.is_empty() { None } else { Some(s.to_string()) };
        RawRecord {
            date: cell(date),
            spend: cell(spend),
            clicks: cell(clicks),
            impressions: cell(impressions),
            conversions: cell(conversions),
        }
    }

    #[test]
    fn unparseable_metrics_become_zero_and_row_is_kept() {
        let out = clean(&[raw("2024-01-01", "999999.99", "invalid", "text", "")]);
        assert_eq!(out.records.len(), 1);
        let r = &out.records[0];
        assert_eq!(r.spend, 999999.99);
        assert_eq!(r.clicks, 0.0);
        assert_eq!(r.impressions, 0.0);
        assert_eq!(r.conversions, 0.0);
        assert_eq!(out.coerced_numeric, 3);
    }

    #[test]
    fn rows_with_bad_dates_are_dropped() {
        let out = clean(&[
            raw("", "1", "1", "1", "1"),
            raw("2024-01-05", "2", "2", "2", "2"),
            raw("someday", "3", "3", "3", "3"),
        ]);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(out.dropped_invalid_date, 2);
    }

    #[test]
    fn negatives_are_clamped() {
        let out = clean(&[raw("2024-01-01", "-10.5", "-3", "100", "-1")]);
        let r = &out.records[0];
        assert_eq!((r.spend, r.clicks, r.impressions, r.conversions), (0.0, 0.0, 100.0, 0.0));
        assert_eq!(out.clamped_negative, 3);
    }

    #[test]
    fn source_order_is_preserved() {
        let out = clean(&[
            raw("2024-03-01", "1", "0", "0", "0"),
            raw("bad", "1", "0", "0", "0"),
            raw("2024-01-01", "2", "0", "0", "0"),
        ]);
        let spends: Vec<f64> = out.records.iter().map(|r| r.spend).collect();
        assert_eq!(spends, vec![1.0, 2.0]);
    }

    #[test]
    fn all_invalid_dates_yield_empty_sequence() {
        let out = clean(&[raw("x", "1", "1", "1", "1"), raw("y", "1", "1", "1", "1")]);
        assert!(out.records.is_empty());
    }
}
