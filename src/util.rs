// Parsing and small numeric helpers.
//
// Everything forgiving about messy spreadsheet exports lives here so the
// cleaner and calculator can work on typed values only.
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Date-only layouts tried in order. Year-first layouts come before the
/// ambiguous US/European ones, and four-digit years before two-digit ones.
const DATE_FORMATS: [&str; 13] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%Y%m%d",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %B %Y",
    "%m/%d/%y",
    "%y-%m-%d",
    "%d.%m.%y",
];

// chrono's `%Y` takes one to four digits, so `1/2/24` would otherwise match
// `%Y/%m/%d` as year 1. Anything before this is treated as a failed match.
const MIN_YEAR: i32 = 1000;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];

/// Parse a spreadsheet cell into a non-NaN, finite `f64`.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters (`NaN`, `inf`, `1e3`, `n/a`).
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Permissive calendar-date parser. Datetime cells are truncated to their date.
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let plausible = |d: &NaiveDate| d.year() >= MIN_YEAR;
    for fmt in DATE_FORMATS {
        if let Some(d) = NaiveDate::parse_from_str(s, fmt).ok().filter(plausible) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Some(d) = NaiveDateTime::parse_from_str(s, fmt)
            .ok()
            .map(|dt| dt.date())
            .filter(plausible)
        {
            return Some(d);
        }
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.date_naive())
        .filter(plausible)
}

/// Round to two decimals, halves away from zero.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// `numerator / denominator`, or `0.0` when the denominator is not positive.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

pub fn average(v: &[f64]) -> f64 {
    // Returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Fixed-decimal rendering with `en` thousands separators, e.g. `1,234,567.89`.
pub fn format_number(n: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let mut res = match int_part.parse::<u128>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if n.is_sign_negative() && n != 0.0 {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
