use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Columns every campaign export must carry, in the order they are reported.
pub const REQUIRED_COLUMNS: [&str; 5] = ["date", "spend", "clicks", "impressions", "conversions"];

/// One untrusted CSV row. Every cell is optional text; nothing is assumed
/// about its content until the cleaner has looked at it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub spend: Option<String>,
    #[serde(default)]
    pub clicks: Option<String>,
    #[serde(default)]
    pub impressions: Option<String>,
    #[serde(default)]
    pub conversions: Option<String>,
}

/// A decoded table: the header as it appeared in the file plus its rows.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<RawRecord>,
}

impl RawTable {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    pub date: NaiveDate,
    pub spend: f64,
    pub clicks: f64,
    pub impressions: f64,
    pub conversions: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub spend: f64,
    pub clicks: u64,
    pub impressions: u64,
    pub conversions: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rates {
    pub ctr: f64,
    pub conversion_rate: f64,
    pub cost_per_click: f64,
    pub cost_per_acquisition: f64,
}

/// Snapshot of the row picked as best or worst day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySnapshot {
    pub date: NaiveDate,
    pub conversions: u64,
    pub spend: f64,
}

/// Per-row averages, as opposed to the ratio-of-totals in [`Rates`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyAverages {
    pub avg_daily_spend: f64,
    pub avg_daily_conversions: f64,
    pub avg_ctr: f64,
    pub avg_cpc: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub totals: Totals,
    pub rates: Rates,
    pub best_day: Option<DaySnapshot>,
    pub worst_day: Option<DaySnapshot>,
    pub data_points: usize,
    pub averages: DailyAverages,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub roi: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// The top-level result handed back to whatever hosts the pipeline.
///
/// Serialized untagged so each variant renders as a flat object whose
/// `status` field tells the caller which shape it got.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    Success {
        status: Status,
        data: AggregateMetrics,
        summary: PeriodSummary,
    },
    Rejected {
        status: Status,
        validation_errors: Vec<String>,
    },
    Failed {
        status: Status,
        message: String,
    },
}

impl Envelope {
    pub fn success(data: AggregateMetrics, summary: PeriodSummary) -> Self {
        Envelope::Success {
            status: Status::Success,
            data,
            summary,
        }
    }

    pub fn rejected(validation_errors: Vec<String>) -> Self {
        Envelope::Rejected {
            status: Status::Error,
            validation_errors,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Envelope::Failed {
            status: Status::Error,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Envelope::Success { status, .. }
            | Envelope::Rejected { status, .. }
            | Envelope::Failed { status, .. } => *status,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == Status::Success
    }

    pub fn metrics(&self) -> Option<&AggregateMetrics> {
        match self {
            Envelope::Success { data, .. } => Some(data),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub executive_summary: String,
    pub key_insights: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct KpiRow {
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
}

/// One day of the exported breakdown, kept numeric so the CSV stays
/// machine-readable. Ratios are percent/currency values rounded to 2dp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyExport {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Spend")]
    pub spend: f64,
    #[serde(rename = "Clicks")]
    pub clicks: f64,
    #[serde(rename = "Impressions")]
    pub impressions: f64,
    #[serde(rename = "Conversions")]
    pub conversions: f64,
    #[serde(rename = "CTR")]
    pub ctr: f64,
    #[serde(rename = "CPC")]
    pub cpc: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DailyRow {
    #[serde(rename = "Date")]
    #[tabled(rename = "Date")]
    pub date: String,
    #[serde(rename = "Spend")]
    #[tabled(rename = "Spend")]
    pub spend: String,
    #[serde(rename = "Clicks")]
    #[tabled(rename = "Clicks")]
    pub clicks: String,
    #[serde(rename = "Impressions")]
    #[tabled(rename = "Impressions")]
    pub impressions: String,
    #[serde(rename = "Conversions")]
    #[tabled(rename = "Conversions")]
    pub conversions: String,
    #[serde(rename = "CTR")]
    #[tabled(rename = "CTR")]
    pub ctr: String,
    #[serde(rename = "CPC")]
    #[tabled(rename = "CPC")]
    pub cpc: String,
}
