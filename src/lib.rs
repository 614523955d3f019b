//! Marketing campaign performance reports from daily CSV exports.
//!
//! [`pipeline::run`] takes raw CSV bytes and returns an [`Envelope`]: either
//! aggregate KPIs with a period summary, or a structured error. Everything
//! else in the crate (narratives, batch runs, file output) builds on that.

pub mod batch;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod narrative;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod util;
pub mod validator;

pub use error::{ConfigError, LoadError, NarrativeError, PipelineError, ValidationError};
pub use pipeline::{execute, run, run_file, PipelineOutput};
pub use report::{build_report, CampaignReport};
pub use types::{AggregateMetrics, CleanRecord, Envelope, Narrative, PeriodSummary, Status};
