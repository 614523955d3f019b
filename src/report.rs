use crate::narrative::{narrate_or_fallback, Narrator};
use crate::pipeline::execute;
use crate::types::{CleanRecord, Envelope, Narrative};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// A finished report: the pipeline envelope relayed as-is, plus a narrative
/// when the run succeeded.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignReport {
    pub envelope: Envelope,
    pub narrative: Option<Narrative>,
    pub generated_at: String,
    #[serde(skip)]
    pub records: Vec<CleanRecord>,
}

/// Run the pipeline and, on success only, attach a narrative for its metrics.
pub fn build_report(bytes: &[u8], narrator: Option<&dyn Narrator>) -> CampaignReport {
    let output = execute(bytes);
    let narrative = output
        .envelope
        .metrics()
        .map(|metrics| narrate_or_fallback(narrator, metrics));
    CampaignReport {
        envelope: output.envelope,
        narrative,
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        records: output.records,
    }
}
