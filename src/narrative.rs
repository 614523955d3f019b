//! Narrative generation on top of computed metrics.
//!
//! The pipeline never depends on this module; it only consumes the finished
//! [`AggregateMetrics`]. Any failure here degrades to [`Narrative::fallback`].

use crate::config::NarrativeConfig;
use crate::error::NarrativeError;
use crate::types::{AggregateMetrics, Narrative};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Number of insights and recommendations a narrative must carry.
pub const NARRATIVE_ITEMS: usize = 3;

const SYSTEM_PROMPT: &str = "You are a senior marketing performance analyst. \
Write concise, executive-level, data-driven prose. Analyze only the JSON metrics provided.\n\
Rules:\n\
1. Never invent numbers. Only use values present in the input.\n\
2. If a metric is 0 or low, address it objectively.\n\
3. Respond with a JSON object with exactly these keys: \"executive_summary\" (string), \
\"key_insights\" (list of 3 strings), \"recommendations\" (list of 3 strings).\n\
4. Do not wrap the output in markdown code blocks.";

pub trait Narrator {
    fn narrate(&self, metrics: &AggregateMetrics) -> Result<Narrative, NarrativeError>;
}

impl Narrative {
    /// Parse a model response, tolerating a surrounding code fence, and
    /// enforce the three-insights / three-recommendations shape.
    pub fn from_json(text: &str) -> Result<Self, NarrativeError> {
        let narrative: Narrative = serde_json::from_str(strip_code_fence(text))?;
        narrative.checked()
    }

    fn checked(self) -> Result<Self, NarrativeError> {
        if self.executive_summary.trim().is_empty() {
            return Err(NarrativeError::Shape("executive_summary is empty".to_string()));
        }
        for (name, items) in [
            ("key_insights", &self.key_insights),
            ("recommendations", &self.recommendations),
        ] {
            if items.len() != NARRATIVE_ITEMS {
                return Err(NarrativeError::Shape(format!(
                    "{name} has {} entries, expected {NARRATIVE_ITEMS}",
                    items.len()
                )));
            }
        }
        Ok(self)
    }

    /// Fixed narrative used whenever generation is unavailable or fails.
    pub fn fallback() -> Self {
        Narrative {
            executive_summary: "Automated narrative analysis is unavailable for this report; \
                                the metrics above are complete and accurate."
                .to_string(),
            key_insights: vec![
                "Review click-through rate against prior periods.".to_string(),
                "Review conversion rate against prior periods.".to_string(),
                "Review cost per acquisition against target.".to_string(),
            ],
            recommendations: vec![
                "Regenerate the narrative once the analysis service is reachable.".to_string(),
                "Compare best and worst days to locate performance drivers.".to_string(),
                "Reallocate spend toward the most efficient days and channels.".to_string(),
            ],
        }
    }
}

fn strip_code_fence(text: &str) -> &str {
    let t = text.trim();
    let Some(rest) = t.strip_prefix("```") else {
        return t;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Use `narrator` when present, and the fixed fallback on any error.
pub fn narrate_or_fallback(narrator: Option<&dyn Narrator>, metrics: &AggregateMetrics) -> Narrative {
    let Some(narrator) = narrator else {
        debug!("no narrator configured, using fallback narrative");
        return Narrative::fallback();
    };
    match narrator.narrate(metrics) {
        Ok(n) => n,
        Err(e) => {
            warn!(error = %e, "narrative generation failed, using fallback");
            Narrative::fallback()
        }
    }
}

/// Chat-completions client for any OpenAI-compatible endpoint.
pub struct OpenAiNarrator {
    client: Client,
    config: NarrativeConfig,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

impl OpenAiNarrator {
    pub fn new(config: NarrativeConfig) -> Result<Self, NarrativeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    pub(crate) fn request_body(&self, metrics: &AggregateMetrics) -> Result<Value, NarrativeError> {
        Ok(json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": user_prompt(metrics)?},
            ],
        }))
    }
}

fn user_prompt(metrics: &AggregateMetrics) -> Result<String, NarrativeError> {
    let data = serde_json::to_string_pretty(metrics)?;
    Ok(format!(
        "Analyze the following marketing performance data:\n{data}\n\n\
         Provide:\n\
         1. An executive summary (2-3 sentences).\n\
         2. Exactly 3 key insights (focus on CTR, conversion rate and cost efficiency).\n\
         3. Exactly 3 actionable optimization recommendations."
    ))
}

impl Narrator for OpenAiNarrator {
    fn narrate(&self, metrics: &AggregateMetrics) -> Result<Narrative, NarrativeError> {
        let body = self.request_body(metrics)?;
        debug!(model = %self.config.model, "requesting narrative");
        let response: ChatResponse = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(NarrativeError::NoChoices)?;
        Narrative::from_json(&content)
    }
}
