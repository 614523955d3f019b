use crate::error::ConfigError;
use std::path::PathBuf;

pub const DEFAULT_CSV_PATH: &str = "campaign_data.csv";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TEMPERATURE: f64 = 0.2;
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Credentials and model settings for the narrative service. Only ever built
/// from explicit configuration; there is no built-in key.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub csv_path: PathBuf,
    pub output_dir: PathBuf,
    pub preview_rows: usize,
    /// `None` when no API key is configured; reports then use the fallback narrative.
    pub narrative: Option<NarrativeConfig>,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let preview_rows = match get("CAMPAIGN_PREVIEW_ROWS") {
            None => DEFAULT_PREVIEW_ROWS,
            Some(v) => match v.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "CAMPAIGN_PREVIEW_ROWS",
                        expected: "a positive integer",
                        value: v,
                    })
                }
            },
        };

        let narrative = match get("OPENAI_API_KEY") {
            None => None,
            Some(api_key) => {
                let temperature = match get("OPENAI_TEMPERATURE") {
                    None => DEFAULT_TEMPERATURE,
                    Some(v) => match v.parse::<f64>() {
                        Ok(t) if (0.0..=2.0).contains(&t) => t,
                        _ => {
                            return Err(ConfigError::Invalid {
                                name: "OPENAI_TEMPERATURE",
                                expected: "a number between 0 and 2",
                                value: v,
                            })
                        }
                    },
                };
                Some(NarrativeConfig {
                    api_key,
                    model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                    base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                    temperature,
                    timeout_secs: DEFAULT_TIMEOUT_SECS,
                })
            }
        };

        Ok(AppConfig {
            csv_path: get("CAMPAIGN_CSV_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_PATH)),
            output_dir: get("CAMPAIGN_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            preview_rows,
            narrative,
        })
    }
}
