use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "gemma2:7b";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TEMPLATE_PATH: &str = "prompts/base_prompt.txt";
const DEFAULT_DATA_DIR: &str = "data";

/// Narrative backend configuration, resolved once at startup and threaded
/// into the requester's constructor. Components never read env state.
#[derive(Debug, Clone)]
pub struct NarrativeConfig {
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub template_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub narrative: NarrativeConfig,
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub fn resolve() -> Result<Self, ConfigError> {
        let enabled = match optional_env("ENABLE_OLLAMA_INTEGRATION") {
            Some(raw) => parse_bool("ENABLE_OLLAMA_INTEGRATION", &raw)?,
            None => false,
        };
        let timeout_secs = match optional_env("NARRATIVE_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: "NARRATIVE_TIMEOUT_SECS".to_string(),
                message: format!("expected a number of seconds, got {raw:?}"),
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            narrative: NarrativeConfig {
                enabled,
                base_url: optional_env("OLLAMA_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                model: optional_env("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                timeout: Duration::from_secs(timeout_secs),
                template_path: optional_env("PROMPT_TEMPLATE")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATE_PATH)),
            },
            data_dir: optional_env("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
        })
    }
}

/// Read an env var, treating unset and blank the same way.
fn optional_env(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) => {
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected true or false, got {raw:?}"),
        }),
    }
}
