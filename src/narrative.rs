use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::config::NarrativeConfig;
use crate::error::{ConfigError, NarrativeError};
use crate::models::{
    BackendHealth, HealthStatus, NarrativeOutcome, NarrativeSource, SignalReading,
};

const FALLBACK_MODEL_LABEL: &str = "local-fallback";

const STRESS_REGULATION_TEXT: &str = "Burnout risk insight: elevated stress markers detected in behavioral patterns. \
     Regulation strategy: prioritize low-stimulation tasks and reflective journaling. \
     Avoid high-emotion meetings or conflict-heavy spaces today.";

const CREATIVE_PACING_TEXT: &str = "Burnout risk insight: cognitive expansion phase detected, monitor for overstimulation. \
     Regulation strategy: leverage ideation timeframes for focused creative work. \
     Set clear boundaries to prevent creative burnout.";

const STEADY_STATE_TEXT: &str = "Burnout risk insight: stable behavioral patterns observed. \
     Regulation strategy: maintain consistent pacing and reinforce familiar habits. \
     Focus on controlled inputs and minimal cognitive overload.";

/// Prompt template with three substitution points: the joined tag list, the
/// conductance value, and the environmental state.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    /// Load the template file. A missing template is a fatal configuration
    /// error for any flow that needs narrative generation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::TemplateNotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            text: std::fs::read_to_string(path)?,
        })
    }

    #[cfg(test)]
    fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn render(&self, tags: &BTreeSet<String>, reading: &SignalReading) -> String {
        let joined = tags.iter().cloned().collect::<Vec<_>>().join(", ");
        self.text
            .replace("{pattern_tags}", &joined)
            .replace(
                "{skin_conductance}",
                &format!("{:.2}", reading.skin_conductance),
            )
            .replace(
                "{environmental_state}",
                &reading.environmental_state.to_string(),
            )
    }
}

/// Thin client for the local Ollama HTTP API.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(serde::Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let mut base = base_url.into();
        while base.ends_with('/') {
            base.pop();
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("failed to build HTTP client with timeout: {e}; using default");
                reqwest::Client::new()
            });
        Self {
            base_url: base,
            client,
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// Submit a prompt for completion via `POST /api/generate`.
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String, NarrativeError> {
        let url = self.api_url("generate");
        tracing::debug!("sending generate request to {url}");

        let body = GenerateRequest {
            model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| NarrativeError::RequestFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| NarrativeError::RequestFailed {
                reason: format!("failed to read response body: {e}"),
            })?;

        if !status.is_success() {
            return Err(NarrativeError::RequestFailed {
                reason: format!("HTTP {}: {}", status, &text[..text.len().min(200)]),
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| NarrativeError::InvalidResponse {
                reason: format!("JSON parse error: {e}"),
            })?;

        Ok(parsed.response)
    }

    async fn list_models(&self) -> Result<Vec<String>, NarrativeError> {
        let url = self.api_url("tags");
        let response =
            self.client
                .get(&url)
                .send()
                .await
                .map_err(|e| NarrativeError::RequestFailed {
                    reason: e.to_string(),
                })?;

        if !response.status().is_success() {
            return Err(NarrativeError::RequestFailed {
                reason: format!("model discovery returned HTTP {}", response.status()),
            });
        }

        let body: TagsResponse =
            response
                .json()
                .await
                .map_err(|e| NarrativeError::InvalidResponse {
                    reason: format!("failed to parse tags response: {e}"),
                })?;

        Ok(body.models.into_iter().map(|m| m.name).collect())
    }

    /// Health snapshot via `GET /api/tags`: reachability plus whether the
    /// configured model is installed.
    pub async fn health(&self, model: &str) -> BackendHealth {
        match self.list_models().await {
            Ok(models) => {
                let model_available = models
                    .iter()
                    .any(|name| name == model || name.starts_with(&format!("{model}:")));
                BackendHealth {
                    status: HealthStatus::Healthy,
                    available_models: models,
                    model_available,
                    error: None,
                }
            }
            Err(e) => BackendHealth {
                status: HealthStatus::Unreachable,
                available_models: Vec::new(),
                model_available: false,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Boundary adapter around the text-generation capability. Every request
/// terminates with usable text: backend failures surface as informational
/// context on the outcome, never as errors to the caller.
pub struct NarrativeRequester {
    config: NarrativeConfig,
    template: PromptTemplate,
    client: OllamaClient,
}

impl NarrativeRequester {
    pub fn new(config: NarrativeConfig) -> Result<Self, ConfigError> {
        let template = PromptTemplate::load(&config.template_path)?;
        Ok(Self::from_parts(config, template))
    }

    fn from_parts(config: NarrativeConfig, template: PromptTemplate) -> Self {
        let client = OllamaClient::new(config.base_url.clone(), config.timeout);
        Self {
            config,
            template,
            client,
        }
    }

    pub async fn request(
        &self,
        tags: &BTreeSet<String>,
        reading: &SignalReading,
    ) -> NarrativeOutcome {
        let prompt = self.template.render(tags, reading);

        if !self.config.enabled {
            tracing::debug!("narrative backend disabled, using local generator");
            return self.fallback_outcome(tags, prompt, None);
        }

        let health = self.client.health(&self.config.model).await;
        match health.status {
            HealthStatus::Unreachable => {
                let detail = health
                    .error
                    .unwrap_or_else(|| "backend unreachable".to_string());
                tracing::warn!("narrative backend unreachable: {detail}");
                self.fallback_outcome(tags, prompt, Some(detail))
            }
            HealthStatus::Healthy if !health.model_available => {
                let detail = format!(
                    "model {} not installed, available: {}",
                    self.config.model,
                    health.available_models.join(", ")
                );
                tracing::warn!("{detail}");
                self.fallback_outcome(tags, prompt, Some(detail))
            }
            HealthStatus::Healthy => {
                match self.client.generate(&self.config.model, &prompt).await {
                    Ok(text) => NarrativeOutcome {
                        text,
                        source: NarrativeSource::External,
                        model_label: self.config.model.clone(),
                        prompt,
                        degraded: None,
                    },
                    Err(e) => {
                        tracing::warn!("narrative generation failed: {e}");
                        self.fallback_outcome(tags, prompt, Some(e.to_string()))
                    }
                }
            }
        }
    }

    fn fallback_outcome(
        &self,
        tags: &BTreeSet<String>,
        prompt: String,
        degraded: Option<String>,
    ) -> NarrativeOutcome {
        NarrativeOutcome {
            text: fallback_narrative(tags).to_string(),
            source: NarrativeSource::Fallback,
            model_label: FALLBACK_MODEL_LABEL.to_string(),
            prompt,
            degraded,
        }
    }
}

/// Deterministic local generator: a classifier over the tag set, selecting
/// one of three canned advisories.
pub fn fallback_narrative(tags: &BTreeSet<String>) -> &'static str {
    if tags.contains("reactive") && tags.contains("volatile") {
        STRESS_REGULATION_TEXT
    } else if tags.contains("creative")
        && (tags.contains("stimulus-seeking") || tags.contains("early-peak"))
    {
        CREATIVE_PACING_TEXT
    } else {
        STEADY_STATE_TEXT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EnvironmentalState;
    use chrono::Utc;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn sample_reading() -> SignalReading {
        SignalReading {
            signal_id: Uuid::new_v4(),
            timestamp_utc: Utc::now(),
            skin_conductance: 3.25,
            environmental_state: EnvironmentalState::Neutral,
        }
    }

    fn tags(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn disabled_config() -> NarrativeConfig {
        NarrativeConfig {
            enabled: false,
            base_url: "http://localhost:11434".to_string(),
            model: "gemma2:7b".to_string(),
            timeout: Duration::from_secs(5),
            template_path: PathBuf::from("prompts/base_prompt.txt"),
        }
    }

    #[test]
    fn template_renders_all_substitution_points() {
        let template = PromptTemplate::from_text(
            "Tags: {pattern_tags}. EDA: {skin_conductance} µS. Context: {environmental_state}.",
        );
        let rendered = template.render(&tags(&["reactive", "analytical"]), &sample_reading());
        assert_eq!(
            rendered,
            "Tags: analytical, reactive. EDA: 3.25 µS. Context: neutral."
        );
    }

    #[test]
    fn missing_template_is_fatal() {
        let err = PromptTemplate::load(Path::new("prompts/does_not_exist.txt")).unwrap_err();
        assert!(matches!(err, ConfigError::TemplateNotFound { .. }));
    }

    #[test]
    fn fallback_selects_stress_regulation_for_reactive_volatile() {
        let text = fallback_narrative(&tags(&["reactive", "volatile", "practical"]));
        assert!(text.contains("elevated stress markers"));
    }

    #[test]
    fn fallback_selects_creative_pacing() {
        let text = fallback_narrative(&tags(&["creative", "stimulus-seeking"]));
        assert!(text.contains("cognitive expansion"));
        let text = fallback_narrative(&tags(&["creative", "early-peak"]));
        assert!(text.contains("cognitive expansion"));
    }

    #[test]
    fn fallback_defaults_to_steady_state() {
        let text = fallback_narrative(&tags(&["grounded", "practical"]));
        assert!(text.contains("stable behavioral patterns"));
        let text = fallback_narrative(&tags(&[]));
        assert!(text.contains("stable behavioral patterns"));
    }

    #[tokio::test]
    async fn disabled_backend_always_falls_back() {
        let requester = NarrativeRequester::from_parts(
            disabled_config(),
            PromptTemplate::from_text("Tags: {pattern_tags}"),
        );
        let outcome = requester
            .request(&tags(&["reactive", "volatile"]), &sample_reading())
            .await;
        assert_eq!(outcome.source, NarrativeSource::Fallback);
        assert!(!outcome.text.is_empty());
        assert!(outcome.degraded.is_none());
        assert_eq!(outcome.prompt, "Tags: reactive, volatile");
    }

    #[tokio::test]
    async fn unreachable_backend_surfaces_detail_and_falls_back() {
        // Reserved port with nothing listening; the request fails fast and
        // the outcome must still carry usable text.
        let config = NarrativeConfig {
            enabled: true,
            base_url: "http://127.0.0.1:1".to_string(),
            timeout: Duration::from_millis(300),
            ..disabled_config()
        };
        let requester =
            NarrativeRequester::from_parts(config, PromptTemplate::from_text("{pattern_tags}"));
        let outcome = requester.request(&tags(&["grounded"]), &sample_reading()).await;
        assert_eq!(outcome.source, NarrativeSource::Fallback);
        assert!(!outcome.text.is_empty());
        assert!(outcome.degraded.is_some());
    }

    #[test]
    fn tags_response_parses() {
        let json = r#"{"models": [{"name": "gemma2:7b", "size": 4000000000}, {"name": "llama3:latest"}]}"#;
        let parsed: TagsResponse = serde_json::from_str(json).unwrap();
        let names: Vec<String> = parsed.models.into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["gemma2:7b", "llama3:latest"]);
    }

    #[test]
    fn generate_response_parses() {
        let json = r#"{"model": "gemma2:7b", "response": "stay grounded", "done": true}"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.response, "stay grounded");
    }
}
