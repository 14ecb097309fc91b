//! Recommendation settings and environment configuration.

use bakery_rag::{DEFAULT_COLLECTION, ScoreCapture};
use serde::{Deserialize, Serialize};

use crate::error::{RecommendError, Result};

/// Default sampling temperature for explanations.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// What to do when one candidate's explanation cannot be generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationFailurePolicy {
    /// Fail the whole recommendation with the candidate's error.
    #[default]
    Abort,
    /// Leave the candidate out and keep going.
    Skip,
}

/// Configuration for the [`Recommender`](crate::Recommender).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommenderConfig {
    /// How secondary scores are read from documents.
    pub score_capture: ScoreCapture,
    /// Handling of per-candidate generation failures.
    pub failure_policy: GenerationFailurePolicy,
    /// Request candidates' explanations concurrently.
    pub parallel_explanations: bool,
    /// Fewest lines an explanation is asked to have.
    pub min_explanation_lines: usize,
    /// Most lines an explanation keeps after normalization.
    pub max_explanation_lines: usize,
    /// Sampling temperature for explanations.
    pub temperature: f32,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            score_capture: ScoreCapture::Independent,
            failure_policy: GenerationFailurePolicy::Abort,
            parallel_explanations: false,
            min_explanation_lines: 3,
            max_explanation_lines: 4,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl RecommenderConfig {
    /// Create a new builder for constructing a [`RecommenderConfig`].
    pub fn builder() -> RecommenderConfigBuilder {
        RecommenderConfigBuilder::default()
    }

    /// Check the line bounds and temperature.
    ///
    /// # Errors
    ///
    /// Returns [`RecommendError::ConfigError`] if:
    /// - `min_explanation_lines == 0` or it exceeds `max_explanation_lines`
    /// - `temperature` is outside `0.0..=2.0`
    pub fn validate(&self) -> Result<()> {
        if self.min_explanation_lines == 0 || self.min_explanation_lines > self.max_explanation_lines {
            return Err(RecommendError::ConfigError(format!(
                "explanation lines {}..={} are not a valid range",
                self.min_explanation_lines, self.max_explanation_lines
            )));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(RecommendError::ConfigError(format!(
                "temperature ({}) must be between 0.0 and 2.0",
                self.temperature
            )));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`RecommenderConfig`].
#[derive(Debug, Clone, Default)]
pub struct RecommenderConfigBuilder {
    config: RecommenderConfig,
}

impl RecommenderConfigBuilder {
    /// Set how secondary scores are captured.
    pub fn score_capture(mut self, score_capture: ScoreCapture) -> Self {
        self.config.score_capture = score_capture;
        self
    }

    /// Set the generation failure policy.
    pub fn failure_policy(mut self, policy: GenerationFailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    /// Request explanations concurrently.
    pub fn parallel_explanations(mut self, parallel: bool) -> Self {
        self.config.parallel_explanations = parallel;
        self
    }

    /// Set the explanation line bounds.
    pub fn explanation_lines(mut self, min: usize, max: usize) -> Self {
        self.config.min_explanation_lines = min;
        self.config.max_explanation_lines = max;
        self
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Build the [`RecommenderConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`RecommendError::ConfigError`] when
    /// [`RecommenderConfig::validate`] does.
    pub fn build(self) -> Result<RecommenderConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Settings read from the environment at startup.
///
/// | Variable | Required | Default |
/// |----------|----------|---------|
/// | `OPENAI_API_KEY` | yes | |
/// | `OPENAI_BASE_URL` | no | OpenAI |
/// | `OPENAI_CHAT_MODEL` | no | `gpt-4o-mini` |
/// | `OPENAI_EMBEDDING_MODEL` | no | `text-embedding-3-small` |
/// | `BAKERY_COLLECTION` | no | `bakery_vector_store` |
/// | `QDRANT_URL` | no | in-memory index |
#[derive(Clone, PartialEq)]
pub struct AppConfig {
    /// OpenAI API key.
    pub openai_api_key: String,
    /// OpenAI-compatible API base URL override.
    pub openai_base_url: Option<String>,
    /// Chat model used for explanations.
    pub chat_model: String,
    /// Embedding model used for documents and queries.
    pub embedding_model: String,
    /// Vector store collection name.
    pub collection: String,
    /// Qdrant endpoint; `None` selects the in-memory store.
    pub qdrant_url: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("openai_api_key", &"[redacted]")
            .field("openai_base_url", &self.openai_base_url)
            .field("chat_model", &self.chat_model)
            .field("embedding_model", &self.embedding_model)
            .field("collection", &self.collection)
            .field("qdrant_url", &self.qdrant_url)
            .finish()
    }
}

/// Default chat model.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

impl AppConfig {
    /// Load from the process environment, after reading a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns [`RecommendError::ConfigError`] if `OPENAI_API_KEY` is unset or empty.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let openai_api_key = get("OPENAI_API_KEY").ok_or_else(|| {
            RecommendError::ConfigError("OPENAI_API_KEY environment variable not set".to_string())
        })?;

        Ok(Self {
            openai_api_key,
            openai_base_url: get("OPENAI_BASE_URL"),
            chat_model: get("OPENAI_CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            embedding_model: get("OPENAI_EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            collection: get("BAKERY_COLLECTION").unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            qdrant_url: get("QDRANT_URL"),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn missing_api_key_is_a_configuration_error() {
        let err = AppConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, RecommendError::ConfigError(_)));
    }

    #[test]
    fn defaults_fill_optional_settings() {
        let config = AppConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.collection, "bakery_vector_store");
        assert_eq!(config.chat_model, DEFAULT_CHAT_MODEL);
        assert_eq!(config.qdrant_url, None);
        assert!(!format!("{config:?}").contains("sk-test"));
    }

    #[test]
    fn builder_validates_ranges() {
        assert!(RecommenderConfig::builder().explanation_lines(0, 4).build().is_err());
        assert!(RecommenderConfig::builder().explanation_lines(5, 4).build().is_err());
        assert!(RecommenderConfig::builder().temperature(3.5).build().is_err());
        let config = RecommenderConfig::builder()
            .failure_policy(GenerationFailurePolicy::Skip)
            .parallel_explanations(true)
            .build()
            .unwrap();
        assert_eq!(config.failure_policy, GenerationFailurePolicy::Skip);
        assert!(config.parallel_explanations);
    }

    #[test]
    fn literal_configs_are_validated_too() {
        let config = RecommenderConfig {
            failure_policy: GenerationFailurePolicy::Skip,
            max_explanation_lines: 0,
            ..RecommenderConfig::default()
        };
        assert!(matches!(config.validate(), Err(RecommendError::ConfigError(_))));
        assert!(RecommenderConfig::default().validate().is_ok());
    }
}
