use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::application::{AggregationOptions, Pacing, Ranking, RetryPolicy, MAX_RETRY_DELAY};
use crate::domain::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_BYTES};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

const MAX_MULTIPLIER: f64 = 10.0;

/// Runtime settings plus the prompt texts, loaded from two YAML files.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub config: Config,
    pub prompts: PromptsConfig,
}

impl AppConfig {
    /// Reads both files when present, falls back to defaults otherwise, then
    /// applies environment overrides and validates the result.
    pub fn load(config_path: &Path, prompts_path: &Path) -> Result<Self, ConfigError> {
        let mut app = Self {
            config: read_yaml_or_default(config_path)?,
            prompts: read_yaml_or_default(prompts_path)?,
        };
        app.config.apply_env_overrides(|key| std::env::var(key).ok());
        app.config.validate()?;
        Ok(app)
    }
}

fn read_yaml_or_default<T>(path: &Path) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de> + Default,
{
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(T::default());
    }

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub vector_store: VectorStoreConfig,
    pub pipeline: PipelineConfig,
    pub retry: RetryConfig,
    pub pacing: PacingConfig,
    pub report: ReportConfig,
}

impl Config {
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("QDRANT_URL") {
            self.vector_store.url = url;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(model) = lookup("EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            (self.pipeline.chunk_size, "pipeline.chunk_size"),
            (self.pipeline.per_chunk_limit, "pipeline.per_chunk_limit"),
            (self.pipeline.max_results, "pipeline.max_results"),
            (self.pipeline.max_bytes, "pipeline.max_bytes"),
            (self.embedding.dimension, "embedding.dimension"),
            (self.retry.max_attempts as usize, "retry.max_attempts"),
        ];
        if let Some((_, name)) = checks.iter().find(|(value, _)| *value == 0) {
            return Err(ConfigError::Invalid(format!("{name} must be greater than zero")));
        }
        if !(1.0..=MAX_MULTIPLIER).contains(&self.retry.multiplier) {
            return Err(ConfigError::Invalid(format!(
                "retry.multiplier must be between 1.0 and {MAX_MULTIPLIER}"
            )));
        }

        let max_delay = MAX_RETRY_DELAY.as_secs_f64();
        let delays = [
            (self.retry.base_delay_seconds, "retry.base_delay_seconds"),
            (self.pacing.call_delay_seconds, "pacing.call_delay_seconds"),
            (self.pacing.file_delay_seconds, "pacing.file_delay_seconds"),
        ];
        if let Some((_, name)) = delays
            .iter()
            .find(|(seconds, _)| !(0.0..=max_delay).contains(seconds))
        {
            return Err(ConfigError::Invalid(format!(
                "{name} must be between 0 and {max_delay} seconds"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: Option<u64>,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.0,
            max_tokens: None,
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-004".to_string(),
            dimension: 768,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub url: String,
    pub collection: String,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            collection: "contracts".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub chunk_size: usize,
    pub per_chunk_limit: usize,
    pub max_results: usize,
    pub max_bytes: usize,
    pub ranking: Ranking,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            per_chunk_limit: 3,
            max_results: 3,
            max_bytes: DEFAULT_MAX_BYTES,
            ranking: Ranking::ChunkOrder,
        }
    }
}

impl PipelineConfig {
    pub fn aggregation_options(&self) -> AggregationOptions {
        AggregationOptions {
            chunk_size: self.chunk_size,
            per_chunk_limit: self.per_chunk_limit,
            max_results: self.max_results,
            ranking: self.ranking,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_seconds: f64,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_seconds: 5.0,
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            seconds(self.base_delay_seconds),
            self.multiplier,
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub call_delay_seconds: f64,
    pub file_delay_seconds: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            call_delay_seconds: 2.0,
            file_delay_seconds: 3.0,
        }
    }
}

impl PacingConfig {
    pub fn pacing(&self) -> Pacing {
        Pacing::new(
            seconds(self.call_delay_seconds),
            seconds(self.file_delay_seconds),
        )
    }
}

/// Non-panicking conversion; out-of-range values clamp to `[0, MAX_RETRY_DELAY]`.
fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.max(0.0))
        .unwrap_or(MAX_RETRY_DELAY)
        .min(MAX_RETRY_DELAY)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_dir: String,
    pub title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: "reports".to_string(),
            title: "Contract Analysis Report".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub synthesis: SynthesisPrompts,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SynthesisPrompts {
    pub system: String,
}

impl Default for SynthesisPrompts {
    fn default() -> Self {
        Self {
            system: "You are an AI assistant that analyzes contracts. Use the retrieved \
                     contract excerpts and their dates to answer the user's question \
                     accurately and concisely. If the retrieved information is not \
                     sufficient, say so and explain what is missing."
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_pipeline_constants() {
        let config = Config::default();

        assert_eq!(config.pipeline.chunk_size, 8000);
        assert_eq!(config.pipeline.max_bytes, 9900);
        assert_eq!(config.pipeline.max_results, 3);
        assert_eq!(config.retry.policy(), RetryPolicy::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let yaml = "pipeline:\n  max_results: 5\n  ranking: score\nvector_store:\n  collection: leases\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.pipeline.max_results, 5);
        assert_eq!(config.pipeline.ranking, Ranking::Score);
        assert_eq!(config.pipeline.per_chunk_limit, 3);
        assert_eq!(config.vector_store.collection, "leases");
        assert_eq!(config.vector_store.url, "http://localhost:6334");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [("QDRANT_URL", "http://qdrant:6334"), ("LLM_MODEL", "gemini-pro")]
            .into_iter()
            .collect();
        let mut config = Config::default();

        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.vector_store.url, "http://qdrant:6334");
        assert_eq!(config.llm.model, "gemini-pro");
        assert_eq!(config.embedding.model, "text-embedding-004");
    }

    #[test]
    fn test_validate_rejects_zero_chunk_size() {
        let mut config = Config::default();
        config.pipeline.chunk_size = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pipeline.chunk_size"));
    }

    #[test]
    fn test_validate_rejects_unbounded_retry_values() {
        let mut config = Config::default();
        config.retry.multiplier = 1e30;
        assert!(config.validate().is_err());
        assert_eq!(config.retry.policy().delay_for(1), MAX_RETRY_DELAY);

        let mut config = Config::default();
        config.retry.base_delay_seconds = f64::INFINITY;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("retry.base_delay_seconds"));
        assert_eq!(config.retry.policy().base_delay, MAX_RETRY_DELAY);

        let mut config = Config::default();
        config.pacing.file_delay_seconds = f64::NAN;
        assert!(config.validate().is_err());
        assert_eq!(config.pacing.pacing().file_delay, Duration::ZERO);
    }

    #[test]
    fn test_load_missing_files_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let app = AppConfig::load(&dir.path().join("none.yaml"), &dir.path().join("none.yaml"))
            .unwrap();

        assert!(app.prompts.synthesis.system.contains("contracts"));
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "pipeline: [not, a, map]").unwrap();

        let err = AppConfig::load(&path, &dir.path().join("prompts.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
