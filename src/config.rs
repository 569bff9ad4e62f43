use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::core::error::EngineError;
use crate::models::{default_workers, EngineConfig, FuzzyThreshold, ScoringWeights};
use crate::services::ai::{AiScorer, DisabledScorer, GeminiScorer, DEFAULT_ENDPOINT, DEFAULT_MODEL};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub ai: AiSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default = "default_skill_weight")]
    pub skill_weight: f64,
    #[serde(default = "default_semantic_weight")]
    pub semantic_weight: f64,
    #[serde(default = "default_ai_weight")]
    pub ai_weight: f64,
    #[serde(default = "default_experience_bonus")]
    pub experience_bonus: f64,
    #[serde(default = "default_fuzzy_discount")]
    pub fuzzy_discount: f64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            skill_weight: default_skill_weight(),
            semantic_weight: default_semantic_weight(),
            ai_weight: default_ai_weight(),
            experience_bonus: default_experience_bonus(),
            fuzzy_discount: default_fuzzy_discount(),
        }
    }
}

fn default_skill_weight() -> f64 { 0.6 }
fn default_semantic_weight() -> f64 { 0.4 }
fn default_ai_weight() -> f64 { 0.3 }
fn default_experience_bonus() -> f64 { 0.1 }
fn default_fuzzy_discount() -> f64 { 0.8 }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_fuzzy_distance_threshold")]
    pub fuzzy_distance_threshold: f64,
    #[serde(default = "default_fuzzy_min_distance")]
    pub fuzzy_min_distance: usize,
    #[serde(default)]
    pub sublinear_tf: bool,
    /// Size of the per-resume worker pool; CPU cores when unset
    pub worker_threads: Option<usize>,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            fuzzy_distance_threshold: default_fuzzy_distance_threshold(),
            fuzzy_min_distance: default_fuzzy_min_distance(),
            sublinear_tf: false,
            worker_threads: None,
        }
    }
}

fn default_fuzzy_distance_threshold() -> f64 { 0.2 }
fn default_fuzzy_min_distance() -> usize { 1 }

#[derive(Debug, Clone, Deserialize)]
pub struct AiSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_ai_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_ai_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_ai_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_ai_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_ai_endpoint(),
            model: default_ai_model(),
            api_key: None,
            timeout_ms: default_ai_timeout_ms(),
            max_concurrency: default_ai_max_concurrency(),
        }
    }
}

fn default_ai_endpoint() -> String { DEFAULT_ENDPOINT.to_string() }
fn default_ai_model() -> String { DEFAULT_MODEL.to_string() }
fn default_ai_timeout_ms() -> u64 { 5000 }
fn default_ai_max_concurrency() -> usize { 8 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with HIRE__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., HIRE__SCORING__AI_WEIGHT -> scoring.ai_weight
            .add_source(env_source())
            .build()?;

        apply_api_key_override(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        apply_api_key_override(settings)?.try_deserialize()
    }

    /// Engine configuration; ranges are checked when the matcher is built
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            weights: ScoringWeights {
                skill_weight: self.scoring.skill_weight,
                semantic_weight: self.scoring.semantic_weight,
                ai_weight: self.scoring.ai_weight,
                experience_bonus: self.scoring.experience_bonus,
                fuzzy_discount: self.scoring.fuzzy_discount,
            },
            fuzzy: FuzzyThreshold {
                distance_ratio: self.matching.fuzzy_distance_threshold,
                min_distance: self.matching.fuzzy_min_distance,
            },
            sublinear_tf: self.matching.sublinear_tf,
            workers: self.matching.worker_threads.unwrap_or_else(default_workers),
            ai_timeout: Duration::from_millis(self.ai.timeout_ms),
            ai_concurrency: self.ai.max_concurrency,
        }
    }

    /// AI backend selected by configuration.
    ///
    /// Falls back to the disabled scorer when AI is switched off or no API key
    /// is available.
    pub fn build_scorer(&self) -> Result<Arc<dyn AiScorer>, EngineError> {
        let api_key = self.ai.api_key.as_deref().filter(|k| !k.trim().is_empty());

        match (self.ai.enabled, api_key) {
            (true, Some(key)) => {
                let scorer = GeminiScorer::new(
                    self.ai.endpoint.clone(),
                    self.ai.model.clone(),
                    key,
                    Duration::from_millis(self.ai.timeout_ms),
                )
                .map_err(|e| EngineError::InvalidConfig(format!("AI client: {}", e)))?;
                Ok(Arc::new(scorer))
            }
            (true, None) => {
                tracing::warn!("AI scoring enabled but no API key configured, using algorithmic scores only");
                Ok(Arc::new(DisabledScorer))
            }
            (false, _) => Ok(Arc::new(DisabledScorer)),
        }
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("HIRE")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// `HIRE_AI_API_KEY` or `GEMINI_API_KEY` replace `ai.api_key`
fn apply_api_key_override(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let api_key = env::var("HIRE_AI_API_KEY")
        .or_else(|_| env::var("GEMINI_API_KEY"))
        .ok();

    match api_key {
        Some(key) => Config::builder()
            .add_source(settings)
            .set_override("ai.api_key", key)?
            .build(),
        None => Ok(settings),
    }
}
