//! Configuration module for doceval
//!
//! This module handles:
//! - User-level configuration (`~/.config/doceval/config.toml`)
//! - Environment variables and `.env` files
//! - CLI overrides
//! - Validation, before any document is processed

mod user_config;

pub use user_config::{AzureSection, EvaluationSection, UserConfig};

use crate::ai::{ScoreParseMode, ScorerSettings};
use crate::text::Encoding;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const ENV_API_KEY: &str = "AZURE_OPENAI_API_KEY";
pub const ENV_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
pub const ENV_DEPLOYMENT: &str = "AZURE_OPENAI_DEPLOYMENT";
pub const ENV_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";

pub const DEFAULT_API_VERSION: &str = "2024-02-15-preview";
pub const DEFAULT_MAX_TOKENS_PER_CHUNK: usize = 4000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_MAX_RESPONSE_TOKENS: u32 = 500;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_EXTENSIONS: &[&str] = &["txt", "md", "markdown", "text"];
/// Documents larger than this are rejected (50 MiB)
pub const DEFAULT_MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;

/// Errors raised while assembling or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Missing required configuration: {}. Provide via CLI arguments, environment variables, or a .env file.",
        .0.join(", ")
    )]
    Missing(Vec<String>),

    #[error("Token budget must be a positive integer (got {0})")]
    InvalidBudget(usize),

    #[error("Invalid {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Values supplied on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub deployment: Option<String>,
    pub api_version: Option<String>,
    pub max_tokens_per_chunk: Option<usize>,
    pub max_retries: Option<u32>,
    pub temperature: Option<f32>,
    pub encoding: Option<String>,
    pub lenient_scores: bool,
    /// Extra TOML file layered over the user config
    pub config_file: Option<PathBuf>,
}

/// Fully resolved configuration bundle
#[derive(Debug, Clone)]
pub struct EvalConfig {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub deployment: Option<String>,
    pub api_version: String,
    /// Token budget per chunk
    pub max_tokens_per_chunk: usize,
    /// Total scoring attempts per chunk
    pub max_retries: u32,
    pub temperature: f32,
    pub max_response_tokens: u32,
    pub request_timeout: Duration,
    pub encoding: Encoding,
    pub score_mode: ScoreParseMode,
    pub extensions: Vec<String>,
    pub max_file_bytes: u64,
}

impl EvalConfig {
    /// Load with the full fallback chain: CLI → environment → `.env` →
    /// `--config` file → user config → defaults
    pub fn load(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        // .env never overrides variables already set in the process
        dotenvy::dotenv().ok();
        let mut user = UserConfig::load()?;
        if let Some(path) = &overrides.config_file {
            user.merge(UserConfig::load_from(path)?);
        }
        Self::resolve(overrides, user, |key| {
            std::env::var(key).ok().filter(|v| !v.trim().is_empty())
        })
    }

    /// Resolve from explicit sources; `env` looks up a variable by name
    pub fn resolve(
        overrides: ConfigOverrides,
        user: UserConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let UserConfig { azure, evaluation } = user;

        let encoding = match overrides.encoding.or(evaluation.encoding) {
            Some(name) => name.parse()?,
            None => Encoding::default(),
        };

        let score_mode = if overrides.lenient_scores || evaluation.lenient_scores.unwrap_or(false)
        {
            ScoreParseMode::Lenient
        } else {
            ScoreParseMode::Strict
        };

        let extensions = evaluation
            .extensions
            .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect())
            .into_iter()
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        let config = Self {
            api_key: overrides.api_key.or_else(|| env(ENV_API_KEY)).or(azure.api_key),
            endpoint: overrides
                .endpoint
                .or_else(|| env(ENV_ENDPOINT))
                .or(azure.endpoint),
            deployment: overrides
                .deployment
                .or_else(|| env(ENV_DEPLOYMENT))
                .or(azure.deployment),
            api_version: overrides
                .api_version
                .or_else(|| env(ENV_API_VERSION))
                .or(azure.api_version)
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            max_tokens_per_chunk: overrides
                .max_tokens_per_chunk
                .or(evaluation.max_tokens_per_chunk)
                .unwrap_or(DEFAULT_MAX_TOKENS_PER_CHUNK),
            max_retries: overrides
                .max_retries
                .or(evaluation.max_retries)
                .unwrap_or(DEFAULT_MAX_RETRIES),
            temperature: overrides
                .temperature
                .or(evaluation.temperature)
                .unwrap_or(0.0),
            max_response_tokens: evaluation
                .max_response_tokens
                .unwrap_or(DEFAULT_MAX_RESPONSE_TOKENS),
            request_timeout: Duration::from_secs(
                evaluation
                    .request_timeout_secs
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            encoding,
            score_mode,
            extensions,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check everything that does not need credentials
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tokens_per_chunk == 0 {
            return Err(ConfigError::InvalidBudget(self.max_tokens_per_chunk));
        }
        if self.max_retries == 0 {
            return Err(ConfigError::invalid(
                "max_retries",
                "at least one attempt is required",
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::invalid(
                "temperature",
                format!("{} is outside 0.0-2.0", self.temperature),
            ));
        }
        if self.max_response_tokens == 0 {
            return Err(ConfigError::invalid(
                "max_response_tokens",
                "must be positive",
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::invalid(
                "request_timeout_secs",
                "must be positive",
            ));
        }
        if self.extensions.is_empty() {
            return Err(ConfigError::invalid(
                "extensions",
                "at least one file extension is required",
            ));
        }
        Ok(())
    }

    /// Settings for the scoring client. Fails listing every missing credential.
    pub fn scorer_settings(&self) -> Result<ScorerSettings, ConfigError> {
        let mut missing = Vec::new();
        if self.api_key.is_none() {
            missing.push(format!("--api-key/{ENV_API_KEY}"));
        }
        if self.endpoint.is_none() {
            missing.push(format!("--endpoint/{ENV_ENDPOINT}"));
        }
        if self.deployment.is_none() {
            missing.push(format!("--deployment/{ENV_DEPLOYMENT}"));
        }

        match (&self.api_key, &self.endpoint, &self.deployment) {
            (Some(api_key), Some(endpoint), Some(deployment)) => {
                if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
                    return Err(ConfigError::invalid(
                        "endpoint",
                        format!("'{endpoint}' must start with https:// or http://"),
                    ));
                }
                Ok(ScorerSettings {
                    endpoint: endpoint.trim_end_matches('/').to_string(),
                    api_key: api_key.clone(),
                    deployment: deployment.clone(),
                    api_version: self.api_version.clone(),
                    temperature: self.temperature,
                    max_response_tokens: self.max_response_tokens,
                    timeout: self.request_timeout,
                    score_mode: self.score_mode,
                })
            }
            _ => Err(ConfigError::Missing(missing)),
        }
    }

    /// API key with all but the last four characters hidden
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key.as_deref().map(|key| {
            let chars: Vec<char> = key.chars().collect();
            if chars.len() <= 4 {
                "****".to_string()
            } else {
                let tail: String = chars[chars.len() - 4..].iter().collect();
                format!("****{tail}")
            }
        })
    }
}
