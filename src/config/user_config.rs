//! User-level configuration for doceval
//!
//! Loaded from `~/.config/doceval/config.toml`. Every key is optional; unset
//! keys fall through to built-in defaults, and CLI flags or environment
//! variables override anything set here.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub azure: AzureSection,

    #[serde(default)]
    pub evaluation: EvaluationSection,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AzureSection {
    /// Azure OpenAI API key
    pub api_key: Option<String>,

    /// Resource endpoint, e.g. https://my-resource.openai.azure.com
    pub endpoint: Option<String>,

    /// Deployment (model) name
    pub deployment: Option<String>,

    /// REST API version
    pub api_version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EvaluationSection {
    pub max_tokens_per_chunk: Option<usize>,
    pub max_retries: Option<u32>,
    pub temperature: Option<f32>,
    pub max_response_tokens: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub encoding: Option<String>,
    pub lenient_scores: Option<bool>,
    pub extensions: Option<Vec<String>>,
}

impl UserConfig {
    /// Load the user config file if it exists. A file that exists but does not
    /// parse is an error rather than being silently ignored.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::user_config_path().filter(|p| p.exists()) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("doceval").join("config.toml"))
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: UserConfig) {
        let UserConfig { azure, evaluation } = other;
        merge_opt(&mut self.azure.api_key, azure.api_key);
        merge_opt(&mut self.azure.endpoint, azure.endpoint);
        merge_opt(&mut self.azure.deployment, azure.deployment);
        merge_opt(&mut self.azure.api_version, azure.api_version);

        let e = &mut self.evaluation;
        merge_opt(&mut e.max_tokens_per_chunk, evaluation.max_tokens_per_chunk);
        merge_opt(&mut e.max_retries, evaluation.max_retries);
        merge_opt(&mut e.temperature, evaluation.temperature);
        merge_opt(&mut e.max_response_tokens, evaluation.max_response_tokens);
        merge_opt(&mut e.request_timeout_secs, evaluation.request_timeout_secs);
        merge_opt(&mut e.encoding, evaluation.encoding);
        merge_opt(&mut e.lenient_scores, evaluation.lenient_scores);
        merge_opt(&mut e.extensions, evaluation.extensions);
    }

    /// Create the user config directory and an example config (no-op if present)
    pub fn init_user_config() -> Result<PathBuf, ConfigError> {
        let config_path = Self::user_config_path().ok_or_else(|| {
            ConfigError::invalid("config path", "could not determine config directory")
        })?;
        Self::write_example(&config_path)?;
        Ok(config_path)
    }

    pub(crate) fn write_example(config_path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: config_path.to_path_buf(),
            source,
        };

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        if !config_path.exists() {
            let example = r#"# doceval user configuration
# CLI flags and AZURE_OPENAI_* environment variables override these values.

[azure]
# api_key = "..."
# endpoint = "https://my-resource.openai.azure.com"
# deployment = "gpt-4o"
# api_version = "2024-02-15-preview"

[evaluation]
# max_tokens_per_chunk = 4000
# max_retries = 3            # total attempts per chunk
# temperature = 0.0
# max_response_tokens = 500
# request_timeout_secs = 120
# encoding = "cl100k_base"   # or p50k_base, r50k_base
# lenient_scores = false     # true: default missing score keys to 0 instead of retrying
# extensions = ["txt", "md", "markdown", "text"]
"#;
            std::fs::write(config_path, example).map_err(io_err)?;
        }

        Ok(())
    }
}

fn merge_opt<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_parsing_full() {
        let toml_str = r#"
[azure]
api_key = "k-123"
endpoint = "https://example.openai.azure.com"
deployment = "gpt-4o"

[evaluation]
max_tokens_per_chunk = 2000
max_retries = 5
lenient_scores = true
extensions = ["txt"]
"#;
        let config: UserConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.azure.api_key.as_deref(), Some("k-123"));
        assert_eq!(config.azure.deployment.as_deref(), Some("gpt-4o"));
        assert!(config.azure.api_version.is_none());
        assert_eq!(config.evaluation.max_tokens_per_chunk, Some(2000));
        assert_eq!(config.evaluation.max_retries, Some(5));
        assert_eq!(config.evaluation.lenient_scores, Some(true));
        assert_eq!(config.evaluation.extensions, Some(vec!["txt".to_string()]));
    }

    #[test]
    fn test_toml_parsing_minimal() {
        let config: UserConfig = toml::from_str("").unwrap();
        assert_eq!(config, UserConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is [[ not valid toml {{{}}}").unwrap();
        assert!(matches!(
            UserConfig::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_merge_overrides_set_fields() {
        let mut base = UserConfig::default();
        base.azure.api_key = Some("old".into());
        base.evaluation.max_retries = Some(2);

        let mut other = UserConfig::default();
        other.azure.api_key = Some("new".into());
        other.evaluation.temperature = Some(0.5);

        base.merge(other);
        assert_eq!(base.azure.api_key.as_deref(), Some("new"));
        assert_eq!(base.evaluation.max_retries, Some(2));
        assert_eq!(base.evaluation.temperature, Some(0.5));
    }

    #[test]
    fn test_example_config_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        UserConfig::write_example(&path).unwrap();
        let config = UserConfig::load_from(&path).unwrap();
        assert_eq!(config, UserConfig::default());
    }

    #[test]
    fn test_user_config_path_suffix() {
        if let Some(p) = UserConfig::user_config_path() {
            assert!(p.ends_with("doceval/config.toml"));
        }
    }
}
