use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{GenieError, Result};

pub const DEFAULT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/codellama/CodeLlama-34b-Instruct-hf";
pub const TOKEN_ENV_VAR: &str = "HUGGINGFACE_TOKEN";
pub const DEFAULT_CONFIG_FILE: &str = "codegenie.yaml";

/// Sampling knobs forwarded to the inference endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GenerationParameters {
    pub max_length: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub stop: Vec<String>,
    pub repetition_penalty: f32,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_length: 1024,
            temperature: 0.1,
            top_p: 0.95,
            stop: vec!["</s>".to_string(), "[INST]".to_string()],
            repetition_penalty: 1.2,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GenieConfig {
    pub endpoint: String,
    pub token: Option<String>,
    pub parameters: GenerationParameters,
    /// No timeout is applied unless this is set.
    pub timeout_secs: Option<u64>,
}

impl Default for GenieConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: None,
            parameters: GenerationParameters::default(),
            timeout_secs: None,
        }
    }
}

impl GenieConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|err| GenieError::Config(err.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|err| {
            GenieError::Config(format!("could not read {}: {err}", path.display()))
        })?;
        Self::from_yaml(&text)
    }

    /// Loads `path` when given, otherwise `./codegenie.yaml` if it exists,
    /// otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Applies token overrides: an explicit value wins over the environment,
    /// which wins over the file.
    #[must_use]
    pub fn with_token_overrides(mut self, explicit: Option<String>, env: Option<String>) -> Self {
        let usable = |token: &String| !token.trim().is_empty();
        if let Some(token) = explicit.filter(usable).or_else(|| env.filter(usable)) {
            self.token = Some(token);
        }
        self
    }

    pub fn resolve(path: Option<&Path>, explicit_token: Option<String>) -> Result<Self> {
        let config = Self::load(path)?;
        let env_token = std::env::var(TOKEN_ENV_VAR).ok();
        Ok(config.with_token_overrides(explicit_token, env_token))
    }

    pub fn token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                GenieError::Config(format!(
                    "no access token configured: pass --token, set {TOKEN_ENV_VAR} or add `token` to {DEFAULT_CONFIG_FILE}"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{GenerationParameters, GenieConfig, DEFAULT_ENDPOINT};
    use crate::ErrorKind;

    #[test]
    fn empty_file_gives_defaults() {
        let config = GenieConfig::from_yaml("{}").unwrap();
        assert_eq!(config, GenieConfig::default());
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.parameters.stop, vec!["</s>", "[INST]"]);
    }

    #[test]
    fn partial_parameters_are_merged() {
        let config = GenieConfig::from_yaml(
            "endpoint: http://localhost:8080/generate
token: hf_abc
parameters:
  temperature: 0.7
timeout_secs: 30
",
        )
        .unwrap();
        assert_eq!(config.endpoint, "http://localhost:8080/generate");
        assert_eq!(config.token().unwrap(), "hf_abc");
        assert!((config.parameters.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(
            config.parameters.max_length,
            GenerationParameters::default().max_length
        );
        assert_eq!(config.timeout_secs, Some(30));
    }

    #[test]
    fn invalid_yaml_is_a_config_error() {
        let err = GenieConfig::from_yaml("parameters: [1, 2").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn token_precedence() {
        let file = GenieConfig {
            token: Some("from-file".into()),
            ..GenieConfig::default()
        };
        let config = file
            .clone()
            .with_token_overrides(Some("from-flag".into()), Some("from-env".into()));
        assert_eq!(config.token().unwrap(), "from-flag");

        let config = file
            .clone()
            .with_token_overrides(None, Some("from-env".into()));
        assert_eq!(config.token().unwrap(), "from-env");

        let config = file
            .clone()
            .with_token_overrides(None, Some("  ".into()));
        assert_eq!(config.token().unwrap(), "from-file");

        // a blank flag must not hide the environment variable
        let config = file
            .clone()
            .with_token_overrides(Some(String::new()), Some("from-env".into()));
        assert_eq!(config.token().unwrap(), "from-env");

        let config = file.with_token_overrides(Some(" ".into()), None);
        assert_eq!(config.token().unwrap(), "from-file");
    }

    #[test]
    fn missing_token_is_reported() {
        let err = GenieConfig::default().token().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("HUGGINGFACE_TOKEN"));
    }
}
