//! Console settings: backend location, default model and wizard policies

use crate::core::{error::ConfigError, ConcurrencyPolicy, FieldSet, StalenessPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5001";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_LANGUAGE: &str = "English";

/// Environment variable overriding `base_url`
pub const BASE_URL_ENV: &str = "GENCONSOLE_BASE_URL";
/// Environment variable overriding `model_name`
pub const MODEL_ENV: &str = "MODEL_GEMINI_FLASH";

/// Settings shared by every page of the console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    /// Root URL of the generation backend
    pub base_url: String,

    /// Model sent as `model_name` unless the pipeline or user overrides it
    pub model_name: String,

    /// Output language sent as `story_lang`
    pub language: String,

    pub concurrency: ConcurrencyPolicy,

    pub staleness: StalenessPolicy,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model_name: DEFAULT_MODEL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            concurrency: ConcurrencyPolicy::default(),
            staleness: StalenessPolicy::default(),
        }
    }
}

/// Policies the wizard controller runs with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WizardOptions {
    pub concurrency: ConcurrencyPolicy,
    pub staleness: StalenessPolicy,
}

impl ConsoleSettings {
    /// Parse settings from YAML; missing keys take their defaults
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let settings: ConsoleSettings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Default settings file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("genconsole").join("console.yaml"))
    }

    /// Load settings for the binary
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// when present. A `.env` file is read first, then environment overrides
    /// are applied on top of the file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Ok(env_file) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", env_file.display());
        }

        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => {
                    debug!("Loading settings from {}", path.display());
                    Self::from_file(path)?
                }
                None => Self::default(),
            },
        };

        settings.apply_overrides(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    /// Apply environment-style overrides from a lookup function
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.base_url = url;
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|v| !v.is_empty()) {
            self.model_name = model;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Setting {
                key: "base_url".to_string(),
                message: format!("'{}' is not an http(s) URL", self.base_url),
            });
        }
        if self.model_name.trim().is_empty() {
            return Err(ConfigError::Setting {
                key: "model_name".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Fill `model_name` and `story_lang` unless already set
    pub fn apply_defaults(&self, fields: &mut FieldSet) {
        fields.set_default("model_name", self.model_name.clone());
        fields.set_default("story_lang", self.language.clone());
    }

    pub fn wizard_options(&self) -> WizardOptions {
        WizardOptions {
            concurrency: self.concurrency,
            staleness: self.staleness,
        }
    }
}
