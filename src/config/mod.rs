mod defaults;
mod types;

pub use types::*;

use crate::error::ConfigError;
use defaults::*;
use std::path::Path;
use std::time::Duration;

/// Config file picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "aireview.yaml";

/// Hosted services that will reject unauthenticated requests
const ONLINE_SERVICES: &[&str] = &[
    "api.openai.com",
    "openai.azure.com",
    "api.anthropic.com",
    "generativelanguage.googleapis.com",
];

impl Default for Config {
    fn default() -> Self {
        Self {
            target: default_target(),
            api_url: default_api_url(),
            api_urls: Vec::new(),
            api_key: None,
            model: default_model(),
            max_file_size: default_max_file_size(),
            timeout_sec: default_timeout_sec(),
            concurrency: default_concurrency(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            launch_delay_ms: default_launch_delay_ms(),
            system_prompt: default_system_prompt(),
            include: default_include(),
            exclude: default_exclude(),
            skip_dirs: default_skip_dirs(),
            diff_base: None,
        }
    }
}

impl Config {
    /// Load config from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load an explicit config file, else `aireview.yaml` if present, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Validate the config
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_urls.is_empty() && self.api_url.trim().is_empty() {
            return Err(ConfigError::NoEndpoints);
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel);
        }
        if self.max_file_size == 0 {
            return Err(ConfigError::NotPositive("max file size"));
        }
        if self.timeout_sec == 0 {
            return Err(ConfigError::NotPositive("request timeout"));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::NotPositive("concurrency"));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::NotPositive("max tokens"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Temperature(self.temperature));
        }
        // API key is optional - needed for online services but not for local models
        Ok(())
    }

    /// Check if any configured endpoint likely requires authentication
    pub fn requires_api_key(&self) -> bool {
        self.api_urls
            .iter()
            .chain(std::iter::once(&self.api_url))
            .any(|url| ONLINE_SERVICES.iter().any(|svc| url.contains(svc)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_sec)
    }
}
