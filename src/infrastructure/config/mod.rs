use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::{CompletionConfig, GenerationLimits};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Service configuration, merged from defaults, an optional `qaforge.toml`,
/// and `QAFORGE_`-prefixed environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub api_key: String,
    pub base_url: String,
    pub bind_addr: String,
    pub port: u16,
    pub completion: CompletionConfig,
    pub limits: GenerationLimits,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            bind_addr: "127.0.0.1".to_string(),
            port: 5004,
            completion: CompletionConfig::default(),
            limits: GenerationLimits::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn load() -> Result<Self> {
        let config: RuntimeConfig = Figment::from(Serialized::defaults(RuntimeConfig::default()))
            .merge(Toml::file("qaforge.toml"))
            .merge(Env::prefixed("QAFORGE_").split("__"))
            .extract()
            .map_err(|err| AppError::ConfigError(format!("failed to load configuration: {}", err)))?;
        config.validated()
    }

    /// The API key is required up front. A missing key stops the service at
    /// startup instead of surfacing as a failed completion later.
    pub fn validated(self) -> Result<Self> {
        if self.api_key.trim().is_empty() {
            return Err(AppError::ConfigError(
                "QAFORGE_API_KEY is not set".to_string(),
            ));
        }
        Ok(self)
    }
}
