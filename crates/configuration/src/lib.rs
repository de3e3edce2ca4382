use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;
pub mod telemetry;

// Re-export the core types to provide a clean public API.
pub use settings::{
    Config, HistoryConfig, LoggingConfig, NewsConfig, PriceSourceConfig, ServerConfig,
    SummarizerConfig,
};
pub use telemetry::init_tracing;

/// Prefix of the environment variables that override file settings,
/// e.g. `PULSE__PRICE_SOURCE__MAX_ATTEMPTS=5`.
const ENV_PREFIX: &str = "PULSE";

/// Loads the application configuration from `config.toml` in the working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(Path::new("config.toml"))
}

/// Loads the configuration from `path` (optional on disk), layered under `PULSE__*`
/// environment variables, and validates it.
///
/// `OPENAI_API_KEY` is honoured as the lowest-priority source for the summarizer key.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();
    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        builder = builder.set_default("summarizer.api_key", key)?;
    }

    let settings = builder
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("news.sources")
                .with_list_parse_key("news.default_keywords"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = settings.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

impl Config {
    /// Rejects settings that would make the price client misbehave rather than fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let source = &self.price_source;
        if source.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "price_source.base_url must not be empty".to_string(),
            ));
        }
        if source.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "price_source.max_attempts must be at least 1".to_string(),
            ));
        }
        if !source.backoff_multiplier.is_finite() || source.backoff_multiplier < 1.0 {
            return Err(ConfigError::ValidationError(format!(
                "price_source.backoff_multiplier must be a finite number >= 1.0, got {}",
                source.backoff_multiplier
            )));
        }
        if source.intraday_window_days < 1 {
            return Err(ConfigError::ValidationError(
                "price_source.intraday_window_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
