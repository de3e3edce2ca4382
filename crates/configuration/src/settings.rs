use chrono::NaiveDate;
use core_types::Interval;
use serde::Deserialize;
use std::time::Duration;

/// The root configuration structure for the entire application.
///
/// Every section falls back to its `Default`, so an empty `config.toml` (or none at all)
/// yields a runnable setup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub price_source: PriceSourceConfig,
    pub history: HistoryConfig,
    pub summarizer: SummarizerConfig,
    pub news: NewsConfig,
    pub logging: LoggingConfig,
}

/// Where the HTTP API listens.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum accepted request body, in bytes.
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3002,
            body_limit_bytes: 1024 * 1024 * 10,
        }
    }
}

/// Connection and retry parameters for the historical price provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PriceSourceConfig {
    /// Base URL of the chart API, without a trailing slash.
    pub base_url: String,
    /// The provider rejects requests without a browser-like user agent.
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Total attempts per request when the provider signals rate limiting (including the first).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff_ms: u64,
    /// Factor applied to the delay after every retry.
    pub backoff_multiplier: f64,
    /// Width of each request window for intraday intervals.
    pub intraday_window_days: i64,
    /// Bar interval used for fresh backtests.
    pub backtest_interval: Interval,
    /// First day of price history requested by a fresh backtest.
    pub backtest_start: NaiveDate,
    /// Bar interval used for incremental history updates.
    pub update_interval: Interval,
}

impl PriceSourceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }
}

impl Default for PriceSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query2.finance.yahoo.com".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string(),
            request_timeout_secs: 30,
            max_attempts: 3,
            initial_backoff_ms: 500,
            backoff_multiplier: 2.0,
            intraday_window_days: 59,
            backtest_interval: Interval::OneDay,
            backtest_start: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or_default(),
            update_interval: Interval::OneDay,
        }
    }
}

/// Settings for incremental history updates.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Start date used when a portfolio has no recorded history yet.
    pub fallback_start: NaiveDate,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            fallback_start: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap_or_default(),
        }
    }
}

/// Credentials and model choice for the language-model summarizer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Empty disables the summarizer.
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub request_timeout_secs: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            request_timeout_secs: 60,
        }
    }
}

/// News pages scanned for articles.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub sources: Vec<String>,
    pub user_agent: String,
    /// Number of characters of article text kept as its summary.
    pub excerpt_chars: usize,
    /// Keywords used when a request does not name any.
    pub default_keywords: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                "https://www.cnbc.com/world/?region=world".to_string(),
                "https://sg.finance.yahoo.com/topic/latestnews/".to_string(),
            ],
            user_agent: "Mozilla/5.0".to_string(),
            excerpt_chars: 500,
            default_keywords: vec!["tech".to_string(), "finance".to_string()],
            request_timeout_secs: 20,
        }
    }
}

/// Log level and optional rolling log file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive, e.g. "info" or "pulse=debug,tower_http=info".
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
