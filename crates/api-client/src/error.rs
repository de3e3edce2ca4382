use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to send the HTTP request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("The price provider answered HTTP {status} for {ticker}: {message}")]
    Status {
        ticker: String,
        status: u16,
        message: String,
    },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),

    #[error("Rate limited by the price provider for {ticker} after {attempts} attempts")]
    RateLimited { ticker: String, attempts: u32 },
}

impl ApiError {
    /// Throttling that outlived the retry budget, as opposed to a plain fetch failure.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. })
    }
}
