use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewsError {
    #[error("Failed to send the HTTP request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid news source URL '{0}'")]
    InvalidUrl(String),

    #[error("Invalid user agent '{0}'")]
    InvalidUserAgent(String),

    #[error("Invalid CSS selector '{0}'")]
    Selector(String),
}
