use thiserror::Error;

#[derive(Error, Debug)]
pub enum SummarizerError {
    #[error("Chat completion request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Chat completion API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Chat completion response contained no message")]
    EmptyResponse,
}
