use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unsupported interval: {0}")]
    UnsupportedInterval(String),
}
