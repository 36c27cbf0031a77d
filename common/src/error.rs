use thiserror::Error;

// Core internal errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("RAG service error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("Operation error: {0}")]
    Operation(String),
    #[error("JSON error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Url parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}
