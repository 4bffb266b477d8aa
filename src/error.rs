use thiserror::Error;

#[derive(Error, Debug)]
pub enum CycleTimeError {
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("API kept returning status {status} after {retries} retries")]
    ApiErrorAfterRetries { status: u16, retries: u32 },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CycleTimeError>;
