use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlciError {
    #[error("GitLab API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("No pipelines running or available on {0}")]
    PipelineNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Git error: {0}")]
    Git(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GlciError>;
