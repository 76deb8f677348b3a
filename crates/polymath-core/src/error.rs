use thiserror::Error;

pub type Result<T> = std::result::Result<T, PolymathError>;

#[derive(Debug, Error)]
pub enum PolymathError {
    /// Missing or malformed setting. Raised before any network activity.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Store unreachable, sign-in rejected, or namespace selection failed.
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Write failed: {0}")]
    Write(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Parse failed: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PolymathError {
    pub fn missing_env(key: &str) -> Self {
        PolymathError::Configuration(format!("Missing required environment variable: {}", key))
    }

    /// Configuration and connection failures abort a run; everything else
    /// is expected to be logged and degraded by the component that raised it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PolymathError::Configuration(_) | PolymathError::Connection(_)
        )
    }
}
