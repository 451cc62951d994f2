use slotplan_core::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("no JSON object found in response: {0}")]
    NoJson(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
