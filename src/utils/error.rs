use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Upstream dataset {dataset} returned status {status}")]
    UpstreamStatus { dataset: String, status: u16 },

    #[error("Failed to decode response from dataset {dataset}: {source}")]
    Decode {
        dataset: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl LookupError {
    pub fn template(err: impl std::fmt::Display) -> Self {
        LookupError::Template {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;
