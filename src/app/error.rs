use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Snapshot decode error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Index {index} out of range for visible list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FeedError {
    /// Failures raised while asking the provider for a fresh batch.
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, Self::Provider(_) | Self::Http(_) | Self::InvalidUrl(_))
    }

    /// Failures of the persisted store, including undecodable blobs.
    pub fn is_cache_failure(&self) -> bool {
        matches!(
            self,
            Self::Cache(_) | Self::Database(_) | Self::Snapshot(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;
