use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to fetch {resource} (HTTP {status})")]
    Status { resource: String, status: u16 },

    #[error("Unexpected response for {resource}: {message}")]
    Decode { resource: String, message: String },

    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

pub type Result<T> = std::result::Result<T, FetchError>;
