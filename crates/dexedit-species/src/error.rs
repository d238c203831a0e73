use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeciesError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error from {0}: {1}")]
    ApiError(String, String),

    #[error("rate limit from {0}, retry after {1}s")]
    RateLimit(String, u64),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("species not found: {0}")]
    NotFound(String),

    #[error("invalid species id: {0}")]
    InvalidId(String),
}

pub type Result<T> = std::result::Result<T, SpeciesError>;
