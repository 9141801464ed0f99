use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlabzError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream source is rate limited")]
    RateLimited,

    #[error("Service unavailable: rate limited and no cached data for {0}")]
    ServiceUnavailable(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
