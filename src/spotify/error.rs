use thiserror::Error;

/// Failures talking to the music service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("environment variable {0} is not set")]
    MissingCredential(&'static str),

    #[error("failed to read credentials file: {0}")]
    EnvFile(#[from] dotenvy::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("request to {url} failed with status {status}")]
    Status { status: u16, url: String },

    #[error("still rate limited after {attempts} attempts: {url}")]
    RateLimited { url: String, attempts: u32 },

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
}
