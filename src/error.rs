// src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RadarError {
    #[error("API key is missing. Add your key in settings or set GEMINI_API_KEY.")]
    CredentialMissing,

    #[error("API quota exceeded (429). Add your own API key in settings to continue.")]
    QuotaExceeded,

    #[error("unable to fetch news from any source; check your network connection")]
    NetworkUnavailable,

    #[error("model returned an empty response")]
    EmptyModelResponse,

    #[error("model response did not match the expected shape: {0}")]
    ModelShape(String),

    #[error("feed parse error: {0}")]
    FeedParse(String),

    #[error("at least {min} votes are required before analysis; have {have}")]
    NotEnoughVotes { have: usize, min: usize },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, RadarError>;
