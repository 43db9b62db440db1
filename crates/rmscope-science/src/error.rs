use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} {reason}")]
    Status { status: u16, reason: String },

    #[error("HTTP 429 Too Many Requests")]
    RateLimited { retry_after: Option<String> },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{last} (after {attempts} attempts)")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Attempts made before giving up; 1 for errors that were never retried.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } => *attempts,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
