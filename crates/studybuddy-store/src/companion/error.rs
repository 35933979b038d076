use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompanionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Companion server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Feed sent a value that is not a score: {0:?}")]
    InvalidScore(String),

    #[error("Invalid companion configuration: {0}")]
    InvalidConfig(String),
}
