//! REST client errors.

use thiserror::Error;

/// Result type for REST operations.
pub type RestResult<T> = Result<T, RestError>;

#[derive(Error, Debug)]
pub enum RestError {
    /// The client could not be built or the base URL is unusable.
    #[error("invalid REST configuration: {message}")]
    Configuration { message: String },

    /// The request never produced a response.
    #[error("network error: {message}")]
    Network { message: String },

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The server reported an error inside a success response.
    #[error("server error: {0}")]
    Remote(String),

    #[error("failed to (de)serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RestError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
