//! Remote object error types

use thiserror::Error;

/// Errors raised while reconciling a remote object
#[derive(Error, Debug)]
pub enum RestError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Unexpected response code '{status}': {body}")]
    Remote { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

/// Coarse classification of [`RestError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller input is malformed. Never retried.
    Validation,
    /// The server reported the object as absent (HTTP 404).
    NotFound,
    /// Non-success status, transport failure, or an unusable response.
    Remote,
}

impl RestError {
    pub fn validation(message: impl Into<String>) -> Self {
        RestError::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RestError::Validation(_) => ErrorKind::Validation,
            RestError::NotFound(_) => ErrorKind::NotFound,
            RestError::Remote { .. } | RestError::Transport(_) | RestError::InvalidResponse(_) => {
                ErrorKind::Remote
            }
        }
    }

    /// HTTP status carried by the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            RestError::Remote { status, .. } => Some(*status),
            RestError::NotFound(_) => Some(404),
            RestError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the object is known to be gone
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

pub type Result<T> = std::result::Result<T, RestError>;
