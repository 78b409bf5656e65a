//! Error types for call execution
//!
//! Every failure is terminal for the invocation that produced it. Messages carry
//! the operation, HTTP method and path query involved so a failed run can be
//! diagnosed without re-running it.

use thiserror::Error;

/// Errors produced while executing a lifecycle call
#[derive(Error, Debug)]
pub enum CallError {
    /// The call cannot be performed with the given configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request could not be built or sent
    #[error("transport error during {method} {url}: {message}")]
    Transport {
        method: String,
        url: String,
        message: String,
    },

    /// The remote answered with a status other than 200
    #[error("{method} {url} returned status: {status}, body: {body}")]
    Remote {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    /// The response could not be parsed, queried or re-serialised
    #[error("extraction error: {0}")]
    Extraction(String),
}

impl CallError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction(message.into())
    }

    pub fn transport(method: &str, url: &str, message: impl std::fmt::Display) -> Self {
        Self::Transport {
            method: method.to_string(),
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    pub fn remote(method: &str, url: &str, status: u16, body: impl Into<String>) -> Self {
        Self::Remote {
            method: method.to_string(),
            url: url.to_string(),
            status,
            body: body.into(),
        }
    }

    /// Status code of a remote failure, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CallError>;
