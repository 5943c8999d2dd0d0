//! Error handling for the SharedSpoon client

use std::fmt;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the SharedSpoon client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Non-2xx API response that is not an auth rejection or a missing
    /// resource. Carries the server-provided message when one was present.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// No credential, or the stored credential was rejected (401/403)
    #[error("authentication required")]
    AuthRequired,

    /// Single-resource lookup miss (404)
    #[error("not found")]
    NotFound,

    /// Client-side validation failure; the request never reached the network
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// Whether this error means the stored credential is invalid or expired
    /// and the user should be sent back through sign-in.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, Error::AuthRequired)
    }
}
