//! # Error Handling
//!
//! Crate-level error type for robinctl. Each component defines its own
//! `thiserror` error; this type collects them so library callers can match
//! on one enum while the CLI layer wraps them in `anyhow` with context.

use crate::projection::UnknownFieldError;
use crate::registry::RegistryError;
use crate::session::SessionError;

/// Custom result type for robinctl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for robinctl
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Invalid operator input (malformed JSON payload, empty id, bad URL)
    #[error("Input error: {0}")]
    Input(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A requested table field does not exist
    #[error(transparent)]
    UnknownField(#[from] UnknownFieldError),

    /// Registry call failed. `context` names the operation and frontend id.
    #[error("{context}")]
    Registry {
        context: String,
        #[source]
        source: RegistryError,
    },

    /// Registration lifecycle failure
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl Error {
    /// Create a new input error
    pub fn input<S: Into<String>>(message: S) -> Self {
        Self::Input(message.into())
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Wrap a registry failure, e.g. `Error::registry("Failed to get frontend 'web'", err)`
    pub fn registry<S: Into<String>>(context: S, source: RegistryError) -> Self {
        Self::Registry { context: context.into(), source }
    }

    /// Whether this error was caused by operator input rather than the registry
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Input(_) | Self::Config(_) | Self::UnknownField(_))
    }
}
