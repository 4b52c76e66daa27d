//! Error types for parley.

use thiserror::Error;

use crate::lookup::TemplateError;

/// Default result type for parley.
pub type BotResult<T> = Result<T, BotError>;

/// Errors that can occur while handling a message or running the bot.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// User-supplied pattern key does not compile.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The knowledge store could not serve the request. Retryable.
    #[error("Knowledge store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[cfg(feature = "cli")]
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    /// An input line that could not be decoded.
    #[error("Malformed input line: {0}")]
    MalformedLine(String),

    /// The transport reached end of input.
    #[error("Transport closed")]
    TransportClosed,

    #[error("{0}")]
    Other(String),
}

impl BotError {
    /// Creates a generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Wraps a backend failure as a store outage.
    pub fn store<E: std::fmt::Display>(err: E) -> Self {
        Self::StoreUnavailable(err.to_string())
    }

    /// Whether the same message may succeed if sent again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}
