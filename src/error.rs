//! Error types for SankaraConnect

use thiserror::Error;

/// Result type alias for SankaraConnect operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in SankaraConnect
///
/// None of these are fatal to a conversation: the chat path recovers
/// upstream failures into canned replies and the speech path degrades to a
/// no-op. They surface only from constructors, config loading and the
/// platform adapters.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Chat service error (upstream LLM call)
    #[error("chat error: {0}")]
    Chat(String),

    /// Speech recognition error
    #[error("recognition error: {0}")]
    Recognition(String),

    /// Requested capability is not available on this host
    #[error("capability missing: {0}")]
    CapabilityMissing(String),

    /// Unknown language selection
    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
