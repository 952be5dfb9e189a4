//! Error types for the persistence layer.

/// Errors that can occur while persisting or recovering chat history.
///
/// Most of these are logged and swallowed at the call site — chat keeps
/// working when durable storage is unavailable. Only [`InvalidKey`]
/// surfaces to the operator, at startup.
///
/// [`InvalidKey`]: StoreError::InvalidKey
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the history file failed.
    #[error("history file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Sealing the document failed.
    #[error("failed to encrypt history document")]
    Encrypt,

    /// The document could not be decrypted or failed authentication.
    #[error("failed to decrypt history document")]
    Decrypt,

    /// The configured key is not 32 bytes of hex.
    #[error("invalid history key: {0}")]
    InvalidKey(String),

    /// The history document could not be serialized.
    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}
