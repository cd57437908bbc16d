//! Error types for secret management.

use setenv_core::ConfigError;
use thiserror::Error;

/// Errors that can occur during secret operations.
#[derive(Debug, Error)]
pub enum SecretError {
    /// Authenticated decryption failed: wrong passphrase or tampered data.
    #[error("Invalid password. Re-run with the correct password.")]
    InvalidPassword,

    #[error("Unknown context '{0}'; add it to config/contexts.json5")]
    InvalidContext(String),

    #[error("Malformed secret token: {0}")]
    MalformedToken(String),

    #[error("Invalid secret name: {0}")]
    InvalidName(String),

    #[error("Secret store has not been loaded")]
    NotLoaded,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Key derivation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result alias for secret operations.
pub type Result<T> = std::result::Result<T, SecretError>;
