//! # setenv-core
//!
//! Shared building blocks for the setenv crates:
//!
//! - **Configuration**: loading and validating `config/contexts.json5`
//! - **Paths**: the conventional project layout (`config/`, `.env`)
//! - **Secrets**: zeroize-on-drop, redacted wrappers for passphrases and plaintexts
//! - **Env files**: rendering and writing `.env` output

pub mod config;
pub mod envfile;
pub mod error;
pub mod paths;
pub mod secret;

// Re-exports for convenience
pub use config::{ContextDefinition, ContextRegistry, GLOBAL_CONTEXT};
pub use error::{ConfigError, Result};
pub use secret::{Passphrase, SecretValue};
