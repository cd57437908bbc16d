//! Passphrase-encrypted secret storage for setenv.
//!
//! Secrets are grouped by context and stored in `config/secrets.json` as
//! AES-256-GCM tokens whose keys are derived from a user passphrase with
//! PBKDF2-HMAC-SHA512. See [`SecretManager`] for the lifecycle.

pub mod codec;
pub mod crypto;
pub mod error;
pub mod manager;
pub mod types;

pub use crypto::SecretCipher;
pub use error::{Result, SecretError};
pub use manager::{inspect, SecretManager};
pub use types::{SecretParts, SecretRef, StoreReport};
