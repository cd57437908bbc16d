//! Data structures shared by the codec, cipher and manager.

use serde::Serialize;
use std::collections::BTreeMap;

/// Length of the AES-GCM initialization vector, in bytes.
pub const IV_LEN: usize = 16;

/// Length of the AES-GCM authentication tag, in bytes.
pub const TAG_LEN: usize = 16;

/// The decomposed form of one encrypted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretParts {
    /// Raw ciphertext, without the tag. Empty for an empty plaintext.
    pub encrypted_data: Vec<u8>,

    /// Per-encryption random IV.
    pub iv: [u8; IV_LEN],

    /// Per-value random salt the key is derived with.
    pub salt: Vec<u8>,

    /// Detached AEAD authentication tag.
    pub tag: [u8; TAG_LEN],
}

/// Encrypted tokens of one context, keyed by secret name.
pub type ContextSecrets = BTreeMap<String, String>;

/// The whole store: context identifier to that context's tokens.
///
/// `BTreeMap` keeps the persisted file sorted and diffable.
pub type SecretMap = BTreeMap<String, ContextSecrets>;

/// A stored secret's location, with no plaintext or ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SecretRef {
    pub context: String,
    pub key: String,
}

/// Result of a structural, passphrase-free check of a store file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreReport {
    /// Every stored secret, sorted by context then key.
    pub entries: Vec<SecretRef>,

    /// Entries whose token does not parse.
    pub malformed: Vec<SecretRef>,
}

impl StoreReport {
    /// Number of distinct contexts with at least one entry.
    pub fn context_count(&self) -> usize {
        let mut contexts: Vec<&str> = self.entries.iter().map(|e| e.context.as_str()).collect();
        contexts.dedup();
        contexts.len()
    }

    pub fn is_healthy(&self) -> bool {
        self.malformed.is_empty()
    }
}
