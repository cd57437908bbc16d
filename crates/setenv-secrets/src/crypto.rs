//! AES-256-GCM encryption keyed by PBKDF2-HMAC-SHA512 over a passphrase.
//!
//! Every value gets its own random salt (so its own key) and its own random
//! 16-byte IV. The parameters below are a compatibility contract with stores
//! written by the earlier Node.js tool: `crypto.pbkdf2(pass, salt, 1000, 32,
//! 'sha512')` feeding `aes-256-gcm` with a 16-byte IV and a 16-byte tag.

use std::sync::Arc;

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::AesGcm;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use setenv_core::{Passphrase, SecretValue};
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::codec;
use crate::error::{Result, SecretError};
use crate::types::{SecretParts, IV_LEN, TAG_LEN};

/// AES-256-GCM with a 128-bit nonce.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

pub const KEY_LEN: usize = 32;
pub const SALT_LEN: usize = 16;
pub const PBKDF2_ITERATIONS: u32 = 1000;

/// Derive the AES key for one value from the passphrase and that value's salt.
pub fn derive_key(passphrase: &[u8], salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha512>(passphrase, salt, PBKDF2_ITERATIONS, &mut key[..]);
    key
}

fn cipher_for(passphrase: &Passphrase, salt: &[u8]) -> Result<Aes256Gcm16> {
    let key = derive_key(passphrase.expose().as_bytes(), salt);
    Aes256Gcm16::new_from_slice(&key[..]).map_err(|e| SecretError::EncryptionFailed(e.to_string()))
}

/// Encrypt `plaintext` under a fresh salt and IV. Blocking: runs the KDF.
pub fn seal(passphrase: &Passphrase, plaintext: &str) -> Result<SecretParts> {
    let mut salt = vec![0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);

    let cipher = cipher_for(passphrase, &salt)?;
    let mut buffer = plaintext.as_bytes().to_vec();
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(&iv), b"", &mut buffer)
        .map_err(|e| SecretError::EncryptionFailed(e.to_string()))?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(&tag);

    Ok(SecretParts {
        encrypted_data: buffer,
        iv,
        salt,
        tag: tag_bytes,
    })
}

/// Decrypt and authenticate `parts`. Blocking: runs the KDF.
///
/// A tag mismatch is reported as [`SecretError::InvalidPassword`]; it is the
/// only way a wrong passphrase shows up.
pub fn open(passphrase: &Passphrase, parts: &SecretParts) -> Result<SecretValue> {
    let cipher = cipher_for(passphrase, &parts.salt)?;
    let mut buffer = Zeroizing::new(parts.encrypted_data.clone());
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(&parts.iv),
            b"",
            &mut buffer,
            GenericArray::from_slice(&parts.tag),
        )
        .map_err(|_| SecretError::InvalidPassword)?;

    let plaintext = std::str::from_utf8(&buffer)
        .map_err(|_| SecretError::MalformedToken("plaintext is not valid UTF-8".to_string()))?;
    Ok(SecretValue::new(plaintext))
}

/// Passphrase-scoped encryption engine producing and consuming tokens.
///
/// Key derivation is CPU-bound, so each call runs it on the blocking pool;
/// concurrent calls derive in parallel.
#[derive(Clone)]
pub struct SecretCipher {
    passphrase: Arc<Passphrase>,
}

impl SecretCipher {
    pub fn new(passphrase: Passphrase) -> Self {
        Self {
            passphrase: Arc::new(passphrase),
        }
    }

    /// Encrypt `plaintext` into a token. Never returns the same token twice.
    pub async fn encrypt(&self, plaintext: &str) -> Result<String> {
        let passphrase = Arc::clone(&self.passphrase);
        let plaintext = SecretValue::new(plaintext);
        let parts =
            tokio::task::spawn_blocking(move || seal(&passphrase, plaintext.expose())).await??;
        Ok(codec::serialize(&parts))
    }

    /// Decrypt a token. Malformed tokens fail before any key derivation.
    pub async fn decrypt(&self, token: &str) -> Result<SecretValue> {
        let parts = codec::deserialize(token)?;
        let passphrase = Arc::clone(&self.passphrase);
        tokio::task::spawn_blocking(move || open(&passphrase, &parts)).await?
    }
}

impl std::fmt::Debug for SecretCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretCipher")
            .field("passphrase", &self.passphrase)
            .finish()
    }
}
