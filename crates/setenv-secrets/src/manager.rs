//! The on-disk secret store and its in-memory manager.
//!
//! [`SecretManager`] owns `config/secrets.json` for one CLI run: it loads the
//! whole file, checks the passphrase against every stored token, hands out
//! decrypted values per context, and writes the whole file back on
//! [`SecretManager::persist`]. Nothing touches disk between `load` and
//! `persist`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use setenv_core::{paths, ContextRegistry, Passphrase, SecretValue};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, trace, warn};

use crate::codec;
use crate::crypto::SecretCipher;
use crate::error::{Result, SecretError};
use crate::types::{SecretMap, SecretRef, StoreReport};

/// Passphrase-scoped manager for one secret store file.
#[derive(Debug)]
pub struct SecretManager {
    path: PathBuf,
    registry: ContextRegistry,
    cipher: SecretCipher,
    /// `None` until [`SecretManager::load`] succeeds.
    secrets: Option<SecretMap>,
}

impl SecretManager {
    /// Create a manager for the store at `path`. Call [`load`](Self::load) next.
    pub fn new(path: impl Into<PathBuf>, registry: ContextRegistry, passphrase: Passphrase) -> Self {
        Self {
            path: path.into(),
            registry,
            cipher: SecretCipher::new(passphrase),
            secrets: None,
        }
    }

    /// Create a manager for the project at `root`, reading its context
    /// configuration from the conventional location.
    pub fn for_project(root: &Path, passphrase: Passphrase) -> Result<Self> {
        let registry = ContextRegistry::load_or_empty(&paths::contexts_file(root))?;
        Ok(Self::new(paths::secrets_file(root), registry, passphrase))
    }

    /// Whether the project at `root` has a secret store file.
    pub fn is_enabled(root: &Path) -> bool {
        paths::secrets_file(root).is_file()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn registry(&self) -> &ContextRegistry {
        &self.registry
    }

    pub fn is_loaded(&self) -> bool {
        self.secrets.is_some()
    }

    /// Read the store and verify the passphrase.
    ///
    /// A missing file is an empty store. Every stored token is decrypted once;
    /// the first authentication failure is returned as
    /// [`SecretError::InvalidPassword`].
    pub async fn load(&mut self) -> Result<()> {
        let secrets = read_store(&self.path).await?;

        for context in secrets.keys() {
            if !self.registry.contains(context) {
                warn!(context = %context, "stored context is not configured; its secrets are unreachable");
            }
        }

        let tokens: Vec<&str> = secrets
            .values()
            .flat_map(|entries| entries.values())
            .map(String::as_str)
            .collect();
        try_join_all(tokens.iter().map(|token| self.cipher.decrypt(token))).await?;

        debug!(
            path = %self.path.display(),
            contexts = secrets.len(),
            secrets = tokens.len(),
            "loaded secret store"
        );
        self.secrets = Some(secrets);
        Ok(())
    }

    /// Decrypt every secret of `context`.
    ///
    /// The context is validated before anything is decrypted. A valid context
    /// with nothing stored yields an empty map.
    pub async fn get_secrets(&self, context: &str) -> Result<BTreeMap<String, SecretValue>> {
        self.check_context(context)?;
        let Some(entries) = self.loaded()?.get(context) else {
            return Ok(BTreeMap::new());
        };

        let values = try_join_all(entries.iter().map(|(key, token)| async move {
            let value = self.cipher.decrypt(token).await?;
            Ok::<_, SecretError>((key.clone(), value))
        }))
        .await?;

        trace!(context, count = values.len(), "decrypted context secrets");
        Ok(values.into_iter().collect())
    }

    /// Whether `context` has a stored value for `key`. No decryption.
    pub fn has_secret(&self, context: &str, key: &str) -> Result<bool> {
        self.check_context(context)?;
        Ok(self
            .loaded()?
            .get(context)
            .is_some_and(|entries| entries.contains_key(key)))
    }

    /// Encrypt `value` and store it in memory under `context`/`key`.
    pub async fn set_secret(&mut self, context: &str, key: &str, value: &str) -> Result<()> {
        self.check_context(context)?;
        if key.is_empty() {
            return Err(SecretError::InvalidName("name must not be empty".to_string()));
        }
        self.loaded()?;

        let token = self.cipher.encrypt(value).await?;
        self.loaded_mut()?
            .entry(context.to_string())
            .or_default()
            .insert(key.to_string(), token);

        debug!(context, key, "secret set");
        Ok(())
    }

    /// Remove `context`/`key` from memory. Returns whether it existed.
    pub fn delete_secret(&mut self, context: &str, key: &str) -> Result<bool> {
        self.check_context(context)?;
        let secrets = self.loaded_mut()?;

        let Some(entries) = secrets.get_mut(context) else {
            return Ok(false);
        };
        let removed = entries.remove(key).is_some();
        if entries.is_empty() {
            secrets.remove(context);
        }

        debug!(context, key, removed, "secret deleted");
        Ok(removed)
    }

    /// Write the whole in-memory store back to disk.
    pub async fn persist(&self) -> Result<()> {
        let secrets = self.loaded()?;
        let json = serde_json::to_string_pretty(secrets)?;
        write_store(&self.path, json.as_bytes()).await?;

        info!(path = %self.path.display(), contexts = secrets.len(), "secret store saved");
        Ok(())
    }

    /// Re-encrypt every secret under `new_passphrase`, in memory.
    ///
    /// Entries are rotated one by one; if one fails to decrypt, the error is
    /// returned and the entries already rotated stay rotated. On success the
    /// manager uses the new passphrase from then on. Call
    /// [`persist`](Self::persist) to make the rotation durable.
    pub async fn rotate(&mut self, new_passphrase: Passphrase) -> Result<()> {
        let next = SecretCipher::new(new_passphrase);
        let secrets = self.secrets.as_mut().ok_or(SecretError::NotLoaded)?;

        let mut rotated = 0usize;
        for (context, entries) in secrets.iter_mut() {
            for (key, token) in entries.iter_mut() {
                let value = self.cipher.decrypt(token).await?;
                *token = next.encrypt(value.expose()).await?;
                rotated += 1;
                trace!(context = %context, key = %key, "secret rotated");
            }
        }

        self.cipher = next;
        info!(rotated, "rotated secret store passphrase");
        Ok(())
    }

    fn check_context(&self, context: &str) -> Result<()> {
        if self.registry.contains(context) {
            Ok(())
        } else {
            Err(SecretError::InvalidContext(context.to_string()))
        }
    }

    fn loaded(&self) -> Result<&SecretMap> {
        self.secrets.as_ref().ok_or(SecretError::NotLoaded)
    }

    fn loaded_mut(&mut self) -> Result<&mut SecretMap> {
        self.secrets.as_mut().ok_or(SecretError::NotLoaded)
    }
}

/// Structurally check the store at `path` without a passphrase.
///
/// Lists every entry and flags tokens that do not parse. A missing file
/// yields an empty report.
pub async fn inspect(path: &Path) -> Result<StoreReport> {
    let secrets = read_store(path).await?;
    let mut report = StoreReport::default();

    for (context, entries) in &secrets {
        for (key, token) in entries {
            let entry = SecretRef {
                context: context.clone(),
                key: key.clone(),
            };
            if let Err(e) = codec::deserialize(token) {
                warn!(context = %context, key = %key, "malformed token: {e}");
                report.malformed.push(entry.clone());
            }
            report.entries.push(entry);
        }
    }

    Ok(report)
}

async fn read_store(path: &Path) -> Result<SecretMap> {
    if !tokio::fs::try_exists(path).await? {
        debug!(path = %path.display(), "no secret store, starting empty");
        return Ok(SecretMap::new());
    }

    let data = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&data)?)
}

/// Replace `path` with `data` via a sibling temp file, mode 0600 on Unix.
///
/// The temp file is created fresh with its final mode and removed if the
/// write or the rename fails.
async fn write_store(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let temp_path = path.with_extension("json.tmp");
    match tokio::fs::remove_file(&temp_path).await {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e.into()),
        _ => {}
    }

    let result = async {
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&temp_path, path).await
    }
    .await;

    if let Err(e) = result {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e.into());
    }
    Ok(())
}
