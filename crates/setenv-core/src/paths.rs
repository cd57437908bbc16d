//! Project layout resolution.
//!
//! Every path setenv touches lives under a project root:
//!
//! ```text
//! <root>/config/contexts.json5   context definitions (read-only)
//! <root>/config/secrets.json     encrypted secret store
//! <root>/.env                    generated environment file
//! ```

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Directory holding setenv's configuration files.
pub const CONFIG_DIR: &str = "config";

/// File name of the encrypted secret store.
pub const SECRETS_FILE: &str = "secrets.json";

/// File name of the context configuration.
pub const CONTEXTS_FILE: &str = "contexts.json5";

/// File name of the generated environment file.
pub const ENV_FILE: &str = ".env";

/// Resolve the project root.
///
/// An explicit path wins (with `~/` expanded); otherwise the current
/// working directory is used.
pub fn project_root(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match explicit {
        Some(path) => Ok(expand_tilde(&path.to_string_lossy())),
        None => Ok(std::env::current_dir()?),
    }
}

/// Get the configuration directory (`<root>/config`).
pub fn config_dir(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR)
}

/// Get the secret store path (`<root>/config/secrets.json`).
pub fn secrets_file(root: &Path) -> PathBuf {
    config_dir(root).join(SECRETS_FILE)
}

/// Get the context configuration path (`<root>/config/contexts.json5`).
pub fn contexts_file(root: &Path) -> PathBuf {
    config_dir(root).join(CONTEXTS_FILE)
}

/// Get the default env file path (`<root>/.env`).
pub fn env_file(root: &Path) -> PathBuf {
    root.join(ENV_FILE)
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
