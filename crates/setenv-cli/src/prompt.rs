//! Hidden terminal input for passwords and secret values.

use anyhow::Context;
use setenv_core::{Passphrase, SecretValue};

/// Read a password without echoing it.
pub fn passphrase(prompt: &str) -> anyhow::Result<Passphrase> {
    let input = rpassword::prompt_password(prompt).context("Failed to read password")?;
    Ok(Passphrase::new(input))
}

/// Read a new password twice and require both entries to match.
pub fn new_passphrase() -> anyhow::Result<Passphrase> {
    let first = passphrase("New secrets password: ")?;
    if first.is_empty() {
        anyhow::bail!("Password must not be empty");
    }
    let second = passphrase("Confirm new secrets password: ")?;
    if first != second {
        anyhow::bail!("Passwords do not match");
    }
    Ok(first)
}

/// Read the value of `context`/`key` without echoing it.
pub fn secret_value(context: &str, key: &str) -> anyhow::Result<SecretValue> {
    let input = rpassword::prompt_password(format!("Enter value for {context}/{key}: "))
        .context("Failed to read secret")?;
    Ok(SecretValue::new(input))
}
