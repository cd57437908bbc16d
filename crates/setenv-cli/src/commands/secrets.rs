//! Secret management commands.
//!
//! Provides `setenv secrets set|get|list|delete|rotate` on top of
//! [`SecretManager`](setenv_secrets::SecretManager).

use clap::Args;
use setenv_core::{paths, Passphrase, SecretValue};

use crate::{prompt, render, Project};

/// Secrets command arguments.
#[derive(Args)]
pub struct SecretsArgs {
    #[command(subcommand)]
    pub command: SecretsCommand,
}

#[derive(clap::Subcommand)]
pub enum SecretsCommand {
    /// Store a secret (prompts for the value)
    Set {
        /// Context identifier (GLOBAL or a key of contexts.json5)
        context: String,

        /// Secret name
        key: String,

        /// Secret value (if omitted, prompts for hidden input)
        #[arg(long)]
        value: Option<String>,
    },

    /// Show the secrets of a context
    Get {
        /// Context identifier
        context: String,

        /// Print plaintext values instead of masking them
        #[arg(long)]
        reveal: bool,
    },

    /// List stored secrets (names only, no password needed)
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a secret
    Delete {
        /// Context identifier
        context: String,

        /// Secret name
        key: String,
    },

    /// Re-encrypt every secret under a new password
    Rotate {
        /// New password (if omitted, prompts twice)
        #[arg(long, env = "SETENV_NEW_PASSWORD", hide_env_values = true)]
        new_password: Option<String>,
    },
}

/// Run the secrets command.
pub async fn run(project: &Project, args: SecretsArgs) -> anyhow::Result<()> {
    match args.command {
        SecretsCommand::Set {
            context,
            key,
            value,
        } => {
            let mut manager = project.open_secrets().await?;
            let value = match value {
                Some(v) => SecretValue::new(v),
                None => prompt::secret_value(&context, &key)?,
            };
            if value.is_empty() {
                anyhow::bail!("Secret value must not be empty");
            }

            manager.set_secret(&context, &key, value.expose()).await?;
            manager.persist().await?;
            render::success(format!("Secret '{}/{}' stored.", context, key));
        }

        SecretsCommand::Get { context, reveal } => {
            let manager = project.open_existing_secrets().await?;
            let secrets = manager.get_secrets(&context).await?;
            if secrets.is_empty() {
                println!("No secrets stored for '{}'.", context);
            } else {
                render::print_secrets(&secrets, reveal);
            }
        }

        SecretsCommand::List { json } => {
            let report = setenv_secrets::inspect(&paths::secrets_file(&project.root)).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report.entries)?);
            } else if report.entries.is_empty() {
                println!("No secrets stored.");
            } else {
                render::print_entries(&report.entries);
            }
        }

        SecretsCommand::Delete { context, key } => {
            let mut manager = project.open_existing_secrets().await?;
            if !manager.delete_secret(&context, &key)? {
                anyhow::bail!("Secret '{}/{}' not found", context, key);
            }
            manager.persist().await?;
            render::success(format!("Secret '{}/{}' deleted.", context, key));
        }

        SecretsCommand::Rotate { new_password } => {
            let mut manager = project.open_existing_secrets().await?;
            let new_passphrase = match new_password {
                Some(p) if p.is_empty() => anyhow::bail!("Password must not be empty"),
                Some(p) => Passphrase::new(p),
                None => prompt::new_passphrase()?,
            };

            manager.rotate(new_passphrase).await?;
            manager.persist().await?;
            render::success("Secrets re-encrypted with the new password.");
        }
    }

    Ok(())
}
