//! setenv command-line interface.

pub mod commands;
pub mod prompt;
pub mod render;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use setenv_core::{paths, Passphrase};
use setenv_secrets::SecretManager;

/// setenv - encrypted per-context secrets and .env generation
#[derive(Parser)]
#[command(name = "setenv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Project root containing config/ (defaults to the current directory)
    #[arg(long, env = "SETENV_ROOT", global = true)]
    pub root: Option<PathBuf>,

    /// Secrets password (prompted for when omitted)
    #[arg(long, env = "SETENV_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Write a .env file for a context
    Generate(commands::generate::GenerateArgs),

    /// Manage encrypted secrets
    Secrets(commands::secrets::SecretsArgs),

    /// List configured contexts
    Contexts,

    /// Check project configuration and the secret store
    Doctor,

    /// Show version information
    Version,
}

/// The project a command operates on, plus how to obtain its passphrase.
pub struct Project {
    pub root: PathBuf,
    password: Option<Passphrase>,
}

impl Project {
    pub fn new(root: Option<&Path>, password: Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            root: paths::project_root(root)?,
            password: password.map(Passphrase::new),
        })
    }

    /// Whether the project already has a secret store file.
    pub fn has_store(&self) -> bool {
        SecretManager::is_enabled(&self.root)
    }

    /// Whether obtaining the passphrase will create a new store, so an
    /// interactive entry must be confirmed.
    fn confirms_new_passphrase(&self) -> bool {
        self.password.is_none() && !self.has_store()
    }

    /// The passphrase from `--password`/`SETENV_PASSWORD`, else prompted.
    ///
    /// Prompts twice when no store exists yet.
    pub fn passphrase(&self) -> anyhow::Result<Passphrase> {
        let passphrase = match &self.password {
            Some(p) => p.clone(),
            None if self.confirms_new_passphrase() => prompt::new_passphrase()?,
            None => prompt::passphrase("Secrets password: ")?,
        };
        if passphrase.is_empty() {
            anyhow::bail!("Password must not be empty");
        }
        Ok(passphrase)
    }

    /// Build and load the project's secret manager, creating the store on
    /// first persist.
    pub async fn open_secrets(&self) -> anyhow::Result<SecretManager> {
        let mut manager = SecretManager::for_project(&self.root, self.passphrase()?)?;
        manager.load().await?;
        Ok(manager)
    }

    /// Like [`open_secrets`](Self::open_secrets), but fails before asking for
    /// a passphrase when the project has no store.
    pub async fn open_existing_secrets(&self) -> anyhow::Result<SecretManager> {
        if !self.has_store() {
            anyhow::bail!(
                "No secret store at {}; add one with 'setenv secrets set'",
                paths::secrets_file(&self.root).display()
            );
        }
        self.open_secrets().await
    }
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let project = Project::new(cli.root.as_deref(), cli.password)?;

    match cli.command {
        Commands::Generate(args) => commands::generate::run(&project, args).await,
        Commands::Secrets(args) => commands::secrets::run(&project, args).await,
        Commands::Contexts => commands::contexts::run(&project),
        Commands::Doctor => commands::doctor::run(&project).await,
        Commands::Version => {
            println!("setenv {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
