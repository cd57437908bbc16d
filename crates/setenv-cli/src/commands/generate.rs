//! `setenv generate`: render a context's settings and secrets into a `.env` file.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use setenv_core::{envfile, paths, ContextRegistry, SecretValue};
use setenv_secrets::SecretManager;
use tracing::{debug, warn};

use crate::{prompt, render, Project};

/// Generate command arguments.
#[derive(Args)]
pub struct GenerateArgs {
    /// Context to generate for (GLOBAL or a key of contexts.json5)
    #[arg(short, long)]
    pub context: String,

    /// Output file (defaults to <root>/.env)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fail instead of prompting for missing secrets
    #[arg(long)]
    pub no_prompt: bool,
}

/// Run the generate command.
pub async fn run(project: &Project, args: GenerateArgs) -> anyhow::Result<()> {
    let registry = ContextRegistry::load_or_empty(&paths::contexts_file(&project.root))?;
    if !registry.contains(&args.context) {
        anyhow::bail!(
            "Unknown context '{}'; configured contexts: {}",
            args.context,
            registry.ids().collect::<Vec<_>>().join(", ")
        );
    }

    let mut vars: BTreeMap<String, SecretValue> = registry
        .env_for(&args.context)
        .into_iter()
        .map(|(key, value)| (key, SecretValue::new(value)))
        .collect();

    let required = registry.required_secrets(&args.context);
    if SecretManager::is_enabled(&project.root) || !required.is_empty() {
        let mut manager = SecretManager::new(
            paths::secrets_file(&project.root),
            registry.clone(),
            project.passphrase()?,
        );
        manager.load().await?;

        let mut changed = false;
        for (context, key) in &required {
            if manager.has_secret(context, key)? {
                continue;
            }
            if args.no_prompt {
                anyhow::bail!("Missing secret '{}/{}' (run without --no-prompt to enter it)", context, key);
            }
            let value = prompt::secret_value(context, key)?;
            manager.set_secret(context, key, value.expose()).await?;
            changed = true;
        }
        if changed {
            manager.persist().await?;
        }

        for layer in registry.layers(&args.context) {
            for (key, value) in manager.get_secrets(layer).await? {
                if !envfile::is_valid_key(&key) {
                    warn!(context = layer, key = %key, "skipping secret that is not a valid variable name");
                    continue;
                }
                vars.insert(key, value);
            }
        }
    } else {
        debug!("no secret store and no required secrets; skipping password");
    }

    let output = args
        .output
        .unwrap_or_else(|| paths::env_file(&project.root));
    let contents = envfile::render(vars.iter().map(|(k, v)| (k.as_str(), v.expose())));
    envfile::write(&output, &contents)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    render::success(format!(
        "Wrote {} variable(s) for '{}' to {}",
        vars.len(),
        args.context,
        output.display()
    ));
    Ok(())
}
