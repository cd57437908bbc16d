//! Diagnostic command.

use console::style;
use setenv_core::{paths, ConfigError, ContextRegistry};

use crate::render::{self, Status};
use crate::Project;

/// Run the doctor command.
pub async fn run(project: &Project) -> anyhow::Result<()> {
    println!("setenv doctor\n");

    let mut errors = 0;
    let mut warnings = 0;

    println!("Checking project layout...");
    if project.root.is_dir() {
        render::status(Status::Ok, format!("Project root: {}", project.root.display()));
    } else {
        render::status(Status::Fail, format!("Project root missing: {}", project.root.display()));
        errors += 1;
    }

    println!("\nChecking contexts...");
    let contexts_path = paths::contexts_file(&project.root);
    let registry = match ContextRegistry::load(&contexts_path) {
        Ok(registry) => {
            let count = registry.ids().count() - 1;
            render::status(Status::Ok, format!("{} context(s) configured", count));
            registry
        }
        Err(ConfigError::NotFound(_)) => {
            render::status(
                Status::Warn,
                format!("{} not found; only GLOBAL is available", contexts_path.display()),
            );
            warnings += 1;
            ContextRegistry::default()
        }
        Err(e) => {
            render::status(Status::Fail, e);
            errors += 1;
            ContextRegistry::default()
        }
    };

    println!("\nChecking secret store...");
    let secrets_path = paths::secrets_file(&project.root);
    if !secrets_path.exists() {
        render::status(
            Status::Warn,
            format!("{} not found; secrets are disabled", secrets_path.display()),
        );
        warnings += 1;
    } else {
        match setenv_secrets::inspect(&secrets_path).await {
            Ok(report) => {
                render::status(
                    Status::Ok,
                    format!(
                        "{} secret(s) across {} context(s)",
                        report.entries.len(),
                        report.context_count()
                    ),
                );
                for entry in &report.malformed {
                    render::status(
                        Status::Fail,
                        format!("Malformed token: {}/{}", entry.context, entry.key),
                    );
                    errors += 1;
                }
                let mut unknown: Vec<&str> = report
                    .entries
                    .iter()
                    .map(|e| e.context.as_str())
                    .filter(|context| !registry.contains(context))
                    .collect();
                unknown.dedup();
                for context in unknown {
                    render::status(
                        Status::Warn,
                        format!("Stored context '{}' is not configured", context),
                    );
                    warnings += 1;
                }
            }
            Err(e) => {
                render::status(Status::Fail, format!("Unreadable secret store: {}", e));
                errors += 1;
            }
        }
    }

    println!("\nChecking env file...");
    let env_path = paths::env_file(&project.root);
    if env_path.exists() {
        render::status(Status::Ok, format!("{} exists", env_path.display()));
    } else {
        render::status(
            Status::Warn,
            format!("{} missing; run 'setenv generate --context <ID>'", env_path.display()),
        );
        warnings += 1;
    }

    println!("\n{}", style("Summary").bold());
    println!("  Errors: {}", if errors > 0 { style(errors).red() } else { style(errors).green() });
    println!("  Warnings: {}", if warnings > 0 { style(warnings).yellow() } else { style(warnings).green() });

    if errors > 0 {
        anyhow::bail!("{} error(s) found", errors);
    }

    Ok(())
}
