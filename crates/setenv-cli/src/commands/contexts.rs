//! `setenv contexts`: list the configured contexts.

use console::style;
use setenv_core::{paths, ContextRegistry, GLOBAL_CONTEXT};

use crate::Project;

/// Run the contexts command.
pub fn run(project: &Project) -> anyhow::Result<()> {
    let registry = ContextRegistry::load_or_empty(&paths::contexts_file(&project.root))?;

    for id in registry.ids() {
        let definition = registry.get(id);
        let description = match (id, definition.and_then(|d| d.description.as_deref())) {
            (_, Some(description)) => description.to_string(),
            (GLOBAL_CONTEXT, None) => "shared by every context".to_string(),
            (_, None) => String::new(),
        };
        println!("{:<16} {}", style(id).bold(), style(description).dim());

        if let Some(definition) = definition {
            if !definition.env.is_empty() {
                let names: Vec<&str> = definition.env.keys().map(String::as_str).collect();
                println!("  env:     {}", names.join(", "));
            }
            if !definition.secrets.is_empty() {
                println!("  secrets: {}", definition.secrets.join(", "));
            }
        }
    }

    Ok(())
}
