//! The context registry, loaded from `config/contexts.json5`.
//!
//! Each top-level key names a context (an environment the developer can
//! target). The reserved [`GLOBAL_CONTEXT`] is always valid; when it is also
//! declared in the file, its settings apply to every context.

use crate::envfile;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Context identifier that is valid regardless of configuration.
pub const GLOBAL_CONTEXT: &str = "GLOBAL";

/// Settings for one context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextDefinition {
    /// Human-readable description shown by `setenv contexts`.
    pub description: Option<String>,

    /// Non-secret variables written to the env file. Values must be scalars.
    pub env: BTreeMap<String, Value>,

    /// Secret keys the context needs; `setenv generate` prompts for missing ones.
    pub secrets: Vec<String>,
}

impl ContextDefinition {
    /// Render `env` values as strings. Only valid after [`ContextRegistry::validate`].
    fn rendered_env(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.env.iter().filter_map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => render_number(n),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key.clone(), rendered))
        })
    }
}

/// JSON5 integers may arrive as floats; print them without a fraction.
fn render_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

/// The set of valid contexts and their settings.
#[derive(Debug, Clone, Default)]
pub struct ContextRegistry {
    contexts: BTreeMap<String, ContextDefinition>,
}

impl ContextRegistry {
    /// Build a registry from already-parsed definitions.
    pub fn new(contexts: BTreeMap<String, ContextDefinition>) -> Self {
        Self { contexts }
    }

    /// Load and validate the registry from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let registry = Self::parse(&content).map_err(|e| match e {
            ConfigError::Json5 { message, .. } => ConfigError::Json5 {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;
        debug!(
            path = %path.display(),
            contexts = registry.contexts.len(),
            "loaded context configuration"
        );
        Ok(registry)
    }

    /// Load the registry, treating a missing file as "only GLOBAL is valid".
    pub fn load_or_empty(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => {
                debug!(path = %path.display(), "no context configuration, only GLOBAL is valid");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Parse and validate a JSON5 document.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let contexts: BTreeMap<String, ContextDefinition> =
            json5::from_str(content).map_err(|e| ConfigError::Json5 {
                path: "<input>".to_string(),
                message: e.to_string(),
            })?;
        let registry = Self::new(contexts);
        registry.validate()?;
        Ok(registry)
    }

    /// Validate the registry, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        for (id, context) in &self.contexts {
            if id.is_empty() {
                errors.push("Context identifier must not be empty".to_string());
            }

            for (key, value) in &context.env {
                if !envfile::is_valid_key(key) {
                    errors.push(format!("Context '{}': invalid variable name '{}'", id, key));
                }
                if !matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_)) {
                    errors.push(format!(
                        "Context '{}': variable '{}' must be a string, number or boolean",
                        id, key
                    ));
                }
            }

            for key in &context.secrets {
                if !envfile::is_valid_key(key) {
                    errors.push(format!("Context '{}': invalid secret name '{}'", id, key));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }

    /// Whether `id` is a valid context (GLOBAL or configured).
    pub fn contains(&self, id: &str) -> bool {
        id == GLOBAL_CONTEXT || self.contexts.contains_key(id)
    }

    /// Get a context definition by identifier.
    pub fn get(&self, id: &str) -> Option<&ContextDefinition> {
        self.contexts.get(id)
    }

    /// Iterate over all valid context identifiers, GLOBAL first.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(GLOBAL_CONTEXT).chain(
            self.contexts
                .keys()
                .map(String::as_str)
                .filter(|id| *id != GLOBAL_CONTEXT),
        )
    }

    /// The contexts whose settings apply to `id`, in override order.
    pub fn layers<'a>(&self, id: &'a str) -> Vec<&'a str> {
        if id == GLOBAL_CONTEXT {
            vec![GLOBAL_CONTEXT]
        } else {
            vec![GLOBAL_CONTEXT, id]
        }
    }

    /// Non-secret variables for `id`: GLOBAL's, overridden by the context's own.
    pub fn env_for(&self, id: &str) -> BTreeMap<String, String> {
        self.layers(id)
            .into_iter()
            .filter_map(|layer| self.contexts.get(layer))
            .flat_map(|context| context.rendered_env())
            .collect()
    }

    /// Secrets `id` needs, as `(context, key)` pairs. GLOBAL's required
    /// secrets are stored under GLOBAL.
    pub fn required_secrets(&self, id: &str) -> Vec<(String, String)> {
        self.layers(id)
            .into_iter()
            .filter_map(|layer| self.contexts.get(layer).map(|c| (layer, c)))
            .flat_map(|(layer, context)| {
                context
                    .secrets
                    .iter()
                    .map(move |key| (layer.to_string(), key.clone()))
            })
            .collect()
    }
}
