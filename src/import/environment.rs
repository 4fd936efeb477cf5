//! Environment export importer
//!
//! Reads the `{name, values: [{enabled, key, value}]}` JSON files exported by
//! other API clients and stores them as a new environment.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ImportError;
use crate::models::{Environment, Variable};
use crate::storage::EnvironmentRepository;

#[derive(Debug, Deserialize)]
struct EnvironmentExport {
    name: String,
    #[serde(default)]
    values: Vec<ExportedVariable>,
}

#[derive(Debug, Deserialize)]
struct ExportedVariable {
    key: String,
    #[serde(default, deserialize_with = "lenient_string")]
    value: String,
    #[serde(default = "default_true")]
    enabled: bool,
}

fn default_true() -> bool {
    true
}

/// Exports sometimes carry numbers or booleans as values
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Import an environment export file
pub fn import_environment_file<R: EnvironmentRepository>(
    path: &Path,
    repo: &mut R,
) -> Result<Environment, ImportError> {
    let bytes = fs::read(path).map_err(|err| {
        tracing::warn!(path = %path.display(), error = %err, "Cannot read environment file");
        ImportError::InvalidFile
    })?;
    import_environment(&bytes, repo)
}

/// Create a new environment from an export document
pub fn import_environment<R: EnvironmentRepository>(
    bytes: &[u8],
    repo: &mut R,
) -> Result<Environment, ImportError> {
    let export: EnvironmentExport = serde_json::from_slice(bytes).map_err(|err| {
        tracing::debug!(error = %err, "Malformed environment export");
        ImportError::InvalidFile
    })?;

    let environment = Environment {
        id: None,
        name: export.name,
        variables: export
            .values
            .into_iter()
            .map(|v| Variable {
                enabled: v.enabled,
                key: v.key,
                value: v.value,
            })
            .collect(),
    };

    let created = repo.create_environment(environment)?;
    tracing::info!(name = %created.name, variables = created.variables.len(), "Environment imported");
    Ok(created)
}
