use crate::config::builder::BuildError;
use crate::config::schema::PatchSet;
use log::debug;
use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    Toml {
        source: toml_edit::de::Error,
    },
    TomlSerialize {
        source: toml_edit::ser::Error,
    },
    Json {
        source: serde_json::Error,
    },
    Build {
        name: Option<String>,
        source: BuildError,
    },
}

impl ConfigError {
    fn with_name(self, name: &str) -> Self {
        match self {
            ConfigError::Build { name: None, source } if !name.is_empty() => ConfigError::Build {
                name: Some(name.to_string()),
                source,
            },
            other => other,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Toml { source } => write!(f, "failed to parse patch set TOML: {}", source),
            ConfigError::TomlSerialize { source } => {
                write!(f, "failed to write patch set TOML: {}", source)
            }
            ConfigError::Json { source } => write!(f, "failed to process patch set JSON: {}", source),
            ConfigError::Build { name, source } => match name {
                Some(name) => write!(f, "invalid patch set '{}': {}", name, source),
                None => write!(f, "invalid patch set: {}", source),
            },
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Toml { source } => Some(source),
            ConfigError::TomlSerialize { source } => Some(source),
            ConfigError::Json { source } => Some(source),
            ConfigError::Build { source, .. } => Some(source),
        }
    }
}

/// Parse a TOML patch set and check that every definition builds.
pub fn load_from_str(input: &str) -> Result<PatchSet, ConfigError> {
    let set: PatchSet =
        toml_edit::de::from_str(input).map_err(|source| ConfigError::Toml { source })?;
    validated(set)
}

/// Parse a JSON patch set and check that every definition builds.
pub fn load_from_json_str(input: &str) -> Result<PatchSet, ConfigError> {
    let set: PatchSet =
        serde_json::from_str(input).map_err(|source| ConfigError::Json { source })?;
    validated(set)
}

pub fn to_toml_string(set: &PatchSet) -> Result<String, ConfigError> {
    toml_edit::ser::to_string(set).map_err(|source| ConfigError::TomlSerialize { source })
}

pub fn to_json_string(set: &PatchSet) -> Result<String, ConfigError> {
    serde_json::to_string_pretty(set).map_err(|source| ConfigError::Json { source })
}

fn validated(set: PatchSet) -> Result<PatchSet, ConfigError> {
    let ops = set
        .operations()
        .map_err(|source| ConfigError::Build { name: None, source }.with_name(&set.meta.name))?;
    debug!(
        "loaded patch set '{}' with {} operation(s)",
        set.meta.name,
        ops.len()
    );
    Ok(set)
}
