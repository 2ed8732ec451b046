//! Tracer configuration file parsing.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::runner::builtins::registry::{BuiltInRegistry, RegistryError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid alias key '{0}', expected \"Type.alias\"")]
    InvalidAlias(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Limits for the function-body interpreter and extra method names for the
/// registry.
///
/// Expected format:
/// ```toml
/// max_call_depth = 64
/// max_loop_iterations = 50000
/// max_array_growth = 10000
///
/// [method_aliases]
/// "Array.collect" = "map"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TracerConfig {
    pub max_call_depth: usize,
    pub max_loop_iterations: usize,
    /// How far one index write, `length` write or `new Array(n)` may extend
    /// an array past its current length.
    pub max_array_growth: usize,
    /// Keyed by `"Type.alias"`, valued by the existing method name.
    pub method_aliases: IndexMap<String, String>,
}

impl Default for TracerConfig {
    fn default() -> Self {
        TracerConfig {
            max_call_depth: 64,
            max_loop_iterations: 100_000,
            max_array_growth: 100_000,
            method_aliases: IndexMap::new(),
        }
    }
}

impl TracerConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config: TracerConfig = toml::from_str(content)?;
        if config.max_call_depth == 0 {
            warn!(
                "max_call_depth of 0 would reject every call, using {}",
                TracerConfig::default().max_call_depth
            );
            config.max_call_depth = TracerConfig::default().max_call_depth;
        }
        Ok(config)
    }

    /// Registers every configured alias with `registry`.
    pub fn apply_aliases(&self, registry: &mut BuiltInRegistry) -> Result<(), ConfigError> {
        for (key, method) in &self.method_aliases {
            let (object, alias) = key
                .split_once('.')
                .filter(|(o, a)| !o.is_empty() && !a.is_empty())
                .ok_or_else(|| ConfigError::InvalidAlias(key.clone()))?;
            debug!("Aliasing {}.{} to {}", object, alias, method);
            registry.alias_method(object, alias, method)?;
        }
        Ok(())
    }

    /// The registry these settings describe: core built-ins plus aliases.
    pub fn build_registry(&self) -> Result<BuiltInRegistry, ConfigError> {
        let mut registry = BuiltInRegistry::with_core();
        self.apply_aliases(&mut registry)?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config = TracerConfig::parse("max_loop_iterations = 10").unwrap();
        assert_eq!(config.max_loop_iterations, 10);
        assert_eq!(config.max_call_depth, 64);
        assert_eq!(config.max_array_growth, 100_000);
        assert!(config.method_aliases.is_empty());
    }

    #[test]
    fn zero_call_depth_falls_back() {
        let config = TracerConfig::parse("max_call_depth = 0").unwrap();
        assert_eq!(config.max_call_depth, 64);
    }

    #[test]
    fn aliases_are_applied() {
        let config = TracerConfig::parse(
            r#"
            [method_aliases]
            "Array.collect" = "map"
            "#,
        )
        .unwrap();
        let registry = config.build_registry().unwrap();
        assert!(registry.has_method("Array", "collect"));
    }

    #[test]
    fn bad_alias_keys_are_rejected() {
        let config = TracerConfig::parse(
            r#"
            [method_aliases]
            "collect" = "map"
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.build_registry(),
            Err(ConfigError::InvalidAlias(_))
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            TracerConfig::parse("max_call_depth = ["),
            Err(ConfigError::Parse(_))
        ));
    }
}
