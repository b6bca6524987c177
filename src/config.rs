//! Naming configuration for the rendered source file
//!
//! The catalog itself is never configurable; the only knobs are the names
//! woven into the generated text. Configuration loads from a small TOML
//! file and every field has a default matching the shipped extension.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Naming knobs for the rendered translation unit
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Prefix of every SQL-facing function name, e.g. `datasketch` in
    /// `datasketch_kll_rank`
    pub function_prefix: String,
    /// C++ namespace wrapping the generated code
    pub namespace: String,
    /// Banner comment at the top of the generated file
    pub banner: String,
}

#[derive(Deserialize)]
struct TomlConfig {
    naming: Option<TomlNaming>,
    output: Option<TomlOutput>,
}

#[derive(Deserialize)]
struct TomlNaming {
    function_prefix: Option<String>,
    namespace: Option<String>,
}

#[derive(Deserialize)]
struct TomlOutput {
    banner: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            function_prefix: "datasketch".to_string(),
            namespace: "duckdb_datasketches".to_string(),
            banner: "Generated file. Edit the generator, not this file.".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string; absent keys keep their defaults
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let mut config = Self::default();

        if let Some(naming) = parsed.naming {
            if let Some(prefix) = naming.function_prefix {
                config.function_prefix = prefix;
            }
            if let Some(namespace) = naming.namespace {
                config.namespace = namespace;
            }
        }
        if let Some(output) = parsed.output {
            if let Some(banner) = output.banner {
                config.banner = banner;
            }
        }

        Ok(config)
    }

    /// Set the SQL function name prefix
    pub fn with_function_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.function_prefix = prefix.into();
        self
    }

    /// Set the C++ namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the banner comment
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }
}
