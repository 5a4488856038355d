//! Mapper configuration via `stratamap.toml`
//!
//! A mapper session is pointed at one table of one database. Both names and
//! the missing-field policy can be read from a small TOML file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use strata_core::{Error, Result};

/// Config file name
pub const CONFIG_FILE_NAME: &str = "stratamap.toml";

/// Suffix appended to the namespace to form the shard table name
pub const SHARD_SUFFIX: &str = "1";

/// What a load does when an expected node is absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingFieldPolicy {
    /// Abort the load with `MissingField`
    #[default]
    Fail,
    /// Keep the field's current value and continue
    Default,
}

/// Mapper configuration loaded from `stratamap.toml`.
///
/// # Example
///
/// ```toml
/// database = "StrataMap"
/// namespace = "Zone_"
/// missing_fields = "fail"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapperConfig {
    /// Database holding the table
    #[serde(default = "default_database")]
    pub database: String,
    /// Table namespace; the shard table is `namespace + "1"`
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Missing-field policy: `"fail"` or `"default"`
    #[serde(default = "default_missing_fields")]
    pub missing_fields: String,
}

fn default_database() -> String {
    "StrataMap".to_string()
}

fn default_namespace() -> String {
    "Zone_".to_string()
}

fn default_missing_fields() -> String {
    "fail".to_string()
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            namespace: default_namespace(),
            missing_fields: default_missing_fields(),
        }
    }
}

impl MapperConfig {
    /// Name of the shard table rows are written to
    pub fn shard_table(&self) -> String {
        format!("{}{}", self.namespace, SHARD_SUFFIX)
    }

    /// Parse the missing-field policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `"fail"` or `"default"`.
    pub fn missing_field_policy(&self) -> Result<MissingFieldPolicy> {
        match self.missing_fields.as_str() {
            "fail" => Ok(MissingFieldPolicy::Fail),
            "default" => Ok(MissingFieldPolicy::Default),
            other => Err(Error::Config(format!(
                "Invalid missing_fields '{}'. Expected \"fail\" or \"default\".",
                other
            ))),
        }
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML, the namespace is
    /// empty, or the policy is unknown.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MapperConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# StrataMap configuration
#
# Database holding the table
database = "StrataMap"

# Table namespace; rows go to the shard table "<namespace>1"
namespace = "Zone_"

# What a load does when an expected field is absent:
#   "fail"    = abort with MissingField (default)
#   "default" = keep the field's current value
missing_fields = "fail"
"#
    }

    fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(Error::Config("namespace must not be empty".to_string()));
        }
        self.missing_field_policy()?;
        Ok(())
    }
}
