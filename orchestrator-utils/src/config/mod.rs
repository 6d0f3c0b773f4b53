//! Configuration file loading
//!
//! Configs are plain serde structs. A file may be TOML, JSON or YAML and
//! only needs to mention the keys it overrides; everything else keeps the
//! struct's `Default`.

use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

/// Supported on-disk formats, picked by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> crate::Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yml" | "yaml" => Ok(Self::Yaml),
            _ => Err(crate::UtilError::Config(format!(
                "Unsupported config format: '{}' (expected toml, json, yaml)",
                extension
            ))),
        }
    }

    fn parse_value(self, content: &str) -> crate::Result<serde_json::Value> {
        match self {
            Self::Toml => {
                let value: toml::Value = toml::from_str(content)
                    .map_err(|e| crate::UtilError::Config(format!("TOML parse error: {}", e)))?;
                serde_json::to_value(value)
                    .map_err(|e| crate::UtilError::Config(format!("TOML conversion error: {}", e)))
            }
            Self::Json => serde_json::from_str(content)
                .map_err(|e| crate::UtilError::Config(format!("JSON parse error: {}", e))),
            Self::Yaml => serde_yaml::from_str(content)
                .map_err(|e| crate::UtilError::Config(format!("YAML parse error: {}", e))),
        }
    }
}

fn read_value(path: &Path) -> crate::Result<serde_json::Value> {
    let format = ConfigFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    format.parse_value(&content)
}

/// Load a complete configuration from file (auto-detects format)
pub fn load_config<T>(path: &Path) -> crate::Result<T>
where
    T: DeserializeOwned,
{
    let value = read_value(path)?;
    serde_json::from_value(value)
        .map_err(|e| crate::UtilError::Config(format!("{}: {}", path.display(), e)))
}

/// Merge two JSON values, `override_value` winning on conflicts.
///
/// Objects merge key by key; any other value replaces wholesale.
fn merge_json_values(base: &mut serde_json::Value, override_value: serde_json::Value) {
    match (base, override_value) {
        (serde_json::Value::Object(base_obj), serde_json::Value::Object(override_obj)) => {
            for (key, value) in override_obj {
                match base_obj.get_mut(&key) {
                    Some(existing) => merge_json_values(existing, value),
                    None => {
                        base_obj.insert(key, value);
                    }
                }
            }
        }
        (base_value, override_value) => {
            *base_value = override_value;
        }
    }
}

/// Overlay `override_config` onto `base` through their JSON representation
pub fn merge_configs<T>(base: &mut T, override_config: serde_json::Value) -> crate::Result<()>
where
    T: Serialize + DeserializeOwned,
{
    let mut base_value = serde_json::to_value(&*base)
        .map_err(|e| crate::UtilError::Serialization(format!("Base serialization error: {}", e)))?;

    merge_json_values(&mut base_value, override_config);

    *base = serde_json::from_value(base_value)
        .map_err(|e| crate::UtilError::Config(format!("Invalid configuration: {}", e)))?;

    Ok(())
}

/// Configuration builder: defaults, then optional files, then explicit overrides
#[derive(Debug)]
pub struct ConfigBuilder<T> {
    config: T,
}

impl<T> ConfigBuilder<T>
where
    T: Default + Serialize + DeserializeOwned,
{
    /// Create new config builder with defaults
    pub fn new() -> Self {
        Self {
            config: T::default(),
        }
    }

    /// Overlay a (possibly partial) config file
    pub fn load_file(mut self, path: &Path) -> crate::Result<Self> {
        let value = read_value(path)?;
        merge_configs(&mut self.config, value)?;
        Ok(self)
    }

    /// Overlay a file when one is given
    pub fn load_optional_file(self, path: Option<&Path>) -> crate::Result<Self> {
        match path {
            Some(path) => self.load_file(path),
            None => Ok(self),
        }
    }

    /// Overlay an in-memory JSON fragment
    pub fn merge(mut self, overrides: serde_json::Value) -> crate::Result<Self> {
        merge_configs(&mut self.config, overrides)?;
        Ok(self)
    }

    pub fn build(self) -> T {
        self.config
    }
}

impl<T> Default for ConfigBuilder<T>
where
    T: Default + Serialize + DeserializeOwned,
{
    fn default() -> Self {
        Self::new()
    }
}
