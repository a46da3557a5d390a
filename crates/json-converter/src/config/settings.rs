use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::Level;

use super::{DuplicateKeys, JsonConfig, NamingStrategy, NullMembers, ParseOptions};
use crate::errors::{JsonError, Result};

/// File-backed converter settings (YAML or JSON).
///
/// Every field is optional; anything missing falls back to the converter
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConverterSettings {
    pub log_name: Option<String>,
    pub log_level: Option<String>,
    pub log_exclude: Option<Vec<String>>,
    pub naming: NamingStrategy,
    pub null_members: NullMembers,
    pub duplicate_keys: DuplicateKeys,
    pub require_content_type: Option<bool>,
}

impl ConverterSettings {
    /// Load settings from a file. `.json` files are parsed as JSON, anything
    /// else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&text)
                .map_err(|e| JsonError::Config(format!("{}: {}", path.display(), e)))
        } else {
            serde_yaml::from_str(&text)
                .map_err(|e| JsonError::Config(format!("{}: {}", path.display(), e)))
        }
    }

    /// Parsed log level, if one was given.
    pub fn level(&self) -> Result<Option<Level>> {
        self.log_level
            .as_deref()
            .map(|s| {
                s.parse::<Level>()
                    .map_err(|_| JsonError::Config(format!("invalid log level: {}", s)))
            })
            .transpose()
    }

    /// Build the [`JsonConfig`] described by these settings.
    pub fn json_config(&self) -> JsonConfig {
        let defaults = ParseOptions::default();
        JsonConfig::builder()
            .naming(self.naming)
            .null_members(self.null_members)
            .parse_options(ParseOptions {
                duplicate_keys: self.duplicate_keys,
                require_content_type: self
                    .require_content_type
                    .unwrap_or(defaults.require_content_type),
            })
            .build()
    }
}
