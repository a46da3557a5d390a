//! JSON conversion configuration.
//!
//! `JsonConfig` is built once at startup and shared read-only (`Arc`) by
//! every converter instance. `ConverterSettings` is the file-backed form
//! used by binaries.

pub mod converters;
pub mod naming;
pub mod settings;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use converters::Converters;
pub use naming::NamingStrategy;
pub use settings::ConverterSettings;

/// What to do when an object repeats a member name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKeys {
    /// Keep the last occurrence (lenient).
    #[default]
    TakeLast,
    /// Reject the document (strict).
    Error,
}

/// Treatment of object members whose value is `null` when writing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullMembers {
    #[default]
    Keep,
    /// Drop `null` members from every object, at any depth.
    Omit,
}

impl NullMembers {
    pub(crate) fn apply(self, value: Value) -> Value {
        match self {
            NullMembers::Keep => value,
            NullMembers::Omit => omit_nulls(value),
        }
    }
}

fn omit_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, omit_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(omit_nulls).collect()),
        other => other,
    }
}

/// Options applied while parsing request bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub duplicate_keys: DuplicateKeys,
    /// Reject requests whose content type is not JSON.
    pub require_content_type: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            duplicate_keys: DuplicateKeys::TakeLast,
            require_content_type: true,
        }
    }
}

/// Immutable settings controlling parse and serialize behavior.
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    naming: NamingStrategy,
    null_members: NullMembers,
    parse: ParseOptions,
    converters: Converters,
}

impl JsonConfig {
    pub fn builder() -> JsonConfigBuilder {
        JsonConfigBuilder::default()
    }

    pub fn naming(&self) -> NamingStrategy {
        self.naming
    }

    pub fn null_members(&self) -> NullMembers {
        self.null_members
    }

    pub fn parse_options(&self) -> &ParseOptions {
        &self.parse
    }

    pub fn converters(&self) -> &Converters {
        &self.converters
    }
}

/// Builder for [`JsonConfig`].
#[derive(Debug, Default)]
pub struct JsonConfigBuilder {
    config: JsonConfig,
}

impl JsonConfigBuilder {
    pub fn naming(mut self, naming: NamingStrategy) -> Self {
        self.config.naming = naming;
        self
    }

    pub fn null_members(mut self, policy: NullMembers) -> Self {
        self.config.null_members = policy;
        self
    }

    pub fn parse_options(mut self, parse: ParseOptions) -> Self {
        self.config.parse = parse;
        self
    }

    pub fn duplicate_keys(mut self, policy: DuplicateKeys) -> Self {
        self.config.parse.duplicate_keys = policy;
        self
    }

    pub fn require_content_type(mut self, required: bool) -> Self {
        self.config.parse.require_content_type = required;
        self
    }

    /// Serialize values of type `T` with `f` instead of their `Serialize` impl.
    pub fn to_json<T, F>(mut self, f: F) -> Self
    where
        T: 'static,
        F: Fn(&T) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.config.converters.add_to_json(f);
        self
    }

    /// Deserialize values of type `T` with `f` instead of their `Deserialize` impl.
    pub fn from_json<T, F>(mut self, f: F) -> Self
    where
        T: 'static,
        F: Fn(&Value) -> anyhow::Result<Option<T>> + Send + Sync + 'static,
    {
        self.config.converters.add_from_json(f);
        self
    }

    pub fn build(self) -> JsonConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_lenient_identity() {
        let cfg = JsonConfig::default();
        assert_eq!(cfg.naming(), NamingStrategy::Identity);
        assert_eq!(cfg.null_members(), NullMembers::Keep);
        assert_eq!(cfg.parse_options().duplicate_keys, DuplicateKeys::TakeLast);
        assert!(cfg.parse_options().require_content_type);
        assert!(cfg.converters().is_empty());
    }

    #[test]
    fn builder_sets_every_option() {
        struct Marker;
        let cfg = JsonConfig::builder()
            .naming(NamingStrategy::CamelCase)
            .null_members(NullMembers::Omit)
            .duplicate_keys(DuplicateKeys::Error)
            .require_content_type(false)
            .to_json::<Marker, _>(|_| Ok(Value::Null))
            .build();
        assert_eq!(cfg.naming(), NamingStrategy::CamelCase);
        assert_eq!(cfg.null_members(), NullMembers::Omit);
        assert_eq!(cfg.parse_options().duplicate_keys, DuplicateKeys::Error);
        assert!(!cfg.parse_options().require_content_type);
        assert!(cfg.converters().has_to_json::<Marker>());
    }

    #[test]
    fn omit_removes_null_members_at_any_depth() {
        let value = serde_json::json!({
            "a": null,
            "b": {"c": null, "d": 1},
            "e": [null, {"f": null}]
        });
        let omitted = NullMembers::Omit.apply(value.clone());
        assert_eq!(omitted, serde_json::json!({"b": {"d": 1}, "e": [null, {}]}));
        assert_eq!(NullMembers::Keep.apply(value.clone()), value);
    }
}
