//! Wiring for [`JsonConverter`].
//!
//! Every dependency is optional. Missing pieces fall back to: the default
//! [`JsonConfig`], no logger, `DEBUG` level, no redaction.

use std::sync::Arc;

use tracing::Level;

use super::JsonConverter;
use crate::config::{ConverterSettings, JsonConfig};
use crate::errors::Result;
use crate::json::Redaction;
use crate::logger::{JsonLogger, LoggerFactory};

#[derive(Default)]
pub struct JsonConverterBuilder {
    config: Option<Arc<JsonConfig>>,
    logger_factory: Option<Arc<dyn LoggerFactory>>,
    logger_name: Option<String>,
    log_level: Option<Level>,
    log_exclude: Option<Vec<String>>,
}

impl JsonConverterBuilder {
    pub fn config(mut self, config: impl Into<Arc<JsonConfig>>) -> Self {
        self.config = Some(config.into());
        self
    }

    pub fn logger_factory(mut self, factory: Arc<dyn LoggerFactory>) -> Self {
        self.logger_factory = Some(factory);
        self
    }

    pub fn logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = Some(name.into());
        self
    }

    pub fn log_level(mut self, level: Level) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Member names whose values are masked in logged JSON.
    pub fn log_exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.log_exclude = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Apply file-backed settings. Values already set on the builder are
    /// overwritten only where the settings provide one.
    pub fn settings(mut self, settings: &ConverterSettings) -> Result<Self> {
        self.config = Some(Arc::new(settings.json_config()));
        if let Some(name) = &settings.log_name {
            self.logger_name = Some(name.clone());
        }
        if let Some(level) = settings.level()? {
            self.log_level = Some(level);
        }
        if let Some(exclude) = &settings.log_exclude {
            self.log_exclude = Some(exclude.clone());
        }
        Ok(self)
    }

    pub fn build(self) -> JsonConverter {
        let logger = self.logger_factory.map(|factory| match &self.logger_name {
            Some(name) => factory.named(name),
            None => factory.logger(),
        });
        let redaction = match self.log_exclude {
            Some(names) => Redaction::exclude(names),
            None => Redaction::none(),
        };

        if let Some(logger) = &logger {
            tracing::debug!(logger = logger.name(), "JSON converter logging enabled");
        }

        JsonConverter {
            config: self.config.unwrap_or_default(),
            logger,
            level: self.log_level.unwrap_or(Level::DEBUG),
            redaction: Arc::new(redaction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamingStrategy;
    use crate::logger::{TracingLoggerFactory, DEFAULT_LOGGER_NAME};

    #[test]
    fn defaults_have_no_logger_and_debug_level() {
        let converter = JsonConverter::builder().build();
        assert!(converter.logger().is_none());
        assert_eq!(converter.level(), Level::DEBUG);
        assert_eq!(converter.config().naming(), NamingStrategy::Identity);
    }

    #[test]
    fn factory_without_name_uses_default_logger() {
        let converter = JsonConverter::builder()
            .logger_factory(Arc::new(TracingLoggerFactory))
            .build();
        assert_eq!(converter.logger().unwrap().name(), DEFAULT_LOGGER_NAME);
    }

    #[test]
    fn factory_with_name_uses_named_logger() {
        let converter = JsonConverter::builder()
            .logger_factory(Arc::new(TracingLoggerFactory))
            .logger_name("api.json")
            .log_level(Level::INFO)
            .build();
        assert_eq!(converter.logger().unwrap().name(), "api.json");
        assert_eq!(converter.level(), Level::INFO);
    }

    #[test]
    fn name_without_factory_has_no_logger() {
        let converter = JsonConverter::builder().logger_name("unused").build();
        assert!(converter.logger().is_none());
    }

    #[test]
    fn settings_override_builder_values() {
        let settings = ConverterSettings {
            log_name: Some("from.file".into()),
            log_level: Some("warn".into()),
            log_exclude: Some(vec!["secret".into()]),
            naming: NamingStrategy::KebabCase,
            ..Default::default()
        };
        let converter = JsonConverter::builder()
            .logger_factory(Arc::new(TracingLoggerFactory))
            .logger_name("from.code")
            .settings(&settings)
            .unwrap()
            .build();
        assert_eq!(converter.logger().unwrap().name(), "from.file");
        assert_eq!(converter.level(), Level::WARN);
        assert_eq!(converter.config().naming(), NamingStrategy::KebabCase);
    }

    #[test]
    fn settings_with_bad_level_fail() {
        let settings = ConverterSettings {
            log_level: Some("chatty".into()),
            ..Default::default()
        };
        assert!(JsonConverter::builder().settings(&settings).is_err());
    }
}
