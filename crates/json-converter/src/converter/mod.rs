//! The message converter: bytes to typed values and back.
//!
//! `JsonConverter` is stateless apart from `Arc`s to its configuration and
//! optional logger, so one instance serves every request concurrently.

pub mod builder;

use std::io;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::Level;

use crate::config::{JsonConfig, NullMembers};
use crate::errors::{JsonError, Result};
use crate::json::rename::RenameDeserializer;
use crate::json::{self, Redaction};
use crate::logger::JsonLogger;

pub use builder::JsonConverterBuilder;

/// Converts HTTP message bodies to and from typed values.
#[derive(Clone)]
pub struct JsonConverter {
    config: Arc<JsonConfig>,
    logger: Option<Arc<dyn JsonLogger>>,
    level: Level,
    redaction: Arc<Redaction>,
}

impl Default for JsonConverter {
    fn default() -> Self {
        JsonConverter::builder().build()
    }
}

impl std::fmt::Debug for JsonConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonConverter")
            .field("config", &self.config)
            .field("logger", &self.logger.as_ref().map(|l| l.name().to_string()))
            .field("level", &self.level)
            .field("redaction", &self.redaction)
            .finish()
    }
}

impl JsonConverter {
    pub fn builder() -> JsonConverterBuilder {
        JsonConverterBuilder::default()
    }

    pub fn config(&self) -> &JsonConfig {
        &self.config
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn logger(&self) -> Option<&Arc<dyn JsonLogger>> {
        self.logger.as_ref()
    }

    /// Logger to use for debug-level traffic, if it would record anything.
    fn active_logger(&self) -> Option<&dyn JsonLogger> {
        self.logger
            .as_deref()
            .filter(|logger| logger.is_enabled(self.level))
    }

    // -----------------------------------------------------------------------
    // Read path
    // -----------------------------------------------------------------------

    /// Read a complete JSON document from `reader` and convert it to `T`.
    pub fn read<T, R>(&self, mut reader: R) -> Result<T>
    where
        T: DeserializeOwned + 'static,
        R: io::Read,
    {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.read_slice(&bytes)
    }

    /// Convert a JSON document held in memory to `T`.
    pub fn read_slice<T>(&self, bytes: &[u8]) -> Result<T>
    where
        T: DeserializeOwned + 'static,
    {
        let parsed = json::parse_document(bytes, self.config.parse_options());
        let value = match parsed {
            Ok(Some(value)) => value,
            Ok(None) => return Err(self.read_failed(None, JsonError::EmptyMessage)),
            Err(e) => return Err(self.read_failed(None, e)),
        };

        match self.decode_tree::<T>(&value) {
            Ok(result) => {
                if let Some(logger) = self.active_logger() {
                    logger.log(
                        self.level,
                        &format!("JSON Input: {}", self.redaction.display(&value)),
                    );
                }
                Ok(result)
            }
            Err(e) => Err(self.read_failed(Some(&value), e)),
        }
    }

    fn decode_tree<T>(&self, value: &Value) -> Result<T>
    where
        T: DeserializeOwned + 'static,
    {
        if let Some(result) = self.config.converters().from_json::<T>(value) {
            return result;
        }

        let naming = self.config.naming();
        if naming.is_identity() {
            return serde_path_to_error::deserialize(value).map_err(JsonError::from_path_error);
        }

        // Path tracking sits under the renaming layer so reported paths use
        // the document's member names.
        let mut track = serde_path_to_error::Track::new();
        let tracked = serde_path_to_error::Deserializer::new(value, &mut track);
        match T::deserialize(RenameDeserializer::new(tracked, naming)) {
            Ok(result) => Ok(result),
            Err(e) => Err(JsonError::from_path_error(serde_path_to_error::Error::new(
                track.path(),
                e,
            ))),
        }
    }

    /// Log a failed read at ERROR, whatever the configured level.
    fn read_failed(&self, value: Option<&Value>, err: JsonError) -> JsonError {
        if let Some(logger) = self.logger.as_deref() {
            if let Some(value) = value {
                logger.log(
                    Level::ERROR,
                    &format!("JSON Input: {}", self.redaction.display(value)),
                );
            }
            logger.log(Level::ERROR, &err.to_string());
        }
        err
    }

    // -----------------------------------------------------------------------
    // Write path
    // -----------------------------------------------------------------------

    /// Serialize `value` as JSON onto `sink`.
    ///
    /// When nothing will be logged and no transformation applies, the value
    /// is streamed straight to the sink without building a `Value` tree.
    pub fn write<T, W>(&self, value: &T, sink: W) -> Result<()>
    where
        T: Serialize + 'static,
        W: io::Write,
    {
        let logger = self.active_logger();
        let passthrough = logger.is_none()
            && self.config.naming().is_identity()
            && self.config.null_members() == NullMembers::Keep
            && !self.config.converters().has_to_json::<T>();
        if passthrough {
            return json::to_writer(sink, value);
        }

        let tree = self.encode_tree(value)?;
        if let Some(logger) = logger {
            logger.log(
                self.level,
                &format!("JSON Output: {}", self.redaction.display(&tree)),
            );
        }
        json::to_writer(sink, &tree)
    }

    /// Serialize `value` into a fresh buffer.
    pub fn write_to_vec<T>(&self, value: &T) -> Result<Vec<u8>>
    where
        T: Serialize + 'static,
    {
        let mut buf = Vec::with_capacity(128);
        self.write(value, &mut buf)?;
        Ok(buf)
    }

    fn encode_tree<T>(&self, value: &T) -> Result<Value>
    where
        T: Serialize + 'static,
    {
        let tree = match self.config.converters().to_json(value) {
            Some(result) => result?,
            None => json::to_value(value, self.config.naming())?,
        };
        Ok(self.config.null_members().apply(tree))
    }
}
