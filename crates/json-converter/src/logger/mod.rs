//! Logging seam for the converter.
//!
//! The converter talks to an optional [`JsonLogger`] obtained from a
//! [`LoggerFactory`]. The default factory emits `tracing` events, so log
//! lines end up wherever the application's subscriber sends them.

use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Logger name used when a factory is supplied without an explicit name.
pub const DEFAULT_LOGGER_NAME: &str = "json_converter::converter";

/// `tracing` target of every event a [`TracingLogger`] emits.
pub const LOG_TARGET: &str = "json_converter::logger";

/// A named logger with a severity gate.
pub trait JsonLogger: Send + Sync {
    fn name(&self) -> &str;

    /// Whether a message at `level` would be recorded.
    fn is_enabled(&self, level: Level) -> bool;

    fn log(&self, level: Level, message: &str);
}

/// Hands out loggers, either by name or with the default name.
pub trait LoggerFactory: Send + Sync {
    fn named(&self, name: &str) -> Arc<dyn JsonLogger>;

    fn logger(&self) -> Arc<dyn JsonLogger> {
        self.named(DEFAULT_LOGGER_NAME)
    }
}

/// Factory for loggers backed by the current `tracing` dispatcher.
///
/// Every logger emits under the target [`LOG_TARGET`] and carries its name
/// in a `logger` field, since `tracing` targets are fixed at compile time.
/// `RUST_LOG` directives therefore gate all converter loggers together
/// (`json_converter::logger=debug`); a directive naming the logger
/// (`api.json=debug`) matches nothing. Per-logger control is the converter's
/// configured level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLoggerFactory;

impl LoggerFactory for TracingLoggerFactory {
    fn named(&self, name: &str) -> Arc<dyn JsonLogger> {
        Arc::new(TracingLogger {
            name: name.to_string(),
        })
    }
}

/// Emits each message as a `tracing` event carrying a `logger` field.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    name: String,
}

// tracing needs the level as a constant at each callsite.
macro_rules! at_level {
    ($level:expr, enabled) => {
        if $level == Level::ERROR {
            tracing::enabled!(target: LOG_TARGET, Level::ERROR)
        } else if $level == Level::WARN {
            tracing::enabled!(target: LOG_TARGET, Level::WARN)
        } else if $level == Level::INFO {
            tracing::enabled!(target: LOG_TARGET, Level::INFO)
        } else if $level == Level::DEBUG {
            tracing::enabled!(target: LOG_TARGET, Level::DEBUG)
        } else {
            tracing::enabled!(target: LOG_TARGET, Level::TRACE)
        }
    };
    ($level:expr, event, $($args:tt)+) => {
        if $level == Level::ERROR {
            tracing::event!(target: LOG_TARGET, Level::ERROR, $($args)+)
        } else if $level == Level::WARN {
            tracing::event!(target: LOG_TARGET, Level::WARN, $($args)+)
        } else if $level == Level::INFO {
            tracing::event!(target: LOG_TARGET, Level::INFO, $($args)+)
        } else if $level == Level::DEBUG {
            tracing::event!(target: LOG_TARGET, Level::DEBUG, $($args)+)
        } else {
            tracing::event!(target: LOG_TARGET, Level::TRACE, $($args)+)
        }
    };
}

impl JsonLogger for TracingLogger {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self, level: Level) -> bool {
        at_level!(level, enabled)
    }

    fn log(&self, level: Level, message: &str) {
        at_level!(level, event, logger = %self.name, "{}", message)
    }
}

/// Initialize the tracing subscriber with timestamp, level, and structured fields.
/// If `debug` is true, sets the log level to DEBUG; otherwise INFO.
/// `RUST_LOG` overrides both.
pub fn init(debug: bool) {
    let fallback = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    fmt()
        .with_env_filter(filter)
        .with_timer(fmt::time::SystemTime)
        .with_level(true)
        .with_target(true)
        .init();
}


#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    #[derive(Clone, Default)]
    struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

    impl CapturedOutput {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for CapturedOutput {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedOutput {
        type Writer = CapturedOutput;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn with_subscriber<F: FnOnce()>(max: Level, f: F) -> String {
        let output = CapturedOutput::default();
        let subscriber = fmt()
            .with_max_level(max)
            .with_writer(output.clone())
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        output.text()
    }

    #[test]
    fn tracing_logger_emits_message_and_name() {
        let text = with_subscriber(Level::DEBUG, || {
            let logger = TracingLoggerFactory.named("api.json");
            logger.log(Level::DEBUG, "JSON Input: {\"a\":1}");
        });
        assert!(text.contains("DEBUG"), "{text}");
        assert!(text.contains("JSON Input: {\"a\":1}"), "{text}");
        assert!(text.contains("logger=api.json"), "{text}");
    }

    #[test]
    fn tracing_logger_respects_subscriber_level() {
        let text = with_subscriber(Level::INFO, || {
            let logger = TracingLoggerFactory.logger();
            assert!(!logger.is_enabled(Level::DEBUG));
            assert!(logger.is_enabled(Level::ERROR));
            logger.log(Level::DEBUG, "hidden");
            logger.log(Level::ERROR, "shown");
        });
        assert!(!text.contains("hidden"), "{text}");
        assert!(text.contains("shown"), "{text}");
    }

    #[test]
    fn env_filter_gates_by_target_not_logger_name() {
        let run = |directive: &str| {
            let output = CapturedOutput::default();
            let subscriber = fmt()
                .with_env_filter(EnvFilter::new(directive))
                .with_writer(output.clone())
                .with_ansi(false)
                .without_time()
                .finish();
            tracing::subscriber::with_default(subscriber, || {
                let logger = TracingLoggerFactory.named("api.json");
                logger.log(Level::DEBUG, "traffic");
            });
            output.text()
        };

        assert!(run("json_converter::logger=debug").contains("traffic"));
        assert!(!run("api.json=debug").contains("traffic"));
    }

    #[test]
    fn default_logger_uses_default_name() {
        assert_eq!(TracingLoggerFactory.logger().name(), DEFAULT_LOGGER_NAME);
        assert_eq!(TracingLoggerFactory.named("custom").name(), "custom");
    }

    #[test]
    fn recording_logger_gates_by_threshold() {
        let logger = testing::RecordingLogger::new(Level::INFO);
        assert!(logger.is_enabled(Level::ERROR));
        assert!(logger.is_enabled(Level::INFO));
        assert!(!logger.is_enabled(Level::DEBUG));
    }
}
