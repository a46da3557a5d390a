//! HTTP server configuration types.

use crate::errors::{JsonError, Result};

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port to listen on. `0` lets the OS pick one.
    pub port: u16,
    /// Bind address (e.g. "0.0.0.0").
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".into(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(JsonError::Config("host is not set".into()));
        }
        Ok(())
    }

    /// Returns the socket address string "host:port".
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Graceful shutdown timeout in seconds.
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.host, "0.0.0.0");
        cfg.validate().expect("default config should be valid");
    }

    #[test]
    fn empty_host_fails_validation() {
        let cfg = ServerConfig {
            host: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(JsonError::Config(_))));
    }

    #[test]
    fn addr_format() {
        let cfg = ServerConfig {
            host: "127.0.0.1".into(),
            port: 3000,
        };
        assert_eq!(cfg.addr(), "127.0.0.1:3000");
    }
}
