// json-converter: JSON message conversion for axum handlers and reqwest clients,
// with redacted logging of every converted document.

// Always-available modules
pub mod config;
pub mod converter;
pub mod errors;
pub mod json;
pub mod logger;

// Feature-gated modules
#[cfg(feature = "http-server")]
pub mod server;

#[cfg(feature = "client")]
pub mod client;

pub use converter::{JsonConverter, JsonConverterBuilder};
pub use errors::{JsonError, Result};
