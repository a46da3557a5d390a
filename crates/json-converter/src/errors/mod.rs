use thiserror::Error;

#[derive(Error, Debug)]
pub enum JsonError {
    #[error("Malformed JSON: {0}")]
    Malformed(serde_json::Error),

    #[error("Message may not be \"null\"")]
    EmptyMessage,

    #[error("{}", mismatch_message(.message, .path))]
    Mismatch { path: String, message: String },

    #[error("Deserialized value may not be \"null\"")]
    NullResult,

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Serialization error: {0}")]
    Serialize(serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported media type: expected application/json")]
    UnsupportedMediaType,

    #[error("Failed to read body ({status}): {message}")]
    Body { status: u16, message: String },

    #[cfg(feature = "client")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, JsonError>;

fn mismatch_message(message: &str, path: &str) -> String {
    if path.is_empty() {
        message.to_string()
    } else {
        format!("{} at {}", message, path)
    }
}

impl JsonError {
    /// HTTP status the host framework should answer with for this error.
    ///
    /// Everything caused by the request body is a client error; failures
    /// on the response side are server errors.
    pub fn status_code(&self) -> u16 {
        match self {
            JsonError::Malformed(_)
            | JsonError::EmptyMessage
            | JsonError::Mismatch { .. }
            | JsonError::NullResult
            | JsonError::Conversion(_) => 400,
            JsonError::UnsupportedMediaType => 415,
            JsonError::Body { status, .. } => *status,
            #[cfg(feature = "client")]
            JsonError::Http(e) => e.status().map(|s| s.as_u16()).unwrap_or(502),
            JsonError::Serialize(_) | JsonError::Io(_) | JsonError::Config(_) => 500,
        }
    }

    /// Build a [`JsonError::Mismatch`] from a path-tracking deserialization failure.
    pub(crate) fn from_path_error(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = json_pointer(err.path());
        JsonError::Mismatch {
            path,
            message: err.into_inner().to_string(),
        }
    }
}

/// Render a serde path as an RFC 6901 JSON pointer (`/ID`, `/items/0/name`).
fn json_pointer(path: &serde_path_to_error::Path) -> String {
    use serde_path_to_error::Segment;

    let mut pointer = String::new();
    for segment in path.iter() {
        pointer.push('/');
        match segment {
            Segment::Seq { index } => pointer.push_str(&index.to_string()),
            Segment::Map { key } => pointer.push_str(&key.replace('~', "~0").replace('/', "~1")),
            Segment::Enum { variant } => pointer.push_str(variant),
            Segment::Unknown => pointer.push('?'),
        }
    }
    pointer
}
