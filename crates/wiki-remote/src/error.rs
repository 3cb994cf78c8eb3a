//! Error types for wiki-remote

/// Result type for wiki-remote operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by remote services
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection, DNS, TLS or protocol failure before a status was received
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The service answered with a non-2xx status
    #[error("{method} {url} returned status {code}: {body}")]
    Status {
        method: String,
        url: String,
        code: u16,
        body: String,
    },

    /// The response body did not have the expected shape
    #[error("Malformed response from {url}: {message}")]
    Decode { url: String, message: String },

    /// A timestamp field was not RFC 3339
    #[error("Invalid timestamp '{value}': {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Reading a response body failed
    #[error("Failed to read response from {url}: {source}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Status code for [`Error::Status`], `None` otherwise
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}
