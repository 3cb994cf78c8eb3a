//! Error types for wiki-markup

/// Result type for wiki-markup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while rewriting embedded assets.
///
/// The normalizer recovers from every variant locally: the offending
/// element is left untouched and a warning is logged.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Asset operation failed for {url}: {message}")]
    Asset { url: String, message: String },

    #[error("Cannot derive an attachment name from {url}")]
    InvalidImageUrl { url: String },

    #[error("No <svg> element found in {url}")]
    VectorRootMissing { url: String },
}

impl Error {
    pub fn asset(url: impl Into<String>, source: impl std::fmt::Display) -> Self {
        Self::Asset {
            url: url.into(),
            message: source.to_string(),
        }
    }
}
