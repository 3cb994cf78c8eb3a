//! Error types for wiki-core

use std::path::PathBuf;

/// Result type for wiki-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a synchronization run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file not found at expected path
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file could not be parsed
    #[error("Failed to parse {format} configuration at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    /// Configuration file has an unknown extension
    #[error("Unsupported configuration format: '{extension}'")]
    UnsupportedConfigFormat { extension: String },

    /// A configuration value failed validation
    #[error("Invalid configuration value for {field}: {message}")]
    InvalidConfig { field: String, message: String },

    /// The destination space root could not be determined
    #[error("Cannot determine the space root page: {message}")]
    SpaceRoot { message: String },

    /// A temporary page is owned by a different space
    #[error(
        "Refusing to delete '{title}' (page {page_id}): owned by space '{actual}', expected '{expected}'"
    )]
    OwnershipViolation {
        title: String,
        page_id: String,
        expected: String,
        actual: String,
    },

    /// Two siblings share a title, so matching by title is ambiguous
    #[error("Duplicate title '{title}' under '{parent}'")]
    DuplicateTitle { parent: String, title: String },

    /// A node is not listed among its parent's children
    #[error("Page '{title}' is missing from its parent's children")]
    DetachedNode { title: String },

    /// A node id does not refer to a live node
    #[error("Unknown page tree node {index}")]
    UnknownNode { index: usize },

    /// Error from a remote service
    #[error(transparent)]
    Remote(#[from] wiki_remote::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
