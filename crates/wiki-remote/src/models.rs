//! Wire-independent models exchanged with the services

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A source repository (knowledge base)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoBrief {
    pub id: String,
    pub title: String,
    /// Seconds since epoch
    pub mtime: i64,
}

/// A source document with its hierarchy links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocBrief {
    pub id: String,
    pub repo_id: String,
    pub title: String,
    /// Seconds since epoch
    pub mtime: i64,
    /// Node identifier in the repository's table of contents
    pub uuid: String,
    /// `None` for top-level documents
    pub parent_uuid: Option<String>,
}

/// A destination page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBrief {
    pub id: String,
    pub title: String,
    pub version: u64,
    /// Seconds since epoch of the last version
    pub mtime: i64,
    /// Ancestor page ids, outermost first
    pub ancestors: Vec<String>,
}

impl PageBrief {
    /// Direct parent id, if any
    pub fn parent_id(&self) -> Option<&str> {
        self.ancestors.last().map(String::as_str)
    }
}

/// A file attached to a destination page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentBrief {
    pub id: String,
    pub title: String,
}

/// Parse an RFC 3339 timestamp into seconds since epoch
pub fn parse_timestamp(value: &str) -> Result<i64> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|t| t.timestamp())
        .map_err(|source| Error::Timestamp {
            value: value.to_string(),
            source,
        })
}
