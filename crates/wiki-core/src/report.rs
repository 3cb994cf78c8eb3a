//! Synchronization report

use std::fmt;

use serde::Serialize;

/// What happened to one page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncActionKind {
    Created,
    Updated,
    Unchanged,
    Deprecated,
    Deleted,
}

impl fmt::Display for SyncActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncActionKind::Created => "created",
            SyncActionKind::Updated => "updated",
            SyncActionKind::Unchanged => "unchanged",
            SyncActionKind::Deprecated => "deprecated",
            SyncActionKind::Deleted => "deleted",
        };
        f.write_str(name)
    }
}

/// A single recorded action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncAction {
    pub kind: SyncActionKind,
    pub title: String,
    pub page_id: String,
}

/// Every action taken by one run, in order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub actions: Vec<SyncAction>,
}

impl SyncReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: SyncActionKind, title: impl Into<String>, page_id: impl Into<String>) {
        self.actions.push(SyncAction {
            kind,
            title: title.into(),
            page_id: page_id.into(),
        });
    }

    pub fn count(&self, kind: SyncActionKind) -> usize {
        self.actions.iter().filter(|a| a.kind == kind).count()
    }

    /// Titles of the pages that received `kind`, in order
    pub fn titles(&self, kind: SyncActionKind) -> Vec<&str> {
        self.actions
            .iter()
            .filter(|a| a.kind == kind)
            .map(|a| a.title.as_str())
            .collect()
    }

    /// Whether the run changed nothing
    pub fn is_noop(&self) -> bool {
        self.actions
            .iter()
            .all(|a| a.kind == SyncActionKind::Unchanged)
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} unchanged, {} deprecated, {} deleted",
            self.count(SyncActionKind::Created),
            self.count(SyncActionKind::Updated),
            self.count(SyncActionKind::Unchanged),
            self.count(SyncActionKind::Deprecated),
            self.count(SyncActionKind::Deleted),
        )
    }
}
