//! Source space snapshot

use std::collections::{HashMap, HashSet};

use wiki_remote::{DocBrief, SourceService};

use crate::error::Result;

/// A source document and its subtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDoc {
    pub id: String,
    pub repo_id: String,
    pub title: String,
    /// Seconds since epoch
    pub mtime: i64,
    pub children: Vec<SourceDoc>,
}

impl SourceDoc {
    pub fn new(id: impl Into<String>, repo_id: impl Into<String>, title: impl Into<String>, mtime: i64) -> Self {
        Self {
            id: id.into(),
            repo_id: repo_id.into(),
            title: title.into(),
            mtime,
            children: Vec::new(),
        }
    }

    /// Builder: append a child
    pub fn with_child(mut self, child: SourceDoc) -> Self {
        self.children.push(child);
        self
    }

    /// Number of documents in this subtree, including this one
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(SourceDoc::count).sum::<usize>()
    }
}

/// A source repository with its top-level documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRepo {
    pub id: String,
    pub title: String,
    pub docs: Vec<SourceDoc>,
}

/// Which parts of the source take part in a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFilter {
    /// Repository titles to include; nothing is synchronized when empty
    pub sync_repos: Vec<String>,
    /// Document titles removed together with their subtrees
    pub excluded_docs: Vec<String>,
}

impl SourceFilter {
    /// Filter selecting exactly `repos`, with no excluded documents
    pub fn repos<I, T>(repos: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            sync_repos: repos.into_iter().map(Into::into).collect(),
            excluded_docs: Vec::new(),
        }
    }

    pub fn includes_repo(&self, title: &str) -> bool {
        self.sync_repos.iter().any(|r| r == title)
    }

    pub fn excludes_doc(&self, title: &str) -> bool {
        self.excluded_docs.iter().any(|d| d == title)
    }
}

/// Read-only snapshot of the source, taken once per run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSpace {
    pub repos: Vec<SourceRepo>,
}

impl SourceSpace {
    pub fn from_repos(repos: Vec<SourceRepo>) -> Self {
        Self { repos }
    }

    /// List repositories and documents and build each repository's tree
    pub fn load<S: SourceService>(service: &S, filter: &SourceFilter) -> Result<Self> {
        if filter.sync_repos.is_empty() {
            tracing::warn!("No repositories listed in sync_repos, nothing will be synchronized");
        }
        let mut repos = Vec::new();
        for repo in service.list_all_repos()? {
            if !filter.includes_repo(&repo.title) {
                tracing::debug!(repo = %repo.title, "Repository not selected for sync");
                continue;
            }
            let docs = service.list_all_docs_in_repo(&repo.id)?;
            let mut tree = build_tree(docs);
            exclude(&mut tree, filter);

            tracing::info!(
                repo = %repo.title,
                docs = tree.iter().map(SourceDoc::count).sum::<usize>(),
                "Loaded source repository"
            );
            repos.push(SourceRepo {
                id: repo.id,
                title: repo.title,
                docs: tree,
            });
        }
        Ok(Self { repos })
    }

    pub fn repo(&self, title: &str) -> Option<&SourceRepo> {
        self.repos.iter().find(|r| r.title == title)
    }
}

/// Build the document forest from `parent_uuid` links, keeping list order.
///
/// Documents whose parent is unknown are attached at top level. Documents
/// caught in a parent cycle are dropped.
pub fn build_tree(docs: Vec<DocBrief>) -> Vec<SourceDoc> {
    let known: HashSet<&str> = docs
        .iter()
        .map(|d| d.uuid.as_str())
        .filter(|u| !u.is_empty())
        .collect();

    let mut roots = Vec::new();
    let mut children: HashMap<&str, Vec<&DocBrief>> = HashMap::new();
    for doc in &docs {
        match doc.parent_uuid.as_deref() {
            Some(parent) if known.contains(parent) && parent != doc.uuid => {
                children.entry(parent).or_default().push(doc);
            }
            Some(parent) => {
                tracing::warn!(doc = %doc.title, parent, "Parent document not found, attaching at top level");
                roots.push(doc);
            }
            None => roots.push(doc),
        }
    }

    let mut visited = HashSet::new();
    let forest: Vec<SourceDoc> = roots
        .into_iter()
        .filter_map(|doc| grow(doc, &children, &mut visited))
        .collect();

    if visited.len() < docs.len() {
        tracing::warn!(
            dropped = docs.len() - visited.len(),
            "Documents unreachable from the top level were skipped"
        );
    }
    forest
}

fn grow<'a>(
    doc: &'a DocBrief,
    children: &HashMap<&str, Vec<&'a DocBrief>>,
    visited: &mut HashSet<&'a str>,
) -> Option<SourceDoc> {
    if !visited.insert(doc.id.as_str()) {
        return None;
    }
    let mut node = SourceDoc::new(&doc.id, &doc.repo_id, &doc.title, doc.mtime);
    if let Some(kids) = children.get(doc.uuid.as_str()) {
        node.children = kids
            .iter()
            .filter_map(|&kid| grow(kid, children, visited))
            .collect();
    }
    Some(node)
}

/// Remove excluded documents together with their subtrees
fn exclude(docs: &mut Vec<SourceDoc>, filter: &SourceFilter) {
    docs.retain(|d| {
        let keep = !filter.excludes_doc(&d.title);
        if !keep {
            tracing::info!(doc = %d.title, "Excluding document and its subtree");
        }
        keep
    });
    for doc in docs.iter_mut() {
        exclude(&mut doc.children, filter);
    }
}
