//! Tree reconciliation
//!
//! [`Reconciler::synchronize`] runs four passes in a fixed order:
//!
//! 1. **cleanup**: delete temporary pages left by an interrupted run, after
//!    confirming every one of them belongs to the configured space
//! 2. **deprecation**: tag destination pages whose source disappeared
//! 3. **convergence**: create missing pages and refresh stale ones, parents
//!    before children
//! 4. **cleanup** again
//!
//! Duplicate sibling titles in the source are rejected before the first pass.
//! Pages are matched to source documents by title among siblings. Any error
//! aborts the run; the passes are idempotent so the next run picks up where
//! this one stopped.

use std::collections::{HashMap, HashSet};

use wiki_remote::{DestinationService, ImageFetcher, SourceService};

use crate::convert::DocumentConverter;
use crate::destination::{DestinationSpace, NodeId};
use crate::error::{Error, Result};
use crate::marker;
use crate::report::{SyncActionKind, SyncReport};
use crate::source::{SourceDoc, SourceSpace};

/// Drives one synchronization run against the given services
pub struct Reconciler<'a, S, D, I> {
    source: &'a S,
    destination: &'a D,
    images: &'a I,
}

impl<'a, S, D, I> Reconciler<'a, S, D, I>
where
    S: SourceService,
    D: DestinationService,
    I: ImageFetcher,
{
    pub fn new(source: &'a S, destination: &'a D, images: &'a I) -> Self {
        Self {
            source,
            destination,
            images,
        }
    }

    /// Bring `destination` in line with `source`
    pub fn synchronize(
        &self,
        source: &SourceSpace,
        destination: &mut DestinationSpace,
    ) -> Result<SyncReport> {
        check_unique_titles(source)?;
        let mut report = SyncReport::new();

        tracing::info!("Removing leftover placeholders");
        self.cleanup(destination, &mut report)?;

        tracing::info!("Deprecating removed documents");
        self.deprecate(source, destination, &mut report)?;

        tracing::info!("Converging documents");
        self.converge(source, destination, &mut report)?;

        tracing::info!("Removing placeholders");
        self.cleanup(destination, &mut report)?;

        tracing::info!(summary = %report, "Synchronization finished");
        Ok(report)
    }

    fn cleanup(&self, space: &mut DestinationSpace, report: &mut SyncReport) -> Result<()> {
        let targets = space.temporary_nodes()?;

        for &node in &targets {
            let owner = space.owner_of(self.destination, node)?;
            if owner != space.key() {
                let page = space.node(node)?;
                return Err(Error::OwnershipViolation {
                    title: page.title.clone(),
                    page_id: page.id.clone(),
                    expected: space.key().to_string(),
                    actual: owner,
                });
            }
        }

        for node in targets {
            let page = space.node(node)?;
            let (title, id) = (page.title.clone(), page.id.clone());
            space.delete_page(self.destination, node)?;
            report.record(SyncActionKind::Deleted, title, id);
        }
        Ok(())
    }

    fn deprecate(
        &self,
        source: &SourceSpace,
        space: &mut DestinationSpace,
        report: &mut SyncReport,
    ) -> Result<()> {
        let repos = space.child_index(space.root())?;
        let mut plan = Vec::new();

        for repo in &source.repos {
            if let Some(&node) = repos.get(&repo.title) {
                self.plan_deprecations(&repo.title, &repo.docs, space, node, &mut plan)?;
            }
        }

        for node in plan {
            let page = space.node(node)?;
            if marker::is_exempt_from_deprecation(&page.title) {
                continue;
            }
            let title = marker::deprecated(&page.title);
            let id = page.id.clone();
            space.rename_page(self.destination, node, &title)?;
            report.record(SyncActionKind::Deprecated, title, id);
        }
        Ok(())
    }

    fn plan_deprecations(
        &self,
        parent_title: &str,
        docs: &[SourceDoc],
        space: &DestinationSpace,
        parent: NodeId,
        plan: &mut Vec<NodeId>,
    ) -> Result<()> {
        let sources = source_index(parent_title, docs)?;

        for &child in space.tree().children(parent)? {
            let title = &space.node(child)?.title;
            if marker::is_deprecated(title) {
                continue;
            }
            match sources.get(title.as_str()) {
                Some(doc) => {
                    self.plan_deprecations(title, &doc.children, space, child, plan)?;
                }
                None if marker::is_protected(title) => {}
                None => {
                    tracing::debug!(page = %title, "No source document, deprecating subtree");
                    for node in space.tree().descendants_post_order(child)? {
                        if !marker::is_exempt_from_deprecation(&space.node(node)?.title) {
                            plan.push(node);
                        }
                    }
                    plan.push(child);
                }
            }
        }
        Ok(())
    }

    fn converge(
        &self,
        source: &SourceSpace,
        space: &mut DestinationSpace,
        report: &mut SyncReport,
    ) -> Result<()> {
        let root = space.root();
        let repos = space.child_index(root)?;

        for repo in &source.repos {
            let node = match repos.get(&repo.title) {
                Some(&node) => node,
                None => {
                    let node = space.create_page(self.destination, root, &repo.title, "")?;
                    report.record(SyncActionKind::Created, &repo.title, &space.node(node)?.id);
                    node
                }
            };
            self.align(&repo.docs, space, node, report)?;
        }
        Ok(())
    }

    fn align(
        &self,
        docs: &[SourceDoc],
        space: &mut DestinationSpace,
        parent: NodeId,
        report: &mut SyncReport,
    ) -> Result<()> {
        let existing = space.child_index(parent)?;

        for doc in docs {
            let node = match existing.get(&doc.title) {
                Some(&node) => {
                    let page = space.node(node)?;
                    if page.mtime < doc.mtime {
                        tracing::debug!(doc = %doc.title, page_mtime = page.mtime, doc_mtime = doc.mtime, "Page is stale");
                        self.converter(doc, node).convert(space)?;
                        report.record(SyncActionKind::Updated, &doc.title, &space.node(node)?.id);
                    } else {
                        report.record(SyncActionKind::Unchanged, &doc.title, &page.id);
                    }
                    node
                }
                None => {
                    let placeholder = marker::temporary(&doc.title);
                    let node = space.create_page(self.destination, parent, &placeholder, "")?;
                    self.converter(doc, node).convert(space)?;
                    report.record(SyncActionKind::Created, &doc.title, &space.node(node)?.id);
                    node
                }
            };
            self.align(&doc.children, space, node, report)?;
        }
        Ok(())
    }

    fn converter<'d>(&'d self, doc: &'d SourceDoc, node: NodeId) -> DocumentConverter<'d, S, D, I> {
        DocumentConverter::new(self.source, self.destination, self.images, doc, node)
    }
}

/// Title lookup over source siblings, rejecting duplicates
fn source_index<'d>(parent: &str, docs: &'d [SourceDoc]) -> Result<HashMap<&'d str, &'d SourceDoc>> {
    let mut index = HashMap::with_capacity(docs.len());
    for doc in docs {
        if index.insert(doc.title.as_str(), doc).is_some() {
            return Err(Error::DuplicateTitle {
                parent: parent.to_string(),
                title: doc.title.clone(),
            });
        }
    }
    Ok(index)
}

/// Reject duplicate sibling titles anywhere in the source, before any pass runs
fn check_unique_titles(source: &SourceSpace) -> Result<()> {
    let mut seen = HashSet::new();
    for repo in &source.repos {
        if !seen.insert(repo.title.as_str()) {
            return Err(Error::DuplicateTitle {
                parent: "(space root)".to_string(),
                title: repo.title.clone(),
            });
        }
        check_unique_docs(&repo.title, &repo.docs)?;
    }
    Ok(())
}

fn check_unique_docs(parent: &str, docs: &[SourceDoc]) -> Result<()> {
    source_index(parent, docs)?;
    for doc in docs {
        check_unique_docs(&doc.title, &doc.children)?;
    }
    Ok(())
}
