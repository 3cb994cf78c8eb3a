//! Destination space model
//!
//! Pages live in a [`PageTree`] arena addressed by [`NodeId`]. Each node keeps
//! its ordered children and a `parent` back-reference; removing a node
//! tombstones its slot so ids held elsewhere never point at a different page.

use std::collections::HashMap;

use wiki_remote::{DestinationService, PageBrief};

use crate::error::{Error, Result};
use crate::marker;

/// Index of a node in a [`PageTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A destination page as known locally
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNode {
    pub id: String,
    pub title: String,
    pub version: u64,
    /// Seconds since epoch of the last version
    pub mtime: i64,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl PageNode {
    fn from_brief(page: PageBrief) -> Self {
        Self {
            id: page.id,
            title: page.title,
            version: page.version,
            mtime: page.mtime,
            parent: None,
            children: Vec::new(),
        }
    }

    fn refresh(&mut self, page: PageBrief) {
        self.title = page.title;
        self.version = page.version;
        self.mtime = page.mtime;
    }
}

/// Arena of page nodes
#[derive(Debug, Clone, Default)]
pub struct PageTree {
    slots: Vec<Option<PageNode>>,
}

impl PageTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a detached node
    pub fn insert(&mut self, node: PageNode) -> NodeId {
        self.slots.push(Some(node));
        NodeId(self.slots.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> Result<&PageNode> {
        self.slots
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(Error::UnknownNode { index: id.0 })
    }

    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut PageNode> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(Error::UnknownNode { index: id.0 })
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.get(id)?.children)
    }

    /// Append `child` to `parent`'s children
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.get(parent)?;
        self.get_mut(child)?.parent = Some(parent);
        self.get_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Remove `id` from the tree; its children take its place in the parent
    pub fn remove(&mut self, id: NodeId) -> Result<PageNode> {
        let node = self.get(id)?;
        let title = node.title.clone();
        let orphans = node.children.clone();

        if let Some(parent) = node.parent {
            let siblings = &mut self.get_mut(parent)?.children;
            let position = siblings
                .iter()
                .position(|&c| c == id)
                .ok_or(Error::DetachedNode { title })?;
            let tail = siblings.split_off(position + 1);
            siblings.pop();
            siblings.extend(orphans.iter().copied());
            siblings.extend(tail);
        }
        let parent = self.get(id)?.parent;
        for &orphan in &orphans {
            self.get_mut(orphan)?.parent = parent;
        }

        self.slots[id.0].take().ok_or(Error::UnknownNode { index: id.0 })
    }

    /// Descendants of `id` (excluding `id`), children before parents
    pub fn descendants_post_order(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        self.collect_post_order(id, &mut out)?;
        out.pop();
        Ok(out)
    }

    fn collect_post_order(&self, id: NodeId, out: &mut Vec<NodeId>) -> Result<()> {
        for &child in self.children(id)? {
            self.collect_post_order(child, out)?;
        }
        out.push(id);
        Ok(())
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Snapshot of the destination space, kept in step with every mutation
#[derive(Debug, Clone)]
pub struct DestinationSpace {
    key: String,
    tree: PageTree,
    root: NodeId,
}

impl DestinationSpace {
    /// List every page and build the tree below the space root
    pub fn load<D: DestinationService>(service: &D, root_page_id: Option<&str>) -> Result<Self> {
        let pages = service.list_all_pages()?;
        let space = Self::from_pages(service.space_key(), pages, root_page_id)?;
        tracing::info!(
            space = %space.key,
            pages = space.tree.len(),
            "Loaded destination space"
        );
        Ok(space)
    }

    /// Build the tree from a page listing.
    ///
    /// The root is `root_page_id` if given, else the only page without
    /// ancestors. Every other page hangs under the last entry of its
    /// ancestors; pages that do not reach the root are dropped.
    pub fn from_pages(
        key: impl Into<String>,
        pages: Vec<PageBrief>,
        root_page_id: Option<&str>,
    ) -> Result<Self> {
        let root_id = match root_page_id {
            Some(id) => {
                if !pages.iter().any(|p| p.id == id) {
                    return Err(Error::SpaceRoot {
                        message: format!("configured root page {id} is not in the space"),
                    });
                }
                id.to_string()
            }
            None => {
                let mut candidates = pages.iter().filter(|p| p.ancestors.is_empty());
                match (candidates.next(), candidates.next()) {
                    (Some(root), None) => root.id.clone(),
                    (None, _) => {
                        return Err(Error::SpaceRoot {
                            message: "no page without ancestors".to_string(),
                        });
                    }
                    (Some(_), Some(_)) => {
                        return Err(Error::SpaceRoot {
                            message: "several pages without ancestors; set destination.root_page_id"
                                .to_string(),
                        });
                    }
                }
            }
        };

        let mut tree = PageTree::new();
        let mut by_page_id: HashMap<String, NodeId> = HashMap::new();
        let mut parents: Vec<(NodeId, Option<String>)> = Vec::with_capacity(pages.len());
        for page in pages {
            let parent = page.parent_id().map(str::to_string);
            let page_id = page.id.clone();
            let node = tree.insert(PageNode::from_brief(page));
            by_page_id.insert(page_id, node);
            parents.push((node, parent));
        }

        let root = by_page_id
            .get(&root_id)
            .copied()
            .ok_or_else(|| Error::SpaceRoot {
                message: format!("root page {root_id} could not be indexed"),
            })?;
        for (node, parent) in parents {
            if node == root {
                continue;
            }
            if let Some(&parent) = parent.as_deref().and_then(|p| by_page_id.get(p)) {
                tree.attach(parent, node)?;
            }
        }

        // Keep only what hangs below the root
        let mut reachable = vec![false; tree.slots.len()];
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            reachable[id.0] = true;
            stack.extend(tree.children(id)?.iter().copied());
        }
        for (index, keep) in reachable.into_iter().enumerate() {
            if !keep && let Some(page) = tree.slots[index].take() {
                tracing::debug!(page = %page.title, "Page outside the root's subtree ignored");
            }
        }

        Ok(Self {
            key: key.into(),
            tree,
            root,
        })
    }

    /// Space key
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn tree(&self) -> &PageTree {
        &self.tree
    }

    pub fn node(&self, id: NodeId) -> Result<&PageNode> {
        self.tree.get(id)
    }

    /// Repo pages: the direct children of the root
    pub fn repos(&self) -> Result<&[NodeId]> {
        self.tree.children(self.root)
    }

    /// Title lookup over the non-deprecated children of `parent`.
    ///
    /// Fails when two of them share a title.
    pub fn child_index(&self, parent: NodeId) -> Result<HashMap<String, NodeId>> {
        let mut index = HashMap::new();
        for &child in self.tree.children(parent)? {
            let title = &self.tree.get(child)?.title;
            if marker::is_deprecated(title) {
                continue;
            }
            if index.insert(title.clone(), child).is_some() {
                return Err(Error::DuplicateTitle {
                    parent: self.tree.get(parent)?.title.clone(),
                    title: title.clone(),
                });
            }
        }
        Ok(index)
    }

    /// Temporary pages below any Repo, deepest first
    pub fn temporary_nodes(&self) -> Result<Vec<NodeId>> {
        let mut found = Vec::new();
        for &repo in self.repos()? {
            for node in self.tree.descendants_post_order(repo)? {
                if marker::is_temporary(&self.tree.get(node)?.title) {
                    found.push(node);
                }
            }
        }
        Ok(found)
    }

    /// Create a page under `parent` remotely and locally
    pub fn create_page<D: DestinationService>(
        &mut self,
        service: &D,
        parent: NodeId,
        title: &str,
        body: &str,
    ) -> Result<NodeId> {
        let parent_id = self.tree.get(parent)?.id.clone();
        let page = service.create_page(title, &[parent_id], body)?;
        tracing::info!(page = %page.title, id = %page.id, "Created page");

        let node = self.tree.insert(PageNode::from_brief(page));
        self.tree.attach(parent, node)?;
        Ok(node)
    }

    /// Replace title and body with version + 1
    pub fn update_page<D: DestinationService>(
        &mut self,
        service: &D,
        node: NodeId,
        title: &str,
        body: &str,
    ) -> Result<()> {
        let current = self.tree.get(node)?;
        let page = service.update_page(&current.id, title, current.version + 1, body)?;
        tracing::info!(page = %page.title, version = page.version, "Updated page");
        self.tree.get_mut(node)?.refresh(page);
        Ok(())
    }

    /// Replace the title only, with version + 1
    pub fn rename_page<D: DestinationService>(
        &mut self,
        service: &D,
        node: NodeId,
        title: &str,
    ) -> Result<()> {
        let current = self.tree.get_mut(node)?;
        let version = current.version + 1;
        service.update_page_title(&current.id, title, version)?;
        tracing::info!(from = %current.title, to = title, "Renamed page");
        current.title = title.to_string();
        current.version = version;
        Ok(())
    }

    /// Delete a page remotely and drop it from the tree
    pub fn delete_page<D: DestinationService>(&mut self, service: &D, node: NodeId) -> Result<()> {
        let id = self.tree.get(node)?.id.clone();
        service.delete_page(&id)?;
        let removed = self.tree.remove(node)?;
        tracing::info!(page = %removed.title, id = %removed.id, "Deleted page");
        Ok(())
    }

    /// Key of the space owning the page
    pub fn owner_of<D: DestinationService>(&self, service: &D, node: NodeId) -> Result<String> {
        Ok(service.get_page_space_owner(&self.tree.get(node)?.id)?)
    }
}
