//! [`FakeSource`]: an in-memory source wiki

use std::cell::{Cell, RefCell};

use wiki_remote::{DocBrief, RepoBrief, Result, SourceService};

use crate::not_found;

#[derive(Debug, Clone)]
struct StoredDoc {
    brief: DocBrief,
    body: String,
}

/// In-memory source with sequential repo and document ids.
///
/// # Example
///
/// ```rust
/// use wiki_test_utils::FakeSource;
/// use wiki_remote::SourceService;
///
/// let source = FakeSource::new();
/// let guide = source.add_repo("Guide");
/// let intro = source.add_doc(&guide, "Intro", None, 100, "<p>Hello</p>");
/// source.add_doc(&guide, "Setup", Some(&intro), 100, "<p>Steps</p>");
///
/// assert_eq!(source.list_all_docs_in_repo(&guide).unwrap().len(), 2);
/// ```
#[derive(Default)]
pub struct FakeSource {
    repos: RefCell<Vec<RepoBrief>>,
    docs: RefCell<Vec<StoredDoc>>,
    next_id: Cell<u64>,
    body_fetches: Cell<usize>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> String {
        self.next_id.set(self.next_id.get() + 1);
        self.next_id.get().to_string()
    }

    /// Add a repository and return its id
    pub fn add_repo(&self, title: &str) -> String {
        let id = self.next_id();
        self.repos.borrow_mut().push(RepoBrief {
            id: id.clone(),
            title: title.to_string(),
            mtime: 0,
        });
        id
    }

    /// Add a document under `parent` (a document id) and return its id
    pub fn add_doc(
        &self,
        repo_id: &str,
        title: &str,
        parent: Option<&str>,
        mtime: i64,
        body: &str,
    ) -> String {
        let id = self.next_id();
        self.docs.borrow_mut().push(StoredDoc {
            brief: DocBrief {
                id: id.clone(),
                repo_id: repo_id.to_string(),
                title: title.to_string(),
                mtime,
                uuid: uuid_of(&id),
                parent_uuid: parent.map(uuid_of),
            },
            body: body.to_string(),
        });
        id
    }

    /// Simulate an edit: new body and modification time
    pub fn edit_doc(&self, doc_id: &str, mtime: i64, body: &str) {
        if let Some(doc) = self.docs.borrow_mut().iter_mut().find(|d| d.brief.id == doc_id) {
            doc.brief.mtime = mtime;
            doc.body = body.to_string();
        }
    }

    /// Remove a document (its children become unreachable orphans)
    pub fn remove_doc(&self, doc_id: &str) {
        self.docs.borrow_mut().retain(|d| d.brief.id != doc_id);
    }

    /// Number of `get_doc_body` calls so far
    pub fn body_fetches(&self) -> usize {
        self.body_fetches.get()
    }
}

/// Table-of-contents uuid used for a document id
pub fn uuid_of(doc_id: &str) -> String {
    format!("uuid-{doc_id}")
}

impl SourceService for FakeSource {
    fn list_all_repos(&self) -> Result<Vec<RepoBrief>> {
        Ok(self.repos.borrow().clone())
    }

    fn list_all_docs_in_repo(&self, repo_id: &str) -> Result<Vec<DocBrief>> {
        Ok(self
            .docs
            .borrow()
            .iter()
            .filter(|d| d.brief.repo_id == repo_id)
            .map(|d| d.brief.clone())
            .collect())
    }

    fn get_doc_body(&self, repo_id: &str, doc_id: &str) -> Result<String> {
        self.body_fetches.set(self.body_fetches.get() + 1);
        self.docs
            .borrow()
            .iter()
            .find(|d| d.brief.repo_id == repo_id && d.brief.id == doc_id)
            .map(|d| d.body.clone())
            .ok_or_else(|| not_found("GET", doc_id))
    }
}
