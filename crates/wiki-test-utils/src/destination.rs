//! [`FakeDestination`]: an in-memory destination space

use std::cell::RefCell;

use wiki_remote::{AttachmentBrief, DestinationService, PageBrief, Result};

use crate::{not_found, status};

/// First timestamp handed out by the fake clock
pub const CLOCK_START: i64 = 1_000;

/// A page as stored by the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPage {
    pub id: String,
    pub title: String,
    pub version: u64,
    pub mtime: i64,
    pub ancestors: Vec<String>,
    pub space: String,
    pub body: String,
    pub attachments: Vec<String>,
}

/// A service call received by the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListPages,
    CreatePage { title: String },
    UpdatePage { id: String, title: String, version: u64 },
    UpdateTitle { id: String, title: String, version: u64 },
    DeletePage { id: String },
    GetOwner { id: String },
    UploadAttachment { page_id: String, filename: String },
    FindAttachment { page_id: String, filename: String },
}

impl Call {
    /// Whether the call changes destination state
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Call::CreatePage { .. }
                | Call::UpdatePage { .. }
                | Call::UpdateTitle { .. }
                | Call::DeletePage { .. }
                | Call::UploadAttachment { .. }
        )
    }
}

#[derive(Default)]
struct State {
    pages: Vec<StoredPage>,
    next_id: u64,
    clock: i64,
    calls: Vec<Call>,
    failing_updates: bool,
}

impl State {
    fn tick(&mut self) -> i64 {
        self.clock += 1;
        self.clock
    }

    fn page(&self, id: &str) -> Result<&StoredPage> {
        self.pages
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("GET", id))
    }

    fn page_mut(&mut self, id: &str) -> Result<&mut StoredPage> {
        self.pages
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("PUT", id))
    }

    fn title_taken(&self, space: &str, title: &str, except: Option<&str>) -> bool {
        self.pages
            .iter()
            .any(|p| p.space == space && p.title == title && Some(p.id.as_str()) != except)
    }

    fn insert(&mut self, space: &str, title: &str, parent: Option<&str>, mtime: i64) -> String {
        self.next_id += 1;
        let id = self.next_id.to_string();
        let ancestors = match parent.and_then(|p| self.pages.iter().find(|page| page.id == p)) {
            Some(parent) => {
                let mut chain = parent.ancestors.clone();
                chain.push(parent.id.clone());
                chain
            }
            None => Vec::new(),
        };
        self.pages.push(StoredPage {
            id: id.clone(),
            title: title.to_string(),
            version: 1,
            mtime,
            ancestors,
            space: space.to_string(),
            body: String::new(),
            attachments: Vec::new(),
        });
        id
    }

    fn check_version(&self, id: &str, version: u64) -> Result<()> {
        let current = self.page(id)?.version;
        if version != current + 1 {
            return Err(status(
                "PUT",
                id,
                409,
                &format!("version must be {}, got {}", current + 1, version),
            ));
        }
        Ok(())
    }
}

fn brief(page: &StoredPage) -> PageBrief {
    PageBrief {
        id: page.id.clone(),
        title: page.title.clone(),
        version: page.version,
        mtime: page.mtime,
        ancestors: page.ancestors.clone(),
    }
}

/// In-memory destination space.
///
/// Starts with a single home page. Page ids are sequential, every mutation
/// advances a clock starting at [`CLOCK_START`], titles are unique within a
/// space and updates must carry the current version + 1.
pub struct FakeDestination {
    space: String,
    root: String,
    state: RefCell<State>,
}

impl FakeDestination {
    pub fn new(space: &str) -> Self {
        let mut state = State {
            clock: CLOCK_START,
            ..State::default()
        };
        let root = state.insert(space, &format!("{space} Home"), None, CLOCK_START);
        Self {
            space: space.to_string(),
            root,
            state: RefCell::new(state),
        }
    }

    /// Id of the space home page
    pub fn root_id(&self) -> &str {
        &self.root
    }

    /// Seed a page owned by this space
    pub fn add_page(&self, title: &str, parent: &str, mtime: i64) -> String {
        self.state
            .borrow_mut()
            .insert(&self.space, title, Some(parent), mtime)
    }

    /// Seed a page that shows up in this space's tree but belongs to `space`
    pub fn add_foreign_page(&self, title: &str, parent: &str, space: &str) -> String {
        self.state
            .borrow_mut()
            .insert(space, title, Some(parent), CLOCK_START)
    }

    /// Make every subsequent `update_page` fail with status 500
    pub fn fail_updates(&self) {
        self.state.borrow_mut().failing_updates = true;
    }

    pub fn page(&self, id: &str) -> Option<StoredPage> {
        self.state.borrow().page(id).ok().cloned()
    }

    pub fn page_by_title(&self, title: &str) -> Option<StoredPage> {
        self.state
            .borrow()
            .pages
            .iter()
            .find(|p| p.title == title)
            .cloned()
    }

    pub fn pages(&self) -> Vec<StoredPage> {
        self.state.borrow().pages.clone()
    }

    /// Titles of the direct children of `parent`, in creation order
    pub fn child_titles(&self, parent: &str) -> Vec<String> {
        self.state
            .borrow()
            .pages
            .iter()
            .filter(|p| p.ancestors.last().map(String::as_str) == Some(parent))
            .map(|p| p.title.clone())
            .collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn mutation_count(&self) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| c.is_mutation())
            .count()
    }

    pub fn upload_count(&self) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::UploadAttachment { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl DestinationService for FakeDestination {
    fn space_key(&self) -> &str {
        &self.space
    }

    fn list_all_pages(&self) -> Result<Vec<PageBrief>> {
        self.record(Call::ListPages);
        Ok(self.state.borrow().pages.iter().map(brief).collect())
    }

    fn create_page(&self, title: &str, ancestors: &[String], body: &str) -> Result<PageBrief> {
        self.record(Call::CreatePage {
            title: title.to_string(),
        });
        let mut state = self.state.borrow_mut();
        if state.title_taken(&self.space, title, None) {
            return Err(status("POST", title, 400, "a page with this title already exists"));
        }
        let parent = ancestors.last().map(String::as_str);
        if let Some(parent) = parent {
            state.page(parent)?;
        }
        let now = state.tick();
        let id = state.insert(&self.space, title, parent, now);
        let page = state.page_mut(&id)?;
        page.body = body.to_string();
        Ok(brief(page))
    }

    fn update_page(&self, id: &str, title: &str, version: u64, body: &str) -> Result<PageBrief> {
        self.record(Call::UpdatePage {
            id: id.to_string(),
            title: title.to_string(),
            version,
        });
        let mut state = self.state.borrow_mut();
        if state.failing_updates {
            return Err(status("PUT", id, 500, "internal error"));
        }
        state.check_version(id, version)?;
        if state.title_taken(&self.space, title, Some(id)) {
            return Err(status("PUT", id, 400, "a page with this title already exists"));
        }
        let now = state.tick();
        let page = state.page_mut(id)?;
        page.title = title.to_string();
        page.body = body.to_string();
        page.version = version;
        page.mtime = now;
        Ok(brief(page))
    }

    fn update_page_title(&self, id: &str, title: &str, version: u64) -> Result<()> {
        self.record(Call::UpdateTitle {
            id: id.to_string(),
            title: title.to_string(),
            version,
        });
        let mut state = self.state.borrow_mut();
        state.check_version(id, version)?;
        let now = state.tick();
        let page = state.page_mut(id)?;
        page.title = title.to_string();
        page.version = version;
        page.mtime = now;
        Ok(())
    }

    fn delete_page(&self, id: &str) -> Result<()> {
        self.record(Call::DeletePage { id: id.to_string() });
        let mut state = self.state.borrow_mut();
        state.page(id)?;
        state.pages.retain(|p| p.id != id);
        // Children move up to the deleted page's parent
        for page in state.pages.iter_mut() {
            page.ancestors.retain(|a| a != id);
        }
        state.tick();
        Ok(())
    }

    fn get_page_space_owner(&self, id: &str) -> Result<String> {
        self.record(Call::GetOwner { id: id.to_string() });
        Ok(self.state.borrow().page(id)?.space.clone())
    }

    fn upload_attachment(
        &self,
        page_id: &str,
        filename: &str,
        _bytes: &[u8],
        _content_type: &str,
    ) -> Result<()> {
        self.record(Call::UploadAttachment {
            page_id: page_id.to_string(),
            filename: filename.to_string(),
        });
        let mut state = self.state.borrow_mut();
        let page = state.page_mut(page_id)?;
        if page.attachments.iter().any(|a| a == filename) {
            return Err(status("POST", filename, 400, "attachment already exists"));
        }
        page.attachments.push(filename.to_string());
        Ok(())
    }

    fn find_attachment_by_name(
        &self,
        page_id: &str,
        filename: &str,
    ) -> Result<Option<AttachmentBrief>> {
        self.record(Call::FindAttachment {
            page_id: page_id.to_string(),
            filename: filename.to_string(),
        });
        let state = self.state.borrow();
        let page = state.page(page_id)?;
        Ok(page
            .attachments
            .iter()
            .position(|a| a == filename)
            .map(|i| AttachmentBrief {
                id: format!("att{}-{}", page_id, i + 1),
                title: filename.to_string(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_space_has_home_page() {
        let dest = FakeDestination::new("DOCS");
        let pages = dest.list_all_pages().unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].ancestors.is_empty());
        assert_eq!(pages[0].id, dest.root_id());
    }

    #[test]
    fn test_stale_version_is_rejected() {
        let dest = FakeDestination::new("DOCS");
        let id = dest.add_page("Guide", dest.root_id(), 10);
        let err = dest.update_page(&id, "Guide", 1, "").unwrap_err();
        assert_eq!(err.status(), Some(409));
        dest.update_page(&id, "Guide", 2, "<p/>").unwrap();
        assert_eq!(dest.page(&id).unwrap().version, 2);
    }

    #[test]
    fn test_created_pages_inherit_ancestor_chain() {
        let dest = FakeDestination::new("DOCS");
        let guide = dest.add_page("Guide", dest.root_id(), 10);
        let page = dest
            .create_page("Intro", std::slice::from_ref(&guide), "")
            .unwrap();
        assert_eq!(page.ancestors, vec![dest.root_id().to_string(), guide]);
        assert!(page.mtime > CLOCK_START);
    }

    #[test]
    fn test_duplicate_title_is_rejected() {
        let dest = FakeDestination::new("DOCS");
        dest.add_page("Guide", dest.root_id(), 10);
        let err = dest
            .create_page("Guide", &[dest.root_id().to_string()], "")
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_mutations_are_counted() {
        let dest = FakeDestination::new("DOCS");
        dest.list_all_pages().unwrap();
        dest.create_page("A", &[dest.root_id().to_string()], "").unwrap();
        assert_eq!(dest.calls().len(), 2);
        assert_eq!(dest.mutation_count(), 1);
    }
}
