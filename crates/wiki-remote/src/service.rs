//! Collaborator traits
//!
//! Every method takes `&self`; implementations that keep state use interior
//! mutability.

use crate::error::Result;
use crate::models::{AttachmentBrief, DocBrief, PageBrief, RepoBrief};

/// Read-only access to the source wiki
pub trait SourceService {
    fn list_all_repos(&self) -> Result<Vec<RepoBrief>>;

    /// Every document of a repository, with hierarchy links resolved
    fn list_all_docs_in_repo(&self, repo_id: &str) -> Result<Vec<DocBrief>>;

    /// Rendered HTML body of a document
    fn get_doc_body(&self, repo_id: &str, doc_id: &str) -> Result<String>;
}

/// Pages and attachments of the destination space
pub trait DestinationService {
    /// Key of the space this service writes to
    fn space_key(&self) -> &str;

    fn list_all_pages(&self) -> Result<Vec<PageBrief>>;

    /// Create a page below the last of `ancestors`
    fn create_page(&self, title: &str, ancestors: &[String], body: &str) -> Result<PageBrief>;

    /// Replace title and body. `version` must be the current version + 1.
    fn update_page(&self, id: &str, title: &str, version: u64, body: &str) -> Result<PageBrief>;

    /// Replace the title only. `version` must be the current version + 1.
    fn update_page_title(&self, id: &str, title: &str, version: u64) -> Result<()>;

    fn delete_page(&self, id: &str) -> Result<()>;

    /// Key of the space that owns the page
    fn get_page_space_owner(&self, id: &str) -> Result<String>;

    fn upload_attachment(
        &self,
        page_id: &str,
        filename: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<()>;

    fn find_attachment_by_name(
        &self,
        page_id: &str,
        filename: &str,
    ) -> Result<Option<AttachmentBrief>>;
}

/// Downloads embedded images
pub trait ImageFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Reports the outcome of a run
pub trait Notifier {
    /// `None` on success. Delivery failures are not reported back.
    fn notify(&self, error: Option<&dyn std::error::Error>);
}
