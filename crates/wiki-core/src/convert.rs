//! Per-document conversion

use wiki_markup::{AssetStore, Normalizer};
use wiki_remote::{DestinationService, ImageFetcher, SourceService};

use crate::destination::{DestinationSpace, NodeId};
use crate::error::Result;
use crate::marker;
use crate::source::SourceDoc;

/// [`AssetStore`] bound to one destination page
pub struct PageAssets<'a, D, I> {
    destination: &'a D,
    images: &'a I,
    page_id: &'a str,
}

impl<'a, D: DestinationService, I: ImageFetcher> PageAssets<'a, D, I> {
    pub fn new(destination: &'a D, images: &'a I, page_id: &'a str) -> Self {
        Self {
            destination,
            images,
            page_id,
        }
    }
}

impl<D: DestinationService, I: ImageFetcher> AssetStore for PageAssets<'_, D, I> {
    type Error = wiki_remote::Error;

    fn fetch(&self, url: &str) -> wiki_remote::Result<Vec<u8>> {
        self.images.fetch(url)
    }

    fn attachment_exists(&self, filename: &str) -> wiki_remote::Result<bool> {
        Ok(self
            .destination
            .find_attachment_by_name(self.page_id, filename)?
            .is_some())
    }

    fn upload_attachment(
        &self,
        filename: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> wiki_remote::Result<()> {
        self.destination
            .upload_attachment(self.page_id, filename, bytes, content_type)
    }
}

/// Converts one source document into one destination page.
///
/// Fetches the body, normalizes it with attachments registered on the
/// target page, and stores it with a single update that also strips the
/// temporary marker from the title.
pub struct DocumentConverter<'a, S, D, I> {
    source: &'a S,
    destination: &'a D,
    images: &'a I,
    doc: &'a SourceDoc,
    node: NodeId,
}

impl<'a, S, D, I> DocumentConverter<'a, S, D, I>
where
    S: SourceService,
    D: DestinationService,
    I: ImageFetcher,
{
    pub fn new(
        source: &'a S,
        destination: &'a D,
        images: &'a I,
        doc: &'a SourceDoc,
        node: NodeId,
    ) -> Self {
        Self {
            source,
            destination,
            images,
            doc,
            node,
        }
    }

    pub fn convert(&self, space: &mut DestinationSpace) -> Result<()> {
        let html = self.source.get_doc_body(&self.doc.repo_id, &self.doc.id)?;

        let page = space.node(self.node)?;
        let title = marker::strip_temporary(&page.title).to_string();
        let assets = PageAssets::new(self.destination, self.images, &page.id);
        let body = Normalizer::new(&assets).normalize_html(&html);

        tracing::debug!(doc = %self.doc.title, bytes = body.len(), "Converted document");
        space.update_page(self.destination, self.node, &title, &body)
    }
}
