//! Source-to-storage normalization
//!
//! The [`Normalizer`] runs an ordered sequence of rewrite passes over a
//! parsed [`Document`]:
//!
//! 1. **emphasis**: unwrap `<strong>` elements that carry no text
//! 2. **code**: `<pre>` blocks become `code` macros
//! 3. **image**: raster images become attachments, vector images are inlined
//! 4. **list**: flattened level-tagged lists are re-nested and merged
//! 5. **checklist**: task lists become numbered `ac:task` structures
//! 6. **decorate**: the first top-level element is restyled
//!
//! Later passes assume earlier ones already ran (checklists are only
//! recognized once lists have been re-nested).

pub mod checklist;
pub mod code;
pub mod decorate;
pub mod emphasis;
pub mod image;
pub mod list;
pub mod macros;

use crate::parse::Document;

/// Access to remote assets during normalization.
///
/// Implemented by the caller for the page being converted: `fetch` reads
/// image bytes from the source, the attachment methods operate on the
/// destination page.
pub trait AssetStore {
    type Error: std::fmt::Display;

    fn fetch(&self, url: &str) -> Result<Vec<u8>, Self::Error>;

    fn attachment_exists(&self, filename: &str) -> Result<bool, Self::Error>;

    fn upload_attachment(
        &self,
        filename: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), Self::Error>;
}

/// Runs every rewrite pass in order
pub struct Normalizer<'a, A: AssetStore> {
    assets: &'a A,
}

impl<'a, A: AssetStore> Normalizer<'a, A> {
    pub fn new(assets: &'a A) -> Self {
        Self { assets }
    }

    /// Rewrite `doc` in place.
    ///
    /// Never fails: per-image failures are logged and the image is left as is.
    pub fn normalize(&self, doc: &mut Document) {
        let nodes = doc.nodes_mut();

        emphasis::unwrap_empty_emphasis(nodes);
        code::convert_code_blocks(nodes);
        image::rewrite_images(nodes, self.assets);
        list::nest_lists(nodes);
        let tasks = checklist::convert_checklists(nodes);
        decorate::decorate_first_element(nodes);

        tracing::debug!(tasks, "Normalized document");
    }

    /// Parse, normalize and serialize in one step
    pub fn normalize_html(&self, html: &str) -> String {
        let mut doc = Document::parse(html);
        self.normalize(&mut doc);
        doc.to_storage()
    }
}
