//! [`FakeImages`]: canned image bytes by URL

use std::cell::Cell;
use std::collections::HashMap;

use wiki_remote::{ImageFetcher, Result};

use crate::not_found;

/// Serves registered URLs and answers 404 for everything else
#[derive(Default)]
pub struct FakeImages {
    images: HashMap<String, Vec<u8>>,
    fetches: Cell<usize>,
}

impl FakeImages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: register `bytes` under `url`
    pub fn with(mut self, url: &str, bytes: &[u8]) -> Self {
        self.images.insert(url.to_string(), bytes.to_vec());
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.get()
    }
}

impl ImageFetcher for FakeImages {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.fetches.set(self.fetches.get() + 1);
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| not_found("GET", url))
    }
}
