//! [`RecordingNotifier`]: remembers every notification

use std::cell::RefCell;

use wiki_remote::Notifier;

/// Stores `None` for success and the error text for failures
#[derive(Default)]
pub struct RecordingNotifier {
    pub received: RefCell<Vec<Option<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> Vec<Option<String>> {
        self.received.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, error: Option<&dyn std::error::Error>) {
        self.received.borrow_mut().push(error.map(|e| e.to_string()));
    }
}
