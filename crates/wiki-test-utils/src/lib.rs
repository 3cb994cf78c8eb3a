//! Shared test utilities for the wikisync workspace.
//!
//! In-memory stand-ins for every remote collaborator. They keep their state
//! behind `RefCell`, record the calls they receive and reproduce the
//! destination's version and title checks. Dev-dependency only.
//!
//! # Modules
//!
//! - [`destination`]: [`FakeDestination`] page store with a call log
//! - [`source`]: [`FakeSource`] repository and document builder
//! - [`images`]: [`FakeImages`] URL-to-bytes map
//! - [`notify`]: [`RecordingNotifier`]
//! - [`config`]: [`ConfigFile`] temporary configuration files

pub mod config;
pub mod destination;
pub mod images;
pub mod notify;
pub mod source;

pub use config::ConfigFile;
pub use destination::{Call, FakeDestination, StoredPage};
pub use images::FakeImages;
pub use notify::RecordingNotifier;
pub use source::FakeSource;

/// Error returned by fakes for a missing resource
pub fn not_found(method: &str, what: &str) -> wiki_remote::Error {
    status(method, what, 404, "not found")
}

/// Error with an arbitrary status code
pub fn status(method: &str, what: &str, code: u16, body: &str) -> wiki_remote::Error {
    wiki_remote::Error::Status {
        method: method.to_string(),
        url: format!("fake://{what}"),
        code,
        body: body.to_string(),
    }
}
