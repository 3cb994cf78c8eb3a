//! Remote services for wikisync
//!
//! This crate defines the collaborator traits the reconciler talks to and
//! provides blocking HTTP implementations of them:
//!
//! - [`SourceService`]: read-only access to the source wiki ([`YuqueClient`])
//! - [`DestinationService`]: pages and attachments of the destination space
//!   ([`ConfluenceClient`])
//! - [`ImageFetcher`]: raw image downloads ([`HttpImageFetcher`])
//! - [`Notifier`]: end-of-run notification ([`WebhookNotifier`])
//!
//! All calls are sequential and blocking. Any transport failure, non-2xx
//! status or malformed body surfaces as an [`Error`].

pub mod confluence;
pub mod error;
pub mod http;
pub mod image;
pub mod models;
pub mod notify;
pub mod service;
pub mod yuque;

pub use confluence::ConfluenceClient;
pub use error::{Error, Result};
pub use http::HttpClient;
pub use image::HttpImageFetcher;
pub use models::{AttachmentBrief, DocBrief, PageBrief, RepoBrief};
pub use notify::WebhookNotifier;
pub use service::{DestinationService, ImageFetcher, Notifier, SourceService};
pub use yuque::YuqueClient;
