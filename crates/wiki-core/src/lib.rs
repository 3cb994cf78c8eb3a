//! Core synchronization layer for wikisync
//!
//! This crate sits between the markup normalizer and the remote services:
//!
//! ```text
//!                  wiki-cli
//!                     |
//!                 wiki-core
//!                /         \
//!        wiki-markup     wiki-remote
//! ```
//!
//! - **Title markers** ([`marker`]): the `[Temp]`, `[Deprecated]` and
//!   `[Protected]` title prefixes
//! - **Space models** ([`source`], [`destination`]): per-run snapshots of both
//!   hierarchies; the destination tree is an arena with parent back-references
//! - **Reconciliation** ([`Reconciler`]): cleanup, deprecation and convergence
//!   passes producing a [`SyncReport`]
//! - **Conversion** ([`DocumentConverter`]): fetch, normalize and store one
//!   document
//! - **Configuration** ([`Config`]): TOML or JSON settings file
//!
//! # Example
//!
//! ```rust,ignore
//! use wiki_core::{Config, DestinationSpace, Reconciler, SourceSpace};
//!
//! let config = Config::load(&path)?;
//! let source = SourceSpace::load(&yuque, &config.source_filter())?;
//! let mut destination = DestinationSpace::load(&confluence, config.destination.root_page_id.as_deref())?;
//! let report = Reconciler::new(&yuque, &confluence, &images).synchronize(&source, &mut destination)?;
//! ```

pub mod config;
pub mod convert;
pub mod destination;
pub mod error;
pub mod marker;
pub mod reconcile;
pub mod report;
pub mod source;

pub use config::{Config, DestinationConfig, NotificationConfig, SourceConfig};
pub use convert::{DocumentConverter, PageAssets};
pub use destination::{DestinationSpace, NodeId, PageNode, PageTree};
pub use error::{Error, Result};
pub use reconcile::Reconciler;
pub use report::{SyncAction, SyncActionKind, SyncReport};
pub use source::{SourceDoc, SourceFilter, SourceRepo, SourceSpace};
