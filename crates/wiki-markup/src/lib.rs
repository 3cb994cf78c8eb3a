//! Markup handling for wikisync
//!
//! Parses source rich-text HTML into an owned node tree, rewrites it into the
//! destination's storage format, and serializes the result as XHTML.
//!
//! # Layout
//!
//! - [`node`]: owned markup tree and fragment builder
//! - [`parse`]: HTML5 parsing into [`Document`]
//! - [`serialize`]: storage-format (XHTML) serialization
//! - [`normalize`]: ordered rewrite passes and the [`Normalizer`]
//!
//! # Example
//!
//! ```
//! use wiki_markup::Document;
//!
//! let doc = Document::parse("<p>Hello<br>world</p>");
//! assert_eq!(doc.to_storage(), "<p>Hello<br/>world</p>");
//! ```

pub mod error;
pub mod node;
pub mod normalize;
pub mod parse;
pub mod serialize;

pub use error::{Error, Result};
pub use node::{Attribute, Element, Node};
pub use normalize::{AssetStore, Normalizer};
pub use parse::Document;
