//! Destination macro fragments

use uuid::Uuid;

use crate::node::{Element, Node};

/// An `ac:structured-macro` with a fresh macro id
pub fn structured_macro(name: &str) -> Element {
    Element::new("ac:structured-macro")
        .attr("ac:name", name)
        .attr("ac:schema-version", "1")
        .attr("ac:macro-id", Uuid::new_v4().to_string())
}

/// A macro whose body is literal text
pub fn plain_text_macro(name: &str, body: &str) -> Element {
    structured_macro(name).child(Element::new("ac:plain-text-body").child(Node::cdata(body)))
}

/// Reference to an attachment of the current page rendered as an image
pub fn attached_image(filename: &str) -> Element {
    Element::new("ac:image")
        .attr("ac:thumbnail", "true")
        .child(Element::new("ri:attachment").attr("ri:filename", filename))
}
