//! HTML5 parsing into an owned [`Document`]

use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, QualName, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::node::{Attribute, Element, Node};
use crate::serialize;

/// The body content of a parsed page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Parse an HTML document or fragment.
    ///
    /// Parsing follows the HTML5 algorithm and never fails: malformed input
    /// is repaired the way a browser would repair it. Only the content of
    /// `<body>` is kept; comments, doctypes and processing instructions are
    /// dropped.
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);

        let nodes = find_element(&dom.document, "body")
            .map(|body| convert_children(&body))
            .unwrap_or_default();

        Self { nodes }
    }

    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    /// First element (depth-first) with the given name
    pub fn find_element(&self, name: &str) -> Option<&Element> {
        for el in self.nodes.iter().filter_map(Node::as_element) {
            if el.is(name) {
                return Some(el);
            }
            if let Some(found) = el.find(&|e| e.is(name)) {
                return Some(found);
            }
        }
        None
    }

    /// Serialize to the destination storage format
    pub fn to_storage(&self) -> String {
        serialize::to_storage(&self.nodes)
    }
}

fn find_element(handle: &Handle, name: &str) -> Option<Handle> {
    for child in handle.children.borrow().iter() {
        if let NodeData::Element { name: qual, .. } = &child.data
            && &*qual.local == name
        {
            return Some(child.clone());
        }
        if let Some(found) = find_element(child, name) {
            return Some(found);
        }
    }
    None
}

fn convert_children(handle: &Handle) -> Vec<Node> {
    handle.children.borrow().iter().filter_map(convert).collect()
}

fn convert(handle: &Handle) -> Option<Node> {
    match &handle.data {
        NodeData::Text { contents } => Some(Node::Text(contents.borrow().to_string())),
        NodeData::Element { name, attrs, .. } => {
            let attrs = attrs
                .borrow()
                .iter()
                .map(|a| Attribute::new(qualified(&a.name), a.value.to_string()))
                .collect();
            Some(Node::Element(Element {
                name: qualified(name),
                attrs,
                children: convert_children(handle),
            }))
        }
        _ => None,
    }
}

fn qualified(name: &QualName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{}:{}", prefix, name.local),
        None => name.local.to_string(),
    }
}
