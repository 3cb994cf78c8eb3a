//! Empty emphasis unwrapping

use crate::node::Node;

/// Replace every `<strong>` without text by its element children.
///
/// The source wraps decorative empty emphasis around structural content;
/// it has no rendering in the destination.
pub fn unwrap_empty_emphasis(nodes: &mut Vec<Node>) {
    let mut out = Vec::with_capacity(nodes.len());
    for mut node in nodes.drain(..) {
        if let Node::Element(el) = &mut node {
            unwrap_empty_emphasis(&mut el.children);
            if el.is("strong") && el.text_content().is_empty() {
                out.extend(el.children.drain(..).filter(Node::is_element));
                continue;
            }
        }
        out.push(node);
    }
    *nodes = out;
}
