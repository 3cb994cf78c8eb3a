//! First-element decoration

use crate::node::{Element, Node};

use super::macros;

/// Drop presentation attributes from the first top-level element and append
/// an `easy-heading-free` macro to it.
pub fn decorate_first_element(nodes: &mut [Node]) {
    let Some(first) = nodes.iter_mut().find_map(Node::as_element_mut) else {
        return;
    };

    first.remove_attr("class");
    first.remove_attr("typography");
    first.children.push(
        Element::new("span")
            .attr("class", "ne-text")
            .child(macros::structured_macro("easy-heading-free"))
            .into(),
    );
}
