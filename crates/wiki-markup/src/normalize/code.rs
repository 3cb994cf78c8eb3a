//! Code block conversion

use crate::node::Node;

use super::macros;

/// Turn every `<pre>` into a `code` macro holding the block's raw text
pub fn convert_code_blocks(nodes: &mut [Node]) {
    for node in nodes.iter_mut() {
        let Some(el) = node.as_element_mut() else {
            continue;
        };
        if el.is("pre") {
            let text = el.text_content();
            *node = macros::plain_text_macro("code", &text).into();
        } else {
            convert_code_blocks(&mut el.children);
        }
    }
}
