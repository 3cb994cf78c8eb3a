//! Checklist conversion
//!
//! A list with class `ne-tl` becomes an `ac:task-list`. Each item becomes an
//! `ac:task` numbered in document order across the whole document, starting
//! at 1, with nested checklists numbered after their parent item.

use crate::node::{Element, Node};

/// Class of a checklist
pub const CHECKLIST_CLASS: &str = "ne-tl";

/// Class of the checkbox glyph inside a checklist item
pub const SYMBOL_CLASS: &str = "ne-tli-symbol";

/// Convert every checklist below `nodes` and return the number of tasks
pub fn convert_checklists(nodes: &mut [Node]) -> u32 {
    let mut next_id = 1;
    convert_in(nodes, &mut next_id);
    next_id - 1
}

fn convert_in(nodes: &mut [Node], next_id: &mut u32) {
    for node in nodes.iter_mut() {
        let Some(el) = node.as_element_mut() else {
            continue;
        };
        if is_checklist(el) {
            let list = std::mem::take(el);
            *node = task_list(list, next_id).into();
        } else {
            convert_in(&mut el.children, next_id);
        }
    }
}

fn is_checklist(el: &Element) -> bool {
    (el.is("ul") || el.is("ol")) && el.has_class(CHECKLIST_CLASS)
}

fn task_list(list: Element, next_id: &mut u32) -> Element {
    let mut tasks: Vec<Node> = Vec::new();

    for child in list.children {
        let Node::Element(child) = child else {
            continue;
        };

        if child.is("li") {
            tasks.push(task(child, next_id).into());
            continue;
        }

        // Stray content between items belongs to the item before it
        let mut child = Node::Element(child);
        convert_in(std::slice::from_mut(&mut child), next_id);
        match tasks.last_mut().and_then(task_body) {
            Some(body) => body.children.push(child),
            None => tasks.push(child),
        }
    }

    Element::new("ac:task-list").children(tasks)
}

fn task(item: Element, next_id: &mut u32) -> Element {
    let id = *next_id;
    *next_id += 1;

    let mut body = item.children;
    strip_symbols(&mut body);
    convert_in(&mut body, next_id);

    Element::new("ac:task")
        .child(Element::new("ac:task-id").text(id.to_string()))
        .child(Element::new("ac:task-status").text("incomplete"))
        .child(Element::new("ac:task-body").children(body))
}

fn task_body(task: &mut Node) -> Option<&mut Element> {
    task.as_element_mut()?
        .children
        .iter_mut()
        .filter_map(Node::as_element_mut)
        .find(|el| el.is("ac:task-body"))
}

fn strip_symbols(nodes: &mut Vec<Node>) {
    nodes.retain(|n| !n.as_element().is_some_and(|el| el.has_class(SYMBOL_CLASS)));
    for el in nodes.iter_mut().filter_map(Node::as_element_mut) {
        strip_symbols(&mut el.children);
    }
}
