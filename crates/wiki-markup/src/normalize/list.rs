//! List re-nesting and merging
//!
//! The source flattens nested lists into sibling elements. A top-level list
//! carries a class and no level:
//!
//! ```html
//! <ul class="ne-ul"><li>A</li></ul>
//! ```
//!
//! Deeper entries are wrapped in an adjacency marker and tagged with their
//! nesting level:
//!
//! ```html
//! <ul class="ne-list-wrap"><ul ne-level="1" class="ne-ul"><li>A.1</li></ul></ul>
//! ```
//!
//! Each run of consecutive entries is rebuilt into a recursive tree: a deeper
//! entry nests inside the last item of the list before it, and consecutive
//! entries with the same tag, class and level are merged into one list.

use std::iter::Peekable;

use crate::node::{Element, Node};

/// Class marking a wrapper around a level-tagged list entry
pub const WRAP_CLASS: &str = "ne-list-wrap";

/// Attribute holding an entry's nesting level
pub const LEVEL_ATTR: &str = "ne-level";

/// One flattened list entry
#[derive(Debug, Clone, PartialEq, Eq)]
struct FlatEntry {
    level: usize,
    tag: String,
    class: String,
    items: Vec<Node>,
}

impl FlatEntry {
    /// Take `node` as a list entry, or hand it back unchanged
    fn take(node: Node) -> Result<FlatEntry, Node> {
        let el = match node {
            Node::Element(el) => el,
            other => return Err(other),
        };

        if el.has_class(WRAP_CLASS) {
            let inner = el
                .find(&|e| is_list(e) && level_of(e).is_some())
                .and_then(|inner| Some((inner, level_of(inner)?)));
            return match inner {
                Some((inner, level)) => Ok(Self::from_list(inner.clone(), level)),
                None => Err(Node::Element(el)),
            };
        }

        if !is_list(&el) {
            return Err(Node::Element(el));
        }
        if let Some(level) = level_of(&el) {
            return Ok(Self::from_list(el, level));
        }
        if el.get_attr("class").is_some() {
            return Ok(Self::from_list(el, 0));
        }
        Err(Node::Element(el))
    }

    fn from_list(list: Element, level: usize) -> Self {
        let class = list.get_attr("class").unwrap_or_default().to_string();
        Self {
            level,
            tag: list.name,
            class,
            items: list.children.into_iter().filter(Node::is_element).collect(),
        }
    }

    fn matches(&self, list: &Element) -> bool {
        list.name == self.tag && list.get_attr("class").unwrap_or_default() == self.class
    }

    fn into_list(self) -> Element {
        let mut list = Element::new(self.tag);
        if !self.class.is_empty() {
            list = list.attr("class", self.class);
        }
        list.children(self.items)
    }
}

fn is_list(el: &Element) -> bool {
    el.is("ul") || el.is("ol")
}

fn level_of(el: &Element) -> Option<usize> {
    el.get_attr(LEVEL_ATTR)?.trim().parse().ok()
}

/// Re-nest and merge every run of flattened list entries below `nodes`
pub fn nest_lists(nodes: &mut Vec<Node>) {
    let mut out = Vec::with_capacity(nodes.len());
    let mut run: Vec<FlatEntry> = Vec::new();
    // Whitespace between two entries does not break a run
    let mut gap: Vec<Node> = Vec::new();

    for node in nodes.drain(..) {
        let mut node = match FlatEntry::take(node) {
            Ok(entry) => {
                gap.clear();
                run.push(entry);
                continue;
            }
            Err(node) => node,
        };

        if !run.is_empty() && node.is_blank_text() {
            gap.push(node);
            continue;
        }

        flush_run(&mut run, &mut out);
        out.append(&mut gap);

        if let Some(el) = node.as_element_mut() {
            nest_lists(&mut el.children);
        }
        out.push(node);
    }

    flush_run(&mut run, &mut out);
    out.append(&mut gap);
    *nodes = out;
}

fn flush_run(run: &mut Vec<FlatEntry>, out: &mut Vec<Node>) {
    if run.is_empty() {
        return;
    }
    let mut entries = run.drain(..).peekable();
    let lists = build_level(&mut entries, 0);
    out.extend(lists.into_iter().map(Node::Element));
}

/// Consume every entry at `level` or deeper and return the lists at `level`
fn build_level<I>(entries: &mut Peekable<I>, level: usize) -> Vec<Element>
where
    I: Iterator<Item = FlatEntry>,
{
    let mut lists: Vec<Element> = Vec::new();

    while let Some(next_level) = entries.peek().map(|e| e.level) {
        if next_level < level {
            break;
        }
        if next_level > level {
            // Skipped level: nest under whatever precedes it
            let nested = build_level(entries, next_level);
            attach_nested(&mut lists, nested);
            continue;
        }

        let Some(entry) = entries.next() else {
            break;
        };
        match lists.last_mut() {
            Some(last) if entry.matches(last) => last.children.extend(entry.items),
            _ => lists.push(entry.into_list()),
        }

        let nested = build_level(entries, level + 1);
        attach_nested(&mut lists, nested);
    }

    lists
}

/// Place deeper lists inside the last item of the last list
fn attach_nested(lists: &mut Vec<Element>, nested: Vec<Element>) {
    if nested.is_empty() {
        return;
    }
    let Some(list) = lists.last_mut() else {
        lists.extend(nested);
        return;
    };

    let last_item = list
        .children
        .iter_mut()
        .rev()
        .filter_map(Node::as_element_mut)
        .find(|el| el.is("li"));
    match last_item {
        Some(item) => item.children.extend(nested.into_iter().map(Node::Element)),
        None => list.children.extend(nested.into_iter().map(Node::Element)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Document;
    use pretty_assertions::assert_eq;

    fn run(html: &str) -> String {
        let mut doc = Document::parse(html);
        nest_lists(doc.nodes_mut());
        doc.to_storage()
    }

    fn wrap(level: usize, tag: &str, class: &str, items: &str) -> String {
        let mut inner = format!(r#"<{tag} {LEVEL_ATTR}="{level}" class="{class}">{items}</{tag}>"#);
        for _ in 0..level {
            inner = format!(r#"<{tag} class="{WRAP_CLASS}">{inner}</{tag}>"#);
        }
        inner
    }

    #[test]
    fn test_adjacent_same_class_lists_merge() {
        let html = r#"<ul class="ne-ul"><li>A</li></ul><ul class="ne-ul"><li>B</li></ul><ul class="ne-ul"><li>C</li></ul>"#;
        assert_eq!(run(html), r#"<ul class="ne-ul"><li>A</li><li>B</li><li>C</li></ul>"#);
    }

    #[test]
    fn test_different_class_is_not_merged() {
        let html = r#"<ul class="ne-ul"><li>A</li></ul><ul class="ne-ul"><li>B</li></ul><ul class="ne-ul"><li>C</li></ul><ol class="ne-ol"><li>D</li></ol>"#;
        assert_eq!(
            run(html),
            r#"<ul class="ne-ul"><li>A</li><li>B</li><li>C</li></ul><ol class="ne-ol"><li>D</li></ol>"#
        );
    }

    #[test]
    fn test_lists_separated_by_content_stay_apart() {
        let html = r#"<ul class="ne-ul"><li>A</li></ul><p>x</p><ul class="ne-ul"><li>B</li></ul>"#;
        assert_eq!(run(html), html);
    }

    #[test]
    fn test_wrapped_levels_nest_into_previous_item() {
        let html = format!(
            r#"<ul class="ne-ul"><li>A</li></ul>{}{}{}<ul class="ne-ul"><li>B</li></ul>"#,
            wrap(1, "ul", "ne-ul", "<li>A.1</li>"),
            wrap(2, "ul", "ne-ul", "<li>A.1.a</li>"),
            wrap(1, "ul", "ne-ul", "<li>A.2</li>"),
        );
        assert_eq!(
            run(&html),
            concat!(
                r#"<ul class="ne-ul"><li>A"#,
                r#"<ul class="ne-ul"><li>A.1<ul class="ne-ul"><li>A.1.a</li></ul></li><li>A.2</li></ul>"#,
                r#"</li><li>B</li></ul>"#,
            )
        );
    }

    #[test]
    fn test_nested_class_change_starts_new_sublist() {
        let html = format!(
            r#"<ol class="ne-ol"><li>A</li></ol>{}{}"#,
            wrap(1, "ol", "ne-ol", "<li>A.1</li>"),
            wrap(1, "ul", "ne-ul", "<li>A.x</li>"),
        );
        assert_eq!(
            run(&html),
            r#"<ol class="ne-ol"><li>A<ol class="ne-ol"><li>A.1</li></ol><ul class="ne-ul"><li>A.x</li></ul></li></ol>"#
        );
    }

    #[test]
    fn test_skipped_level_nests_under_previous_item() {
        let html = format!(
            r#"<ul class="ne-ul"><li>A</li></ul>{}"#,
            wrap(2, "ul", "ne-ul", "<li>deep</li>")
        );
        assert_eq!(
            run(&html),
            r#"<ul class="ne-ul"><li>A<ul class="ne-ul"><li>deep</li></ul></li></ul>"#
        );
    }

    #[test]
    fn test_lists_inside_containers_are_processed() {
        let html = r#"<div class="lake-content"><ul class="ne-ul"><li>A</li></ul><ul class="ne-ul"><li>B</li></ul></div>"#;
        assert_eq!(
            run(html),
            r#"<div class="lake-content"><ul class="ne-ul"><li>A</li><li>B</li></ul></div>"#
        );
    }

    #[test]
    fn test_whitespace_between_entries_is_dropped() {
        let html = "<ul class=\"ne-ul\"><li>A</li></ul>\n<ul class=\"ne-ul\"><li>B</li></ul>\n<p>x</p>";
        assert_eq!(
            run(html),
            "<ul class=\"ne-ul\"><li>A</li><li>B</li></ul>\n<p>x</p>"
        );
    }

    #[test]
    fn test_unclassed_plain_list_is_left_alone() {
        assert_eq!(run("<ul><li>A</li></ul>"), "<ul><li>A</li></ul>");
    }
}
