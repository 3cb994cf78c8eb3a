//! End-to-end tests for the normalization pipeline

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use pretty_assertions::assert_eq;
use wiki_markup::{AssetStore, Document, Element, Node, Normalizer};

/// In-memory asset store recording every upload
#[derive(Default)]
struct MemoryAssets {
    remote: HashMap<String, Vec<u8>>,
    attached: RefCell<HashSet<String>>,
    uploads: RefCell<Vec<(String, String)>>,
    fetches: RefCell<u32>,
}

impl MemoryAssets {
    fn with(mut self, url: &str, bytes: &[u8]) -> Self {
        self.remote.insert(url.to_string(), bytes.to_vec());
        self
    }

    fn already_attached(self, filename: &str) -> Self {
        self.attached.borrow_mut().insert(filename.to_string());
        self
    }
}

impl AssetStore for MemoryAssets {
    type Error = String;

    fn fetch(&self, url: &str) -> Result<Vec<u8>, String> {
        *self.fetches.borrow_mut() += 1;
        self.remote
            .get(url)
            .cloned()
            .ok_or_else(|| format!("404 for {url}"))
    }

    fn attachment_exists(&self, filename: &str) -> Result<bool, String> {
        Ok(self.attached.borrow().contains(filename))
    }

    fn upload_attachment(
        &self,
        filename: &str,
        _bytes: &[u8],
        content_type: &str,
    ) -> Result<(), String> {
        self.attached.borrow_mut().insert(filename.to_string());
        self.uploads
            .borrow_mut()
            .push((filename.to_string(), content_type.to_string()));
        Ok(())
    }
}

const PNG: &str = "https://cdn.example.com/yuque/0/2024/png/1/photo.png";
const SVG: &str = "https://cdn.example.com/yuque/0/2024/svg/1/diagram.svg";

#[test]
fn test_raster_image_becomes_attachment_reference() {
    let assets = MemoryAssets::default().with(PNG, b"\x89PNG");
    let out = Normalizer::new(&assets).normalize_html(&format!(r#"<p>x</p><p><img src="{PNG}"></p>"#));

    assert!(out.contains(r#"<ac:image ac:thumbnail="true"><ri:attachment ri:filename="photo.png"/></ac:image>"#));
    assert!(!out.contains("<img"));
    assert_eq!(
        *assets.uploads.borrow(),
        vec![("photo.png".to_string(), "image/png".to_string())]
    );
}

#[test]
fn test_existing_attachment_is_not_uploaded_again() {
    let assets = MemoryAssets::default()
        .with(PNG, b"\x89PNG")
        .already_attached("photo.png");
    let out = Normalizer::new(&assets).normalize_html(&format!(r#"<p>x</p><img src="{PNG}"><img src="{PNG}">"#));

    assert_eq!(out.matches(r#"ri:filename="photo.png""#).count(), 2);
    assert!(assets.uploads.borrow().is_empty());
}

#[test]
fn test_same_image_twice_uploads_once() {
    let assets = MemoryAssets::default().with(PNG, b"\x89PNG");
    Normalizer::new(&assets).normalize_html(&format!(r#"<p>x</p><img src="{PNG}"><img src="{PNG}">"#));

    assert_eq!(assets.uploads.borrow().len(), 1);
}

#[test]
fn test_vector_image_is_inlined_with_sizing() {
    let assets = MemoryAssets::default().with(
        SVG,
        br#"<svg xmlns="http://www.w3.org/2000/svg" width="300px" height="100px"><circle r="4"></circle></svg>"#,
    );
    let out = Normalizer::new(&assets).normalize_html(&format!(r#"<p>x</p><p><img src="{SVG}"></p>"#));

    assert!(out.contains(r#"ac:name="html""#));
    assert!(out.contains("<![CDATA[<svg "));
    assert!(out.contains("max-width:300px;max-height:100px;width:100%;height:100%;"));
    assert!(assets.uploads.borrow().is_empty());
}

#[test]
fn test_failed_fetch_leaves_image_and_continues() {
    let assets = MemoryAssets::default().with(PNG, b"\x89PNG");
    let out = Normalizer::new(&assets).normalize_html(
        r#"<p>x</p><img src="https://cdn.example.com/missing.png"><img src="https://cdn.example.com/yuque/0/2024/png/1/photo.png">"#,
    );

    assert!(out.contains(r#"<img src="https://cdn.example.com/missing.png"/>"#));
    assert!(out.contains(r#"ri:filename="photo.png""#));
    assert_eq!(*assets.fetches.borrow(), 2);
}

#[test]
fn test_full_document_pipeline() {
    let assets = MemoryAssets::default();
    let html = concat!(
        r#"<div class="lake-content" typography="classic">"#,
        r#"<p><strong><br></strong>intro</p>"#,
        r#"<ul class="ne-ul"><li>one</li></ul>"#,
        r#"<ul class="ne-ul"><li>two</li></ul>"#,
        r#"<ul class="ne-list-wrap"><ul ne-level="1" class="ne-ul"><li>two.a</li></ul></ul>"#,
        r#"<pre><code>let x = 1;</code></pre>"#,
        r#"<ul class="ne-tl"><li class="ne-tli"><span class="ne-tli-symbol"></span><span>todo</span></li></ul>"#,
        "</div>"
    );
    let mut doc = Document::parse(html);
    Normalizer::new(&assets).normalize(&mut doc);
    let out = doc.to_storage();

    assert!(out.starts_with("<div><p><br/>intro</p>"));
    assert!(out.contains(
        r#"<ul class="ne-ul"><li>one</li><li>two<ul class="ne-ul"><li>two.a</li></ul></li></ul>"#
    ));
    assert!(out.contains("<ac:plain-text-body><![CDATA[let x = 1;]]></ac:plain-text-body>"));
    assert!(out.contains("<ac:task-id>1</ac:task-id><ac:task-status>incomplete</ac:task-status>"));
    assert!(!out.contains("ne-tli-symbol"));
    assert!(!out.contains("ne-level"));
    assert!(out.contains(r#"ac:name="easy-heading-free""#));
    assert!(out.ends_with("</span></div>"));
}

fn task_item(text: &str) -> String {
    format!(r#"<li class="ne-tli"><span class="ne-tli-symbol"></span><span>{text}</span></li>"#)
}

fn task_ids(nodes: &[Node]) -> Vec<String> {
    let mut ids = Vec::new();
    for el in nodes.iter().filter_map(Node::as_element) {
        if el.is("ac:task-id") {
            ids.push(el.text_content());
        }
        ids.extend(task_ids(&el.children));
    }
    ids
}

fn task_body(task: &Element) -> &Element {
    task.find(&|e| e.is("ac:task-body")).unwrap()
}

#[test]
fn test_flattened_checklists_are_numbered_in_document_order() {
    let assets = MemoryAssets::default();
    let html = format!(
        concat!(
            "<p>plan</p>",
            r#"<ul class="ne-tl">{}{}</ul>"#,
            r#"<ul class="ne-list-wrap"><ul ne-level="1" class="ne-tl">{}{}</ul></ul>"#,
            r#"<ul class="ne-tl">{}</ul>"#,
        ),
        task_item("A"),
        task_item("B"),
        task_item("B.1"),
        task_item("B.2"),
        task_item("C"),
    );
    let mut doc = Document::parse(&html);
    Normalizer::new(&assets).normalize(&mut doc);

    assert_eq!(task_ids(doc.nodes()), vec!["1", "2", "3", "4", "5"]);

    let lists: Vec<&Element> = doc
        .nodes()
        .iter()
        .filter_map(Node::as_element)
        .filter(|e| e.is("ac:task-list"))
        .collect();
    assert_eq!(lists.len(), 1);

    let tasks: Vec<&Element> = lists[0].element_children().collect();
    assert_eq!(tasks.len(), 3);
    let nested = task_body(tasks[1])
        .find(&|e| e.is("ac:task-list"))
        .unwrap();
    assert_eq!(task_ids(&nested.children), vec!["3", "4"]);
    assert_eq!(task_body(tasks[2]).text_content(), "C");

    let out = doc.to_storage();
    assert!(!out.contains("ne-level"));
    assert!(!out.contains("ne-tli-symbol"));
}
