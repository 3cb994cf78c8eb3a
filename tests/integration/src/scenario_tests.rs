//! Multi-run synchronization scenarios
//!
//! Each test drives the full stack (space loading, reconciliation and
//! markup normalization) against the in-memory fakes, usually across several
//! runs with source changes in between.

use pretty_assertions::assert_eq;
use wiki_core::{
    Config, DestinationSpace, Error, Reconciler, SourceFilter, SourceSpace, SyncActionKind,
    SyncReport, marker,
};
use wiki_remote::DestinationService;
use wiki_test_utils::{Call, ConfigFile, FakeDestination, FakeImages, FakeSource};

// =============================================================================
// Test Infrastructure
// =============================================================================

const PHOTO: &str = "https://cdn.example.com/yuque/0/2024/png/1/photo.png";

/// Source and destination wikis wired together
struct TestWiki {
    source: FakeSource,
    destination: FakeDestination,
    images: FakeImages,
    filter: SourceFilter,
}

impl TestWiki {
    fn new() -> Self {
        Self {
            source: FakeSource::new(),
            destination: FakeDestination::new("DOCS"),
            images: FakeImages::new().with(PHOTO, b"\x89PNG"),
            filter: SourceFilter::repos(["Guide", "API"]),
        }
    }

    fn with_filter(mut self, filter: SourceFilter) -> Self {
        self.filter = filter;
        self
    }

    /// One complete run from fresh snapshots
    fn sync(&self) -> wiki_core::Result<SyncReport> {
        let source = SourceSpace::load(&self.source, &self.filter)?;
        let mut destination = DestinationSpace::load(&self.destination, None)?;
        Reconciler::new(&self.source, &self.destination, &self.images)
            .synchronize(&source, &mut destination)
    }

    /// Run and forget the calls the run made
    fn sync_and_reset(&self) -> SyncReport {
        let report = self.sync().unwrap();
        self.destination.clear_calls();
        report
    }

    fn body_of(&self, title: &str) -> String {
        self.destination.page_by_title(title).unwrap().body
    }

    fn no_placeholders(&self) -> bool {
        self.destination
            .pages()
            .iter()
            .all(|p| !marker::is_temporary(&p.title))
    }
}

fn checklist(items: &[&str]) -> String {
    let items: String = items
        .iter()
        .map(|text| {
            format!(
                r#"<li class="ne-tli"><span class="ne-tli-symbol"></span><span>{text}</span></li>"#
            )
        })
        .collect();
    format!(r#"<ul class="ne-tl">{items}</ul>"#)
}

// =============================================================================
// Convergence
// =============================================================================

mod convergence {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_run_builds_hierarchy_second_run_is_silent() {
        let wiki = TestWiki::new();
        let repo = wiki.source.add_repo("Guide");
        let intro = wiki.source.add_doc(&repo, "Intro", None, 100, "<p>welcome</p>");
        wiki.source.add_doc(&repo, "Setup", Some(&intro), 100, "<p>install</p>");
        wiki.source.add_doc(&repo, "FAQ", None, 100, "<p>questions</p>");

        let first = wiki.sync_and_reset();
        assert_eq!(first.count(SyncActionKind::Created), 4);
        assert!(wiki.no_placeholders());

        let root = wiki.destination.root_id().to_string();
        let guide = wiki.destination.page_by_title("Guide").unwrap();
        let intro = wiki.destination.page_by_title("Intro").unwrap();
        assert_eq!(wiki.destination.child_titles(&root), vec!["Guide"]);
        assert_eq!(wiki.destination.child_titles(&guide.id), vec!["Intro", "FAQ"]);
        assert_eq!(wiki.destination.child_titles(&intro.id), vec!["Setup"]);
        assert!(wiki.body_of("Setup").contains("install"));

        let second = wiki.sync().unwrap();
        assert!(second.is_noop());
        assert_eq!(second.count(SyncActionKind::Unchanged), 3);
        assert_eq!(wiki.destination.mutation_count(), 0);
    }

    #[test]
    fn second_repository_lands_next_to_the_first() {
        let wiki = TestWiki::new();
        let guide = wiki.source.add_repo("Guide");
        wiki.source.add_doc(&guide, "Intro", None, 100, "<p/>");
        wiki.sync_and_reset();

        let api = wiki.source.add_repo("API");
        wiki.source.add_doc(&api, "Endpoints", None, 100, "<p/>");
        let report = wiki.sync().unwrap();

        assert_eq!(report.titles(SyncActionKind::Created), vec!["API", "Endpoints"]);
        let root = wiki.destination.root_id().to_string();
        assert_eq!(wiki.destination.child_titles(&root), vec!["Guide", "API"]);
    }

    #[test]
    fn placeholder_from_interrupted_run_is_replaced() {
        let wiki = TestWiki::new();
        let repo = wiki.source.add_repo("Guide");
        wiki.source.add_doc(&repo, "Intro", None, 100, "<p>done</p>");
        let guide = wiki.destination.add_page("Guide", wiki.destination.root_id(), 900);
        wiki.destination.add_page("[Temp]Intro", &guide, 900);

        let report = wiki.sync().unwrap();

        assert_eq!(report.titles(SyncActionKind::Deleted), vec!["[Temp]Intro"]);
        assert_eq!(report.titles(SyncActionKind::Created), vec!["Intro"]);
        assert!(wiki.no_placeholders());
        assert!(wiki.body_of("Intro").contains("done"));
    }
}

// =============================================================================
// Updates
// =============================================================================

mod updates {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn only_the_edited_document_is_rewritten() {
        let wiki = TestWiki::new();
        let repo = wiki.source.add_repo("Guide");
        let intro = wiki.source.add_doc(&repo, "Intro", None, 100, "<p>v1</p>");
        wiki.source.add_doc(&repo, "FAQ", None, 100, "<p>faq</p>");
        wiki.sync_and_reset();

        wiki.source.edit_doc(&intro, 50_000, "<p>v2</p>");
        let report = wiki.sync().unwrap();

        assert_eq!(report.titles(SyncActionKind::Updated), vec!["Intro"]);
        assert_eq!(report.titles(SyncActionKind::Unchanged), vec!["FAQ"]);
        let page = wiki.destination.page_by_title("Intro").unwrap();
        assert!(page.body.contains("v2"));
        assert_eq!(page.version, 3);

        let updates: Vec<Call> = wiki
            .destination
            .calls()
            .into_iter()
            .filter(Call::is_mutation)
            .collect();
        assert_eq!(updates.len(), 1);
        assert!(matches!(&updates[0], Call::UpdatePage { title, .. } if title == "Intro"));
    }

    #[test]
    fn attachment_is_uploaded_once_across_runs() {
        let wiki = TestWiki::new();
        let repo = wiki.source.add_repo("Guide");
        let body = format!(r#"<p><img src="{PHOTO}"></p><p><img src="{PHOTO}"></p>"#);
        let doc = wiki.source.add_doc(&repo, "Gallery", None, 100, &body);

        wiki.sync_and_reset();
        assert_eq!(wiki.destination.upload_count(), 1);
        let stored = wiki.body_of("Gallery");
        assert_eq!(stored.matches(r#"ri:filename="photo.png""#).count(), 2);

        wiki.source.edit_doc(&doc, 50_000, &body);
        wiki.sync().unwrap();
        assert_eq!(wiki.destination.upload_count(), 0);
        assert_eq!(
            wiki.destination.page_by_title("Gallery").unwrap().attachments,
            vec!["photo.png"]
        );
    }

    #[test]
    fn broken_image_does_not_fail_the_run() {
        let wiki = TestWiki::new();
        let repo = wiki.source.add_repo("Guide");
        wiki.source.add_doc(
            &repo,
            "Broken",
            None,
            100,
            r#"<p><img src="https://cdn.example.com/gone.png"></p>"#,
        );

        let report = wiki.sync().unwrap();

        assert_eq!(report.titles(SyncActionKind::Created), vec!["Guide", "Broken"]);
        assert!(wiki.body_of("Broken").contains("gone.png"));
        assert_eq!(wiki.destination.upload_count(), 0);
    }
}

// =============================================================================
// Content
// =============================================================================

mod content {
    use super::*;

    #[test]
    fn tasks_are_numbered_per_page() {
        let wiki = TestWiki::new();
        let repo = wiki.source.add_repo("Guide");
        let body = format!("{}<p>between</p>{}", checklist(&["a", "b"]), checklist(&["c"]));
        wiki.source.add_doc(&repo, "Todo", None, 100, &body);
        wiki.source.add_doc(&repo, "More", None, 100, &checklist(&["d"]));

        wiki.sync().unwrap();

        let todo = wiki.body_of("Todo");
        for id in 1..=3 {
            assert!(todo.contains(&format!("<ac:task-id>{id}</ac:task-id>")));
        }
        assert!(!todo.contains("ne-tli-symbol"));
        assert!(wiki.body_of("More").contains("<ac:task-id>1</ac:task-id>"));
    }

    #[test]
    fn flattened_lists_are_nested_on_the_page() {
        let wiki = TestWiki::new();
        let repo = wiki.source.add_repo("Guide");
        let body = concat!(
            "<p>steps</p>",
            r#"<ul class="ne-ul"><li>one</li></ul>"#,
            r#"<ul class="ne-list-wrap"><ul ne-level="1" class="ne-ul"><li>one.a</li></ul></ul>"#,
            r#"<ul class="ne-ul"><li>two</li></ul>"#,
        );
        wiki.source.add_doc(&repo, "Lists", None, 100, body);

        wiki.sync().unwrap();

        let stored = wiki.body_of("Lists");
        assert!(stored.contains(
            r#"<ul class="ne-ul"><li>one<ul class="ne-ul"><li>one.a</li></ul></li><li>two</li></ul>"#
        ));
        assert!(!stored.contains("ne-level"));
        assert!(stored.contains(r#"ac:name="easy-heading-free""#));
    }
}

// =============================================================================
// Deprecation
// =============================================================================

mod deprecation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn removed_document_is_deprecated_once() {
        let wiki = TestWiki::new();
        let repo = wiki.source.add_repo("Guide");
        let old = wiki.source.add_doc(&repo, "Old", None, 100, "<p/>");
        wiki.source.add_doc(&repo, "Current", None, 100, "<p/>");
        wiki.sync_and_reset();

        wiki.source.remove_doc(&old);
        let report = wiki.sync().unwrap();
        assert_eq!(report.titles(SyncActionKind::Deprecated), vec!["[Deprecated]Old"]);
        assert!(wiki.destination.page_by_title("Old").is_none());
        wiki.destination.clear_calls();

        let again = wiki.sync().unwrap();
        assert!(again.is_noop());
        assert_eq!(wiki.destination.mutation_count(), 0);
    }

    #[test]
    fn restored_document_gets_a_fresh_page() {
        let wiki = TestWiki::new();
        let repo = wiki.source.add_repo("Guide");
        let doc = wiki.source.add_doc(&repo, "Intro", None, 100, "<p/>");
        wiki.sync_and_reset();

        wiki.source.remove_doc(&doc);
        wiki.sync_and_reset();

        wiki.source.add_doc(&repo, "Intro", None, 100, "<p>back</p>");
        let report = wiki.sync().unwrap();

        assert_eq!(report.titles(SyncActionKind::Created), vec!["Intro"]);
        let guide = wiki.destination.page_by_title("Guide").unwrap();
        assert_eq!(
            wiki.destination.child_titles(&guide.id),
            vec!["[Deprecated]Intro", "Intro"]
        );
    }

    #[test]
    fn excluded_subtree_is_deprecated() {
        let wiki = TestWiki::new();
        let repo = wiki.source.add_repo("Guide");
        let drafts = wiki.source.add_doc(&repo, "Drafts", None, 100, "<p/>");
        wiki.source.add_doc(&repo, "Sketch", Some(&drafts), 100, "<p/>");
        wiki.source.add_doc(&repo, "Intro", None, 100, "<p/>");
        wiki.sync_and_reset();

        let wiki = wiki.with_filter(SourceFilter {
            sync_repos: vec!["Guide".into()],
            excluded_docs: vec!["Drafts".into()],
        });
        let report = wiki.sync().unwrap();

        assert_eq!(
            report.titles(SyncActionKind::Deprecated),
            vec!["[Deprecated]Sketch", "[Deprecated]Drafts"]
        );
        assert!(wiki.destination.page_by_title("Intro").is_some());
    }
}

// =============================================================================
// Safety
// =============================================================================

mod safety {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn foreign_placeholder_blocks_every_deletion() {
        let wiki = TestWiki::new();
        let repo = wiki.source.add_repo("Guide");
        wiki.source.add_doc(&repo, "Intro", None, 100, "<p/>");
        wiki.sync_and_reset();

        let guide = wiki.destination.page_by_title("Guide").unwrap();
        wiki.destination.add_page("[Temp]Ours", &guide.id, 900);
        wiki.destination.add_foreign_page("[Temp]Theirs", &guide.id, "OTHER");

        let err = wiki.sync().unwrap_err();

        assert!(matches!(err, Error::OwnershipViolation { ref actual, .. } if actual == "OTHER"));
        assert!(wiki.destination.page_by_title("[Temp]Ours").is_some());
        assert_eq!(wiki.destination.mutation_count(), 0);
    }

    #[test]
    fn empty_allowlist_synchronizes_nothing() {
        let wiki = TestWiki::new().with_filter(SourceFilter::default());
        let guide = wiki.source.add_repo("Guide");
        wiki.source.add_doc(&guide, "Intro", None, 100, "<p/>");

        let report = wiki.sync().unwrap();

        assert!(report.actions.is_empty());
        assert_eq!(wiki.destination.mutation_count(), 0);
        assert_eq!(wiki.source.body_fetches(), 0);
    }

    #[test]
    fn unsynced_repositories_are_not_read() {
        let wiki = TestWiki::new().with_filter(SourceFilter {
            sync_repos: vec!["Guide".into()],
            excluded_docs: Vec::new(),
        });
        let guide = wiki.source.add_repo("Guide");
        wiki.source.add_doc(&guide, "Intro", None, 100, "<p/>");
        let private = wiki.source.add_repo("Private");
        wiki.source.add_doc(&private, "Secrets", None, 100, "<p/>");

        wiki.sync().unwrap();

        assert!(wiki.destination.page_by_title("Private").is_none());
        assert!(wiki.destination.page_by_title("Secrets").is_none());
        assert_eq!(wiki.source.body_fetches(), 1);
    }
}

// =============================================================================
// Configuration
// =============================================================================

mod configuration {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn json_config_drives_the_filter() {
        let json = serde_json::json!({
            "source": {
                "domain": "https://www.yuque.com",
                "user_id": "1001",
                "auth": "token",
                "sync_repos": ["Guide"],
                "excluded_docs": ["Drafts"]
            },
            "destination": {
                "domain": "https://wiki.example.com",
                "space": "DOCS",
                "auth": "Basic dXNlcjpwYXNz"
            }
        });
        let file = ConfigFile::new("config.json", &json.to_string());
        let config = Config::load(file.path()).unwrap();

        let wiki = TestWiki::new().with_filter(config.source_filter());
        let guide = wiki.source.add_repo("Guide");
        wiki.source.add_doc(&guide, "Drafts", None, 100, "<p/>");
        wiki.source.add_doc(&guide, "Intro", None, 100, "<p/>");
        wiki.source.add_repo("Other");

        let report = wiki.sync().unwrap();

        assert_eq!(report.titles(SyncActionKind::Created), vec!["Guide", "Intro"]);
        assert_eq!(config.destination.space, wiki.destination.space_key());
    }
}
