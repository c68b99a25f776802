use std::collections::HashMap;
use std::sync::Once;

use chrono::NaiveDate;
use postport_core::{
    enrichment_for, render_notes, render_site, transform_notes, transform_site, FixedClock,
    MarkupConverter, PostStatus, RawPost, TransformContext,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(postport_logging::initialize_for_tests);
}

fn clock() -> FixedClock {
    FixedClock(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
}

fn hello_world() -> RawPost {
    RawPost::from_value(json!({
        "_id": "1",
        "title": "Hello World",
        "slug": "hello-world",
        "content": "# Hi",
        "tags": ["t1"],
    }))
    .unwrap()
}

struct Tagging;

impl MarkupConverter for Tagging {
    fn to_markdown(&self, html: &str) -> String {
        format!("converted {html}")
    }
}

#[test]
fn site_post_without_remote_enrichment_uses_fallback_names() {
    init_logging();
    let raw = hello_world();
    let clock = clock();
    let ctx = TransformContext::new(&clock);
    let remote = HashMap::new();
    let enriched = enrichment_for(&raw, &remote);
    assert!(enriched.is_fallback());

    let post = transform_site(&raw, Some(&*enriched), &ctx);
    assert_eq!(post.title, "Hello World");
    assert_eq!(post.slug, "hello-world");
    assert_eq!(post.tags, vec!["Tag-t1"]);
    assert_eq!(post.permalink, "/hello-world/");
    assert_eq!(post.date, clock.0);
    assert_eq!(post.content, "# Hi");

    let doc = render_site(&post);
    assert!(doc.starts_with("---\ntitle: \"Hello World\""));
    assert!(doc.ends_with("---\n\n# Hi"));
}

#[test]
fn notes_post_without_remote_enrichment() {
    init_logging();
    let raw = hello_world();
    let clock = clock();
    let ctx = TransformContext::new(&clock);
    let empty_map = HashMap::new();
    let enriched = enrichment_for(&raw, &empty_map);

    let post = transform_notes(&raw, Some(&*enriched), &ctx);
    assert_eq!(post.tags, vec!["Tag-t1"]);
    assert_eq!(post.status, vec![PostStatus::Published]);
    assert_eq!(post.updated, clock.0);
    assert!(!post.is_draft());

    let doc = render_notes(&post);
    assert!(doc.starts_with("---\ntitle: \"Hello World\"\nslug: \"hello-world\"\n"));
    assert!(doc.contains("description: \"Read about hello world\"\n"));
}

#[test]
fn dialects_disagree_on_passthrough_markers() {
    init_logging();
    let raw = RawPost::from_value(json!({
        "_id": "2",
        "title": "Templates",
        "slug": "templates",
        "contentMarkdown": "Use {{ page.title }}\n\n\n\nin layouts",
    }))
    .unwrap();
    let clock = clock();
    let ctx = TransformContext::new(&clock);

    let site = transform_site(&raw, None, &ctx);
    assert_eq!(
        site.content,
        "{% raw %}\nUse {{ page.title }}\n\nin layouts\n{% endraw %}"
    );

    let mut migrated = raw.clone();
    migrated.content_markdown = Some(site.content.clone());
    let notes = transform_notes(&migrated, None, &ctx);
    assert_eq!(notes.content, "Use {{ page.title }}\n\nin layouts");
}

#[test]
fn markup_converter_only_sees_html_sources() {
    init_logging();
    let clock = clock();
    let ctx = TransformContext::new(&clock).with_markup(&Tagging);

    let html_only = hello_world();
    assert_eq!(transform_site(&html_only, None, &ctx).content, "converted # Hi");

    let mut with_markdown = hello_world();
    with_markdown.content_markdown = Some("markdown body".into());
    assert_eq!(transform_site(&with_markdown, None, &ctx).content, "markdown body");
}

#[test]
fn inactive_post_renders_as_draft_note() {
    init_logging();
    let raw = RawPost::from_value(json!({
        "_id": "3",
        "title": "Work in progress",
        "slug": "wip",
        "isActive": false,
        "readTime": 12,
        "tags": [{"_id": "x", "name": "Machine Learning", "slug": "ml"}],
    }))
    .unwrap();
    let clock = clock();
    let post = transform_notes(&raw, None, &TransformContext::new(&clock));

    assert!(post.is_draft());
    assert_eq!(post.reading_time, 12);
    assert_eq!(post.tags, vec!["Machine_Learning"]);
    assert!(render_notes(&post).contains("status:\n  - draft\n"));
}
