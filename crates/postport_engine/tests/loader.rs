use std::fs;

use postport_core::PostRejected;
use postport_engine::{load_export, parse_export, LoadError};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

fn export_text() -> String {
    json!({
        "publication": {"_id": "pub1", "title": "My Blog"},
        "posts": [
            {"_id": "1", "title": "First", "slug": "first", "tags": ["t1"]},
            {"_id": "2", "title": "No slug"},
            {"_id": "3", "title": ["not", "a", "string"], "slug": "third"},
            {"_id": "4", "title": "Fourth", "slug": "fourth"},
            "garbage",
            {"_id": "5", "title": "Fifth", "slug": "fifth"},
        ]
    })
    .to_string()
}

#[test]
fn invalid_posts_are_dropped_with_their_index() {
    let export = parse_export(&export_text(), None).unwrap();

    let slugs: Vec<_> = export.posts.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["first", "fourth", "fifth"]);
    assert_eq!(export.total_valid, 3);

    let dropped: Vec<_> = export
        .dropped
        .iter()
        .map(|d| (d.index, d.reason.clone()))
        .collect();
    assert_eq!(
        dropped,
        vec![
            (1, PostRejected::MissingField("slug")),
            (2, PostRejected::NotAString("title")),
            (4, PostRejected::NotAnObject),
        ]
    );
    assert_eq!(export.publication.id.as_deref(), Some("pub1"));
    assert_eq!(export.publication.title.as_deref(), Some("My Blog"));
}

#[test]
fn only_required_fields_can_drop_a_post() {
    let text = json!({
        "posts": [
            {
                "_id": "1",
                "title": "Odd types",
                "slug": "odd-types",
                "isActive": "yes",
                "subtitle": 5,
                "publishedAt": 1690000000,
                "content": {"html": "<p>x</p>"},
                "tags": [null, "t1"],
                "series": {"name": "Deep Dives"}
            },
            {"_id": 2, "title": "Numeric id", "slug": "numeric-id"}
        ]
    })
    .to_string();

    let export = parse_export(&text, None).unwrap();

    let slugs: Vec<_> = export.posts.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["odd-types"]);
    let odd = &export.posts[0];
    assert_eq!(odd.is_active, None);
    assert_eq!(odd.content, None);
    assert_eq!(odd.tags.len(), 1);
    assert!(odd.series.is_some());
    assert_eq!(
        export.dropped.iter().map(|d| d.index).collect::<Vec<_>>(),
        vec![1]
    );
}

#[test]
fn limit_keeps_the_first_valid_posts() {
    let export = parse_export(&export_text(), Some(2)).unwrap();
    let ids: Vec<_> = export.posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "4"]);
    assert_eq!(export.total_valid, 3);
}

#[test]
fn top_level_shape_errors_are_fatal() {
    assert!(matches!(parse_export("[]", None), Err(LoadError::NotAnObject)));
    assert!(matches!(
        parse_export("{\"posts\": {}}", None),
        Err(LoadError::MissingPosts)
    ));
    assert!(matches!(parse_export("{", None), Err(LoadError::Json(_))));
}

#[test]
fn empty_posts_array_is_not_an_error() {
    let export = parse_export("{\"posts\": []}", None).unwrap();
    assert!(export.posts.is_empty());
    assert_eq!(export.publication.title, None);
}

#[test]
fn loads_from_disk_and_reports_missing_files() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("export.json");
    fs::write(&path, format!("\u{FEFF}{}", export_text())).unwrap();

    let export = load_export(&path, None).unwrap();
    assert_eq!(export.posts.len(), 3);

    let missing = load_export(&temp.path().join("missing.json"), None).unwrap_err();
    assert!(matches!(missing, LoadError::Read { .. }));
}
