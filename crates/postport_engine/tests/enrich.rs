use std::sync::{Arc, Mutex};

use postport_core::{EnrichmentOrigin, EnrichmentRecord, Reference};
use postport_engine::{
    enrich_posts, EnrichError, EnrichSettings, EnrichmentSource, HashnodeClient, ProgressSink,
    RunEvent,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<RunEvent>>>,
}

impl TestSink {
    fn take(&self) -> Vec<RunEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: RunEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn client_for(server: &MockServer) -> HashnodeClient {
    HashnodeClient::new(&EnrichSettings {
        endpoint: server.uri(),
        api_key: Some("secret".into()),
        ..EnrichSettings::default()
    })
    .unwrap()
}

#[test]
fn client_requires_an_api_key() {
    let err = HashnodeClient::new(&EnrichSettings::default()).unwrap_err();
    assert!(matches!(err, EnrichError::MissingApiKey));

    let blank = EnrichSettings {
        api_key: Some("  ".into()),
        ..EnrichSettings::default()
    };
    assert!(matches!(
        HashnodeClient::new(&blank),
        Err(EnrichError::MissingApiKey)
    ));
}

#[tokio::test]
async fn remote_post_becomes_a_remote_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "Bearer secret"))
        .and(body_partial_json(json!({"variables": {"id": "p1"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"post": {
                "id": "p1",
                "title": "Remote title",
                "tags": [{"id": "t1", "name": "Rust", "slug": "rust"}],
                "series": {"id": "s1", "name": "Deep Dives", "description": {"text": "All the way down"}},
                "coverImage": {"url": "https://cdn.example.com/c.png", "attribution": "Unsplash"},
                "publication": {"id": "pub", "title": "Blog"}
            }}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record = client_for(&server).fetch("p1").await.unwrap().unwrap();

    assert_eq!(record.origin, EnrichmentOrigin::Remote);
    assert_eq!(record.title.as_deref(), Some("Remote title"));
    assert_eq!(record.slug, None);
    assert_eq!(record.read_time_in_minutes, None);
    let tags: Vec<_> = record.tags.iter().map(Reference::display_name).collect();
    assert_eq!(tags, vec!["Rust"]);
    assert_eq!(
        record.series.as_ref().map(Reference::display_name),
        Some("Deep Dives")
    );
    let cover = record.cover_image.unwrap();
    assert_eq!(cover.url.as_deref(), Some("https://cdn.example.com/c.png"));
    assert_eq!(cover.attribution.as_deref(), Some("Unsplash"));
}

#[tokio::test]
async fn unknown_post_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"post": null}})))
        .mount(&server)
        .await;

    assert_eq!(client_for(&server).fetch("nope").await.unwrap(), None);
}

#[tokio::test]
async fn graphql_errors_and_bad_status_are_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"variables": {"id": "bad"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{"message": "Post not accessible"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"variables": {"id": "down"}})))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server);
    match client.fetch("bad").await {
        Err(EnrichError::GraphQl(message)) => assert_eq!(message, "Post not accessible"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(
        client.fetch("down").await,
        Err(EnrichError::HttpStatus(503))
    ));
}

struct ScriptedSource;

#[async_trait::async_trait]
impl EnrichmentSource for ScriptedSource {
    async fn fetch(&self, post_id: &str) -> Result<Option<EnrichmentRecord>, EnrichError> {
        match post_id {
            "missing" => Ok(None),
            "broken" => Err(EnrichError::HttpStatus(500)),
            id => Ok(Some(EnrichmentRecord::new(id, EnrichmentOrigin::Remote))),
        }
    }
}

#[tokio::test]
async fn failures_are_reported_and_skipped() {
    let sink = TestSink::default();
    let ids: Vec<String> = ["a", "missing", "b", "broken", "c"]
        .into_iter()
        .map(String::from)
        .collect();

    let records = enrich_posts(&ScriptedSource, &ids, 2, &sink).await;

    let mut keys: Vec<_> = records.keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, vec!["a", "b", "c"]);
    assert_eq!(
        sink.take(),
        vec![
            RunEvent::EnrichmentMissing {
                post_id: "missing".into()
            },
            RunEvent::EnrichmentFailed {
                post_id: "broken".into(),
                error: "http status 500".into()
            },
        ]
    );
}
