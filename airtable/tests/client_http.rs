//! HTTP-level tests for the record store client against a mock server

#![allow(clippy::unwrap_used, clippy::panic)]

use serde_json::json;
use taskdeck_airtable::{AirtableClient, AirtableError, Direction, FieldsPatch, ListQuery, Sort};
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> AirtableClient {
    AirtableClient::from_parts(&format!("{}/v0", server.uri()), "appBase", "Todos", "pat-test")
        .unwrap()
}

#[tokio::test]
async fn list_sends_sort_search_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/appBase/Todos"))
        .and(header("authorization", "Bearer pat-test"))
        .and(query_param("sort[0][field]", "title"))
        .and(query_param("sort[0][direction]", "asc"))
        .and(query_param("filterByFormula", "SEARCH(\"milk\",title)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [
                {"id": "rec1", "createdTime": "2025-01-02T00:00:00.000Z",
                 "fields": {"title": "Buy milk", "isCompleted": true}},
                {"id": "rec2", "fields": {}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = ListQuery::new()
        .with_sort(Sort::new("title", Direction::Asc))
        .with_search("milk");
    let records = client.list(&query).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].fields.title.as_deref(), Some("Buy milk"));
    assert_eq!(records[0].fields.is_completed, Some(true));
    assert!(records[1].fields.title.is_none());
    assert!(records[1].created_time.is_none());
}

#[tokio::test]
async fn list_follows_offset_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/appBase/Todos"))
        .and(query_param_is_missing("offset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{"id": "rec1", "fields": {"title": "one"}}],
            "offset": "itrNext"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v0/appBase/Todos"))
        .and(query_param("offset", "itrNext"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{"id": "rec2", "fields": {"title": "two"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let records = client.list(&ListQuery::new()).await.unwrap();

    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["rec1", "rec2"]);
}

#[tokio::test]
async fn create_posts_title_with_incomplete_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v0/appBase/Todos"))
        .and(header("authorization", "Bearer pat-test"))
        .and(body_json(json!({
            "records": [{"fields": {"title": "Walk dog", "isCompleted": false}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{"id": "recNew", "createdTime": "2025-01-03T10:00:00.000Z",
                         "fields": {"title": "Walk dog"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let record = client.create("Walk dog").await.unwrap();

    assert_eq!(record.id, "recNew");
    assert_eq!(record.fields.title.as_deref(), Some("Walk dog"));
}

#[tokio::test]
async fn update_patches_only_given_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/v0/appBase/Todos/rec7"))
        .and(body_json(json!({
            "records": [{"id": "rec7", "fields": {"isCompleted": true}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{"id": "rec7", "fields": {"title": "x", "isCompleted": true}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let patch = FieldsPatch {
        is_completed: Some(true),
        ..FieldsPatch::default()
    };
    let record = client.update("rec7", patch).await.unwrap();

    assert_eq!(record.fields.is_completed, Some(true));
}

#[tokio::test]
async fn update_accepts_bare_record_response() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/v0/appBase/Todos/rec7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "rec7",
            "createdTime": "2025-01-02T08:00:00.000Z",
            "fields": {"title": "Renamed", "isCompleted": false}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let patch = FieldsPatch {
        title: Some("Renamed".to_string()),
        is_completed: Some(false),
    };
    let record = client.update("rec7", patch).await.unwrap();

    assert_eq!(record.id, "rec7");
    assert_eq!(record.fields.title.as_deref(), Some("Renamed"));
}

#[tokio::test]
async fn delete_hits_record_url() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v0/appBase/Todos/rec9"))
        .and(header("authorization", "Bearer pat-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "rec9", "deleted": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.delete("rec9").await.unwrap();
}

#[tokio::test]
async fn status_codes_map_to_errors() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v0/appBase/Todos/recAuth"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"type": "AUTHENTICATION_REQUIRED", "message": "bad token"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v0/appBase/Todos/recGone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "NOT_FOUND"})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v0/appBase/Todos/recBusy"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v0/appBase/Todos/recBad"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "error": {"type": "INVALID_REQUEST", "message": "Could not delete"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v0/appBase/Todos/recDown"))
        .respond_with(ResponseTemplate::new(503).set_body_string("<html>down</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);

    assert!(matches!(
        client.delete("recAuth").await,
        Err(AirtableError::Unauthorized)
    ));
    match client.delete("recGone").await {
        Err(AirtableError::NotFound(message)) => assert_eq!(message, "NOT_FOUND"),
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert!(matches!(
        client.delete("recBusy").await,
        Err(AirtableError::RateLimited)
    ));
    match client.delete("recBad").await {
        Err(AirtableError::Api { status, message }) => {
            assert_eq!(status, 422);
            assert_eq!(message, "Could not delete");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    match client.delete("recDown").await {
        Err(err @ AirtableError::Api { .. }) => {
            assert_eq!(err.status(), Some(503));
            assert!(err.to_string().contains("Service Unavailable"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_bodies_are_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/appBase/Todos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v0/appBase/Todos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": []})))
        .mount(&server)
        .await;

    let client = client_for(&server);

    assert!(matches!(
        client.list(&ListQuery::new()).await,
        Err(AirtableError::MalformedResponse(_))
    ));
    assert!(matches!(
        client.create("x").await,
        Err(AirtableError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn unreachable_server_is_a_request_failure() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    drop(server);

    assert!(matches!(
        client.list(&ListQuery::new()).await,
        Err(AirtableError::RequestFailed(_))
    ));
}
