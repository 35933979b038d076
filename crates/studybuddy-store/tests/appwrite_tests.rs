//! HTTP-level tests for the Appwrite store and the companion client,
//! run against a mock server.

use futures::StreamExt;
use serde_json::json;
use std::time::Duration;
use studybuddy_store::{
    list_all, AccountProvider, AppwriteCredentials, AppwriteStore, Bounds, CompanionClient, CompanionError,
    DocumentData, DocumentId, DocumentStore, Feed, Query, StoreError,
};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOCS: &str = "/v1/databases/db1/collections/playlists/documents";

fn api_key_store(server: &MockServer) -> AppwriteStore {
    AppwriteStore::new(
        format!("{}/v1", server.uri()),
        "proj1",
        "db1",
        AppwriteCredentials::ApiKey {
            key: "secret".to_string(),
            user_id: Some("user-1".to_string()),
        },
        Duration::from_secs(5),
    )
    .unwrap()
}

fn playlist_json(id: &str, name: &str) -> serde_json::Value {
    json!({
        "$id": id,
        "$collectionId": "playlists",
        "$databaseId": "db1",
        "$createdAt": "2026-10-19T08:00:00.000Z",
        "$updatedAt": "2026-10-19T08:00:00.000Z",
        "name": name,
        "userId": "user-1",
        "videoCount": 0
    })
}

fn data(value: serde_json::Value) -> DocumentData {
    value.as_object().cloned().unwrap()
}

// =============================================================================
// Document Store Tests
// =============================================================================

mod documents {
    use super::*;

    #[tokio::test]
    async fn test_list_sends_headers_and_queries() {
        let server = MockServer::start().await;
        let equal = Query::equal("userId", "user-1").to_query_string();
        let order = Query::order_desc("createdAt").to_query_string();

        Mock::given(method("GET"))
            .and(path(DOCS))
            .and(header("X-Appwrite-Project", "proj1"))
            .and(header("X-Appwrite-Key", "secret"))
            .and(query_param("queries[]", equal.as_str()))
            .and(query_param("queries[]", order.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 1,
                "documents": [playlist_json("p1", "Rust")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = api_key_store(&server);
        let list = store
            .list_documents(
                "playlists",
                &[Query::equal("userId", "user-1"), Query::order_desc("createdAt")],
            )
            .await
            .unwrap();

        assert_eq!(list.total, 1);
        assert_eq!(list.documents[0].id, "p1");
        assert_eq!(list.documents[0].get("name"), Some(&json!("Rust")));
        assert_eq!(list.documents[0].collection_id(), "playlists");
    }

    #[tokio::test]
    async fn test_create_uses_unique_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(DOCS))
            .and(body_json(json!({
                "documentId": "unique()",
                "data": {"name": "Rust", "userId": "user-1"}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(playlist_json("new-id", "Rust")))
            .expect(1)
            .mount(&server)
            .await;

        let store = api_key_store(&server);
        let doc = store
            .create_document(
                "playlists",
                DocumentId::Unique,
                data(json!({"name": "Rust", "userId": "user-1"})),
            )
            .await
            .unwrap();
        assert_eq!(doc.id, "new-id");
    }

    #[tokio::test]
    async fn test_update_patches_data() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(format!("{}/p1", DOCS)))
            .and(body_json(json!({"data": {"name": "Renamed"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(playlist_json("p1", "Renamed")))
            .expect(1)
            .mount(&server)
            .await;

        let store = api_key_store(&server);
        let doc = store
            .update_document("playlists", "p1", data(json!({"name": "Renamed"})))
            .await
            .unwrap();
        assert_eq!(doc.get("name"), Some(&json!("Renamed")));
    }

    #[tokio::test]
    async fn test_delete_accepts_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("{}/p1", DOCS)))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let store = api_key_store(&server);
        store.delete_document("playlists", "p1").await.unwrap();
    }

    #[tokio::test]
    async fn test_list_all_pages_past_first_page() {
        let server = MockServer::start().await;
        let first: Vec<_> = (0..100).map(|i| playlist_json(&format!("p{}", i), "x")).collect();
        let second = vec![playlist_json("p100", "x"), playlist_json("p101", "x")];

        Mock::given(method("GET"))
            .and(path(DOCS))
            .and(query_param("queries[]", Query::Offset(0).to_query_string().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 102, "documents": first})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(DOCS))
            .and(query_param("queries[]", Query::Offset(100).to_query_string().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 102, "documents": second})))
            .expect(1)
            .mount(&server)
            .await;

        let store = api_key_store(&server);
        let all = list_all(&store, "playlists", &[Query::Limit(5)]).await.unwrap();
        assert_eq!(all.total, 102);
        assert_eq!(all.documents.len(), 102);
        assert_eq!(all.documents[101].id, "p101");
    }
}

// =============================================================================
// Counter Tests
// =============================================================================

mod counters {
    use super::*;

    #[tokio::test]
    async fn test_increment_endpoint_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(format!("{}/p1/videoCount/increment", DOCS)))
            .and(body_json(json!({"value": 1})))
            .respond_with(ResponseTemplate::new(200).set_body_json(playlist_json("p1", "Rust")))
            .expect(1)
            .mount(&server)
            .await;

        let store = api_key_store(&server);
        store
            .increment_field("playlists", "p1", "videoCount", 1, Bounds::NONE)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_decrement_sends_floor() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(format!("{}/p1/videoCount/decrement", DOCS)))
            .and(body_json(json!({"value": 1, "min": 0})))
            .respond_with(ResponseTemplate::new(200).set_body_json(playlist_json("p1", "Rust")))
            .expect(1)
            .mount(&server)
            .await;

        let store = api_key_store(&server);
        store
            .increment_field("playlists", "p1", "videoCount", -1, Bounds::floor(0))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_decrement_below_floor_is_bound_error() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(format!("{}/p1/videoCount/decrement", DOCS)))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "message": "Value would be below min",
                "type": "attribute_limit_exceeded",
                "code": 400
            })))
            .mount(&server)
            .await;

        let store = api_key_store(&server);
        let err = store
            .increment_field("playlists", "p1", "videoCount", -1, Bounds::floor(0))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::BoundExceeded { ref field, .. } if field == "videoCount"));
    }
}

// =============================================================================
// Error Mapping Tests
// =============================================================================

mod errors {
    use super::*;

    async fn store_returning(status: u16) -> (MockServer, AppwriteStore) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/p1", DOCS)))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "message": "request failed",
                "type": "general_error",
                "code": status
            })))
            .mount(&server)
            .await;
        let store = api_key_store(&server);
        (server, store)
    }

    #[tokio::test]
    async fn test_not_found() {
        let (_server, store) = store_returning(404).await;
        let err = store.get_document("playlists", "p1").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let (_server, store) = store_returning(401).await;
        let err = store.get_document("playlists", "p1").await.unwrap_err();
        match err {
            StoreError::Unauthorized(msg) => assert!(msg.contains("request failed")),
            other => panic!("expected Unauthorized, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_keeps_status() {
        let (_server, store) = store_returning(503).await;
        let err = store.get_document("playlists", "p1").await.unwrap_err();
        assert!(matches!(err, StoreError::Server { status: 503, .. }));
    }
}

// =============================================================================
// Account Tests
// =============================================================================

mod account {
    use super::*;

    #[tokio::test]
    async fn test_api_key_uses_configured_user() {
        let server = MockServer::start().await;
        let store = api_key_store(&server);
        assert_eq!(store.current_user_id().await.unwrap().as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn test_jwt_resolves_account() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/account"))
            .and(header("X-Appwrite-JWT", "token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"$id": "user-9", "name": "Sam"})))
            .expect(1)
            .mount(&server)
            .await;

        let store = AppwriteStore::new(
            format!("{}/v1", server.uri()),
            "proj1",
            "db1",
            AppwriteCredentials::Jwt("token".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(store.current_user_id().await.unwrap().as_deref(), Some("user-9"));
    }

    #[tokio::test]
    async fn test_expired_session_is_anonymous() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/account"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid token"})))
            .mount(&server)
            .await;

        let store = AppwriteStore::new(
            format!("{}/v1", server.uri()),
            "proj1",
            "db1",
            AppwriteCredentials::Jwt("stale".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(store.current_user_id().await.unwrap(), None);
    }
}

// =============================================================================
// Companion Client Tests
// =============================================================================

mod companion {
    use super::*;

    fn client(server: &MockServer) -> CompanionClient {
        CompanionClient::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_summarize() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/summarize"))
            .and(body_json(json!({
                "link": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
                "time_stamp": 120.0
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "summary": "Ownership explained.",
                "quiz": [{"question": "Who owns a value?", "options": ["One owner", "Everyone"], "answer": "One owner"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let summary = client(&server)
            .summarize("https://www.youtube.com/watch?v=dQw4w9WgXcQ", 120.0)
            .await
            .unwrap();
        assert_eq!(summary.summary, "Ownership explained.");
        assert_eq!(summary.quiz.len(), 1);
        assert!(summary.quiz[0].is_correct("One owner"));
    }

    #[tokio::test]
    async fn test_web_summarize_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/web_summarize"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model offline"))
            .mount(&server)
            .await;

        let err = client(&server).web_summarize("https://doc.rust-lang.org").await.unwrap_err();
        match err {
            CompanionError::Server { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "model offline");
            }
            other => panic!("expected Server error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_feed_yields_scores() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/distracted_feed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string("data: 85.5\n\ndata: 40\n\ndata: oops\n\n"),
            )
            .mount(&server)
            .await;

        let stream = client(&server).feed(Feed::Distracted).await.unwrap();
        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap(), &85.5);
        assert_eq!(items[1].as_ref().unwrap(), &40.0);
        assert!(matches!(items[2], Err(CompanionError::InvalidScore(ref raw)) if raw == "oops"));
    }
}
