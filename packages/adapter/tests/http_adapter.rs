use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use docrepo_adapter::{AdapterConfig, Error, Filesystem, RepositoryAdapter};
use docrepo_automation::{ClientConfig, HttpAutomationClient};

fn adapter_for(uri: &str) -> RepositoryAdapter<HttpAutomationClient> {
    let client = HttpAutomationClient::new(&ClientConfig::new(format!("{}/nuxeo", uri))).unwrap();
    RepositoryAdapter::new(client, &AdapterConfig::new().with_root_prefix("/ws"))
}

fn document_entity(uid: &str, doc_path: &str, title: &str) -> serde_json::Value {
    serde_json::json!({
        "entity-type": "document",
        "uid": uid,
        "path": doc_path,
        "type": "File",
        "title": title,
        "lastModified": "2024-03-01T10:00:00.000Z"
    })
}

#[tokio::test]
async fn test_read_through_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/nuxeo/api/v1/automation/Document.Fetch"))
        .and(body_json(serde_json::json!({
            "params": {"value": "/ws/docs/a.txt/"},
            "context": {}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(document_entity("a-uid", "/ws/docs/a.txt", "a.txt")),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/nuxeo/api/v1/automation/Blob.Get"))
        .and(body_string_contains("doc:/ws/docs/a.txt/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/plain; charset=UTF-8")
                .insert_header("Content-Disposition", "attachment; filename=\"a.txt\"")
                .set_body_bytes(b"hello".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let file = tokio::task::spawn_blocking(move || adapter_for(&uri).read("docs/a.txt").unwrap())
        .await
        .unwrap();

    assert_eq!(&file.contents[..], b"hello");
    assert_eq!(file.record.path, "docs/a.txt");
    assert_eq!(file.record.dirname, "docs");
    assert_eq!(file.record.mimetype, "text/plain");
    assert_eq!(file.record.size, 5);
    assert_eq!(file.record.identifier.as_deref(), Some("a-uid"));
    assert_eq!(file.record.timestamp, 1_709_287_200);
}

#[tokio::test]
async fn test_has_maps_only_not_found_to_false() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/nuxeo/api/v1/automation/Document.Fetch"))
        .and(body_string_contains("/ws/missing/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "entity-type": "exception",
            "status": 404,
            "message": "Failed to get document /ws/missing/"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/nuxeo/api/v1/automation/Document.Fetch"))
        .and(body_string_contains("/ws/locked/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "entity-type": "exception",
            "status": 401,
            "message": "Unauthorized"
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let (missing, locked) = tokio::task::spawn_blocking(move || {
        let fs = adapter_for(&uri);
        (fs.has("missing"), fs.has("locked"))
    })
    .await
    .unwrap();

    assert!(!missing.unwrap());
    match locked.unwrap_err() {
        Error::Remote(e) => assert_eq!(e.status(), Some(401)),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_rename_moves_then_retitles() {
    let server = MockServer::start().await;

    // The destination's parent is the root folder, which exists.
    Mock::given(method("POST"))
        .and(path("/nuxeo/api/v1/automation/Document.Fetch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "entity-type": "document",
            "uid": "ws-uid",
            "path": "/ws",
            "type": "Folder",
            "title": "ws"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/nuxeo/api/v1/automation/Document.Move"))
        .and(body_json(serde_json::json!({
            "params": {"target": "/ws/", "name": "new.txt"},
            "input": "doc:/ws/old.txt/",
            "context": {}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(document_entity("f-uid", "/ws/new.txt", "old.txt")),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/nuxeo/api/v1/automation/Document.Update"))
        .and(body_json(serde_json::json!({
            "params": {"properties": "dc:title=new.txt"},
            "input": "doc:/ws/new.txt/",
            "context": {}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(document_entity("f-uid", "/ws/new.txt", "new.txt")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    tokio::task::spawn_blocking(move || adapter_for(&uri).rename("old.txt", "new.txt").unwrap())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unsupported_operations_send_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || adapter_for(&uri).list_contents("", true).unwrap_err())
        .await
        .unwrap();

    assert!(matches!(err, Error::UnsupportedOperation { operation: "listContents" }));
}
