mod common;

use merge_explorer::query::QueryParams;
use merge_explorer::{ApiClient, ApiError, ApiRequest, Credentials, Method, Session};
use serde_json::{json, Value};

use common::spawn_responder;

fn session(base_url: &str) -> Session {
    Session::start(Credentials::new(" sk_test ", " acct_123\n"), ApiClient::new(base_url)).unwrap()
}

#[tokio::test]
async fn test_get_sends_auth_headers() {
    let (url, rx) = spawn_responder(200, r#"{"results":[{"id":"t-1"}],"next":null}"#);

    let result = session(&url).execute(&ApiRequest::get("/tickets", None)).await.unwrap();
    assert_eq!(result["results"][0]["id"], json!("t-1"));

    let captured = rx.recv().unwrap();
    assert_eq!(captured.request_line, "GET /tickets HTTP/1.1");
    assert_eq!(captured.header("authorization"), Some("Bearer sk_test"));
    assert_eq!(captured.header("x-account-token"), Some("acct_123"));
    assert_eq!(captured.header("accept"), Some("application/json"));
    assert!(captured.body.is_empty());
}

#[tokio::test]
async fn test_get_encodes_query_params() {
    let (url, rx) = spawn_responder(200, r#"{"results":[]}"#);

    let mut query = QueryParams::new();
    query.insert("created_after".to_string(), json!("2024-01-31"));
    query.insert("include_shell_data".to_string(), json!(false));
    query.insert("page_size".to_string(), json!(25));

    session(&url)
        .execute(&ApiRequest::get("/users", Some(query)))
        .await
        .unwrap();

    let captured = rx.recv().unwrap();
    assert_eq!(
        captured.request_line,
        "GET /users?created_after=2024-01-31&include_shell_data=false&page_size=25 HTTP/1.1"
    );
}

#[tokio::test]
async fn test_write_sends_json_body() {
    let (url, rx) = spawn_responder(201, r#"{"model":{"id":"new"}}"#);

    let body = json!({"model": {"name": "Printer on fire", "status": "OPEN"}});
    let result = session(&url)
        .execute(&ApiRequest::write(Method::Post, "/tickets", body.clone()))
        .await
        .unwrap();
    assert_eq!(result["model"]["id"], json!("new"));

    let captured = rx.recv().unwrap();
    assert_eq!(captured.request_line, "POST /tickets HTTP/1.1");
    assert_eq!(captured.header("content-type"), Some("application/json"));
    let sent: Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(sent, body);
}

#[tokio::test]
async fn test_patch_uses_patch_method() {
    let (url, rx) = spawn_responder(200, r#"{"model":{"id":"t-1"}}"#);

    let body = json!({"model": {"status": "CLOSED"}});
    session(&url)
        .execute(&ApiRequest::write(Method::Patch, "/tickets/t-1", body))
        .await
        .unwrap();

    let captured = rx.recv().unwrap();
    assert_eq!(captured.request_line, "PATCH /tickets/t-1 HTTP/1.1");
}

#[tokio::test]
async fn test_error_status_keeps_body_text() {
    let (url, _rx) = spawn_responder(401, r#"{"detail":"Invalid API key"}"#);

    let err = session(&url).execute(&ApiRequest::get("/tickets", None)).await.unwrap_err();
    match &err {
        ApiError::Http { status, body } => {
            assert_eq!(*status, 401);
            assert_eq!(body, r#"{"detail":"Invalid API key"}"#);
        }
        other => panic!("expected Http error, got {:?}", other),
    }
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_non_json_success_is_decode_error() {
    let (url, _rx) = spawn_responder(200, "<html>maintenance</html>");

    let err = session(&url).execute(&ApiRequest::get("/tickets", None)).await.unwrap_err();
    match err {
        ApiError::Decode { body, .. } => assert_eq!(body, "<html>maintenance</html>"),
        other => panic!("expected Decode error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = session(&format!("http://127.0.0.1:{}", port))
        .execute(&ApiRequest::get("/tickets", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.status(), None);
}
