mod common;

use chrono::NaiveDate;
use merge_explorer::catalog::fill_path;
use merge_explorer::payload::{build_payload, FieldValue, FieldValues};
use merge_explorer::presenter::Chart;
use merge_explorer::query::{build_query_params, RawParam};
use merge_explorer::tools::TOOLS;
use merge_explorer::{get_catalog, present, ApiClient, ApiRequest, Credentials, Method, Session};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use common::spawn_responder;

const TICKET_PAGE: &str = r#"{
    "next": null,
    "previous": null,
    "results": [
        {"id": "t-1", "name": "Printer on fire", "created_at": "2024-03-01T09:15:00Z"},
        {"id": "t-2", "name": "VPN down", "created_at": "2024-03-01T17:40:00+02:00"},
        {"id": "t-3", "name": "New laptop", "created_at": "2024-03-04T08:00:00Z",
         "priority": "HIGH"}
    ]
}"#;

fn session(base_url: &str) -> Session {
    Session::start(Credentials::new("sk_test", "acct_123"), ApiClient::new(base_url)).unwrap()
}

#[tokio::test]
async fn test_ticket_list_to_chart() {
    let (url, rx) = spawn_responder(200, TICKET_PAGE);
    let tickets = get_catalog().resource("Ticketing", "tickets").unwrap();

    let mut raw = BTreeMap::new();
    raw.insert("page_size".to_string(), Some(RawParam::Integer(50)));
    raw.insert("include_deleted_data".to_string(), Some(RawParam::Flag(false)));
    raw.insert("created_after".to_string(), None);
    let request = ApiRequest::get(tickets.list_path(), Some(build_query_params(tickets, &raw)));

    let json = session(&url).execute(&request).await.unwrap();
    let captured = rx.recv().unwrap();
    assert_eq!(
        captured.request_line,
        "GET /tickets?include_deleted_data=false&page_size=50 HTTP/1.1"
    );

    let presentation = present(json, tickets, &request.path);
    let table = presentation.table.as_ref().unwrap();
    assert_eq!(table.count(), 3);
    assert_eq!(table.columns, vec!["id", "name", "created_at", "priority"]);
    assert_eq!(table.cell(0, "priority"), None);

    match presentation.chart {
        Some(Chart::Daily(series)) => {
            assert_eq!(series.field, "created_at");
            assert_eq!(
                series.points,
                vec![
                    (NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 2),
                    (NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(), 1),
                ]
            );
        }
        other => panic!("expected a daily chart, got {:?}", other),
    }
}

#[tokio::test]
async fn test_single_ticket_has_no_chart() {
    let (url, _rx) = spawn_responder(200, r#"{"id":"t-1","name":"Printer on fire"}"#);
    let tickets = get_catalog().resource("Ticketing", "tickets").unwrap();

    let mut ids = BTreeMap::new();
    ids.insert("id".to_string(), "t-1".to_string());
    let path = fill_path("/tickets/{id}", &ids);
    assert_eq!(path, "/tickets/t-1");

    let json = session(&url).execute(&ApiRequest::get(path.as_str(), None)).await.unwrap();
    let presentation = present(json, tickets, &path);
    assert!(presentation.table.is_none());
    assert!(presentation.chart.is_none());
    assert_eq!(presentation.raw["name"], json!("Printer on fire"));
}

#[tokio::test]
async fn test_explorer_post_framing_follows_resource() {
    let catalog = get_catalog();

    let (url, rx) = spawn_responder(201, r#"{"model":{"id":"c-1"}}"#);
    let contacts = catalog.resource("Ticketing", "contacts").unwrap();
    let mut values = FieldValues::new();
    values.insert("name".to_string(), FieldValue::Text("Ada".to_string()));
    values.insert("phone_number".to_string(), FieldValue::Text(String::new()));
    let body = build_payload(contacts, &values);
    let request = ApiRequest::write(Method::Post, contacts.list_path(), body);
    session(&url).execute(&request).await.unwrap();

    let sent: Value = serde_json::from_str(&rx.recv().unwrap().body).unwrap();
    assert_eq!(sent, json!({"name": "Ada"}));

    let (url, rx) = spawn_responder(201, r#"{"model":{"id":"t-9"}}"#);
    let tickets = catalog.resource("Ticketing", "tickets").unwrap();
    let mut values = FieldValues::new();
    values.insert("name".to_string(), FieldValue::Text("Printer on fire".to_string()));
    values.insert("tags".to_string(), FieldValue::Text("hardware, urgent".to_string()));
    let body = build_payload(tickets, &values);
    let request = ApiRequest::write(Method::Post, tickets.list_path(), body);
    session(&url).execute(&request).await.unwrap();

    let sent: Value = serde_json::from_str(&rx.recv().unwrap().body).unwrap();
    assert_eq!(sent, json!({"model": {"name": "Printer on fire", "tags": ["hardware", "urgent"]}}));
}

#[tokio::test]
async fn test_tools_comment_form_is_wrapped() {
    let (url, rx) = spawn_responder(201, r#"{"model":{"id":"c-7"}}"#);
    let catalog = get_catalog();
    let tool = TOOLS.iter().find(|t| t.name == "Comments").unwrap();
    let schema = tool.schema(catalog).unwrap();
    let form = tool.create_form().unwrap();

    let mut values = FieldValues::new();
    values.insert("body".to_string(), FieldValue::Text("Looking into it".to_string()));
    values.insert("ticket".to_string(), FieldValue::Text("t-1".to_string()));
    let request = ApiRequest::write(Method::Post, tool.endpoint, form.build(schema, &values));
    let result = session(&url).execute(&request).await.unwrap();
    assert_eq!(result["model"]["id"], json!("c-7"));

    let captured = rx.recv().unwrap();
    assert_eq!(captured.request_line, "POST /comments HTTP/1.1");
    let sent: Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(sent, json!({"model": {"body": "Looking into it", "ticket": "t-1"}}));
}
