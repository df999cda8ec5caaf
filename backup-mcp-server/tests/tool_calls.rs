mod common;

use common::*;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_tools_list_advertises_catalog_and_status_tool() {
    let server = MockServer::start().await;
    let gateway = gateway(&server);

    let tools = gateway.tool_provider().list_tools();

    let names: Vec<&str> = tools.iter().map(|t| t.name.as_ref()).collect();
    assert_eq!(names.len(), 15);
    assert!(names.contains(&"list_backup_jobs"));
    assert!(names.contains(&"get_company"));
    assert!(names.contains(&"gateway_status"));
    for tool in &tools {
        assert_eq!(tool.input_schema["additionalProperties"], json!(false));
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_tool_returns_single_page() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let page = json!({"meta": {"pagingInfo": {"total": 3}}, "data": items(0..3)});
    Mock::given(method("GET"))
        .and(path("/api/v3/organizations/companies"))
        .and(header("authorization", "Bearer A"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let result = call_tool(&gateway, "list_companies", json!({"limit": 3})).await;

    assert!(!is_error(&result));
    let body: Value = serde_json::from_str(&text_of(&result)).unwrap();
    assert_eq!(body, page);
    server.verify().await;
}

#[tokio::test]
async fn test_capped_listing_carries_note() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v3/alarms/active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": items(0..100)})))
        .expect(10)
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let result = call_tool(&gateway, "list_active_alarms", json!({"all": true})).await;

    let text = text_of(&result);
    let (note, body) = text.split_once('\n').unwrap();
    assert!(note.starts_with("NOTE: Listing capped at 1000 items"));
    let body: Value = serde_json::from_str(body).unwrap();
    assert_eq!(body.as_array().unwrap().len(), 1000);
    server.verify().await;
}

#[tokio::test]
async fn test_get_tool_encodes_id_as_one_segment() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v3/infrastructure/backupServers/jobs/job%201"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Nightly"})))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let result = call_tool(&gateway, "get_backup_job", json!({"id": "job 1"})).await;

    assert!(!is_error(&result));
    assert!(text_of(&result).contains("Nightly"));
    server.verify().await;
}

#[tokio::test]
async fn test_invalid_arguments_fail_before_network() {
    let server = MockServer::start().await;
    let gateway = gateway(&server);

    for (tool, args) in [
        ("list_backup_jobs", json!({"limit": 500})),
        ("list_backup_jobs", json!({"pageSize": 10})),
        ("get_company", json!({})),
        ("get_company", json!({"id": ""})),
        ("get_about", json!({"verbose": true})),
    ] {
        let result = call_tool(&gateway, tool, args.clone()).await;
        assert!(is_error(&result), "{tool} accepted {args}");
        assert!(text_of(&result).contains("Invalid input"), "{tool}: {}", text_of(&result));
    }

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upstream_failure_is_a_tool_error() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v3/about"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database offline"))
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let result = call_tool(&gateway, "get_about", json!({})).await;

    assert!(is_error(&result));
    let text = text_of(&result);
    assert!(text.contains("500"));
    assert!(text.contains("database offline"));
}

#[tokio::test]
async fn test_login_failure_is_a_tool_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v3/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let result = call_tool(&gateway, "list_sites", json!({})).await;

    assert!(is_error(&result));
    assert!(text_of(&result).contains("Authentication failed with status 401"));
}

#[tokio::test]
async fn test_unknown_tool_is_invalid_params() {
    let server = MockServer::start().await;
    let gateway = gateway(&server);

    let err = gateway.call("delete_everything", None).await.unwrap_err();
    assert_eq!(err.code.0, -32602);
}

#[tokio::test]
async fn test_gateway_status_never_leaks_secrets() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v3/about"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let before = call_tool(&gateway, "gateway_status", json!({})).await;
    let status: Value = serde_json::from_str(&text_of(&before)).unwrap();
    assert_eq!(status["api"]["authenticated"], json!(false));
    assert_eq!(status["api"]["username"], json!("admin"));

    call_tool(&gateway, "get_about", json!({})).await;

    let after = call_tool(&gateway, "gateway_status", json!({})).await;
    let text = text_of(&after);
    let status: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(status["api"]["authenticated"], json!(true));
    assert!(!text.contains("\"pw\""));
    assert!(!text.contains("\"A\""));
}
