mod common;

use backup_api_client::ManualClock;
use backup_mcp_shared::GatewayError;
use common::*;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_unauthorized_response_is_retried_once_after_refresh() {
    let server = MockServer::start().await;
    let clock = Arc::new(ManualClock::new(0));
    let state = seeded_state("A", Some("R"), 3_600_000);

    Mock::given(method("GET"))
        .and(path("/api/v3/infrastructure/backupServers/jobs"))
        .and(header("authorization", "Bearer A"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(
        &server,
        "R",
        ResponseTemplate::new(200).set_body_json(token_body("B", None, Some(600))),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/infrastructure/backupServers/jobs"))
        .and(header("authorization", "Bearer B"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [1, 2, 3]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, clock, state);
    let body = client
        .get("/api/v3/infrastructure/backupServers/jobs", &[])
        .await
        .unwrap();

    assert_eq!(body, json!({"items": [1, 2, 3]}));
    server.verify().await;
}

#[tokio::test]
async fn test_second_unauthorized_surfaces_as_upstream_error() {
    let server = MockServer::start().await;
    let clock = Arc::new(ManualClock::new(0));
    let state = seeded_state("A", Some("R"), 3_600_000);

    Mock::given(method("GET"))
        .and(path("/api/v3/about"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token revoked"))
        .expect(2)
        .mount(&server)
        .await;
    mount_refresh(&server, "R", ResponseTemplate::new(400), 1).await;

    let client = client(&server, clock, state);
    let err = client.get("/api/v3/about", &[]).await.unwrap_err();

    match err {
        GatewayError::Upstream { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "token revoked");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
    server.verify().await;
}

#[tokio::test]
async fn test_other_errors_are_not_retried() {
    let server = MockServer::start().await;
    let clock = Arc::new(ManualClock::new(0));
    let state = seeded_state("A", Some("R"), 3_600_000);

    Mock::given(method("GET"))
        .and(path("/api/v3/alarms/active"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, "R", ResponseTemplate::new(200), 0).await;

    let client = client(&server, clock, state);
    let err = client.get("/api/v3/alarms/active", &[]).await.unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(err.to_string().contains("maintenance"));
    server.verify().await;
}

#[tokio::test]
async fn test_first_request_logs_in_and_sends_bearer_token() {
    let server = MockServer::start().await;
    let clock = Arc::new(ManualClock::new(0));

    mount_login(
        &server,
        ResponseTemplate::new(200).set_body_json(token_body("A", Some("R"), Some(600))),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/about"))
        .and(header("authorization", "Bearer A"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "8.1"})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server, clock, Default::default());
    client.get("/api/v3/about", &[]).await.unwrap();
    let body = client.get("/api/v3/about", &[]).await.unwrap();

    assert_eq!(body["version"], "8.1");
    server.verify().await;
}

#[tokio::test]
async fn test_absent_and_empty_query_params_are_omitted() {
    let server = MockServer::start().await;
    let clock = Arc::new(ManualClock::new(0));
    let state = seeded_state("A", None, 3_600_000);

    Mock::given(method("GET"))
        .and(path("/api/v3/organizations/companies"))
        .and(query_param("offset", "5"))
        .and(query_param("sort", "name"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, clock, state);
    client
        .get(
            "/api/v3/organizations/companies",
            &[
                ("offset", Some("5".to_string())),
                ("limit", None),
                ("filter", Some(String::new())),
                ("sort", Some("name".to_string())),
            ],
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), Some("offset=5&sort=name"));
}

#[tokio::test]
async fn test_get_by_id_targets_resource_path() {
    let server = MockServer::start().await;
    let clock = Arc::new(ManualClock::new(0));
    let state = seeded_state("A", None, 3_600_000);

    Mock::given(method("GET"))
        .and(path("/api/v3/organizations/companies/0f6e-11aa"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"instanceUid": "0f6e-11aa"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, clock, state);
    let body = client
        .get_by_id("/api/v3/organizations/companies", "0f6e-11aa")
        .await
        .unwrap();
    assert_eq!(body["instanceUid"], "0f6e-11aa");

    let err = client
        .get_by_id("/api/v3/organizations/companies", "  ")
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Validation(_)));
    server.verify().await;
}
