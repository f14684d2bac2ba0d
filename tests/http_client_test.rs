//! HTTP transport integration tests
//!
//! Exercises `HttpApiClient` against a `wiremock` server: bearer injection,
//! query encoding, envelope decoding, and the global reaction to
//! `401 Unauthorized`.

mod common;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskdeck::api::{
    ApiTransport, CreateTaskRequest, LoginRequest, SortField, SortOrder, TaskListParams,
    TaskStatus, TransportEvent, UpdateTaskRequest,
};
use taskdeck::storage::{TokenPair, TokenRepository};
use taskdeck::TaskdeckError;

use common::{make_client, memory_tokens, task_json};

#[tokio::test]
async fn test_login_posts_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({ "email": "a@b.com", "password": "secret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": false,
            "message": "Login successful",
            "data": {
                "access_token": "access-1",
                "refresh_token": "refresh-1",
                "token_type": "Bearer",
                "expires_in": 3600
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = make_client(&server.uri(), memory_tokens());
    let response = client
        .login(&LoginRequest::new("a@b.com", "secret"))
        .await
        .expect("login should succeed");

    let data = response.data.expect("login data");
    assert_eq!(data.access_token, "access-1");
    assert_eq!(data.expires_in, 3600);
}

#[tokio::test]
async fn test_requests_carry_stored_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/t1"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": false,
            "message": "ok",
            "data": task_json("t1", "Docs", "pending")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = memory_tokens();
    tokens.save(&TokenPair::new("access-1", "refresh-1")).unwrap();
    let client = make_client(&server.uri(), tokens);

    let task = client.get_task("t1").await.unwrap().data.unwrap();
    assert_eq!(task.title, "Docs");
    assert_eq!(task.status, TaskStatus::Pending);
}

#[tokio::test]
async fn test_list_query_and_pagination_meta() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/tasks"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "5"))
        .and(query_param("status", "in_progress"))
        .and(query_param("sort_field", "updated_at"))
        .and(query_param("sort_order", "asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": false,
            "message": "ok",
            "data": [task_json("t6", "Six", "in_progress")],
            "meta": {
                "pagination": { "page": 2, "limit": 5, "total": 6, "total_pages": 2 }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = make_client(&server.uri(), memory_tokens());
    let params = TaskListParams {
        page: Some(2),
        limit: Some(5),
        status: Some(TaskStatus::InProgress),
        search: None,
        sort_field: Some(SortField::UpdatedAt),
        sort_order: Some(SortOrder::Asc),
    };

    let response = client.get_tasks(&params).await.unwrap();
    assert_eq!(response.data.unwrap().len(), 1);
    let pagination = response.meta.unwrap().pagination.unwrap();
    assert_eq!(pagination.total, 6);
    assert_eq!(pagination.total_pages, 2);

    let requests = server.received_requests().await.unwrap();
    let query = requests[0].url.query().unwrap_or_default().to_string();
    assert!(!query.contains("search"), "unset filters must be omitted");
}

#[tokio::test]
async fn test_create_update_delete_routes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tasks"))
        .and(body_json(json!({ "title": "Write docs" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "error": false,
            "message": "created",
            "data": task_json("t1", "Write docs", "pending")
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/tasks/t1"))
        .and(body_json(json!({ "status": "completed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": false,
            "message": "updated",
            "data": task_json("t1", "Write docs", "completed")
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/tasks/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": false,
            "message": "deleted",
            "data": { "id": "t1" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = make_client(&server.uri(), memory_tokens());

    let created = client
        .create_task(&CreateTaskRequest {
            title: "Write docs".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(created.data.unwrap().id, "t1");

    let updated = client
        .update_task(
            "t1",
            &UpdateTaskRequest {
                title: None,
                status: Some(TaskStatus::Completed),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.data.unwrap().status, TaskStatus::Completed);

    let deleted = client.delete_task("t1").await.unwrap();
    assert!(!deleted.error);
}

#[tokio::test]
async fn test_unauthorized_clears_tokens_and_broadcasts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/tasks"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": true,
            "message": "Token expired"
        })))
        .mount(&server)
        .await;

    let tokens = memory_tokens();
    tokens.save(&TokenPair::new("stale", "refresh")).unwrap();
    let client = make_client(&server.uri(), tokens.clone());
    let mut events = client.subscribe();

    let err = client
        .get_tasks(&TaskListParams::default_filters())
        .await
        .unwrap_err();

    let root = err.downcast_ref::<TaskdeckError>().expect("typed error");
    assert!(root.is_authentication());
    assert!(err.to_string().contains("Token expired"));
    assert!(tokens.load().unwrap().is_empty());
    assert_eq!(events.try_recv().unwrap(), TransportEvent::Unauthorized);
}

#[tokio::test]
async fn test_error_envelope_status_becomes_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tasks"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": true,
            "message": "Title is required"
        })))
        .mount(&server)
        .await;

    let tokens = memory_tokens();
    tokens.save(&TokenPair::new("access", "refresh")).unwrap();
    let client = make_client(&server.uri(), tokens.clone());

    let err = client
        .create_task(&CreateTaskRequest {
            title: String::new(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Title is required");
    assert_eq!(tokens.load().unwrap().access_token.as_deref(), Some("access"));
}

#[tokio::test]
async fn test_non_envelope_status_reports_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/t1"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let client = make_client(&server.uri(), memory_tokens());
    let err = client.get_task("t1").await.unwrap_err();

    assert_eq!(err.to_string(), "Request failed with status code 502");
}

#[tokio::test]
async fn test_success_status_with_error_envelope_is_returned_as_is() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/missing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": true,
            "message": "Task not found"
        })))
        .mount(&server)
        .await;

    let client = make_client(&server.uri(), memory_tokens());
    let response = client.get_task("missing").await.unwrap();

    assert!(response.error);
    assert!(response.data.is_none());
    let err = response.ensure_ok().unwrap_err();
    assert_eq!(err.to_string(), "Task not found");
}
