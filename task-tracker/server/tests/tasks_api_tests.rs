use axum::Router;
use axum::http::{Method, StatusCode};
use insta::assert_yaml_snapshot;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use serde_json::json;
use std::sync::Arc;
use task_tracker_server::task::TaskState;
use task_tracker_server::web::api::create_api_router;

mod common;

use common::{JsonResponseSnapshot, send};

/// Test context for API tests.
struct TestContext {
    app: Router,
    db: DatabaseConnection,
}

async fn setup() -> TestContext {
    let db = common::setup_db().await.expect("Failed to setup database");
    let task_state = Arc::new(TaskState {
        db: Arc::new(db.clone()),
    });
    TestContext {
        app: create_api_router(task_state),
        db,
    }
}

/// Creates a task through the API and returns its ID.
async fn create_task(app: &Router, title: &str) -> i64 {
    let response = send(
        app,
        Method::POST,
        "/api/tasks",
        Some(&json!({ "title": title }).to_string()),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.json()["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn can_create_task_and_fetch_it_by_id() {
    let ctx = setup().await;

    let response = send(
        &ctx.app,
        Method::POST,
        "/api/tasks",
        Some(r#"{"title":"Buy milk"}"#),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let created = response.json();
    assert_eq!(created["success"], json!(true));
    assert_eq!(created["message"], json!("Task created successfully."));
    assert_eq!(created["data"]["title"], json!("Buy milk"));
    assert_eq!(created["data"]["completed"], json!(false));
    assert!(created["data"]["createdAt"].is_string());

    let id = created["data"]["id"].as_i64().unwrap();
    let response = send(&ctx.app, Method::GET, &format!("/api/tasks?id={}", id), None).await;

    assert_eq!(response.status, StatusCode::OK);
    let fetched = response.json();
    assert_eq!(fetched["message"], json!("Task fetched successfully."));
    assert_eq!(fetched["data"]["id"], created["data"]["id"]);
    assert_eq!(fetched["data"]["title"], json!("Buy milk"));
    assert_eq!(fetched["data"]["completed"], json!(false));
    assert!(fetched.get("error").is_none());
}

#[tokio::test]
async fn can_trim_title_on_create() {
    let ctx = setup().await;

    let response = send(
        &ctx.app,
        Method::POST,
        "/api/tasks",
        Some(r#"{"title":"   Water plants  "}"#),
    )
    .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json()["data"]["title"], json!("Water plants"));
}

#[tokio::test]
async fn can_reject_blank_title() {
    let ctx = setup().await;

    for body in [r#"{"title":"   "}"#, r#"{"title":""}"#, r#"{}"#] {
        let response = send(&ctx.app, Method::POST, "/api/tasks", Some(body)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "body: {}", body);
    }

    let response = send(&ctx.app, Method::POST, "/api/tasks", Some(r#"{"title":"\t "}"#)).await;
    assert_yaml_snapshot!(
        "reject_blank_title",
        JsonResponseSnapshot::new(&response, "reject_blank_title")
    );
}

#[tokio::test]
async fn can_reject_non_string_title() {
    let ctx = setup().await;

    let response = send(&ctx.app, Method::POST, "/api/tasks", Some(r#"{"title":12}"#)).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["message"],
        json!("Title is required and must be a non-empty string.")
    );
}

#[tokio::test]
async fn can_reject_malformed_body() {
    let ctx = setup().await;

    let response = send(&ctx.app, Method::POST, "/api/tasks", Some("{not json")).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["message"],
        json!("Request body must be a JSON object.")
    );
}

#[tokio::test]
async fn can_reject_duplicate_title() {
    let ctx = setup().await;
    create_task(&ctx.app, "Pay rent").await;

    let response = send(
        &ctx.app,
        Method::POST,
        "/api/tasks",
        Some(r#"{"title":"  Pay rent "}"#),
    )
    .await;

    assert_yaml_snapshot!(
        "reject_duplicate_title",
        JsonResponseSnapshot::new(&response, "reject_duplicate_title")
    );
}

#[tokio::test]
async fn can_list_tasks_newest_first() {
    let ctx = setup().await;
    let first_id = create_task(&ctx.app, "A").await;
    let second_id = create_task(&ctx.app, "B").await;

    let response = send(&ctx.app, Method::GET, "/api/tasks", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["message"], json!("Tasks fetched successfully."));
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["B", "A"]);
    assert_eq!(body["data"][0]["id"], json!(second_id));
    assert_eq!(body["data"][1]["id"], json!(first_id));
}

#[tokio::test]
async fn can_list_with_empty_id_parameter() {
    let ctx = setup().await;
    create_task(&ctx.app, "Only").await;

    let response = send(&ctx.app, Method::GET, "/api/tasks?id=", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn can_return_empty_list() {
    let ctx = setup().await;

    let response = send(&ctx.app, Method::GET, "/api/tasks", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["data"], json!([]));
}

#[tokio::test]
async fn can_reject_non_numeric_id_on_read() {
    let ctx = setup().await;

    let response = send(&ctx.app, Method::GET, "/api/tasks?id=abc", None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({ "success": false, "message": "Invalid task ID. Must be a number." })
    );
}

#[tokio::test]
async fn can_wrap_repeated_id_parameter_in_envelope() {
    let ctx = setup().await;
    create_task(&ctx.app, "First").await;

    let response = send(&ctx.app, Method::GET, "/api/tasks?id=1&id=2", None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers.get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(
        response.json(),
        json!({ "success": false, "message": "Invalid task ID. Must be a number." })
    );
}

#[tokio::test]
async fn can_delete_task_addressed_by_integral_float_id() {
    let ctx = setup().await;
    let id = create_task(&ctx.app, "Float id").await;

    let response = send(
        &ctx.app,
        Method::DELETE,
        "/api/tasks",
        Some(&format!(r#"{{"id":{}.0}}"#, id)),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["message"], json!("Task deleted successfully."));
}

#[tokio::test]
async fn can_report_unknown_id_on_read() {
    let ctx = setup().await;

    let response = send(&ctx.app, Method::GET, "/api/tasks?id=4242", None).await;

    assert_yaml_snapshot!(
        "unknown_id_on_read",
        JsonResponseSnapshot::new(&response, "unknown_id_on_read")
    );
}

#[tokio::test]
async fn can_toggle_completed_with_patch() {
    let ctx = setup().await;
    let id = create_task(&ctx.app, "Stretch").await;

    let response = send(
        &ctx.app,
        Method::PATCH,
        "/api/tasks",
        Some(&json!({ "id": id, "completed": true }).to_string()),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["message"], json!("Task updated successfully."));
    assert_eq!(body["data"]["completed"], json!(true));
    assert_eq!(body["data"]["title"], json!("Stretch"));
}

#[tokio::test]
async fn can_rename_with_trimmed_title() {
    let ctx = setup().await;
    let id = create_task(&ctx.app, "Old").await;

    let response = send(
        &ctx.app,
        Method::PATCH,
        "/api/tasks",
        Some(&json!({ "id": id, "title": "  New  " }).to_string()),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["data"]["title"], json!("New"));
    assert_eq!(response.json()["data"]["completed"], json!(false));
}

#[tokio::test]
async fn can_reject_non_boolean_completed_and_keep_task_unchanged() {
    let ctx = setup().await;
    let id = create_task(&ctx.app, "Unchanged").await;

    let response = send(
        &ctx.app,
        Method::PATCH,
        "/api/tasks",
        Some(&json!({ "id": id, "title": "Changed", "completed": "yes" }).to_string()),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["message"],
        json!("Completed must be a boolean.")
    );

    let fetched = send(&ctx.app, Method::GET, &format!("/api/tasks?id={}", id), None).await;
    assert_eq!(fetched.json()["data"]["title"], json!("Unchanged"));
    assert_eq!(fetched.json()["data"]["completed"], json!(false));
}

#[tokio::test]
async fn can_reject_invalid_patch_bodies() {
    let ctx = setup().await;
    let id = create_task(&ctx.app, "Target").await;

    let cases = [
        (json!({ "completed": true }), "Task ID must be provided as a number."),
        (json!({ "id": "1", "completed": true }), "Task ID must be provided as a number."),
        (json!({ "id": id, "title": "   " }), "Title must be a non-empty string."),
        (json!({ "id": id, "title": 5 }), "Title must be a non-empty string."),
    ];

    for (body, message) in cases {
        let response = send(&ctx.app, Method::PATCH, "/api/tasks", Some(&body.to_string())).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(response.json()["message"], json!(message), "body: {}", body);
    }
}

#[tokio::test]
async fn can_report_unknown_id_on_patch() {
    let ctx = setup().await;

    let response = send(
        &ctx.app,
        Method::PATCH,
        "/api/tasks",
        Some(r#"{"id":999,"completed":true}"#),
    )
    .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["message"], json!("Task not found."));
}

#[tokio::test]
async fn can_delete_task_and_report_second_delete_as_not_found() {
    let ctx = setup().await;
    let id = create_task(&ctx.app, "Temporary").await;
    let body = json!({ "id": id }).to_string();

    let response = send(&ctx.app, Method::DELETE, "/api/tasks", Some(&body)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({ "success": true, "message": "Task deleted successfully." })
    );

    let response = send(&ctx.app, Method::DELETE, "/api/tasks", Some(&body)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["message"], json!("Task not found."));
}

#[tokio::test]
async fn can_reject_delete_without_numeric_id() {
    let ctx = setup().await;

    for body in [r#"{}"#, r#"{"id":"7"}"#, r#"{"id":null}"#] {
        let response = send(&ctx.app, Method::DELETE, "/api/tasks", Some(body)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(
            response.json()["message"],
            json!("Task ID must be provided as a number.")
        );
    }
}

#[tokio::test]
async fn can_report_store_failures_as_internal_errors() {
    let ctx = setup().await;
    ctx.db
        .execute_unprepared("DROP TABLE tasks")
        .await
        .expect("Failed to drop tasks table");

    let response = send(&ctx.app, Method::GET, "/api/tasks", None).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Something went wrong."));
    assert!(body["error"].is_string());
}
