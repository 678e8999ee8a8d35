//! HTTP endpoint tests
//!
//! Drive the full router with `oneshot` requests and check status codes and
//! JSON bodies against the request surface.

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use taskboard_core::{Client, EntityStore, Tag, Task, TaskType, TasksBackend};
use taskboard_server::{create_router, AppState};

fn task(id: &str, title: &str, order: i64) -> Task {
    Task {
        title: title.to_string(),
        order,
        ..Task::new(id, TaskType::Task)
    }
}

fn app() -> Router {
    let mut t1 = task("t1", "Foobar", 0);
    t1.notes = Some("foo notes".to_string());
    t1.tags = vec!["tag-1".to_string(), "tag-2".to_string()];
    t1.client = Some("c-1".to_string());
    let mut t2 = task("t2", "Write report", 1);
    t2.tags = vec!["tag-1".to_string()];
    let t3 = task("t3", "Call client", 2);

    let store = EntityStore::new()
        .with_tags(vec![Tag::new("tag-1", "Urgent"), Tag::new("tag-2", "Later")])
        .with_clients(vec![Client::new("c-1", "Acme")])
        .with_tasks(vec![t1, t2, t3])
        .with_work_hours(vec![0.5, 1.0, 1.5]);

    create_router(AppState::new(TasksBackend::new(store)))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body)?).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok((status, value))
}

fn ids(tasks: &Value) -> Vec<String> {
    tasks
        .as_array()
        .map(|tasks| {
            tasks
                .iter()
                .filter_map(|task| task["id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn order_of(tasks: &Value, id: &str) -> Option<i64> {
    tasks
        .as_array()?
        .iter()
        .find(|task| task["id"] == id)
        .and_then(|task| task["order"].as_i64())
}

// ============================================================================
// Health and routing
// ============================================================================

#[tokio::test]
async fn test_health_check() -> Result<()> {
    let (status, body) = call(&app(), Method::GET, "/api/health", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_unknown_route_is_not_found() -> Result<()> {
    let (status, body) = call(&app(), Method::GET, "/api/tasks/nothing-here", None).await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn test_work_hours() -> Result<()> {
    let (status, body) = call(&app(), Method::GET, "/api/tasks/workhours", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([0.5, 1.0, 1.5]));
    Ok(())
}

// ============================================================================
// Catalogs
// ============================================================================

#[tokio::test]
async fn test_create_tag_prepends_with_generated_id() -> Result<()> {
    let app = app();

    let (status, created) = call(
        &app,
        Method::POST,
        "/api/tasks/tag",
        Some(json!({"tag": {"id": "client-chosen", "title": "Fresh"}})),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["title"], "Fresh");
    let id = created["id"].as_str().unwrap_or_default().to_string();
    assert!(!id.is_empty());
    assert_ne!(id, "client-chosen");

    let (_, tags) = call(&app, Method::GET, "/api/tasks/tags", None).await?;
    assert_eq!(ids(&tags), vec![id, "tag-1".to_string(), "tag-2".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_create_without_body_key_is_rejected() -> Result<()> {
    let (status, body) = call(
        &app(),
        Method::POST,
        "/api/tasks/category",
        Some(json!({"name": "Ops"})),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn test_malformed_json_is_rejected() -> Result<()> {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/tasks/tag")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"tag\": "))?;

    let response = app().oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&response.into_body().collect().await?.to_bytes())?;
    assert_eq!(body["code"], "INVALID_INPUT");
    Ok(())
}

#[tokio::test]
async fn test_update_preserves_unspecified_fields() -> Result<()> {
    let app = app();

    let (status, updated) = call(
        &app,
        Method::PATCH,
        "/api/tasks/client",
        Some(json!({"id": "c-1", "client": {"email": "ops@acme.test"}})),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Acme");
    assert_eq!(updated["email"], "ops@acme.test");
    Ok(())
}

#[tokio::test]
async fn test_update_unknown_id_answers_null() -> Result<()> {
    let app = app();

    let (status, body) = call(
        &app,
        Method::PATCH,
        "/api/tasks/tag",
        Some(json!({"id": "missing", "tag": {"title": "x"}})),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());

    let (_, tags) = call(&app, Method::GET, "/api/tasks/tags", None).await?;
    assert_eq!(tags.as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn test_update_cannot_change_id() -> Result<()> {
    let (status, body) = call(
        &app(),
        Method::PATCH,
        "/api/tasks/tag",
        Some(json!({"id": "tag-1", "tag": {"id": "tag-9"}})),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn test_delete_tag_cascades_and_repeats() -> Result<()> {
    let app = app();

    let (status, body) = call(&app, Method::DELETE, "/api/tasks/tag?id=tag-1", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(true));

    let (_, tags) = call(&app, Method::GET, "/api/tasks/tags", None).await?;
    assert_eq!(ids(&tags), vec!["tag-2"]);

    let (_, tasks) = call(&app, Method::GET, "/api/tasks/all", None).await?;
    for task in tasks.as_array().into_iter().flatten() {
        assert!(!task["tags"].as_array().into_iter().flatten().any(|tag| tag == "tag-1"));
    }
    assert_eq!(tasks[0]["tags"], json!(["tag-2"]));

    let (status, body) = call(&app, Method::DELETE, "/api/tasks/tag?id=tag-1", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(true));
    Ok(())
}

#[tokio::test]
async fn test_delete_client_clears_task_client() -> Result<()> {
    let app = app();

    call(&app, Method::DELETE, "/api/tasks/client?id=c-1", None).await?;

    let (_, task) = call(&app, Method::GET, "/api/tasks/task?id=t1", None).await?;
    assert!(task["client"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_delete_without_id_is_rejected() -> Result<()> {
    let (status, body) = call(&app(), Method::DELETE, "/api/tasks/partner", None).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
    Ok(())
}

// ============================================================================
// Tasks
// ============================================================================

#[tokio::test]
async fn test_list_tasks_sorted_by_order() -> Result<()> {
    let (status, tasks) = call(&app(), Method::GET, "/api/tasks/all", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&tasks), vec!["t1", "t2", "t3"]);
    Ok(())
}

#[tokio::test]
async fn test_get_task_by_query() -> Result<()> {
    let app = app();

    let (_, found) = call(&app, Method::GET, "/api/tasks/task?id=t2", None).await?;
    assert_eq!(found["title"], "Write report");

    let (status, missing) = call(&app, Method::GET, "/api/tasks/task?id=nope", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(missing.is_null());
    Ok(())
}

#[tokio::test]
async fn test_create_task_takes_minimum_order() -> Result<()> {
    let app = app();

    let (status, created) = call(
        &app,
        Method::POST,
        "/api/tasks/task",
        Some(json!({"type": "section"})),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["type"], "section");
    assert_eq!(created["order"], 0);
    assert_eq!(created["priority"], 1);
    assert!(created["notes"].is_null());
    assert_eq!(created["workHours"], 0.0);

    let (_, tasks) = call(&app, Method::GET, "/api/tasks/all", None).await?;
    let orders: Vec<i64> = tasks
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|task| task["order"].as_i64())
        .collect();
    assert_eq!(orders, vec![0, 1, 2, 3]);
    assert_eq!(tasks[0]["id"], created["id"]);
    Ok(())
}

#[tokio::test]
async fn test_update_task_merges_partial() -> Result<()> {
    let (status, updated) = call(
        &app(),
        Method::PATCH,
        "/api/tasks/task",
        Some(json!({"id": "t2", "task": {"completed": true, "priority": 2}})),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["priority"], 2);
    assert_eq!(updated["title"], "Write report");
    assert_eq!(updated["tags"], json!(["tag-1"]));
    Ok(())
}

#[tokio::test]
async fn test_update_task_invalid_priority_is_rejected() -> Result<()> {
    let app = app();

    let (status, body) = call(
        &app,
        Method::PATCH,
        "/api/tasks/task",
        Some(json!({"id": "t1", "task": {"priority": 7}})),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (_, task) = call(&app, Method::GET, "/api/tasks/task?id=t1", None).await?;
    assert_eq!(task["priority"], 1);
    Ok(())
}

#[tokio::test]
async fn test_update_task_unknown_reference_is_rejected() -> Result<()> {
    let app = app();

    let (status, body) = call(
        &app,
        Method::PATCH,
        "/api/tasks/task",
        Some(json!({"id": "t1", "task": {"tags": ["ghost", "tag-1"]}})),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "Unknown tag id: ghost");

    let (status, _) = call(
        &app,
        Method::PATCH,
        "/api/tasks/task",
        Some(json!({"id": "t1", "task": {"client": "nobody"}})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, task) = call(&app, Method::GET, "/api/tasks/task?id=t1", None).await?;
    assert_eq!(task["tags"], json!(["tag-1", "tag-2"]));
    assert_eq!(task["client"], "c-1");
    Ok(())
}

#[tokio::test]
async fn test_update_task_non_string_id_is_rejected() -> Result<()> {
    let (status, body) = call(
        &app(),
        Method::PATCH,
        "/api/tasks/task",
        Some(json!({"id": 1, "task": {"title": "x"}})),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid task record: id must be a string, got: 1");
    Ok(())
}

#[tokio::test]
async fn test_delete_task_keeps_order_gaps() -> Result<()> {
    let app = app();

    let (_, deleted) = call(&app, Method::DELETE, "/api/tasks/task?id=t2", None).await?;
    assert_eq!(deleted, json!(true));

    let (_, tasks) = call(&app, Method::GET, "/api/tasks/all", None).await?;
    assert_eq!(ids(&tasks), vec!["t1", "t3"]);
    assert_eq!(order_of(&tasks, "t3"), Some(2));
    Ok(())
}

#[tokio::test]
async fn test_reorder_tasks() -> Result<()> {
    let app = app();

    let (status, tasks) = call(
        &app,
        Method::PATCH,
        "/api/tasks/order",
        Some(json!({"tasks": [{"id": "t3"}, {"id": "t1", "title": "ignored"}, {"id": "t2"}]})),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&tasks), vec!["t1", "t2", "t3"]);
    assert_eq!(order_of(&tasks, "t3"), Some(0));
    assert_eq!(order_of(&tasks, "t1"), Some(1));
    assert_eq!(order_of(&tasks, "t2"), Some(2));
    assert_eq!(tasks[0]["title"], "Foobar");

    let (_, listed) = call(&app, Method::GET, "/api/tasks/all", None).await?;
    assert_eq!(ids(&listed), vec!["t3", "t1", "t2"]);
    Ok(())
}

#[tokio::test]
async fn test_reorder_omitted_tasks_sort_first() -> Result<()> {
    let app = app();

    let (_, tasks) = call(
        &app,
        Method::PATCH,
        "/api/tasks/order",
        Some(json!({"tasks": [{"id": "t2"}, {"id": "t1"}]})),
    )
    .await?;
    assert_eq!(order_of(&tasks, "t3"), Some(-1));

    let (_, listed) = call(&app, Method::GET, "/api/tasks/all", None).await?;
    assert_eq!(ids(&listed), vec!["t3", "t2", "t1"]);
    Ok(())
}

#[tokio::test]
async fn test_search_tasks() -> Result<()> {
    let app = app();

    let (status, absent) = call(&app, Method::GET, "/api/tasks/search", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(absent.is_null());

    let (_, empty_query) = call(&app, Method::GET, "/api/tasks/search?query=", None).await?;
    assert!(empty_query.is_null());

    let (_, no_hits) = call(&app, Method::GET, "/api/tasks/search?query=xyz-no-match", None).await?;
    assert_eq!(no_hits, json!([]));

    let (_, hits) = call(&app, Method::GET, "/api/tasks/search?query=foo", None).await?;
    assert_eq!(ids(&hits), vec!["t1"]);
    assert_eq!(hits[0]["title"], "<mark>Foo</mark>bar");
    assert_eq!(hits[0]["notes"], "foo notes");
    Ok(())
}

#[tokio::test]
async fn test_search_matches_notes_only() -> Result<()> {
    let (_, hits) = call(&app(), Method::GET, "/api/tasks/search?query=NOTES", None).await?;

    assert_eq!(ids(&hits), vec!["t1"]);
    assert_eq!(hits[0]["title"], "Foobar");
    Ok(())
}
