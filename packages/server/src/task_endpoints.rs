//! Task Endpoints
//!
//! # Endpoints
//!
//! - `GET /api/health` - Health check endpoint
//! - `GET /api/tasks/all` - Every task, sorted by order
//! - `GET /api/tasks/search?query=` - Case-insensitive search, `null` for an empty query
//! - `PATCH /api/tasks/order` - Reassign orders from `{ "tasks": [...] }`
//! - `GET /api/tasks/task?id=` - One task or `null`
//! - `POST /api/tasks/task` - Create a blank task from `{ "type" }`
//! - `PATCH /api/tasks/task` - Update from `{ "id", "task": partial }`
//! - `DELETE /api/tasks/task?id=` - Delete a task

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    response::Json,
    routing::{get, patch},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog_endpoints::{update_parts, IdQuery};
use crate::{AppState, HttpError};
use taskboard_core::{Record, Task, TaskType};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: Option<String>,
}

/// Body of `POST /api/tasks/task`; the type defaults to a plain task
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(rename = "type", default)]
    pub task_type: TaskType,
}

/// Only the ids of the submitted tasks are read; their order is the new order
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub tasks: Vec<TaskRef>,
}

#[derive(Debug, Deserialize)]
pub struct TaskRef {
    pub id: String,
}

/// Health check endpoint
///
/// ```bash
/// curl http://localhost:3001/api/health
/// ```
async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    Json(state.backend.lock().await.list_tasks())
}

/// Search task titles and notes
///
/// ```bash
/// curl "http://localhost:3001/api/tasks/search?query=report"
/// ```
async fn search_tasks(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Option<Vec<Task>>>, HttpError> {
    let Query(SearchQuery { query }) = query?;
    let results = state.backend.lock().await.search_tasks(query.as_deref());
    Ok(Json(results))
}

/// Reassign every task's order
///
/// Tasks missing from the body get order -1. The response is the whole
/// collection in stored order.
async fn reorder_tasks(
    State(state): State<AppState>,
    body: Result<Json<ReorderRequest>, JsonRejection>,
) -> Result<Json<Vec<Task>>, HttpError> {
    let Json(ReorderRequest { tasks }) = body?;
    let ordered_ids: Vec<String> = tasks.into_iter().map(|task| task.id).collect();

    tracing::debug!(count = ordered_ids.len(), "Reorder request");
    Ok(Json(state.backend.lock().await.reorder_tasks(ordered_ids.as_slice())))
}

async fn get_task(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<Json<Option<Task>>, HttpError> {
    let Query(IdQuery { id }) = query?;
    Ok(Json(state.backend.lock().await.get_task(&id)))
}

/// Create a blank task at the head of the list
///
/// ```bash
/// curl -X POST http://localhost:3001/api/tasks/task \
///   -H "Content-Type: application/json" \
///   -d '{"type": "section"}'
/// ```
async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<Json<Task>, HttpError> {
    let Json(CreateTaskRequest { task_type }) = body?;
    let created = state.backend.lock().await.create_task(task_type)?;
    Ok(Json(created))
}

/// Shallow-merge a partial over one task
///
/// ```bash
/// curl -X PATCH http://localhost:3001/api/tasks/task \
///   -H "Content-Type: application/json" \
///   -d '{"id": "…", "task": {"completed": true}}'
/// ```
async fn update_task(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Option<Task>>, HttpError> {
    let Json(body) = body?;
    let (id, partial) = update_parts(body, Task::KIND)?;

    let updated = state.backend.lock().await.update_task(&id, partial)?;
    Ok(Json(updated))
}

async fn delete_task(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<Json<bool>, HttpError> {
    let Query(IdQuery { id }) = query?;
    Ok(Json(state.backend.lock().await.delete_task(&id)))
}

/// Create router with the health check and every task endpoint
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/tasks/all", get(list_tasks))
        .route("/api/tasks/search", get(search_tasks))
        .route("/api/tasks/order", patch(reorder_tasks))
        .route(
            "/api/tasks/task",
            get(get_task)
                .post(create_task)
                .patch(update_task)
                .delete(delete_task),
        )
        .with_state(state)
}
