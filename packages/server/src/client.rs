//! HTTP client over the axum router
//!
//! [`RouterClient`] implements `TasksApi` by building real HTTP requests and
//! dispatching them through the router with `tower::ServiceExt::oneshot`.
//! Bodies are JSON-encoded on the way in and decoded on the way out, so the
//! façade sees exactly what a remote consumer would.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tower::ServiceExt;

use crate::{create_router, AppState, HttpError};
use taskboard_core::services::error::Result;
use taskboard_core::{CatalogRecord, Task, TaskType, TasksApi, TasksBackend, TasksServiceError};

#[derive(Clone)]
pub struct RouterClient {
    router: Router,
}

impl RouterClient {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// Client over a fresh router serving `backend`
    pub fn from_backend(backend: TasksBackend) -> Self {
        Self::new(create_router(AppState::new(backend)))
    }

    async fn send<T: DeserializeOwned>(&self, method: Method, uri: String, body: Option<Value>) -> Result<T> {
        let mut builder = Request::builder().method(method.clone()).uri(&uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder
            .body(body)
            .map_err(|e| TasksServiceError::transport(e.to_string()))?;

        let response = match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| TasksServiceError::transport(e.to_string()))?
            .to_bytes();

        if !status.is_success() {
            let message = serde_json::from_slice::<HttpError>(&bytes)
                .map(|err| err.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            tracing::warn!(%method, %uri, status = status.as_u16(), "Request rejected: {}", message);
            return Err(TasksServiceError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get<T: DeserializeOwned>(&self, uri: String) -> Result<T> {
        self.send(Method::GET, uri, None).await
    }
}

fn with_query(path: &str, pairs: &[(&str, &str)]) -> Result<String> {
    let query = serde_urlencoded::to_string(pairs)
        .map_err(|e| TasksServiceError::transport(e.to_string()))?;
    Ok(format!("{}?{}", path, query))
}

/// `{ "{key}": value }`, optionally with an `id` alongside
fn keyed_body(key: &str, value: Value, id: Option<&str>) -> Value {
    let mut body = Map::new();
    if let Some(id) = id {
        body.insert("id".to_string(), Value::String(id.to_string()));
    }
    body.insert(key.to_string(), value);
    Value::Object(body)
}

fn singular_path<R: CatalogRecord>() -> String {
    format!("/api/tasks/{}", R::KIND.singular())
}

const TASK_PATH: &str = "/api/tasks/task";

#[async_trait]
impl TasksApi for RouterClient {
    async fn list<R: CatalogRecord>(&self) -> Result<Vec<R>> {
        self.get(format!("/api/tasks/{}", R::KIND.plural())).await
    }

    async fn create<R: CatalogRecord>(&self, payload: Value) -> Result<R> {
        let body = keyed_body(R::KIND.singular(), payload, None);
        self.send(Method::POST, singular_path::<R>(), Some(body)).await
    }

    async fn update<R: CatalogRecord>(&self, id: &str, partial: Value) -> Result<Option<R>> {
        let body = keyed_body(R::KIND.singular(), partial, Some(id));
        self.send(Method::PATCH, singular_path::<R>(), Some(body)).await
    }

    async fn delete<R: CatalogRecord>(&self, id: &str) -> Result<bool> {
        let uri = with_query(&singular_path::<R>(), &[("id", id)])?;
        self.send(Method::DELETE, uri, None).await
    }

    async fn work_hours(&self) -> Result<Vec<f64>> {
        self.get("/api/tasks/workhours".to_string()).await
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        self.get("/api/tasks/all".to_string()).await
    }

    async fn get_task(&self, id: &str) -> Result<Option<Task>> {
        self.get(with_query(TASK_PATH, &[("id", id)])?).await
    }

    async fn create_task(&self, task_type: TaskType) -> Result<Task> {
        let body = json!({ "type": task_type });
        self.send(Method::POST, TASK_PATH.to_string(), Some(body)).await
    }

    async fn update_task(&self, id: &str, partial: Value) -> Result<Option<Task>> {
        let body = keyed_body("task", partial, Some(id));
        self.send(Method::PATCH, TASK_PATH.to_string(), Some(body)).await
    }

    async fn delete_task(&self, id: &str) -> Result<bool> {
        let uri = with_query(TASK_PATH, &[("id", id)])?;
        self.send(Method::DELETE, uri, None).await
    }

    async fn reorder_tasks(&self, tasks: &[Task]) -> Result<Vec<Task>> {
        let body = json!({ "tasks": tasks });
        self.send(Method::PATCH, "/api/tasks/order".to_string(), Some(body)).await
    }

    async fn search_tasks(&self, query: &str) -> Result<Option<Vec<Task>>> {
        self.get(with_query("/api/tasks/search", &[("query", query)])?).await
    }
}
