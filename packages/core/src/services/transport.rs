//! Request surface between the client façade and the handlers
//!
//! [`TasksApi`] mirrors the HTTP endpoints one method per operation. The
//! façade is generic over it, so the same cache logic runs against the
//! in-process [`LocalClient`] or against a client that goes over HTTP.

use crate::api::TasksBackend;
use crate::models::{Task, TaskType};
use crate::services::error::{Result, TasksServiceError};
use crate::store::CatalogRecord;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

/// The task module's request surface
#[async_trait]
pub trait TasksApi: Send + Sync {
    /// `GET /tasks/{kind}`
    async fn list<R: CatalogRecord>(&self) -> Result<Vec<R>>;

    /// `POST /tasks/{kind-singular}`
    async fn create<R: CatalogRecord>(&self, payload: Value) -> Result<R>;

    /// `PATCH /tasks/{kind-singular}`; `None` when the id is unknown
    async fn update<R: CatalogRecord>(&self, id: &str, partial: Value) -> Result<Option<R>>;

    /// `DELETE /tasks/{kind-singular}?id=`
    async fn delete<R: CatalogRecord>(&self, id: &str) -> Result<bool>;

    /// `GET /tasks/workhours`
    async fn work_hours(&self) -> Result<Vec<f64>>;

    /// `GET /tasks/all`
    async fn list_tasks(&self) -> Result<Vec<Task>>;

    /// `GET /tasks/task?id=`
    async fn get_task(&self, id: &str) -> Result<Option<Task>>;

    /// `POST /tasks/task`
    async fn create_task(&self, task_type: TaskType) -> Result<Task>;

    /// `PATCH /tasks/task`; `None` when the id is unknown
    async fn update_task(&self, id: &str, partial: Value) -> Result<Option<Task>>;

    /// `DELETE /tasks/task?id=`
    async fn delete_task(&self, id: &str) -> Result<bool>;

    /// `PATCH /tasks/order`
    async fn reorder_tasks(&self, tasks: &[Task]) -> Result<Vec<Task>>;

    /// `GET /tasks/search?query=`
    async fn search_tasks(&self, query: &str) -> Result<Option<Vec<Task>>>;
}

/// In-process client calling the handlers directly
///
/// Handlers run under a mutex, one at a time, to completion. Every value
/// crossing the boundary is an owned copy.
#[derive(Clone)]
pub struct LocalClient {
    backend: Arc<Mutex<TasksBackend>>,
    latency: Option<Duration>,
}

impl LocalClient {
    pub fn new(backend: TasksBackend) -> Self {
        Self::shared(Arc::new(Mutex::new(backend)))
    }

    /// Client over a backend that other owners may also hold
    pub fn shared(backend: Arc<Mutex<TasksBackend>>) -> Self {
        Self {
            backend,
            latency: None,
        }
    }

    /// Delay every call by `latency` before it reaches the handlers
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn backend(&self) -> Arc<Mutex<TasksBackend>> {
        Arc::clone(&self.backend)
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            sleep(latency).await;
        }
    }

    async fn call<T>(&self, handler: impl FnOnce(&mut TasksBackend) -> T + Send) -> Result<T> {
        self.simulate_latency().await;

        let mut backend = self
            .backend
            .lock()
            .map_err(|_| TasksServiceError::transport("Failed to acquire backend lock"))?;
        Ok(handler(&mut backend))
    }
}

#[async_trait]
impl TasksApi for LocalClient {
    async fn list<R: CatalogRecord>(&self) -> Result<Vec<R>> {
        self.call(|backend| backend.list::<R>()).await
    }

    async fn create<R: CatalogRecord>(&self, payload: Value) -> Result<R> {
        Ok(self.call(|backend| backend.create::<R>(payload)).await??)
    }

    async fn update<R: CatalogRecord>(&self, id: &str, partial: Value) -> Result<Option<R>> {
        Ok(self.call(|backend| backend.update::<R>(id, partial)).await??)
    }

    async fn delete<R: CatalogRecord>(&self, id: &str) -> Result<bool> {
        self.call(|backend| backend.delete::<R>(id)).await
    }

    async fn work_hours(&self) -> Result<Vec<f64>> {
        self.call(|backend| backend.work_hours()).await
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        self.call(|backend| backend.list_tasks()).await
    }

    async fn get_task(&self, id: &str) -> Result<Option<Task>> {
        self.call(|backend| backend.get_task(id)).await
    }

    async fn create_task(&self, task_type: TaskType) -> Result<Task> {
        Ok(self.call(|backend| backend.create_task(task_type)).await??)
    }

    async fn update_task(&self, id: &str, partial: Value) -> Result<Option<Task>> {
        Ok(self.call(|backend| backend.update_task(id, partial)).await??)
    }

    async fn delete_task(&self, id: &str) -> Result<bool> {
        self.call(|backend| backend.delete_task(id)).await
    }

    async fn reorder_tasks(&self, tasks: &[Task]) -> Result<Vec<Task>> {
        let ordered_ids: Vec<&str> = tasks.iter().map(|task| task.id.as_str()).collect();
        self.call(|backend| backend.reorder_tasks(ordered_ids.as_slice())).await
    }

    async fn search_tasks(&self, query: &str) -> Result<Option<Vec<Task>>> {
        self.call(|backend| backend.search_tasks(Some(query))).await
    }
}
