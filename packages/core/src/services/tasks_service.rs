//! Client Façade
//!
//! [`TasksService`] is the consumer-side view of the task module. It keeps
//! the last snapshot of every collection it has seen and publishes each new
//! snapshot to subscribers through `tokio::sync::watch` channels.
//!
//! # Snapshot States
//!
//! Every snapshot starts as `None` ("not loaded yet"), which is distinct
//! from `Some(vec![])` ("loaded, and empty").
//!
//! # Mutation Sequence
//!
//! Each mutating call issues the request first and, once it succeeds,
//! applies the equivalent change to the cached snapshot and publishes it.
//! The change is applied to whatever the snapshot holds when the response
//! arrives, so overlapping calls do not overwrite each other's results.
//!
//! Deleting a catalog entry runs [`cascade_delete`] over the cached tasks,
//! the same routine the backend runs over its store.
//!
//! # Timeouts
//!
//! Every request is bounded by [`ServiceConfig::request_timeout`]. On expiry
//! the call fails with [`TasksServiceError::Timeout`]; nothing is retried.

use crate::config::ServiceConfig;
use crate::models::{Category, Client, Partner, Record, Tag, Task, TaskStats, TaskType, ValidationError};
use crate::services::error::{Result, TasksServiceError};
use crate::services::transport::TasksApi;
use crate::store::{cascade_delete, ordering, CatalogRecord};
use serde_json::{json, Map, Value};
use std::future::Future;
use tokio::sync::watch;

/// A published, possibly not-yet-loaded list
pub type Snapshot<T> = watch::Sender<Option<Vec<T>>>;

fn empty_snapshot<T>() -> Snapshot<T> {
    watch::channel(None).0
}

/// Cached catalog snapshots
pub struct CatalogSnapshots {
    tags: Snapshot<Tag>,
    partners: Snapshot<Partner>,
    categories: Snapshot<Category>,
    clients: Snapshot<Client>,
}

impl Default for CatalogSnapshots {
    fn default() -> Self {
        Self {
            tags: empty_snapshot(),
            partners: empty_snapshot(),
            categories: empty_snapshot(),
            clients: empty_snapshot(),
        }
    }
}

/// Catalog records the façade keeps a snapshot of
pub trait Cached: CatalogRecord {
    fn snapshot(snapshots: &CatalogSnapshots) -> &Snapshot<Self>;
}

macro_rules! impl_cached {
    ($($record:ty => $field:ident),+ $(,)?) => {
        $(
            impl Cached for $record {
                fn snapshot(snapshots: &CatalogSnapshots) -> &Snapshot<Self> {
                    &snapshots.$field
                }
            }
        )+
    };
}

impl_cached!(
    Tag => tags,
    Partner => partners,
    Category => categories,
    Client => clients,
);

/// Consumer-side cache and request façade
pub struct TasksService<A: TasksApi> {
    api: A,
    config: ServiceConfig,
    catalogs: CatalogSnapshots,
    work_hours: Snapshot<f64>,
    tasks: Snapshot<Task>,
    selected: watch::Sender<Option<Task>>,
}

impl<A: TasksApi> TasksService<A> {
    pub fn new(api: A) -> Self {
        Self::build(api, ServiceConfig::default())
    }

    /// Create a service with an explicit configuration
    ///
    /// # Errors
    ///
    /// `Config` when the configuration does not validate.
    pub fn with_config(api: A, config: ServiceConfig) -> Result<Self> {
        config.validate().map_err(TasksServiceError::Config)?;
        Ok(Self::build(api, config))
    }

    /// Create a service configured from the environment
    pub fn from_env(api: A) -> Result<Self> {
        Self::with_config(api, ServiceConfig::from_env())
    }

    fn build(api: A, config: ServiceConfig) -> Self {
        Self {
            api,
            config,
            catalogs: CatalogSnapshots::default(),
            work_hours: empty_snapshot(),
            tasks: empty_snapshot(),
            selected: watch::channel(None).0,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    async fn request<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        let after = self.config.request_timeout;
        match tokio::time::timeout(after, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(?after, "Request timed out");
                Err(TasksServiceError::Timeout { after })
            }
        }
    }

    // ------------------------------------------------------------------
    // Snapshot accessors
    // ------------------------------------------------------------------

    /// Current snapshot of one catalog
    pub fn catalog<R: Cached>(&self) -> Option<Vec<R>> {
        R::snapshot(&self.catalogs).borrow().clone()
    }

    pub fn subscribe<R: Cached>(&self) -> watch::Receiver<Option<Vec<R>>> {
        R::snapshot(&self.catalogs).subscribe()
    }

    pub fn tags(&self) -> Option<Vec<Tag>> {
        self.catalog()
    }

    pub fn subscribe_tags(&self) -> watch::Receiver<Option<Vec<Tag>>> {
        self.subscribe()
    }

    pub fn partners(&self) -> Option<Vec<Partner>> {
        self.catalog()
    }

    pub fn subscribe_partners(&self) -> watch::Receiver<Option<Vec<Partner>>> {
        self.subscribe()
    }

    pub fn categories(&self) -> Option<Vec<Category>> {
        self.catalog()
    }

    pub fn subscribe_categories(&self) -> watch::Receiver<Option<Vec<Category>>> {
        self.subscribe()
    }

    pub fn clients(&self) -> Option<Vec<Client>> {
        self.catalog()
    }

    pub fn subscribe_clients(&self) -> watch::Receiver<Option<Vec<Client>>> {
        self.subscribe()
    }

    pub fn work_hours(&self) -> Option<Vec<f64>> {
        self.work_hours.borrow().clone()
    }

    pub fn subscribe_work_hours(&self) -> watch::Receiver<Option<Vec<f64>>> {
        self.work_hours.subscribe()
    }

    pub fn tasks(&self) -> Option<Vec<Task>> {
        self.tasks.borrow().clone()
    }

    pub fn subscribe_tasks(&self) -> watch::Receiver<Option<Vec<Task>>> {
        self.tasks.subscribe()
    }

    /// The task last resolved by [`get_task_by_id`](Self::get_task_by_id)
    pub fn selected_task(&self) -> Option<Task> {
        self.selected.borrow().clone()
    }

    pub fn subscribe_selected_task(&self) -> watch::Receiver<Option<Task>> {
        self.selected.subscribe()
    }

    // ------------------------------------------------------------------
    // Catalogs
    // ------------------------------------------------------------------

    /// Load one catalog and replace its snapshot
    pub async fn fetch<R: Cached>(&self) -> Result<Vec<R>> {
        let records = self.request(self.api.list::<R>()).await?;
        R::snapshot(&self.catalogs).send_replace(Some(records.clone()));
        Ok(records)
    }

    pub async fn get_tags(&self) -> Result<Vec<Tag>> {
        self.fetch().await
    }

    pub async fn get_partners(&self) -> Result<Vec<Partner>> {
        self.fetch().await
    }

    pub async fn get_categories(&self) -> Result<Vec<Category>> {
        self.fetch().await
    }

    pub async fn get_clients(&self) -> Result<Vec<Client>> {
        self.fetch().await
    }

    pub async fn get_work_hours(&self) -> Result<Vec<f64>> {
        let hours = self.request(self.api.work_hours()).await?;
        self.work_hours.send_replace(Some(hours.clone()));
        Ok(hours)
    }

    /// Create a catalog record and append it to the cached list
    pub async fn create<R: Cached>(&self, payload: Value) -> Result<R> {
        let created = self.request(self.api.create::<R>(payload)).await?;

        R::snapshot(&self.catalogs).send_modify(|records| {
            records.get_or_insert_with(Vec::new).push(created.clone());
        });
        tracing::debug!(kind = %R::KIND, id = created.id(), "Cached created record");

        Ok(created)
    }

    /// Update a catalog record and replace it in the cached list
    ///
    /// `Ok(None)` when the backend knows no such id; the cache is left as is.
    pub async fn update<R: Cached>(&self, id: &str, partial: Value) -> Result<Option<R>> {
        let updated = self.request(self.api.update::<R>(id, partial)).await?;

        if let Some(record) = &updated {
            R::snapshot(&self.catalogs).send_modify(|records| {
                if let Some(slot) = records
                    .iter_mut()
                    .flatten()
                    .find(|existing| existing.id() == id)
                {
                    *slot = record.clone();
                }
            });
        }

        Ok(updated)
    }

    /// Delete a catalog record and strip it from the cached tasks
    pub async fn delete<R: Cached>(&self, id: &str) -> Result<bool> {
        let deleted = self.request(self.api.delete::<R>(id)).await?;
        if !deleted {
            return Ok(false);
        }

        R::snapshot(&self.catalogs).send_modify(|records| {
            if let Some(records) = records {
                records.retain(|record| record.id() != id);
            }
        });

        self.tasks.send_modify(|tasks| {
            if let Some(tasks) = tasks {
                let touched = cascade_delete(tasks, R::KIND, id);
                tracing::debug!(kind = %R::KIND, id, touched, "Cascaded delete into cached tasks");
            }
        });

        Ok(true)
    }

    pub async fn create_tag(&self, tag: Value) -> Result<Tag> {
        self.create(tag).await
    }

    pub async fn update_tag(&self, id: &str, tag: Value) -> Result<Option<Tag>> {
        self.update(id, tag).await
    }

    pub async fn delete_tag(&self, id: &str) -> Result<bool> {
        self.delete::<Tag>(id).await
    }

    pub async fn create_partner(&self, partner: Value) -> Result<Partner> {
        self.create(partner).await
    }

    pub async fn update_partner(&self, id: &str, partner: Value) -> Result<Option<Partner>> {
        self.update(id, partner).await
    }

    pub async fn delete_partner(&self, id: &str) -> Result<bool> {
        self.delete::<Partner>(id).await
    }

    pub async fn create_category(&self, category: Value) -> Result<Category> {
        self.create(category).await
    }

    pub async fn update_category(&self, id: &str, category: Value) -> Result<Option<Category>> {
        self.update(id, category).await
    }

    pub async fn delete_category(&self, id: &str) -> Result<bool> {
        self.delete::<Category>(id).await
    }

    pub async fn create_client(&self, client: Value) -> Result<Client> {
        self.create(client).await
    }

    pub async fn update_client(&self, id: &str, client: Value) -> Result<Option<Client>> {
        self.update(id, client).await
    }

    pub async fn delete_client(&self, id: &str) -> Result<bool> {
        self.delete::<Client>(id).await
    }

    // ------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------

    /// Load every task (sorted by order) and replace the snapshot
    pub async fn get_tasks(&self) -> Result<Vec<Task>> {
        let tasks = self.request(self.api.list_tasks()).await?;
        self.tasks.send_replace(Some(tasks.clone()));
        Ok(tasks)
    }

    /// Resolve a task from the cached snapshot and select it
    ///
    /// # Errors
    ///
    /// `NotFound` when the snapshot holds no task with `id`, including when
    /// tasks were never loaded. The selection is cleared in that case.
    pub fn get_task_by_id(&self, id: &str) -> Result<Task> {
        let found = self
            .tasks
            .borrow()
            .iter()
            .flatten()
            .find(|task| task.id == id)
            .cloned();

        self.selected.send_replace(found.clone());

        found.ok_or_else(|| {
            tracing::warn!(id, "Task not found in cached snapshot");
            TasksServiceError::not_found(id)
        })
    }

    /// Create a blank task at the head of the cached list
    pub async fn create_task(&self, task_type: TaskType) -> Result<Task> {
        let created = self.request(self.api.create_task(task_type)).await?;

        self.tasks.send_modify(|tasks| {
            let tasks = tasks.get_or_insert_with(Vec::new);
            tasks.retain(|task| task.id != created.id);
            tasks.insert(0, created.clone());
            ordering::renumber(tasks);
        });

        Ok(created)
    }

    /// Update a task; the selected task is refreshed if it is the same one
    pub async fn update_task(&self, id: &str, partial: Value) -> Result<Option<Task>> {
        let updated = self.request(self.api.update_task(id, partial)).await?;

        if let Some(task) = &updated {
            self.tasks.send_modify(|tasks| {
                if let Some(slot) = tasks.iter_mut().flatten().find(|cached| cached.id == id) {
                    *slot = task.clone();
                }
            });

            self.selected.send_if_modified(|selected| match selected {
                Some(current) if current.id == id => {
                    *current = task.clone();
                    true
                }
                _ => false,
            });
        }

        Ok(updated)
    }

    /// Delete a task; clears the selection if it was the deleted task
    pub async fn delete_task(&self, id: &str) -> Result<bool> {
        let deleted = self.request(self.api.delete_task(id)).await?;
        if !deleted {
            return Ok(false);
        }

        self.tasks.send_modify(|tasks| {
            if let Some(tasks) = tasks {
                tasks.retain(|task| task.id != id);
            }
        });
        self.selected.send_if_modified(|selected| {
            if selected.as_ref().is_some_and(|task| task.id == id) {
                *selected = None;
                true
            } else {
                false
            }
        });

        Ok(true)
    }

    /// Persist a new task order and replace the snapshot with the result
    pub async fn update_tasks_orders(&self, tasks: &[Task]) -> Result<Vec<Task>> {
        let mut updated = self.request(self.api.reorder_tasks(tasks)).await?;
        ordering::sort_by_order(&mut updated);

        self.tasks.send_replace(Some(updated.clone()));
        Ok(updated)
    }

    /// Move one cached task to a new position and persist the order
    ///
    /// The moved list is published right away, before the request. Returns
    /// `Ok(None)` without a request when tasks were never loaded.
    pub async fn move_task(&self, from: usize, to: usize) -> Result<Option<Vec<Task>>> {
        let Some(mut tasks) = self.tasks() else {
            return Ok(None);
        };

        ordering::move_item(&mut tasks, from, to);
        self.tasks.send_replace(Some(tasks.clone()));

        self.update_tasks_orders(&tasks).await.map(Some)
    }

    /// Flip the completed flag of a cached task
    pub async fn toggle_completed(&self, id: &str) -> Result<Option<Task>> {
        let task = self.get_cached_task(id)?;
        self.update_task(id, json!({ "completed": !task.completed })).await
    }

    /// Attach a catalog record to a cached task
    ///
    /// The id goes to the front of the task's relation list. Already
    /// attached ids are left where they are, without a request.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the task is not cached
    /// - `Validation(UnknownReference)` when the cached catalog lacks `id`
    /// - `Validation(InvalidRecord)` when `R` is not a list relation (clients)
    pub async fn attach_to_task<R: Cached>(&self, task_id: &str, id: &str) -> Result<Option<Task>> {
        let task = self.get_cached_task(task_id)?;
        let mut ids = relation_ids::<R>(&task)?;
        if ids.iter().any(|existing| existing == id) {
            return Ok(Some(task));
        }

        let known = self
            .catalog::<R>()
            .is_some_and(|records| records.iter().any(|record| record.id() == id));
        if !known {
            return Err(ValidationError::UnknownReference {
                kind: R::KIND,
                id: id.to_string(),
            }
            .into());
        }

        ids.insert(0, id.to_string());
        self.set_relation::<R>(task_id, ids).await
    }

    /// Detach a catalog record from a cached task
    ///
    /// Ids the task does not hold are ignored, without a request.
    pub async fn detach_from_task<R: Cached>(&self, task_id: &str, id: &str) -> Result<Option<Task>> {
        let task = self.get_cached_task(task_id)?;
        let mut ids = relation_ids::<R>(&task)?;
        if !ids.iter().any(|existing| existing == id) {
            return Ok(Some(task));
        }

        ids.retain(|existing| existing != id);
        self.set_relation::<R>(task_id, ids).await
    }

    /// Detach `id` from the task if attached, attach it otherwise
    pub async fn toggle_task_relation<R: Cached>(&self, task_id: &str, id: &str) -> Result<Option<Task>> {
        let task = self.get_cached_task(task_id)?;
        let attached = relation_ids::<R>(&task)?.iter().any(|existing| existing == id);

        if attached {
            self.detach_from_task::<R>(task_id, id).await
        } else {
            self.attach_to_task::<R>(task_id, id).await
        }
    }

    /// Create a catalog record and attach it to a cached task
    ///
    /// The task is checked before anything is created, so a missing task
    /// leaves the catalog unchanged.
    pub async fn create_and_attach<R: Cached>(&self, task_id: &str, payload: Value) -> Result<(R, Option<Task>)> {
        relation_ids::<R>(&self.get_cached_task(task_id)?)?;

        let created = self.create::<R>(payload).await?;
        let task = self.attach_to_task::<R>(task_id, created.id()).await?;
        Ok((created, task))
    }

    async fn set_relation<R: Cached>(&self, task_id: &str, ids: Vec<String>) -> Result<Option<Task>> {
        let mut partial = Map::new();
        partial.insert(R::KIND.plural().to_string(), json!(ids));
        self.update_task(task_id, Value::Object(partial)).await
    }

    /// Search tasks; no effect on the cache
    ///
    /// `None` means no search was performed (empty query).
    pub async fn search_tasks(&self, query: &str) -> Result<Option<Vec<Task>>> {
        self.request(self.api.search_tasks(query)).await
    }

    /// Completion counters over the cached tasks
    pub fn task_stats(&self) -> Option<TaskStats> {
        self.tasks
            .borrow()
            .as_ref()
            .map(|tasks| TaskStats::from_tasks(tasks))
    }

    /// Cached tasks as shown in the list
    ///
    /// With `hide_completed`, completed tasks are left out; sections always
    /// stay.
    pub fn visible_tasks(&self, hide_completed: bool) -> Option<Vec<Task>> {
        let tasks = self.tasks.borrow();
        let tasks = tasks.as_ref()?;

        Some(
            tasks
                .iter()
                .filter(|task| !hide_completed || task.is_section() || !task.completed)
                .cloned()
                .collect(),
        )
    }

    /// Which task to show after `id` is deleted
    ///
    /// The following task, or the preceding one when `id` is last. `None`
    /// when `id` is the only task or is not cached.
    pub fn neighbor_after_delete(&self, id: &str) -> Option<String> {
        let tasks = self.tasks.borrow();
        let tasks = tasks.as_ref()?;
        let index = tasks.iter().position(|task| task.id == id)?;

        if tasks.len() == 1 {
            return None;
        }

        let neighbor = if index == tasks.len() - 1 {
            index - 1
        } else {
            index + 1
        };
        Some(tasks[neighbor].id.clone())
    }

    fn get_cached_task(&self, id: &str) -> Result<Task> {
        self.tasks
            .borrow()
            .iter()
            .flatten()
            .find(|task| task.id == id)
            .cloned()
            .ok_or_else(|| TasksServiceError::not_found(id))
    }
}

fn relation_ids<R: Cached>(task: &Task) -> Result<Vec<String>> {
    task.relation(R::KIND).map(<[String]>::to_vec).ok_or_else(|| {
        ValidationError::invalid_record(Task::KIND, format!("{} is not a list relation", R::KIND)).into()
    })
}
