//! Mutation Handlers
//!
//! [`TasksBackend`] owns the [`EntityStore`] and implements one handler per
//! (entity, operation) pair. It is the server side of the request surface:
//! the HTTP router and the in-process client both call straight into it.
//!
//! # Miss Policy
//!
//! Updates and deletes on an unknown id are not errors. Update answers
//! `Ok(None)`, delete answers `true` as if something had been removed.
//! Only malformed payloads produce a [`ValidationError`].
//!
//! # Copies
//!
//! Every response is an owned clone. Nothing handed out aliases the store.

mod search;
mod tasks;

pub use search::{QueryMatcher, HIGHLIGHT_CLOSE, HIGHLIGHT_OPEN};

use crate::models::{Record, Task, ValidationError};
use crate::store::{cascade_delete, CatalogRecord, EntityStore, Stored};
use serde_json::Value;
use uuid::Uuid;

/// Request handlers over the in-memory entity store
#[derive(Debug, Default)]
pub struct TasksBackend {
    store: EntityStore,
}

impl TasksBackend {
    pub fn new(store: EntityStore) -> Self {
        Self { store }
    }

    /// A backend over the demo dataset
    pub fn seeded() -> Self {
        Self::new(EntityStore::seeded())
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Every record of one kind, in stored order
    pub fn list<R: CatalogRecord>(&self) -> Vec<R> {
        self.store.collection::<R>().snapshot()
    }

    /// The work-hour catalogue
    pub fn work_hours(&self) -> Vec<f64> {
        self.store.work_hours().to_vec()
    }

    /// Create a record from a partial payload
    ///
    /// The id is always generated here. The new record goes to the head of
    /// its collection.
    pub fn create<R: CatalogRecord>(&mut self, payload: Value) -> Result<R, ValidationError> {
        let id = generate_id();
        let record = R::from_payload(payload, &id)?;

        self.store.collection_mut::<R>().prepend(record.clone())?;
        tracing::debug!(kind = %R::KIND, id = %id, "Created record");

        Ok(record)
    }

    /// Shallow-merge `partial` over the catalog record with `id`
    ///
    /// Returns `Ok(None)` when the id is unknown. Tasks go through
    /// [`update_task`](Self::update_task), which also checks relations.
    pub fn update<R: CatalogRecord>(&mut self, id: &str, partial: Value) -> Result<Option<R>, ValidationError> {
        self.merge::<R>(id, partial)
    }

    fn merge<R: Stored>(&mut self, id: &str, partial: Value) -> Result<Option<R>, ValidationError> {
        let updated = self.store.collection_mut::<R>().merge_update(id, partial)?;

        match &updated {
            Some(_) => tracing::debug!(kind = %R::KIND, id, "Updated record"),
            None => tracing::debug!(kind = %R::KIND, id, "Update skipped, no such record"),
        }

        Ok(updated)
    }

    /// Delete the record with `id` and strip it from every task
    ///
    /// Always answers `true`, including when nothing matched; callers must
    /// not read the flag as "something changed".
    pub fn delete<R: CatalogRecord>(&mut self, id: &str) -> bool {
        let removed = self.store.collection_mut::<R>().remove(id).is_some();
        let touched = cascade_delete(
            self.store.collection_mut::<Task>().records_mut(),
            R::KIND,
            id,
        );

        tracing::debug!(kind = %R::KIND, id, removed, tasks_touched = touched, "Deleted record");
        true
    }
}

pub(crate) fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
