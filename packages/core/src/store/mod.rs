//! In-Memory Entity Store
//!
//! Holds the five record collections (tags, partners, categories, clients,
//! tasks) plus the read-only work-hour catalogue.
//!
//! # Architecture
//!
//! - **Ordered collections**: each [`Collection`] is a `Vec` in stored order;
//!   new records are prepended, so lists read most-recent-first
//! - **Unique ids**: no operation leaves two records sharing an id
//! - **No-op on miss**: update and remove on an unknown id change nothing and
//!   report `None` instead of failing
//!
//! The store is not synchronized. Its owner (the backend behind a mutex)
//! serializes access, so a mutation always runs to completion before the
//! next one starts.

pub mod ordering;
pub mod relations;
mod seed;

use crate::models::{Category, Client, Partner, Record, Tag, Task, ValidationError};
use serde_json::Value;

pub use relations::cascade_delete;

/// An ordered collection of records with unique ids
#[derive(Debug, Clone)]
pub struct Collection<R: Record> {
    records: Vec<R>,
}

impl<R: Record> Default for Collection<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<R: Record> Collection<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from existing records, dropping repeated ids
    ///
    /// The first record with a given id wins.
    pub fn from_records(records: impl IntoIterator<Item = R>) -> Self {
        let mut collection = Self::new();
        for record in records {
            if collection.contains(record.id()) {
                tracing::warn!(kind = %R::KIND, id = record.id(), "Dropping record with duplicate id");
                continue;
            }
            collection.records.push(record);
        }
        collection
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Index of the first record with `id`
    pub fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [R] {
        &mut self.records
    }

    /// Owned copy of every record, in stored order
    pub fn snapshot(&self) -> Vec<R> {
        self.records.clone()
    }

    /// Insert `record` at the head of the collection
    pub fn prepend(&mut self, record: R) -> Result<(), ValidationError> {
        if self.contains(record.id()) {
            return Err(ValidationError::DuplicateId {
                kind: R::KIND,
                id: record.id().to_string(),
            });
        }
        self.records.insert(0, record);
        Ok(())
    }

    /// Shallow-merge `partial` over the record with `id`, in place
    ///
    /// Returns `Ok(None)` when no record has that id. On a validation error
    /// the stored record is left untouched.
    pub fn merge_update(&mut self, id: &str, partial: Value) -> Result<Option<R>, ValidationError> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };

        let merged = self.records[index].merged_with(partial)?;
        self.records[index] = merged.clone();
        Ok(Some(merged))
    }

    /// Remove the first record with `id`
    pub fn remove(&mut self, id: &str) -> Option<R> {
        self.position(id).map(|index| self.records.remove(index))
    }
}

/// Records that live in an [`EntityStore`] collection
pub trait Stored: Record {
    fn collection(store: &EntityStore) -> &Collection<Self>;
    fn collection_mut(store: &mut EntityStore) -> &mut Collection<Self>;
}

/// The records tasks refer to by id: tags, partners, categories, clients
///
/// Deleting one of these cascades into the task relations.
pub trait CatalogRecord: Stored {}

/// The process-wide set of collections
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    tags: Collection<Tag>,
    partners: Collection<Partner>,
    categories: Collection<Category>,
    clients: Collection<Client>,
    tasks: Collection<Task>,
    work_hours: Vec<f64>,
}

impl EntityStore {
    /// An empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// A store populated with the demo dataset
    pub fn seeded() -> Self {
        seed::demo_store()
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags = Collection::from_records(tags);
        self
    }

    pub fn with_partners(mut self, partners: impl IntoIterator<Item = Partner>) -> Self {
        self.partners = Collection::from_records(partners);
        self
    }

    pub fn with_categories(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.categories = Collection::from_records(categories);
        self
    }

    pub fn with_clients(mut self, clients: impl IntoIterator<Item = Client>) -> Self {
        self.clients = Collection::from_records(clients);
        self
    }

    pub fn with_tasks(mut self, tasks: impl IntoIterator<Item = Task>) -> Self {
        self.tasks = Collection::from_records(tasks);
        self
    }

    pub fn with_work_hours(mut self, work_hours: impl IntoIterator<Item = f64>) -> Self {
        self.work_hours = work_hours.into_iter().collect();
        self
    }

    pub fn collection<R: Stored>(&self) -> &Collection<R> {
        R::collection(self)
    }

    pub fn collection_mut<R: Stored>(&mut self) -> &mut Collection<R> {
        R::collection_mut(self)
    }

    pub fn work_hours(&self) -> &[f64] {
        &self.work_hours
    }
}

macro_rules! impl_stored {
    ($($record:ty => $field:ident),+ $(,)?) => {
        $(
            impl Stored for $record {
                fn collection(store: &EntityStore) -> &Collection<Self> {
                    &store.$field
                }

                fn collection_mut(store: &mut EntityStore) -> &mut Collection<Self> {
                    &mut store.$field
                }
            }
        )+
    };
}

impl_stored!(
    Tag => tags,
    Partner => partners,
    Category => categories,
    Client => clients,
    Task => tasks,
);

impl CatalogRecord for Tag {}
impl CatalogRecord for Partner {}
impl CatalogRecord for Category {}
impl CatalogRecord for Client {}
