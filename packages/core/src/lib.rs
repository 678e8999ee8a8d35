//! Taskboard Core
//!
//! This crate provides the task module's data model, in-memory entity
//! store, request handlers and the client-side façade that mirrors backend
//! state for a UI layer.
//!
//! # Architecture
//!
//! - **Entity Store**: five in-memory collections (tags, partners,
//!   categories, clients, tasks) keyed by generated ids
//! - **Handlers**: create/read/update/delete per collection, with cascading
//!   relation cleanup and a no-op policy for unknown ids
//! - **Ordering**: an integer `order` per task, renumbered on insert and on
//!   explicit reorder requests
//! - **Façade**: snapshot cache with subscribe/notify over `tokio::sync::watch`
//!
//! # Modules
//!
//! - [`models`] - Records (Tag, Partner, Category, Client, Task)
//! - [`store`] - Collections, ordering protocol, relation cleanup
//! - [`api`] - Request handlers over the store
//! - [`services`] - Request surface trait, in-process client, façade
//! - [`config`] - Façade configuration

pub mod api;
pub mod config;
pub mod models;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use api::TasksBackend;
pub use config::ServiceConfig;
pub use models::*;
pub use services::{LocalClient, TasksApi, TasksService, TasksServiceError};
pub use store::{CatalogRecord, EntityStore, Stored};
