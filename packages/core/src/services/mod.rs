//! Client-Side Services
//!
//! This module contains the consumer side of the task module:
//!
//! - `TasksApi` - the request surface, one method per endpoint
//! - `LocalClient` - in-process `TasksApi` calling the handlers directly
//! - `TasksService` - the façade caching collection snapshots for the UI
//!
//! The façade never holds references into the backend store; everything it
//! caches arrived as an owned copy.

pub mod error;
pub mod tasks_service;
pub mod transport;


pub use error::TasksServiceError;
pub use tasks_service::{Cached, CatalogSnapshots, TasksService};
pub use transport::{LocalClient, TasksApi};
