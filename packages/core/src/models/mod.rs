//! Data Models
//!
//! This module contains the records held by the entity store:
//!
//! - `Tag`, `Category`, `Partner`, `Client` - catalog entities tasks refer to
//! - `Task` - task and section rows carrying the relation lists and `order`
//! - `Record` - the trait every collection member implements, including the
//!   shallow-merge used by partial updates

mod entities;
mod record;
mod task;


pub use entities::{Category, Client, Partner, Tag};
pub use record::{EntityKind, Record, ValidationError};
pub use task::{Priority, Task, TaskStats, TaskType};
