//! Task Records
//!
//! A task list is a flat, ordered collection of [`Task`] records. Section
//! headers live in the same collection (`type = "section"`) so that a single
//! `order` field positions both.
//!
//! # Wire Format
//!
//! ```json
//! {
//!   "id": "4f6f8a94-...",
//!   "type": "task",
//!   "title": "Prepare quarterly report",
//!   "notes": null,
//!   "completed": false,
//!   "dueDate": "2026-03-01T00:00:00Z",
//!   "priority": 2,
//!   "tags": ["..."],
//!   "partners": [],
//!   "categories": [],
//!   "client": null,
//!   "workHours": 1.5,
//!   "order": 0
//! }
//! ```

use crate::models::{EntityKind, Record};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a row is a task or a section header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    #[default]
    Task,
    Section,
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task" => Ok(Self::Task),
            "section" => Ok(Self::Section),
            _ => Err(format!("Invalid task type: {}", s)),
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task => write!(f, "task"),
            Self::Section => write!(f, "section"),
        }
    }
}

/// Task priority, serialized as the integers 0, 1 and 2
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Low),
            1 => Ok(Self::Normal),
            2 => Ok(Self::High),
            _ => Err(format!("Invalid priority: {} (expected 0, 1 or 2)", value)),
        }
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Low => 0,
            Priority::Normal => 1,
            Priority::High => 2,
        }
    }
}

/// A task or section row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,

    #[serde(rename = "type", default)]
    pub task_type: TaskType,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub completed: bool,

    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub priority: Priority,

    /// Tag ids
    #[serde(default)]
    pub tags: Vec<String>,

    /// Partner ids
    #[serde(default)]
    pub partners: Vec<String>,

    /// Category ids
    #[serde(default)]
    pub categories: Vec<String>,

    /// Client id
    #[serde(default)]
    pub client: Option<String>,

    #[serde(default)]
    pub work_hours: f64,

    /// Position in the list; lower sorts first, ties keep stored order
    #[serde(default)]
    pub order: i64,
}

impl Task {
    /// A blank task of the given type, as produced by task creation
    pub fn new(id: impl Into<String>, task_type: TaskType) -> Self {
        Self {
            id: id.into(),
            task_type,
            title: String::new(),
            notes: None,
            completed: false,
            due_date: None,
            priority: Priority::Normal,
            tags: Vec::new(),
            partners: Vec::new(),
            categories: Vec::new(),
            client: None,
            work_hours: 0.0,
            order: 0,
        }
    }

    pub fn is_section(&self) -> bool {
        self.task_type == TaskType::Section
    }

    /// True when the due date falls on a day before `today`
    ///
    /// Tasks due today are not overdue; tasks without a due date never are.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date
            .map(|due| due.date_naive() < today)
            .unwrap_or(false)
    }

    /// Whether this task references `id` in any relation
    pub fn references(&self, id: &str) -> bool {
        self.tags.iter().any(|tag| tag == id)
            || self.partners.iter().any(|partner| partner == id)
            || self.categories.iter().any(|category| category == id)
            || self.client.as_deref() == Some(id)
    }

    /// The id list holding references of `kind`
    ///
    /// `None` for kinds that are not list relations (client, task).
    pub fn relation(&self, kind: EntityKind) -> Option<&[String]> {
        match kind {
            EntityKind::Tag => Some(self.tags.as_slice()),
            EntityKind::Partner => Some(self.partners.as_slice()),
            EntityKind::Category => Some(self.categories.as_slice()),
            EntityKind::Client | EntityKind::Task => None,
        }
    }
}

impl Record for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Completion counters over a task list; sections are not counted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub incomplete: usize,
}

impl TaskStats {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let (total, completed) = tasks
            .into_iter()
            .filter(|task| !task.is_section())
            .fold((0, 0), |(total, completed), task| {
                (total + 1, completed + usize::from(task.completed))
            });

        Self {
            total,
            completed,
            incomplete: total - completed,
        }
    }
}
