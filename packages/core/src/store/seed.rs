//! Demo dataset loaded at startup
//!
//! Ids are fixed so that seeded tasks can reference seeded catalog entries.

use super::EntityStore;
use crate::models::{Category, Client, Partner, Priority, Tag, Task, TaskType};
use chrono::{TimeZone, Utc};

const TAG_URGENT: &str = "a0d2b6c4-6a1f-4b58-9a35-1f9f5e2d7c01";
const TAG_BACKEND: &str = "a0d2b6c4-6a1f-4b58-9a35-1f9f5e2d7c02";
const TAG_FRONTEND: &str = "a0d2b6c4-6a1f-4b58-9a35-1f9f5e2d7c03";

const PARTNER_ANA: &str = "b13e7d2a-52c1-4d0e-8f3b-6a0c9e4d1b01";
const PARTNER_MARKO: &str = "b13e7d2a-52c1-4d0e-8f3b-6a0c9e4d1b02";

const CATEGORY_DEVELOPMENT: &str = "c58f1a3e-7b24-4e69-b1d0-3c2e8f6a9d01";
const CATEGORY_SUPPORT: &str = "c58f1a3e-7b24-4e69-b1d0-3c2e8f6a9d02";

const CLIENT_ACME: &str = "d72a4c9b-18e3-4f57-a6c2-5b9d0e1f3a01";
const CLIENT_GLOBEX: &str = "d72a4c9b-18e3-4f57-a6c2-5b9d0e1f3a02";

pub(super) fn demo_store() -> EntityStore {
    EntityStore::new()
        .with_tags(vec![
            Tag::new(TAG_URGENT, "Urgent"),
            Tag::new(TAG_BACKEND, "Backend"),
            Tag::new(TAG_FRONTEND, "Frontend"),
        ])
        .with_partners(vec![
            Partner::new(PARTNER_ANA, "Ana", "Petrovska", "Project manager"),
            Partner::new(PARTNER_MARKO, "Marko", "Iliev", "Developer"),
        ])
        .with_categories(vec![
            Category::new(CATEGORY_DEVELOPMENT, "Development"),
            Category::new(CATEGORY_SUPPORT, "Support"),
        ])
        .with_clients(vec![
            Client {
                company: Some("Acme Corporation".to_string()),
                email: Some("office@acme.test".to_string()),
                ..Client::new(CLIENT_ACME, "Acme")
            },
            Client {
                company: Some("Globex Inc.".to_string()),
                phone: Some("+389 2 000 000".to_string()),
                ..Client::new(CLIENT_GLOBEX, "Globex")
            },
        ])
        .with_tasks(demo_tasks())
        .with_work_hours((1..=16).map(|half_hours| f64::from(half_hours) * 0.5))
}

fn demo_tasks() -> Vec<Task> {
    let mut tasks = vec![
        Task {
            title: "This week".to_string(),
            ..Task::new("e9b3c1d7-0a42-4c6e-9f18-2d5b7a3e6c01", TaskType::Section)
        },
        Task {
            title: "Migrate billing service to the new API".to_string(),
            notes: Some("Coordinate the cut-over window with Acme".to_string()),
            due_date: Utc.with_ymd_and_hms(2026, 11, 2, 9, 0, 0).single(),
            priority: Priority::High,
            tags: vec![TAG_URGENT.to_string(), TAG_BACKEND.to_string()],
            partners: vec![PARTNER_MARKO.to_string()],
            categories: vec![CATEGORY_DEVELOPMENT.to_string()],
            client: Some(CLIENT_ACME.to_string()),
            work_hours: 6.0,
            ..Task::new("e9b3c1d7-0a42-4c6e-9f18-2d5b7a3e6c02", TaskType::Task)
        },
        Task {
            title: "Review dashboard layout".to_string(),
            tags: vec![TAG_FRONTEND.to_string()],
            partners: vec![PARTNER_ANA.to_string()],
            categories: vec![CATEGORY_DEVELOPMENT.to_string()],
            client: Some(CLIENT_GLOBEX.to_string()),
            work_hours: 1.5,
            ..Task::new("e9b3c1d7-0a42-4c6e-9f18-2d5b7a3e6c03", TaskType::Task)
        },
        Task {
            title: "Later".to_string(),
            ..Task::new("e9b3c1d7-0a42-4c6e-9f18-2d5b7a3e6c04", TaskType::Section)
        },
        Task {
            title: "Answer open support tickets".to_string(),
            notes: Some("Globex reported a login issue".to_string()),
            completed: true,
            priority: Priority::Low,
            partners: vec![PARTNER_ANA.to_string(), PARTNER_MARKO.to_string()],
            categories: vec![CATEGORY_SUPPORT.to_string()],
            client: Some(CLIENT_GLOBEX.to_string()),
            work_hours: 2.0,
            ..Task::new("e9b3c1d7-0a42-4c6e-9f18-2d5b7a3e6c05", TaskType::Task)
        },
    ];

    super::ordering::renumber(&mut tasks);
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_tasks_only_reference_seeded_entities() {
        let store = demo_store();

        for task in store.collection::<Task>().records() {
            for tag in &task.tags {
                assert!(store.collection::<Tag>().contains(tag), "unknown tag {}", tag);
            }
            for partner in &task.partners {
                assert!(store.collection::<Partner>().contains(partner));
            }
            for category in &task.categories {
                assert!(store.collection::<Category>().contains(category));
            }
            if let Some(client) = &task.client {
                assert!(store.collection::<Client>().contains(client));
            }
        }
    }

    #[test]
    fn test_seeded_work_hours_are_half_hour_steps() {
        let store = demo_store();
        assert_eq!(store.work_hours().first(), Some(&0.5));
        assert_eq!(store.work_hours().last(), Some(&8.0));
    }
}
