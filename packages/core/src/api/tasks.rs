//! Task handlers: list, lookup, create, update, delete, reorder, search

use super::{generate_id, search, TasksBackend};
use crate::models::{Category, Client, Partner, Record, Tag, Task, TaskType, ValidationError};
use crate::store::{ordering, CatalogRecord};
use serde_json::Value;

impl TasksBackend {
    /// Every task, sorted ascending by order (stable)
    pub fn list_tasks(&self) -> Vec<Task> {
        let mut tasks = self.store.collection::<Task>().snapshot();
        ordering::sort_by_order(&mut tasks);
        tasks
    }

    pub fn get_task(&self, id: &str) -> Option<Task> {
        self.store.collection::<Task>().get(id).cloned()
    }

    /// Create a blank task at the head of the list
    ///
    /// Every task's order is reassigned to its position after the insert,
    /// so the new task always holds the minimum order.
    pub fn create_task(&mut self, task_type: TaskType) -> Result<Task, ValidationError> {
        let tasks = self.store.collection_mut::<Task>();
        tasks.prepend(Task::new(generate_id(), task_type))?;
        ordering::renumber(tasks.records_mut());

        let created = tasks.records()[0].clone();
        tracing::debug!(id = %created.id, task_type = %task_type, "Created task");
        Ok(created)
    }

    /// Shallow-merge `partial` over a task
    ///
    /// Relation ids the update introduces (tags, partners, categories,
    /// client) must name existing catalog records; otherwise the task is
    /// left untouched and `UnknownReference` is returned.
    pub fn update_task(&mut self, id: &str, partial: Value) -> Result<Option<Task>, ValidationError> {
        if let Some(current) = self.store.collection::<Task>().get(id) {
            let merged = current.merged_with(partial.clone())?;
            self.check_references(current, &merged)?;
        }
        self.merge::<Task>(id, partial)
    }

    fn check_references(&self, current: &Task, merged: &Task) -> Result<(), ValidationError> {
        self.check_added::<Tag>(&current.tags, &merged.tags)?;
        self.check_added::<Partner>(&current.partners, &merged.partners)?;
        self.check_added::<Category>(&current.categories, &merged.categories)?;
        self.check_added::<Client>(current.client.as_slice(), merged.client.as_slice())
    }

    fn check_added<R: CatalogRecord>(&self, before: &[String], after: &[String]) -> Result<(), ValidationError> {
        let known = self.store.collection::<R>();
        match after.iter().find(|id| !before.contains(id) && !known.contains(id)) {
            Some(id) => Err(ValidationError::UnknownReference {
                kind: R::KIND,
                id: id.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Remove a task; remaining orders keep their gaps
    pub fn delete_task(&mut self, id: &str) -> bool {
        let removed = self.store.collection_mut::<Task>().remove(id).is_some();
        tracing::debug!(id, removed, "Deleted task");
        true
    }

    /// Reassign every task's order from the caller's id sequence
    ///
    /// Tasks absent from `ordered_ids` get order `-1`. Returns the whole
    /// collection in stored (not sorted) order.
    pub fn reorder_tasks<S: AsRef<str>>(&mut self, ordered_ids: &[S]) -> Vec<Task> {
        let tasks = self.store.collection_mut::<Task>();
        ordering::apply_order(tasks.records_mut(), ordered_ids);

        let unlisted = tasks
            .records()
            .iter()
            .filter(|task| task.order == ordering::UNLISTED_ORDER)
            .count();
        if unlisted > 0 {
            tracing::warn!(unlisted, "Reorder request left tasks out; they now sort first");
        }

        tasks.snapshot()
    }

    /// Case-insensitive search over title and notes
    ///
    /// `None` when no search was performed (empty or absent query), which
    /// differs from `Some(vec![])` for a search with no hits. Matched titles
    /// come back with every occurrence wrapped in highlight markers; notes
    /// are returned untouched.
    pub fn search_tasks(&self, query: Option<&str>) -> Option<Vec<Task>> {
        let query = query.unwrap_or_default();
        let matcher = match search::QueryMatcher::new(query) {
            Ok(matcher) => matcher?,
            Err(e) => {
                tracing::warn!(error = %e, "Search query could not be compiled");
                return Some(Vec::new());
            }
        };

        let results = self
            .store
            .collection::<Task>()
            .records()
            .iter()
            .filter(|task| {
                matcher.is_match(&task.title)
                    || task.notes.as_deref().is_some_and(|notes| matcher.is_match(notes))
            })
            .map(|task| Task {
                title: matcher.highlight(&task.title),
                ..task.clone()
            })
            .collect();

        Some(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EntityStore;
    use serde_json::json;

    fn backend_with(titles: &[&str]) -> TasksBackend {
        let mut tasks: Vec<Task> = titles
            .iter()
            .enumerate()
            .map(|(index, title)| Task {
                title: title.to_string(),
                ..Task::new(format!("t{}", index + 1), TaskType::Task)
            })
            .collect();
        ordering::renumber(&mut tasks);
        TasksBackend::new(EntityStore::new().with_tasks(tasks))
    }

    fn orders(backend: &TasksBackend) -> Vec<(String, i64)> {
        backend
            .store()
            .collection::<Task>()
            .records()
            .iter()
            .map(|task| (task.id.clone(), task.order))
            .collect()
    }

    #[test]
    fn test_create_task_takes_minimum_order() {
        let mut backend = backend_with(&["a", "b"]);
        let created = backend.create_task(TaskType::Task).unwrap();

        assert_eq!(created.order, 0);
        assert_eq!(created.priority, crate::models::Priority::Normal);
        let listed = backend.list_tasks();
        assert_eq!(listed[0].id, created.id);
        assert!(listed.windows(2).all(|pair| pair[0].order <= pair[1].order));
        assert_eq!(listed.iter().map(|t| t.order).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_create_section() {
        let mut backend = backend_with(&[]);
        let created = backend.create_task(TaskType::Section).unwrap();
        assert!(created.is_section());
        assert_eq!(backend.list_tasks().len(), 1);
    }

    #[test]
    fn test_list_tasks_sorted_by_order() {
        let mut backend = backend_with(&["a", "b", "c"]);
        backend.reorder_tasks(&["t3", "t1", "t2"]);

        let ids: Vec<String> = backend.list_tasks().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["t3", "t1", "t2"]);
    }

    #[test]
    fn test_reorder_assigns_positions() {
        let mut backend = backend_with(&["a", "b", "c"]);
        let returned = backend.reorder_tasks(&["t3", "t1", "t2"]);

        assert_eq!(returned.len(), 3);
        assert_eq!(
            orders(&backend),
            vec![("t1".to_string(), 1), ("t2".to_string(), 2), ("t3".to_string(), 0)]
        );
    }

    #[test]
    fn test_reorder_omitted_ids_get_minus_one() {
        let mut backend = backend_with(&["a", "b", "c"]);
        backend.reorder_tasks(&["t2"]);

        assert_eq!(
            orders(&backend),
            vec![("t1".to_string(), -1), ("t2".to_string(), 0), ("t3".to_string(), -1)]
        );
    }

    #[test]
    fn test_delete_task_leaves_order_gaps() {
        let mut backend = backend_with(&["a", "b", "c"]);
        assert!(backend.delete_task("t2"));
        assert!(backend.delete_task("t2"));

        assert_eq!(
            orders(&backend),
            vec![("t1".to_string(), 0), ("t3".to_string(), 2)]
        );
    }

    #[test]
    fn test_update_task_no_op_on_miss() {
        let mut backend = backend_with(&["a"]);
        assert!(backend.update_task("nope", json!({"title": "x"})).unwrap().is_none());
        assert_eq!(backend.get_task("t1").unwrap().title, "a");
    }

    #[test]
    fn test_update_task_keeps_other_fields() {
        let mut backend = backend_with(&["a"]);
        let updated = backend
            .update_task("t1", json!({"completed": true}))
            .unwrap()
            .unwrap();

        assert!(updated.completed);
        assert_eq!(updated.title, "a");
        assert_eq!(updated.order, 0);
    }

    #[test]
    fn test_update_task_rejects_unknown_references() {
        let store = EntityStore::new()
            .with_tags(vec![Tag::new("tag-1", "Urgent")])
            .with_tasks(vec![Task::new("t1", TaskType::Task)]);
        let mut backend = TasksBackend::new(store);

        let err = backend
            .update_task("t1", json!({"tags": ["ghost"], "client": "nobody"}))
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::UnknownReference { kind: crate::models::EntityKind::Tag, ref id } if id == "ghost"
        ));

        let err = backend
            .update_task("t1", json!({"tags": ["tag-1"], "client": "nobody"}))
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::UnknownReference { kind: crate::models::EntityKind::Client, .. }
        ));

        let task = backend.get_task("t1").unwrap();
        assert!(task.tags.is_empty());
        assert!(task.client.is_none());

        let updated = backend
            .update_task("t1", json!({"tags": ["tag-1"]}))
            .unwrap()
            .unwrap();
        assert_eq!(updated.tags, vec!["tag-1"]);
    }

    #[test]
    fn test_search_empty_query_is_none() {
        let backend = backend_with(&["Foobar"]);
        assert!(backend.search_tasks(Some("")).is_none());
        assert!(backend.search_tasks(None).is_none());
    }

    #[test]
    fn test_search_without_hits_is_empty() {
        let backend = backend_with(&["Foobar"]);
        assert_eq!(backend.search_tasks(Some("xyz-no-match")), Some(vec![]));
    }

    #[test]
    fn test_search_highlights_title_and_keeps_notes() {
        let mut backend = backend_with(&["Foobar", "Other"]);
        backend
            .update_task("t1", json!({"notes": "foo in notes"}))
            .unwrap();

        let results = backend.search_tasks(Some("foo")).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "<mark>Foo</mark>bar");
        assert_eq!(results[0].notes.as_deref(), Some("foo in notes"));
        // The stored title is untouched
        assert_eq!(backend.get_task("t1").unwrap().title, "Foobar");
    }

    #[test]
    fn test_search_matches_notes_only() {
        let mut backend = backend_with(&["Plain title"]);
        backend
            .update_task("t1", json!({"notes": "Call the CLIENT"}))
            .unwrap();

        let results = backend.search_tasks(Some("client")).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Plain title");
    }

    #[test]
    fn test_search_folds_greek_final_sigma() {
        let backend = backend_with(&["ΣΑΣ", "Other"]);

        let results = backend.search_tasks(Some("σας")).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "<mark>ΣΑΣ</mark>");
    }
}
