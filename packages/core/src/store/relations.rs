//! Referential cleanup of task relations
//!
//! When a tag, partner, category or client is deleted, no task may keep
//! pointing at it. Both the backend and the client-side cache run this same
//! function, so the two sides cannot drift apart.

use crate::models::{EntityKind, Task};

/// Remove every reference to `id` of the given kind from `tasks`
///
/// List relations (tags, partners, categories) lose every occurrence of the
/// id; a matching `client` is cleared. Returns the number of tasks changed.
pub fn cascade_delete(tasks: &mut [Task], kind: EntityKind, id: &str) -> usize {
    let mut changed = 0;

    for task in tasks.iter_mut() {
        let touched = match kind {
            EntityKind::Tag => strip(&mut task.tags, id),
            EntityKind::Partner => strip(&mut task.partners, id),
            EntityKind::Category => strip(&mut task.categories, id),
            EntityKind::Client => {
                if task.client.as_deref() == Some(id) {
                    task.client = None;
                    true
                } else {
                    false
                }
            }
            // Tasks are not referenced by other tasks
            EntityKind::Task => false,
        };

        if touched {
            changed += 1;
        }
    }

    changed
}

fn strip(ids: &mut Vec<String>, id: &str) -> bool {
    let before = ids.len();
    ids.retain(|existing| existing != id);
    ids.len() != before
}
