//! Task ordering protocol
//!
//! Tasks are positioned by an integer `order`. Values need not be
//! contiguous; sorting is stable, so ties keep their stored position.
//!
//! - Creation prepends and renumbers everything to its index ([`renumber`])
//! - Explicit reorders assign each task the index of its id in the
//!   caller's list, or `-1` when the caller left it out ([`apply_order`])
//! - Deletion leaves gaps; nothing is renumbered

use crate::models::Task;
use std::collections::HashMap;

/// Order value given to tasks missing from a reorder request
pub const UNLISTED_ORDER: i64 = -1;

/// Set every task's order to its current index
pub fn renumber(tasks: &mut [Task]) {
    for (index, task) in tasks.iter_mut().enumerate() {
        task.order = index as i64;
    }
}

/// Stable sort ascending by order
pub fn sort_by_order(tasks: &mut [Task]) {
    tasks.sort_by_key(|task| task.order);
}

/// Assign each task the index of its id within `ordered_ids`
///
/// Ids repeated in `ordered_ids` resolve to their first position. Tasks whose
/// id is absent get [`UNLISTED_ORDER`]; ids that match no task are ignored.
pub fn apply_order<S: AsRef<str>>(tasks: &mut [Task], ordered_ids: &[S]) {
    let mut positions: HashMap<&str, i64> = HashMap::with_capacity(ordered_ids.len());
    for (index, id) in ordered_ids.iter().enumerate() {
        positions.entry(id.as_ref()).or_insert(index as i64);
    }

    for task in tasks.iter_mut() {
        task.order = positions
            .get(task.id.as_str())
            .copied()
            .unwrap_or(UNLISTED_ORDER);
    }
}

/// Move the item at `from` to `to`, shifting the items in between
///
/// Both indices are clamped into range, so a drop past either end lands on
/// that end.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if items.is_empty() {
        return;
    }

    let last = items.len() - 1;
    let from = from.min(last);
    let to = to.min(last);
    if from == to {
        return;
    }

    let item = items.remove(from);
    items.insert(to, item);
}
