//! Transition rules over the task list.
//!
//! Both reducer variants apply these same rules, so they agree on every
//! action sequence. Each rule is a single linear pass and never fails: an id
//! that matches nothing leaves the list as it was.
//!
//! Ids stay unique: a create that reuses an id already in the list is
//! dropped, so the rules below never see two tasks with the same id.

use crate::types::{Task, TaskId};

/// Appends an open task unless `id` is already taken
pub fn create(tasks: &mut Vec<Task>, id: TaskId, description: String) {
    if tasks.iter().any(|task| task.id == id) {
        tracing::debug!(%id, "create ignored, id already present");
        return;
    }
    tasks.push(Task::new(id, description));
}

/// Replaces the description of the matching task in place
pub fn edit(tasks: &mut [Task], id: TaskId, description: String) {
    if let Some(task) = tasks.iter_mut().find(|task| task.id == id) {
        task.description = description;
    }
}

/// Sets the completion flag of the matching task to `is_complete`
pub fn toggle(tasks: &mut [Task], id: TaskId, is_complete: bool) {
    if let Some(task) = tasks.iter_mut().find(|task| task.id == id) {
        task.is_complete = is_complete;
    }
}

/// Removes the matching task, keeping the order of the rest
pub fn delete(tasks: &mut Vec<Task>, id: TaskId) {
    tasks.retain(|task| task.id != id);
}
