//! Domain types for the to-do list.
//!
//! A to-do list is an ordered collection of tasks, an optional selection and
//! a count of how many times the list was changed.

use reflux_core::environment::IdGenerator;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Draws a fresh `TaskId` from an id source
    #[must_use]
    pub fn generate(ids: &dyn IdGenerator) -> Self {
        Self(ids.next_id())
    }

    /// Creates a `TaskId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when text is not a valid task id
#[derive(Debug, Error)]
pub enum TaskIdError {
    /// The text is not a UUID
    #[error("invalid task id `{input}`")]
    Invalid {
        /// The rejected text
        input: String,
        /// Why the UUID parser rejected it
        #[source]
        source: uuid::Error,
    },
}

impl FromStr for TaskId {
    type Err = TaskIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|source| TaskIdError::Invalid {
                input: s.to_owned(),
                source,
            })
    }
}

/// A single task
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, never changes
    pub id: TaskId,
    /// What needs doing
    pub description: String,
    /// Whether the task is done
    pub is_complete: bool,
}

impl Task {
    /// Creates an open task
    #[must_use]
    pub const fn new(id: TaskId, description: String) -> Self {
        Self {
            id,
            description,
            is_complete: false,
        }
    }
}

/// Descriptions and completion flags of the tasks every list starts with
pub const SEED_TASKS: [(&str, bool); 3] = [
    ("Learn React", true),
    ("Learn Redux", true),
    ("Learn Redux-Toolkit", false),
];

/// Builds the seed tasks, drawing one id per task
#[must_use]
pub fn seed_tasks(ids: &dyn IdGenerator) -> Vec<Task> {
    SEED_TASKS
        .iter()
        .map(|&(description, is_complete)| Task {
            id: TaskId::generate(ids),
            description: description.to_owned(),
            is_complete,
        })
        .collect()
}

/// Whole application state
///
/// Replaced as a unit on every dispatch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Tasks in insertion order
    pub tasks: Vec<Task>,
    /// Last selected task; may name a task that no longer exists
    pub selected_task_id: Option<TaskId>,
    /// Number of create, edit, toggle and delete actions applied
    pub mutation_count: u64,
}

impl AppState {
    /// State holding the seed tasks, nothing selected, no mutations
    #[must_use]
    pub fn seeded(ids: &dyn IdGenerator) -> Self {
        Self {
            tasks: seed_tasks(ids),
            ..Self::default()
        }
    }

    /// Looks up a task by id
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// The selected task, if the selection still names an existing task
    #[must_use]
    pub fn selected_task(&self) -> Option<&Task> {
        self.selected_task_id.and_then(|id| self.task(id))
    }

    /// Number of completed tasks
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.is_complete).count()
    }
}

// Field accessors handed to `scope_reducer`, `pullback` and friends.

pub(crate) const fn tasks(state: &AppState) -> &Vec<Task> {
    &state.tasks
}

pub(crate) fn set_tasks(state: &mut AppState, tasks: Vec<Task>) {
    state.tasks = tasks;
}

#[allow(clippy::ref_option)]
pub(crate) const fn selected_task_id(state: &AppState) -> &Option<TaskId> {
    &state.selected_task_id
}

pub(crate) fn set_selected_task_id(state: &mut AppState, id: Option<TaskId>) {
    state.selected_task_id = id;
}

pub(crate) const fn mutation_count(state: &AppState) -> &u64 {
    &state.mutation_count
}

pub(crate) fn set_mutation_count(state: &mut AppState, count: u64) {
    state.mutation_count = count;
}
