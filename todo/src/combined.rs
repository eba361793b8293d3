//! The to-do list built from plain reducer composition.
//!
//! One action enum serves the whole app. Three small reducers each own one
//! field of [`AppState`] and ignore the actions they do not care about; they
//! are scoped onto their field and combined into the root reducer.

use crate::rules;
use crate::types::{
    AppState, Task, TaskId, mutation_count, selected_task_id, set_mutation_count,
    set_selected_task_id, set_tasks, tasks,
};
use reflux_core::composition::{CombinedReducer, combine_reducers, scope_reducer};
use reflux_core::{SmallVec, effect::Effect, reducer::Reducer};
use reflux_macros::Action;
use reflux_runtime::Store;
use serde::{Deserialize, Serialize};

/// Every action the to-do list understands
#[derive(Action, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[action(prefix = "todos")]
pub enum TodoAction {
    /// Append a new open task
    #[mutation]
    CreateTask {
        /// Id assigned by the action creator
        id: TaskId,
        /// What needs doing
        description: String,
    },

    /// Replace a task's description
    #[mutation]
    EditTask {
        /// Task to edit
        id: TaskId,
        /// New description
        description: String,
    },

    /// Mark a task done or not done
    #[mutation]
    ToggleTask {
        /// Task to update
        id: TaskId,
        /// Value to store
        is_complete: bool,
    },

    /// Remove a task
    #[mutation]
    DeleteTask {
        /// Task to remove
        id: TaskId,
    },

    /// Point the selection at a task
    SelectTask {
        /// Task to select, not checked for existence
        id: TaskId,
    },
}

/// Owns the task list
#[derive(Clone, Copy, Debug, Default)]
pub struct TasksReducer;

impl Reducer for TasksReducer {
    type State = Vec<Task>;
    type Action = TodoAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TodoAction::CreateTask { id, description } => rules::create(state, id, description),
            TodoAction::EditTask { id, description } => rules::edit(state, id, description),
            TodoAction::ToggleTask { id, is_complete } => rules::toggle(state, id, is_complete),
            TodoAction::DeleteTask { id } => rules::delete(state, id),
            TodoAction::SelectTask { .. } => {},
        }
        SmallVec::new()
    }
}

/// Owns the selected task id
#[derive(Clone, Copy, Debug, Default)]
pub struct SelectionReducer;

impl Reducer for SelectionReducer {
    type State = Option<TaskId>;
    type Action = TodoAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        if let TodoAction::SelectTask { id } = action {
            *state = Some(id);
        }
        SmallVec::new()
    }
}

/// Counts mutations, whether or not they matched a task
#[derive(Clone, Copy, Debug, Default)]
pub struct MutationCountReducer;

impl Reducer for MutationCountReducer {
    type State = u64;
    type Action = TodoAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        if action.is_mutation() {
            *state += 1;
        }
        SmallVec::new()
    }
}

/// Root reducer type of the combined variant
pub type RootReducer = CombinedReducer<AppState, TodoAction, ()>;

/// Store type of the combined variant
pub type TodoStore = Store<AppState, TodoAction, (), RootReducer>;

/// Builds the root reducer: each field reducer scoped onto its field
#[must_use]
pub fn root_reducer() -> RootReducer {
    combine_reducers(vec![
        Box::new(scope_reducer(TasksReducer, tasks, set_tasks)),
        Box::new(scope_reducer(
            SelectionReducer,
            selected_task_id,
            set_selected_task_id,
        )),
        Box::new(scope_reducer(
            MutationCountReducer,
            mutation_count,
            set_mutation_count,
        )),
    ])
}

/// Creates an independent store starting from `initial_state`
#[must_use]
pub fn store(initial_state: AppState) -> TodoStore {
    Store::new(initial_state, root_reducer(), ())
}

/// Action creators
pub mod actions {
    use super::TodoAction;
    use crate::types::TaskId;
    use reflux_core::environment::IdGenerator;

    /// Create a task with a fresh id drawn from `ids`
    pub fn create_task(ids: &dyn IdGenerator, description: impl Into<String>) -> TodoAction {
        TodoAction::CreateTask {
            id: TaskId::generate(ids),
            description: description.into(),
        }
    }

    /// Replace the description of task `id`
    pub fn edit_task(id: TaskId, description: impl Into<String>) -> TodoAction {
        TodoAction::EditTask {
            id,
            description: description.into(),
        }
    }

    /// Set the completion flag of task `id`
    #[must_use]
    pub const fn toggle_task(id: TaskId, is_complete: bool) -> TodoAction {
        TodoAction::ToggleTask { id, is_complete }
    }

    /// Remove task `id`
    #[must_use]
    pub const fn delete_task(id: TaskId) -> TodoAction {
        TodoAction::DeleteTask { id }
    }

    /// Select task `id`
    #[must_use]
    pub const fn select_task(id: TaskId) -> TodoAction {
        TodoAction::SelectTask { id }
    }
}
