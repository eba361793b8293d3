//! The to-do list built from generated slices.
//!
//! Each slice declares its case reducers once and [`create_slice!`] generates
//! its action enum and reducer. The counter slice owns no actions of its own;
//! it counts the tasks slice's actions through extra reducers.

use crate::rules;
use crate::types::{
    AppState, TaskId, mutation_count, seed_tasks, selected_task_id, set_mutation_count,
    set_selected_task_id, set_tasks, tasks,
};
use reflux_core::action::Action;
use reflux_core::composition::{CombinedReducer, combine_reducers, pullback};
use reflux_core::create_slice;
use reflux_core::environment::RandomIdGenerator;
use reflux_core::slice::{Slice, scope_extra_reducers};
use reflux_runtime::Store;
use serde::{Deserialize, Serialize};

create_slice! {
    /// The task list
    pub slice TasksSlice {
        name: "todos",
        state: Vec<crate::types::Task>,
        initial_state: seed_tasks(&RandomIdGenerator),
        #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        action: TasksAction,
        cases: {
            /// Append a new open task
            CreateTask { id: TaskId, description: String } => |list| {
                rules::create(list, id, description);
            },
            /// Replace a task's description
            EditTask { id: TaskId, description: String } => |list| {
                rules::edit(list, id, description);
            },
            /// Mark a task done or not done
            ToggleTask { id: TaskId, is_complete: bool } => |list| {
                rules::toggle(list, id, is_complete);
            },
            /// Remove a task
            DeleteTask { id: TaskId } => |list| {
                rules::delete(list, id);
            },
        }
    }
}

create_slice! {
    /// The selected task id
    pub slice SelectionSlice {
        name: "selection",
        state: Option<TaskId>,
        initial_state: None,
        #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        action: SelectionAction,
        cases: {
            /// Point the selection at a task, existing or not
            SelectTask { id: TaskId } => |selected| {
                *selected = Some(id);
            },
        }
    }
}

create_slice! {
    /// Number of task list mutations
    pub slice CounterSlice {
        name: "counter",
        state: u64,
        initial_state: 0,
        #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        action: CounterAction,
        cases: {},
        extra_reducers: |count, action: &TasksAction| {
            match action {
                TasksAction::CreateTask { .. }
                | TasksAction::EditTask { .. }
                | TasksAction::ToggleTask { .. }
                | TasksAction::DeleteTask { .. } => *count += 1,
            }
        }
    }
}

/// Every action the sliced app understands, grouped by owning slice
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppAction {
    /// An action of the tasks slice
    Tasks(TasksAction),
    /// An action of the selection slice
    Selection(SelectionAction),
}

impl AppAction {
    /// The tasks slice action, if this is one
    #[must_use]
    pub const fn as_tasks(&self) -> Option<&TasksAction> {
        match self {
            Self::Tasks(action) => Some(action),
            Self::Selection(_) => None,
        }
    }

    fn into_tasks(self) -> Option<TasksAction> {
        match self {
            Self::Tasks(action) => Some(action),
            Self::Selection(_) => None,
        }
    }

    fn into_selection(self) -> Option<SelectionAction> {
        match self {
            Self::Selection(action) => Some(action),
            Self::Tasks(_) => None,
        }
    }
}

impl Action for AppAction {
    fn action_type(&self) -> &'static str {
        match self {
            Self::Tasks(action) => action.action_type(),
            Self::Selection(action) => action.action_type(),
        }
    }
}

impl From<TasksAction> for AppAction {
    fn from(action: TasksAction) -> Self {
        Self::Tasks(action)
    }
}

impl From<SelectionAction> for AppAction {
    fn from(action: SelectionAction) -> Self {
        Self::Selection(action)
    }
}

/// Root reducer type of the sliced variant
pub type RootReducer = CombinedReducer<AppState, AppAction, ()>;

/// Store type of the sliced variant
pub type TodoStore = Store<AppState, AppAction, (), RootReducer>;

/// Builds the root reducer: every slice mounted onto its field
#[must_use]
pub fn root_reducer() -> RootReducer {
    combine_reducers(vec![
        Box::new(pullback(
            TasksSlice,
            tasks,
            set_tasks,
            AppAction::into_tasks,
            AppAction::Tasks,
        )),
        Box::new(pullback(
            SelectionSlice,
            selected_task_id,
            set_selected_task_id,
            AppAction::into_selection,
            AppAction::Selection,
        )),
        Box::new(scope_extra_reducers(
            CounterSlice,
            mutation_count,
            set_mutation_count,
            AppAction::as_tasks,
        )),
    ])
}

/// App state assembled from each slice's initial state
///
/// The seed tasks get random ids.
#[must_use]
pub fn initial_state() -> AppState {
    AppState {
        tasks: TasksSlice.initial_state(),
        selected_task_id: SelectionSlice.initial_state(),
        mutation_count: CounterSlice.initial_state(),
    }
}

/// Creates an independent store starting from `initial_state`
#[must_use]
pub fn store(initial_state: AppState) -> TodoStore {
    Store::new(initial_state, root_reducer(), ())
}

/// Action creators
pub mod actions {
    use super::{AppAction, SelectionAction, TasksAction};
    use crate::types::TaskId;
    use reflux_core::environment::IdGenerator;

    /// Create a task with a fresh id drawn from `ids`
    pub fn create_task(ids: &dyn IdGenerator, description: impl Into<String>) -> AppAction {
        AppAction::Tasks(TasksAction::CreateTask {
            id: TaskId::generate(ids),
            description: description.into(),
        })
    }

    /// Replace the description of task `id`
    pub fn edit_task(id: TaskId, description: impl Into<String>) -> AppAction {
        AppAction::Tasks(TasksAction::EditTask {
            id,
            description: description.into(),
        })
    }

    /// Set the completion flag of task `id`
    #[must_use]
    pub const fn toggle_task(id: TaskId, is_complete: bool) -> AppAction {
        AppAction::Tasks(TasksAction::ToggleTask { id, is_complete })
    }

    /// Remove task `id`
    #[must_use]
    pub const fn delete_task(id: TaskId) -> AppAction {
        AppAction::Tasks(TasksAction::DeleteTask { id })
    }

    /// Select task `id`
    #[must_use]
    pub const fn select_task(id: TaskId) -> AppAction {
        AppAction::Selection(SelectionAction::SelectTask { id })
    }
}
