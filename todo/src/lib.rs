//! A minimal in-memory to-do list, written twice.
//!
//! - [`combined`] composes hand-written reducers, one per field of
//!   [`AppState`], behind a single action enum.
//! - [`sliced`] generates each slice's actions and reducer with
//!   [`create_slice!`](reflux_core::create_slice) and wires the mutation
//!   counter through extra reducers.
//!
//! Both apply the same transition rules and reach the same [`AppState`] for
//! the same actions.
//!
//! # Quick Start
//!
//! ```
//! use reflux_core::environment::RandomIdGenerator;
//! use todo::{AppState, combined};
//! use todo::combined::actions::{create_task, toggle_task};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let ids = RandomIdGenerator;
//! let store = combined::store(AppState::seeded(&ids));
//!
//! let state = store.dispatch(create_task(&ids, "Learn Rust")).await;
//! assert_eq!(state.tasks.len(), 4);
//!
//! let new_task = state.tasks[3].id;
//! let state = store.dispatch(toggle_task(new_task, true)).await;
//! assert_eq!(state.completed_count(), 3);
//! assert_eq!(state.mutation_count, 2);
//! # }
//! ```

pub mod combined;
pub mod rules;
pub mod sliced;
pub mod types;

// Re-export commonly used types
pub use types::{AppState, SEED_TASKS, Task, TaskId, TaskIdError};
