//! # Reflux Testing
//!
//! Testing utilities and helpers for Reflux reducers and stores.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A recording middleware for asserting on store transitions
//! - Property-based testing strategies
//! - Assertion helpers for reducers
//!
//! ## Example
//!
//! ```ignore
//! use reflux_testing::{RecordingMiddleware, SequentialIdGenerator};
//! use reflux_runtime::Store;
//!
//! #[tokio::test]
//! async fn test_create_flow() {
//!     let recorder = RecordingMiddleware::new();
//!     let store = Store::new(AppState::default(), app_reducer(), SequentialIdGenerator::new())
//!         .with_middleware(recorder.clone());
//!
//!     store.dispatch(create_task(&ids, "Write docs")).await;
//!
//!     assert_eq!(recorder.len(), 1);
//! }
//! ```


pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations for testing.
pub mod mocks {
    use reflux_core::environment::IdGenerator;
    use reflux_runtime::Middleware;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex, PoisonError};
    use uuid::Uuid;

    /// Predictable id source for deterministic tests
    ///
    /// Hands out `00000000-0000-0000-0000-000000000001`, then `...0002`, and
    /// so on. Clones share the counter.
    ///
    /// # Example
    ///
    /// ```
    /// use reflux_testing::mocks::SequentialIdGenerator;
    /// use reflux_core::environment::IdGenerator;
    /// use uuid::Uuid;
    ///
    /// let ids = SequentialIdGenerator::new();
    /// assert_eq!(ids.next_id(), Uuid::from_u128(1));
    /// assert_eq!(ids.next_id(), Uuid::from_u128(2));
    /// ```
    #[derive(Debug, Clone, Default)]
    pub struct SequentialIdGenerator {
        issued: Arc<AtomicU64>,
    }

    impl SequentialIdGenerator {
        /// Create a generator whose first id is `1`
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// How many ids have been handed out so far
        #[must_use]
        pub fn issued(&self) -> u64 {
            self.issued.load(Ordering::SeqCst)
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> Uuid {
            let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            Uuid::from_u128(u128::from(n))
        }
    }

    /// One `(previous, action, next)` triple seen by a middleware
    #[derive(Debug, Clone, PartialEq)]
    pub struct Transition<S, A> {
        /// State before the reducer ran
        pub previous: S,
        /// The dispatched action
        pub action: A,
        /// State the reducer produced
        pub next: S,
    }

    /// Middleware that keeps every transition it sees
    ///
    /// Clones share the log, so keep one handle and give the other to the
    /// store.
    #[derive(Debug)]
    pub struct RecordingMiddleware<S, A> {
        transitions: Arc<Mutex<Vec<Transition<S, A>>>>,
    }

    impl<S, A> RecordingMiddleware<S, A> {
        /// Create an empty recorder
        #[must_use]
        pub fn new() -> Self {
            Self {
                transitions: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Number of transitions recorded
        #[must_use]
        pub fn len(&self) -> usize {
            self.transitions
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }

        /// True if nothing was dispatched yet
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    impl<S: Clone, A: Clone> RecordingMiddleware<S, A> {
        /// Copy of everything recorded so far, in dispatch order
        #[must_use]
        pub fn transitions(&self) -> Vec<Transition<S, A>> {
            self.transitions
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    impl<S, A> Default for RecordingMiddleware<S, A> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<S, A> Clone for RecordingMiddleware<S, A> {
        fn clone(&self) -> Self {
            Self {
                transitions: Arc::clone(&self.transitions),
            }
        }
    }

    impl<S, A> Middleware<S, A> for RecordingMiddleware<S, A>
    where
        S: Clone + Send,
        A: Clone + Send,
    {
        fn after_dispatch(&self, previous: &S, action: &A, next: &S) {
            self.transitions
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(Transition {
                    previous: previous.clone(),
                    action: action.clone(),
                    next: next.clone(),
                });
        }
    }
}

/// Test helpers and utilities.
pub mod helpers {
    /// Install a `tracing` subscriber that writes through the test harness
    ///
    /// Honors `RUST_LOG`. Safe to call from every test; only the first call
    /// installs anything.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;

    /// Short free-form task descriptions, including the empty string
    pub fn description() -> impl Strategy<Value = String> {
        "[A-Za-z0-9 ,.!-]{0,32}"
    }

    /// Between zero and `max` descriptions
    pub fn descriptions(max: usize) -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(description(), 0..=max)
    }
}

// Re-export commonly used items
pub use mocks::{RecordingMiddleware, SequentialIdGenerator, Transition};
