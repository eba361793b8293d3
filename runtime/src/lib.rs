//! # Reflux Runtime
//!
//! Runtime implementation for the Reflux state container.
//!
//! This crate provides the [`Store`] that owns a state value, runs the
//! reducer for every dispatched action and executes the returned effects.
//!
//! ## Core Components
//!
//! - **Store**: Owns the state and serializes dispatches
//! - **Middleware**: Observers notified with `(previous, action, next)`
//! - **Effect Executor**: Runs effect descriptions and feeds actions back
//!
//! ## Example
//!
//! ```ignore
//! use reflux_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment)
//!     .with_middleware(LoggingMiddleware);
//!
//! // Dispatch an action and get the resulting state
//! let next = store.dispatch(Action::DoSomething).await;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use reflux_core::{action::Action, effect::Effect, reducer::Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

/// Metrics for observability
pub mod metrics;

/// Observers notified after every dispatch
pub mod middleware;

pub use middleware::{LoggingMiddleware, Middleware};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    ///
    /// Dispatching never fails; these only come from waiting on effects.
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Effects were still running when the settle timeout elapsed
        #[error("Timed out with {0} effects still running")]
        SettleTimeout(usize),
    }
}

pub use error::StoreError;

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use reflux_runtime::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::default()
///     .with_broadcast_capacity(64)
///     .with_settle_timeout(Duration::from_secs(1));
///
/// assert_eq!(config.broadcast_capacity, 64);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Number of actions buffered for each action subscriber
    pub broadcast_capacity: usize,
    /// How long [`Store::settle`] waits for running effects
    pub settle_timeout: Duration,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(broadcast_capacity: usize, settle_timeout: Duration) -> Self {
        Self {
            broadcast_capacity,
            settle_timeout,
        }
    }

    /// Set the action broadcast capacity
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Set the settle timeout
    #[must_use]
    pub const fn with_settle_timeout(mut self, timeout: Duration) -> Self {
        self.settle_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
            settle_timeout: Duration::from_secs(5),
        }
    }
}

/// Decrements a shared counter when dropped, even if the owning task panics
struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        let pending = self.0.fetch_sub(1, Ordering::SeqCst) - 1;
        crate::metrics::StoreMetrics::record_pending(pending);
    }
}

/// Store module - the runtime coordinator for a reducer
pub mod store {
    use super::{
        Action, Arc, AtomicUsize, Duration, Effect, Middleware, Ordering, PendingGuard, Reducer,
        RwLock, StoreConfig, StoreError,
    };
    use crate::metrics::StoreMetrics;
    use std::future::Future;
    use std::pin::Pin;
    use tokio::sync::broadcast;

    type MiddlewareChain<S, A> = Arc<Vec<Arc<dyn Middleware<S, A>>>>;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`, replaced as a whole on every dispatch)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Middleware (observers of every transition)
    /// 5. Effect execution (with feedback loop)
    ///
    /// Cloning a store is cheap and yields another handle to the same state.
    /// Separate calls to [`Store::new`] produce fully independent stores.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        middleware: MiddlewareChain<S, A>,
        pending_effects: Arc<AtomicUsize>,
        config: StoreConfig,
        /// Every dispatched action is broadcast here after its reducer ran.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Action + Clone + Send + Sync + 'static,
        S: Clone + Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// Uses [`StoreConfig::default`].
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        #[must_use]
        pub fn with_config(
            initial_state: S,
            reducer: R,
            environment: E,
            config: StoreConfig,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                middleware: Arc::new(Vec::new()),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                config,
                action_broadcast,
            }
        }

        /// Append a middleware to the chain
        ///
        /// Middleware runs in the order it was added. Handles cloned before
        /// this call keep the chain they were cloned with.
        #[must_use]
        pub fn with_middleware<M>(mut self, middleware: M) -> Self
        where
            M: Middleware<S, A> + 'static,
        {
            Arc::make_mut(&mut self.middleware).push(Arc::new(middleware));
            self
        }

        /// The configuration this store was built with
        #[must_use]
        pub const fn config(&self) -> &StoreConfig {
            &self.config
        }

        /// Dispatch an action to the store
        ///
        /// 1. Acquires the write lock on state
        /// 2. Calls the reducer with (state, action, environment)
        /// 3. Notifies middleware with (previous, action, next)
        /// 4. Broadcasts the action to subscribers, still under the lock
        /// 5. Starts the returned effects
        ///
        /// Returns a snapshot of the state the reducer produced. Effects may
        /// still be running when this returns; see [`Store::settle`].
        ///
        /// Dispatching never fails: an action the reducer does not handle
        /// leaves the state as it was.
        ///
        /// # Panics
        ///
        /// If the reducer panics, the panic propagates to the caller.
        #[tracing::instrument(
            skip(self, action),
            fields(action_type = action.action_type()),
            name = "store_dispatch"
        )]
        pub async fn dispatch(&self, action: A) -> S {
            let action_type = action.action_type();
            let observed = action.clone();

            let (next, effects) = {
                let mut state = self.state.write().await;
                tracing::trace!("Acquired write lock on state");

                let previous = (!self.middleware.is_empty()).then(|| state.clone());

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut state, action, &self.environment);
                StoreMetrics::record_dispatch(action_type, start.elapsed());

                tracing::trace!("Reducer completed, returned {} effects", effects.len());

                if let Some(previous) = previous {
                    for middleware in self.middleware.iter() {
                        middleware.after_dispatch(&previous, &observed, &state);
                    }
                }

                // Sent under the lock so subscribers and middleware agree on
                // order. No subscribers is not an error.
                let _ = self.action_broadcast.send(observed);

                (state.clone(), effects)
            };

            for effect in effects {
                self.execute_effect(effect);
            }

            tracing::debug!("Action processed");
            next
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let task_count = store.state(|s| s.tasks.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&state)
        }

        /// Clone of the current state
        pub async fn snapshot(&self) -> S {
            self.state(S::clone).await
        }

        /// Subscribe to all actions dispatched to this store
        ///
        /// Each receiver gets a clone of every action dispatched after it
        /// subscribed, including actions fed back by effects. A receiver that
        /// falls more than `broadcast_capacity` actions behind skips ahead.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Number of effects still running
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::Acquire)
        }

        /// Wait for running effects using the configured settle timeout
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::SettleTimeout`] if effects are still running
        /// when the timeout elapses.
        pub async fn settle(&self) -> Result<(), StoreError> {
            self.settle_within(self.config.settle_timeout).await
        }

        /// Wait until no effects are running, or the timeout elapses
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::SettleTimeout`] if effects are still running
        /// when the timeout elapses.
        pub async fn settle_within(&self, timeout: Duration) -> Result<(), StoreError> {
            let start = std::time::Instant::now();
            let poll_interval = Duration::from_millis(5);

            loop {
                let pending = self.pending_effects();

                if pending == 0 {
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::warn!(pending_effects = pending, "Timed out waiting for effects");
                    return Err(StoreError::SettleTimeout(pending));
                }

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Start an effect in the background
        ///
        /// `Effect::None` is dropped on the spot; everything else is spawned
        /// and counted as pending until it finishes.
        fn execute_effect(&self, effect: Effect<A>) {
            if matches!(effect, Effect::None) {
                StoreMetrics::record_effect("none");
                return;
            }

            let pending = self.pending_effects.fetch_add(1, Ordering::SeqCst) + 1;
            StoreMetrics::record_pending(pending);
            let guard = PendingGuard(Arc::clone(&self.pending_effects));

            let run = self.run_effect(effect);
            tokio::spawn(async move {
                let _guard = guard;
                run.await;
            });
        }

        /// Drive an effect to completion, dispatching any action it produces
        fn run_effect(&self, effect: Effect<A>) -> Pin<Box<dyn Future<Output = ()> + Send>> {
            let store = self.clone();

            Box::pin(async move {
                match effect {
                    Effect::None => {
                        StoreMetrics::record_effect("none");
                    },
                    Effect::Future(fut) => {
                        StoreMetrics::record_effect("future");
                        if let Some(action) = fut.await {
                            tracing::trace!("Effect::Future produced an action, dispatching");
                            store.dispatch(action).await;
                        }
                    },
                    Effect::Parallel(effects) => {
                        StoreMetrics::record_effect("parallel");
                        futures::future::join_all(
                            effects.into_iter().map(|effect| store.run_effect(effect)),
                        )
                        .await;
                    },
                    Effect::Sequential(effects) => {
                        StoreMetrics::record_effect("sequential");
                        for effect in effects {
                            store.run_effect(effect).await;
                        }
                    },
                }
            })
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                middleware: Arc::clone(&self.middleware),
                pending_effects: Arc::clone(&self.pending_effects),
                config: self.config.clone(),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::FnMiddleware;
    use reflux_core::{SmallVec, smallvec};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct TestState {
        value: i32,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum TestAction {
        Increment,
        Decrement,
        NoOp,
        ProduceEffect,
        ProduceParallelEffects,
        ProduceSequentialEffects,
        ProducePanickingEffect,
    }

    impl Action for TestAction {
        fn action_type(&self) -> &'static str {
            match self {
                Self::Increment => "test/Increment",
                Self::Decrement => "test/Decrement",
                Self::NoOp => "test/NoOp",
                Self::ProduceEffect => "test/ProduceEffect",
                Self::ProduceParallelEffects => "test/ProduceParallelEffects",
                Self::ProduceSequentialEffects => "test/ProduceSequentialEffects",
                Self::ProducePanickingEffect => "test/ProducePanickingEffect",
            }
        }
    }

    #[derive(Debug, Clone)]
    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Increment => {
                    state.value += 1;
                    smallvec![Effect::None]
                },
                TestAction::Decrement => {
                    state.value -= 1;
                    smallvec![Effect::None]
                },
                TestAction::NoOp => SmallVec::new(),
                TestAction::ProduceEffect => {
                    smallvec![Effect::Future(Box::pin(async {
                        Some(TestAction::Increment)
                    }))]
                },
                TestAction::ProduceParallelEffects => {
                    smallvec![Effect::Parallel(vec![
                        Effect::Future(Box::pin(async { Some(TestAction::Increment) })),
                        Effect::Future(Box::pin(async { Some(TestAction::Increment) })),
                        Effect::Future(Box::pin(async { Some(TestAction::Increment) })),
                    ])]
                },
                TestAction::ProduceSequentialEffects => {
                    smallvec![Effect::Sequential(vec![
                        Effect::Future(Box::pin(async { Some(TestAction::Increment) })),
                        Effect::Future(Box::pin(async { Some(TestAction::Increment) })),
                        Effect::Future(Box::pin(async { Some(TestAction::Decrement) })),
                    ])]
                },
                TestAction::ProducePanickingEffect => {
                    #[allow(clippy::panic)] // Intentional panic for testing error handling
                    {
                        smallvec![Effect::Future(Box::pin(async {
                            panic!("Intentional panic in effect for testing");
                        }))]
                    }
                },
            }
        }
    }

    fn test_store() -> Store<TestState, TestAction, (), TestReducer> {
        Store::new(TestState { value: 0 }, TestReducer, ())
    }

    #[tokio::test]
    async fn test_dispatch_returns_next_state() {
        let store = test_store();

        let next = store.dispatch(TestAction::Increment).await;
        assert_eq!(next, TestState { value: 1 });
        assert_eq!(store.snapshot().await, next);
    }

    #[tokio::test]
    async fn test_unhandled_action_leaves_state() {
        let store = test_store();
        let _ = store.dispatch(TestAction::Increment).await;

        let next = store.dispatch(TestAction::NoOp).await;
        assert_eq!(next.value, 1);
    }

    #[tokio::test]
    async fn test_state_closure() {
        let store = test_store();
        let _ = store.dispatch(TestAction::Decrement).await;

        let value = store.state(|s| s.value).await;
        assert_eq!(value, -1);
    }

    #[tokio::test]
    async fn test_future_effect_feeds_back() {
        let store = test_store();

        let _ = store.dispatch(TestAction::ProduceEffect).await;
        assert!(store.settle().await.is_ok());

        assert_eq!(store.state(|s| s.value).await, 1);
        assert_eq!(store.pending_effects(), 0);
    }

    #[tokio::test]
    async fn test_parallel_effects() {
        let store = test_store();

        let _ = store.dispatch(TestAction::ProduceParallelEffects).await;
        assert!(store.settle().await.is_ok());

        assert_eq!(store.state(|s| s.value).await, 3);
    }

    #[tokio::test]
    async fn test_sequential_effects() {
        let store = test_store();
        let mut actions = store.subscribe_actions();

        let _ = store.dispatch(TestAction::ProduceSequentialEffects).await;
        assert!(store.settle().await.is_ok());

        assert_eq!(store.state(|s| s.value).await, 1);

        let mut seen = Vec::new();
        while let Ok(action) = actions.try_recv() {
            seen.push(action);
        }
        assert_eq!(
            seen,
            vec![
                TestAction::ProduceSequentialEffects,
                TestAction::Increment,
                TestAction::Increment,
                TestAction::Decrement,
            ]
        );
    }

    #[tokio::test]
    async fn test_panicking_effect_does_not_poison_store() {
        let store = test_store();

        let _ = store.dispatch(TestAction::ProducePanickingEffect).await;
        assert!(store.settle().await.is_ok());

        let next = store.dispatch(TestAction::Increment).await;
        assert_eq!(next.value, 1);
    }

    #[tokio::test]
    async fn test_settle_times_out_on_slow_effect() {
        #[derive(Clone)]
        struct SlowReducer;

        impl Reducer for SlowReducer {
            type State = TestState;
            type Action = TestAction;
            type Environment = ();

            fn reduce(
                &self,
                _state: &mut TestState,
                _action: TestAction,
                _env: &(),
            ) -> SmallVec<[Effect<TestAction>; 4]> {
                smallvec![Effect::Future(Box::pin(async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    None::<TestAction>
                }))]
            }
        }

        let store = Store::new(TestState { value: 0 }, SlowReducer, ());
        let _ = store.dispatch(TestAction::NoOp).await;

        let result = store.settle_within(Duration::from_millis(20)).await;
        assert!(matches!(result, Err(StoreError::SettleTimeout(1))));
    }

    #[tokio::test]
    async fn test_middleware_sees_every_transition() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);

        let store = test_store().with_middleware(FnMiddleware::new(
            move |previous: &TestState, action: &TestAction, next: &TestState| {
                if let Ok(mut seen) = recorded.lock() {
                    seen.push((previous.value, action.clone(), next.value));
                }
            },
        ));

        let _ = store.dispatch(TestAction::Increment).await;
        let _ = store.dispatch(TestAction::Increment).await;
        let _ = store.dispatch(TestAction::Decrement).await;

        let seen = seen.lock().map(|s| s.clone()).unwrap_or_default();
        assert_eq!(
            seen,
            vec![
                (0, TestAction::Increment, 1),
                (1, TestAction::Increment, 2),
                (2, TestAction::Decrement, 1),
            ]
        );
    }

    #[tokio::test]
    async fn test_middleware_runs_in_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let first = Arc::clone(&order);
        let second = Arc::clone(&order);

        let store = test_store()
            .with_middleware(FnMiddleware::new(
                move |_: &TestState, _: &TestAction, _: &TestState| {
                    if let Ok(mut order) = first.lock() {
                        order.push("first");
                    }
                },
            ))
            .with_middleware(LoggingMiddleware)
            .with_middleware(FnMiddleware::new(
                move |_: &TestState, _: &TestAction, _: &TestState| {
                    if let Ok(mut order) = second.lock() {
                        order.push("second");
                    }
                },
            ));

        let _ = store.dispatch(TestAction::Increment).await;

        let order = order.lock().map(|o| o.clone()).unwrap_or_default();
        assert_eq!(order, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_subscribers_receive_dispatched_actions() {
        let store = test_store();
        let mut actions = store.subscribe_actions();

        let _ = store.dispatch(TestAction::Increment).await;

        assert_eq!(actions.recv().await.ok(), Some(TestAction::Increment));
    }

    #[tokio::test]
    async fn test_stores_are_isolated() {
        let store1 = test_store();
        let store2 = test_store();

        let _ = store1.dispatch(TestAction::Increment).await;
        let _ = store1.dispatch(TestAction::Increment).await;
        let _ = store2.dispatch(TestAction::Increment).await;

        assert_eq!(store1.state(|s| s.value).await, 2);
        assert_eq!(store2.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = test_store();
        let handle = store.clone();

        let _ = handle.dispatch(TestAction::Increment).await;

        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_dispatches_serialize() {
        let store = test_store();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    let _ = store.dispatch(TestAction::Increment).await;
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.is_ok());
        }

        assert_eq!(store.state(|s| s.value).await, 10);
    }

    #[test]
    fn test_config_builder() {
        let config = StoreConfig::new(8, Duration::from_secs(1))
            .with_broadcast_capacity(32)
            .with_settle_timeout(Duration::from_millis(250));

        assert_eq!(config.broadcast_capacity, 32);
        assert_eq!(config.settle_timeout, Duration::from_millis(250));

        let store = Store::with_config(TestState { value: 0 }, TestReducer, (), config);
        assert_eq!(store.config().broadcast_capacity, 32);
    }
}
