//! Integration tests for Store action broadcasting and observation
//!
//! Tests that subscribers and middleware see every dispatched action,
//! including actions fed back by effects, in dispatch order, and that both
//! agree on that order when several tasks dispatch at once.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use reflux_core::{SmallVec, action::Action, effect::Effect, reducer::Reducer, smallvec};
use reflux_runtime::{Store, StoreConfig};
use reflux_testing::{RecordingMiddleware, Transition, helpers::init_test_tracing};
use std::time::Duration;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TestAction {
    /// Start a chain of follow-up steps
    StartChain { id: u64 },
    /// One step of the chain finished
    StepCompleted { id: u64, step: u32 },
    /// The chain is done (terminal action)
    ChainCompleted { id: u64 },
    /// Simple increment
    Increment,
    /// Increment carrying a caller-chosen tag
    Mark { tag: u32 },
}

impl Action for TestAction {
    fn action_type(&self) -> &'static str {
        match self {
            Self::StartChain { .. } => "chain/StartChain",
            Self::StepCompleted { .. } => "chain/StepCompleted",
            Self::ChainCompleted { .. } => "chain/ChainCompleted",
            Self::Increment => "chain/Increment",
            Self::Mark { .. } => "chain/Mark",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct TestState {
    counter: u32,
    steps: Vec<u32>,
    completed: bool,
}

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
            TestAction::StartChain { id } => {
                state.steps.clear();
                state.completed = false;
                smallvec![Effect::Future(Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    Some(TestAction::StepCompleted { id, step: 1 })
                }))]
            },

            TestAction::StepCompleted { id, step } => {
                state.steps.push(step);

                if step < 3 {
                    smallvec![Effect::Future(Box::pin(async move {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        Some(TestAction::StepCompleted { id, step: step + 1 })
                    }))]
                } else {
                    smallvec![Effect::Future(Box::pin(async move {
                        Some(TestAction::ChainCompleted { id })
                    }))]
                }
            },

            TestAction::ChainCompleted { .. } => {
                state.completed = true;
                SmallVec::new()
            },

            TestAction::Increment | TestAction::Mark { .. } => {
                state.counter += 1;
                SmallVec::new()
            },
        }
    }
}

fn drain(receiver: &mut tokio::sync::broadcast::Receiver<TestAction>) -> Vec<TestAction> {
    let mut actions = Vec::new();
    while let Ok(action) = receiver.try_recv() {
        actions.push(action);
    }
    actions
}

// ============================================================================
// Tests
// ============================================================================

/// A subscriber sees the whole effect chain in order
#[tokio::test]
async fn test_subscriber_sees_effect_chain() {
    init_test_tracing();
    let store = Store::new(TestState::default(), TestReducer, ());
    let mut actions = store.subscribe_actions();

    let _ = store.dispatch(TestAction::StartChain { id: 42 }).await;
    store.settle().await.unwrap();

    assert_eq!(
        drain(&mut actions),
        vec![
            TestAction::StartChain { id: 42 },
            TestAction::StepCompleted { id: 42, step: 1 },
            TestAction::StepCompleted { id: 42, step: 2 },
            TestAction::StepCompleted { id: 42, step: 3 },
            TestAction::ChainCompleted { id: 42 },
        ]
    );

    let state = store.snapshot().await;
    assert_eq!(state.steps, vec![1, 2, 3]);
    assert!(state.completed);
}

/// Every subscriber gets its own copy of each action
#[tokio::test]
async fn test_multiple_subscribers() {
    let store = Store::new(TestState::default(), TestReducer, ());
    let mut first = store.subscribe_actions();
    let mut second = store.subscribe_actions();

    let _ = store.dispatch(TestAction::Increment).await;
    let _ = store.dispatch(TestAction::Increment).await;

    assert_eq!(drain(&mut first), vec![TestAction::Increment; 2]);
    assert_eq!(drain(&mut second), vec![TestAction::Increment; 2]);
}

/// Subscribing late misses earlier actions
#[tokio::test]
async fn test_late_subscriber_only_sees_new_actions() {
    let store = Store::new(TestState::default(), TestReducer, ());

    let _ = store.dispatch(TestAction::Increment).await;
    let mut late = store.subscribe_actions();
    let _ = store.dispatch(TestAction::StartChain { id: 1 }).await;

    assert_eq!(
        late.recv().await.unwrap(),
        TestAction::StartChain { id: 1 }
    );
}

/// A slow subscriber skips ahead once it falls behind the configured capacity
#[tokio::test]
async fn test_lagging_subscriber_skips_ahead() {
    let config = StoreConfig::default().with_broadcast_capacity(2);
    let store = Store::with_config(TestState::default(), TestReducer, (), config);
    let mut slow = store.subscribe_actions();

    for _ in 0..5 {
        let _ = store.dispatch(TestAction::Increment).await;
    }

    assert!(matches!(
        slow.recv().await,
        Err(tokio::sync::broadcast::error::RecvError::Lagged(3))
    ));
    assert_eq!(drain(&mut slow).len(), 2);
    assert_eq!(store.state(|s| s.counter).await, 5);
}

/// Middleware records (previous, action, next) for feedback actions too
#[tokio::test]
async fn test_middleware_records_effect_chain() {
    init_test_tracing();
    let recorder = RecordingMiddleware::new();
    let store =
        Store::new(TestState::default(), TestReducer, ()).with_middleware(recorder.clone());

    let _ = store.dispatch(TestAction::StartChain { id: 7 }).await;
    store.settle().await.unwrap();

    let transitions = recorder.transitions();
    assert_eq!(transitions.len(), 5);

    // Each transition starts where the previous one ended
    for pair in transitions.windows(2) {
        assert_eq!(pair[0].next, pair[1].previous);
    }

    let Transition { previous, action, next } = &transitions[3];
    assert_eq!(action, &TestAction::StepCompleted { id: 7, step: 3 });
    assert_eq!(previous.steps, vec![1, 2]);
    assert_eq!(next.steps, vec![1, 2, 3]);

    assert_eq!(transitions[4].next, store.snapshot().await);
}

/// Middleware observes but cannot change the result
#[tokio::test]
async fn test_middleware_does_not_change_state() {
    let recorder = RecordingMiddleware::new();
    let plain = Store::new(TestState::default(), TestReducer, ());
    let observed =
        Store::new(TestState::default(), TestReducer, ()).with_middleware(recorder.clone());

    let a = plain.dispatch(TestAction::Increment).await;
    let b = observed.dispatch(TestAction::Increment).await;

    assert_eq!(a, b);
    assert_eq!(recorder.len(), 1);
}

/// Under concurrent dispatchers, subscribers see the same order as middleware
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_dispatches_broadcast_in_middleware_order() {
    for _ in 0..20 {
        let recorder = RecordingMiddleware::new();
        let store =
            Store::new(TestState::default(), TestReducer, ()).with_middleware(recorder.clone());
        let mut actions = store.subscribe_actions();

        let handles: Vec<_> = (0..16)
            .map(|tag| {
                let store = store.clone();
                tokio::spawn(async move { store.dispatch(TestAction::Mark { tag }).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let recorded: Vec<_> = recorder
            .transitions()
            .into_iter()
            .map(|transition| transition.action)
            .collect();
        assert_eq!(recorded.len(), 16);
        assert_eq!(drain(&mut actions), recorded);

        // Counter values follow the same order
        let counters: Vec<_> = recorder
            .transitions()
            .iter()
            .map(|transition| transition.next.counter)
            .collect();
        assert_eq!(counters, (1..=16).collect::<Vec<_>>());
    }
}
