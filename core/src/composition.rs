//! Reducer composition utilities
//!
//! This module provides utilities for composing reducers in various ways:
//! - **`combine_reducers`**: Run multiple reducers on the same state/action
//! - **`scope_reducer`**: Focus a reducer on a subset of state
//! - **`pullback`**: Focus a reducer on a subset of state *and* a subset of actions
//!
//! # Examples
//!
//! ## Combining Reducers
//!
//! ```
//! use reflux_core::{effect::Effect, reducer::Reducer, SmallVec};
//! use reflux_core::composition::combine_reducers;
//!
//! #[derive(Clone)]
//! struct MyState {
//!     count: i32,
//!     name: String,
//! }
//!
//! #[derive(Clone)]
//! enum MyAction {
//!     Increment,
//!     SetName(String),
//! }
//!
//! struct CounterReducer;
//! struct NameReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = MyState;
//!     type Action = MyAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut MyState, action: MyAction, _env: &()) -> SmallVec<[Effect<MyAction>; 4]> {
//!         if matches!(action, MyAction::Increment) {
//!             state.count += 1;
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! impl Reducer for NameReducer {
//!     type State = MyState;
//!     type Action = MyAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut MyState, action: MyAction, _env: &()) -> SmallVec<[Effect<MyAction>; 4]> {
//!         if let MyAction::SetName(name) = action {
//!             state.name = name;
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! let combined = combine_reducers(vec![Box::new(CounterReducer), Box::new(NameReducer)]);
//!
//! let mut state = MyState { count: 0, name: String::new() };
//! let _ = combined.reduce(&mut state, MyAction::Increment, &());
//! assert_eq!(state.count, 1);
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::SmallVec;

/// Combines multiple reducers that operate on the same state and action types.
///
/// Each reducer is run in sequence, and all effects are collected and concatenated.
/// Every reducer sees the action; each one ignores the actions it does not handle.
#[must_use]
pub fn combine_reducers<S, A, E>(
    reducers: Vec<Box<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>>,
) -> CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    CombinedReducer { reducers }
}

/// A combined reducer that runs multiple reducers in sequence.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    reducers: Vec<Box<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>>,
}

impl<S, A, E> CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    /// Number of reducers in the combination
    #[must_use]
    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    /// Whether the combination is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl<S, A, E> Reducer for CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let mut all_effects = SmallVec::new();

        for reducer in &self.reducers {
            let effects = reducer.reduce(state, action.clone(), env);
            all_effects.extend(effects);
        }

        all_effects
    }
}

/// Scopes a reducer to operate on a subset of a larger state.
///
/// This allows you to reuse reducers designed for smaller state types
/// within a larger application state.
///
/// # Examples
///
/// ```
/// use reflux_core::{effect::Effect, reducer::Reducer, SmallVec};
/// use reflux_core::composition::scope_reducer;
///
/// #[derive(Clone)]
/// enum CounterAction {
///     Increment,
/// }
///
/// struct CounterReducer;
///
/// impl Reducer for CounterReducer {
///     type State = u64;
///     type Action = CounterAction;
///     type Environment = ();
///
///     fn reduce(&self, state: &mut u64, action: CounterAction, _env: &()) -> SmallVec<[Effect<CounterAction>; 4]> {
///         match action {
///             CounterAction::Increment => *state += 1,
///         }
///         SmallVec::new()
///     }
/// }
///
/// #[derive(Clone, Default)]
/// struct AppState {
///     counter: u64,
///     other_data: String,
/// }
///
/// fn counter(state: &AppState) -> &u64 {
///     &state.counter
/// }
///
/// fn set_counter(state: &mut AppState, counter: u64) {
///     state.counter = counter;
/// }
///
/// let scoped = scope_reducer(CounterReducer, counter, set_counter);
///
/// let mut state = AppState::default();
/// let _ = scoped.reduce(&mut state, CounterAction::Increment, &());
/// assert_eq!(state.counter, 1);
/// ```
pub fn scope_reducer<S, SubS, A, E, R>(
    reducer: R,
    get_state: fn(&S) -> &SubS,
    set_state: fn(&mut S, SubS),
) -> ScopedReducer<S, SubS, A, E, R>
where
    S: 'static,
    SubS: Clone + 'static,
    A: 'static,
    E: 'static,
    R: Reducer<State = SubS, Action = A, Environment = E>,
{
    ScopedReducer {
        reducer,
        get_state,
        set_state,
        _phantom: std::marker::PhantomData,
    }
}

/// A scoped reducer that operates on a subset of state.
///
/// Created by [`scope_reducer`].
pub struct ScopedReducer<S, SubS, A, E, R>
where
    S: 'static,
    SubS: Clone + 'static,
    A: 'static,
    E: 'static,
    R: Reducer<State = SubS, Action = A, Environment = E>,
{
    reducer: R,
    get_state: fn(&S) -> &SubS,
    set_state: fn(&mut S, SubS),
    _phantom: std::marker::PhantomData<fn() -> (A, E)>,
}

impl<S, SubS, A, E, R> Reducer for ScopedReducer<S, SubS, A, E, R>
where
    S: 'static,
    SubS: Clone + 'static,
    A: 'static,
    E: 'static,
    R: Reducer<State = SubS, Action = A, Environment = E>,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        // Work on a copy so the parent is only touched through `set_state`
        let mut sub_state = (self.get_state)(state).clone();

        let effects = self.reducer.reduce(&mut sub_state, action, env);

        (self.set_state)(state, sub_state);

        effects
    }
}

/// Scopes a reducer to a subset of state and a subset of actions.
///
/// `to_local` picks the child's actions out of the parent action type; any
/// parent action it rejects leaves the state untouched. Effects returned by
/// the child are lifted back with `to_global`.
///
/// # Examples
///
/// ```
/// use reflux_core::{effect::Effect, reducer::Reducer, SmallVec};
/// use reflux_core::composition::pullback;
///
/// #[derive(Clone, Debug)]
/// enum CounterAction {
///     Increment,
/// }
///
/// #[derive(Clone, Debug)]
/// enum AppAction {
///     Counter(CounterAction),
///     Rename(String),
/// }
///
/// struct CounterReducer;
///
/// impl Reducer for CounterReducer {
///     type State = u64;
///     type Action = CounterAction;
///     type Environment = ();
///
///     fn reduce(&self, state: &mut u64, action: CounterAction, _env: &()) -> SmallVec<[Effect<CounterAction>; 4]> {
///         match action {
///             CounterAction::Increment => *state += 1,
///         }
///         SmallVec::new()
///     }
/// }
///
/// #[derive(Clone, Default)]
/// struct AppState {
///     counter: u64,
/// }
///
/// fn counter(state: &AppState) -> &u64 {
///     &state.counter
/// }
///
/// fn set_counter(state: &mut AppState, counter: u64) {
///     state.counter = counter;
/// }
///
/// fn counter_action(action: AppAction) -> Option<CounterAction> {
///     match action {
///         AppAction::Counter(action) => Some(action),
///         AppAction::Rename(_) => None,
///     }
/// }
///
/// let reducer = pullback(CounterReducer, counter, set_counter, counter_action, AppAction::Counter);
///
/// let mut state = AppState::default();
/// let _ = reducer.reduce(&mut state, AppAction::Counter(CounterAction::Increment), &());
/// let _ = reducer.reduce(&mut state, AppAction::Rename("ignored".into()), &());
/// assert_eq!(state.counter, 1);
/// ```
pub fn pullback<S, SubS, A, SubA, E, R>(
    reducer: R,
    get_state: fn(&S) -> &SubS,
    set_state: fn(&mut S, SubS),
    to_local: fn(A) -> Option<SubA>,
    to_global: fn(SubA) -> A,
) -> PulledBackReducer<S, SubS, A, SubA, E, R>
where
    S: 'static,
    SubS: Clone + 'static,
    A: Send + 'static,
    SubA: Send + 'static,
    E: 'static,
    R: Reducer<State = SubS, Action = SubA, Environment = E>,
{
    PulledBackReducer {
        reducer,
        get_state,
        set_state,
        to_local,
        to_global,
        _phantom: std::marker::PhantomData,
    }
}

/// A reducer scoped to a subset of both state and actions.
///
/// Created by [`pullback`].
pub struct PulledBackReducer<S, SubS, A, SubA, E, R>
where
    S: 'static,
    SubS: Clone + 'static,
    A: Send + 'static,
    SubA: Send + 'static,
    E: 'static,
    R: Reducer<State = SubS, Action = SubA, Environment = E>,
{
    reducer: R,
    get_state: fn(&S) -> &SubS,
    set_state: fn(&mut S, SubS),
    to_local: fn(A) -> Option<SubA>,
    to_global: fn(SubA) -> A,
    _phantom: std::marker::PhantomData<fn() -> E>,
}

impl<S, SubS, A, SubA, E, R> Reducer for PulledBackReducer<S, SubS, A, SubA, E, R>
where
    S: 'static,
    SubS: Clone + 'static,
    A: Send + 'static,
    SubA: Send + 'static,
    E: 'static,
    R: Reducer<State = SubS, Action = SubA, Environment = E>,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let Some(local) = (self.to_local)(action) else {
            return SmallVec::new();
        };

        let mut sub_state = (self.get_state)(state).clone();
        let effects = self.reducer.reduce(&mut sub_state, local, env);
        (self.set_state)(state, sub_state);

        effects
            .into_iter()
            .map(|effect| effect.map(self.to_global))
            .collect()
    }
}
