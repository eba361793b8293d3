//! Observers notified after every dispatch
//!
//! Middleware sees the state before the action, the action itself and the
//! state the reducer produced. It only gets shared references, so it can
//! report on a transition but never change its outcome.

use reflux_core::action::Action;
use std::fmt::Debug;

/// Observer hook run by the [`Store`](crate::Store) after each reducer call
///
/// Called while the store still holds its write lock, so observers see
/// transitions in dispatch order. Implementations should be quick.
pub trait Middleware<S, A>: Send + Sync {
    /// Called once per dispatched action
    fn after_dispatch(&self, previous: &S, action: &A, next: &S);
}

/// Logs every transition through `tracing`
///
/// One `debug` event per dispatch carrying the action's type tag, the action
/// and both states.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMiddleware;

impl<S, A> Middleware<S, A> for LoggingMiddleware
where
    S: Debug,
    A: Action + Debug,
{
    fn after_dispatch(&self, previous: &S, action: &A, next: &S) {
        tracing::debug!(
            action_type = action.action_type(),
            ?action,
            ?previous,
            ?next,
            "action dispatched"
        );
    }
}

/// Adapts a closure into [`Middleware`]
///
/// ```
/// use reflux_runtime::middleware::{FnMiddleware, Middleware};
///
/// let middleware = FnMiddleware::new(|previous: &u32, _action: &(), next: &u32| {
///     assert!(next >= previous);
/// });
/// middleware.after_dispatch(&1, &(), &2);
/// ```
pub struct FnMiddleware<F>(F);

impl<F> FnMiddleware<F> {
    /// Wrap a closure
    pub const fn new(f: F) -> Self {
        Self(f)
    }
}

impl<S, A, F> Middleware<S, A> for FnMiddleware<F>
where
    F: Fn(&S, &A, &S) + Send + Sync,
{
    fn after_dispatch(&self, previous: &S, action: &A, next: &S) {
        (self.0)(previous, action, next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct Ping;

    impl Action for Ping {
        fn action_type(&self) -> &'static str {
            "test/Ping"
        }
    }

    #[test]
    fn logging_middleware_accepts_any_debug_state() {
        let middleware = LoggingMiddleware;
        middleware.after_dispatch(&vec![1, 2], &Ping, &vec![1, 2, 3]);
    }

    #[test]
    fn fn_middleware_forwards_arguments() {
        let seen = AtomicU32::new(0);
        let middleware = FnMiddleware::new(|previous: &u32, _: &Ping, next: &u32| {
            seen.store(previous * 10 + next, Ordering::SeqCst);
        });

        middleware.after_dispatch(&4, &Ping, &5);

        assert_eq!(seen.load(Ordering::SeqCst), 45);
    }
}
