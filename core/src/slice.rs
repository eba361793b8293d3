//! Slice-based reducer generation
//!
//! A *slice* is a named partition of application state that owns its own
//! transition rules. Instead of writing an action enum, a reducer struct and
//! the `match` that ties them together by hand, a slice is declared once with
//! [`create_slice!`](crate::create_slice) as a list of case reducers:
//!
//! ```
//! use reflux_core::{create_slice, reducer::Reducer, slice::Slice};
//!
//! create_slice! {
//!     /// Running total
//!     pub slice TotalSlice {
//!         name: "total",
//!         state: u64,
//!         initial_state: 0,
//!         #[derive(Clone, Debug, PartialEq, Eq)]
//!         action: TotalAction,
//!         cases: {
//!             Add { amount: u64 } => |total| { *total += amount; },
//!             Reset {} => |total| { *total = 0; },
//!         }
//!     }
//! }
//!
//! let mut state = TotalSlice.initial_state();
//! let _ = TotalSlice.reduce(&mut state, TotalAction::Add { amount: 5 }, &());
//! assert_eq!(state, 5);
//! ```
//!
//! The generated action enum implements [`Action`](crate::action::Action)
//! with `"<name>/<Case>"` tags, and the generated reducer implements both
//! [`Reducer`] and [`Slice`].
//!
//! A slice may also react to actions owned by another slice through an
//! `extra_reducers` block; [`scope_extra_reducers`] mounts those reactions
//! into a parent reducer.

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::SmallVec;

/// A reducer generated for one named slice of state
pub trait Slice: Reducer<Environment = ()> {
    /// Slice name, used as the prefix of its action type tags
    const NAME: &'static str;

    /// State the slice starts from
    fn initial_state(&self) -> Self::State;
}

/// Reactions of a slice to actions it does not own
///
/// `A` is the foreign action type. Actions the slice does not care about must
/// leave state untouched.
pub trait ExtraReducers<A>: Slice {
    /// Apply a foreign action to this slice's state
    fn reduce_extra(&self, state: &mut Self::State, action: &A);
}

/// Generate an action enum and a [`Slice`] reducer from case reducers.
///
/// Each case becomes one variant of the action enum, carrying exactly the
/// listed fields. The case body receives the slice state under the name given
/// between the pipes, and the case's fields as local bindings. Case reducers
/// mutate state in place and produce no effects.
///
/// An optional `extra_reducers` block implements [`ExtraReducers`] for one
/// foreign action type.
///
/// # Example
///
/// ```
/// use reflux_core::{create_slice, slice::ExtraReducers};
///
/// create_slice! {
///     pub slice NamesSlice {
///         name: "names",
///         state: Vec<String>,
///         initial_state: Vec::new(),
///         #[derive(Clone, Debug)]
///         action: NamesAction,
///         cases: {
///             Add { name: String } => |names| { names.push(name); },
///         }
///     }
/// }
///
/// create_slice! {
///     pub slice AddsSlice {
///         name: "adds",
///         state: u32,
///         initial_state: 0,
///         #[derive(Clone, Debug)]
///         action: AddsAction,
///         cases: {},
///         extra_reducers: |adds, action: &NamesAction| {
///             match action {
///                 NamesAction::Add { .. } => *adds += 1,
///             }
///         }
///     }
/// }
///
/// let mut adds = 0;
/// AddsSlice.reduce_extra(&mut adds, &NamesAction::Add { name: "a".into() });
/// assert_eq!(adds, 1);
/// ```
#[macro_export]
macro_rules! create_slice {
    (
        $(#[$reducer_meta:meta])*
        $vis:vis slice $reducer:ident {
            name: $name:literal,
            state: $state:ty,
            initial_state: $initial:expr,
            $(#[$action_meta:meta])*
            action: $action:ident,
            cases: {
                $(
                    $(#[$case_meta:meta])*
                    $variant:ident { $( $field:ident : $field_ty:ty ),* $(,)? }
                        => |$case_state:ident| $case_body:block
                ),* $(,)?
            }
            $(,
            extra_reducers: |$extra_state:ident, $extra_action:ident : &$extra_ty:ty|
                $extra_body:block
            )?
            $(,)?
        }
    ) => {
        $(#[$action_meta])*
        $vis enum $action {
            $(
                $(#[$case_meta])*
                $variant { $( $field: $field_ty ),* },
            )*
        }

        impl $crate::action::Action for $action {
            fn action_type(&self) -> &'static str {
                match *self {
                    $( Self::$variant { .. } => concat!($name, "/", stringify!($variant)), )*
                }
            }
        }

        $(#[$reducer_meta])*
        #[derive(Clone, Copy, Debug, Default)]
        $vis struct $reducer;

        impl $crate::slice::Slice for $reducer {
            const NAME: &'static str = $name;

            fn initial_state(&self) -> $state {
                $initial
            }
        }

        impl $crate::reducer::Reducer for $reducer {
            type State = $state;
            type Action = $action;
            type Environment = ();

            #[allow(unused_variables, unreachable_code, clippy::unit_arg)]
            fn reduce(
                &self,
                state: &mut $state,
                action: $action,
                _env: &(),
            ) -> $crate::SmallVec<[$crate::effect::Effect<$action>; 4]> {
                match action {
                    $(
                        $action::$variant { $( $field ),* } => {
                            let $case_state = &mut *state;
                            $case_body
                        }
                    )*
                }
                $crate::SmallVec::new()
            }
        }

        $(
            impl $crate::slice::ExtraReducers<$extra_ty> for $reducer {
                #[allow(unused_variables)]
                fn reduce_extra(&self, $extra_state: &mut $state, $extra_action: &$extra_ty)
                    $extra_body
            }
        )?
    };
}

/// Mounts a slice's extra reducers into a parent reducer.
///
/// `extract` picks the foreign action out of the parent action type; parent
/// actions it rejects leave the slice state untouched. Extra reducers never
/// produce effects.
pub fn scope_extra_reducers<S, A, Ext, R>(
    slice: R,
    get_state: fn(&S) -> &R::State,
    set_state: fn(&mut S, R::State),
    extract: fn(&A) -> Option<&Ext>,
) -> ExtraReducersScope<S, A, Ext, R>
where
    R: ExtraReducers<Ext>,
    R::State: Clone,
{
    ExtraReducersScope {
        slice,
        get_state,
        set_state,
        extract,
    }
}

/// A slice's extra reducers scoped into a parent state and action type.
///
/// Created by [`scope_extra_reducers`].
pub struct ExtraReducersScope<S, A, Ext, R>
where
    R: ExtraReducers<Ext>,
{
    slice: R,
    get_state: fn(&S) -> &R::State,
    set_state: fn(&mut S, R::State),
    extract: fn(&A) -> Option<&Ext>,
}

impl<S, A, Ext, R> Reducer for ExtraReducersScope<S, A, Ext, R>
where
    R: ExtraReducers<Ext>,
    R::State: Clone,
{
    type State = S;
    type Action = A;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        if let Some(foreign) = (self.extract)(&action) {
            let mut sub_state = (self.get_state)(state).clone();
            self.slice.reduce_extra(&mut sub_state, foreign);
            (self.set_state)(state, sub_state);
        }
        SmallVec::new()
    }
}
