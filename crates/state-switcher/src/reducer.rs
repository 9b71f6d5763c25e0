#![forbid(unsafe_code)]

//! The reducer contract.
//!
//! A reducer maps `(state, action)` to the next state. States travel as
//! `Arc<S>` so that "nothing changed" is expressed by handing back the same
//! allocation, which callers detect with [`Arc::ptr_eq`]. A `None` state
//! means the reducer has never run; [`Reducer::initial`] is the named entry
//! point for that case.
//!
//! Any `FnMut(Option<&Arc<S>>, &A) -> Arc<S>` closure is a reducer:
//!
//! ```
//! use std::sync::Arc;
//! use state_switcher::{Action, Reducer};
//!
//! let mut counter = |state: Option<&Arc<i64>>, action: &&str| match (state, action.action_type()) {
//!     (Some(n), "INC") => Arc::new(**n + 1),
//!     (Some(n), _) => Arc::clone(n),
//!     (None, _) => Arc::new(0),
//! };
//!
//! let zero = counter.reduce(None, &"__INIT__");
//! let one = counter.reduce(Some(&zero), &"INC");
//! let same = counter.reduce(Some(&one), &"NOOP");
//! assert_eq!(*one, 1);
//! assert!(Arc::ptr_eq(&one, &same));
//! ```

use std::sync::Arc;

use crate::action::INIT;

/// A synchronous state transition function.
///
/// Implementations should be pure with respect to `state`, and must return
/// the identical `Arc` when they judge an action irrelevant.
pub trait Reducer<S, A: ?Sized> {
    /// Compute the next state.
    fn reduce(&mut self, state: Option<&Arc<S>>, action: &A) -> Arc<S>;

    /// Produce the initial state by reducing the unset state with [`INIT`].
    fn initial(&mut self) -> Arc<S>
    where
        A: From<&'static str>,
    {
        self.reduce(None, &A::from(INIT))
    }
}

impl<S, A: ?Sized, F> Reducer<S, A> for F
where
    F: FnMut(Option<&Arc<S>>, &A) -> Arc<S>,
{
    fn reduce(&mut self, state: Option<&Arc<S>>, action: &A) -> Arc<S> {
        self(state, action)
    }
}
