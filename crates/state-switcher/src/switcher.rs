#![forbid(unsafe_code)]

//! Policy-gated history wrapper around an arbitrary reducer.
//!
//! [`StateSwitcher`] holds the policy table and hands out
//! [`SwitchingReducer`]s. A switching reducer is itself a [`Reducer`], over
//! [`HistoryWrapped<S>`] instead of `S`, so it slots in wherever the base
//! reducer was registered.
//!
//! # Dispatch
//!
//! ```text
//! state ──normalize──► UNDO? ──► history undo (base reducer not called)
//!                      REDO? ──► history redo (base reducer not called)
//!                      else  ──► base reducer ──► same Arc? ──► return state
//!                                                  │
//!                                          policy decision
//!                                   checkpoint ◄───┴───► merge
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use state_switcher::{Policy, Reducer, StateSwitcher, UNDO};
//!
//! fn counter(state: Option<&Arc<i64>>, action: &String) -> Arc<i64> {
//!     match (state, action.as_str()) {
//!         (Some(n), "INC") => Arc::new(**n + 1),
//!         (Some(n), _) => Arc::clone(n),
//!         (None, _) => Arc::new(0),
//!     }
//! }
//!
//! let mut reducer = StateSwitcher::default()
//!     .with_policy("TYPE", Policy::FirstOnly)
//!     .prevent_default_init()
//!     .wrap(counter);
//!
//! let state = reducer.reduce(None, &"INC".to_string());
//! let state = reducer.reduce(Some(&state), &"INC".to_string());
//! assert_eq!(**state.data(), 2);
//!
//! let state = reducer.reduce(Some(&state), &UNDO.to_string());
//! assert_eq!(**state.data(), 1);
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::action::{Action, REDO, STORE_INIT, UNDO};
use crate::history::HistoryWrapped;
use crate::policy::{Decision, Policy, PolicyEntry, PolicyTable, SeenActionTypes};
use crate::reducer::Reducer;

const HISTORY_TARGET: &str = "state_switcher.history";
const POLICY_TARGET: &str = "state_switcher.policy";

/// Builder for policy-gated history reducers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateSwitcher {
    policies: PolicyTable,
}

impl StateSwitcher {
    /// Create a switcher from an ordered list of rules.
    #[must_use]
    pub fn new<E: Into<PolicyEntry>>(entries: impl IntoIterator<Item = E>) -> Self {
        Self {
            policies: entries.into_iter().collect(),
        }
    }

    /// Create a switcher from an existing table.
    #[must_use]
    pub fn from_table(policies: PolicyTable) -> Self {
        Self { policies }
    }

    /// Append a rule.
    #[must_use]
    pub fn with_policy(mut self, action_name: impl Into<String>, policy: Policy) -> Self {
        self.policies.push(PolicyEntry::new(action_name, policy));
        self
    }

    /// Never let `action_name` open a checkpoint on its own.
    #[must_use]
    pub fn suppress_checkpoints(self, action_name: impl Into<String>) -> Self {
        self.with_policy(action_name, Policy::Always)
    }

    /// Keep the host store's startup action ([`STORE_INIT`]) from opening a
    /// checkpoint.
    #[must_use]
    pub fn prevent_default_init(self) -> Self {
        self.suppress_checkpoints(STORE_INIT)
    }

    /// The rules, in lookup order.
    #[must_use]
    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    /// Wrap `reducer` with history tracking.
    ///
    /// Every call returns an independent reducer with its own record of
    /// which action types have been seen.
    pub fn wrap<R>(&self, reducer: R) -> SwitchingReducer<R> {
        let shadowed = self.policies.shadowed_names();
        if !shadowed.is_empty() {
            debug!(
                target: POLICY_TARGET,
                shadowed = ?shadowed,
                "duplicate policy entries; only the first of each applies"
            );
        }
        debug!(
            target: POLICY_TARGET,
            entries = self.policies.len(),
            "history reducer created"
        );
        SwitchingReducer::new(reducer, self.policies.clone())
    }
}

/// A reducer over [`HistoryWrapped<S>`] that adds undo, redo and
/// policy-gated checkpoints to a base reducer over `S`.
///
/// Dispatch is `&mut self`: the seen-action record is mutated in place and
/// calls must be serialized by the host.
pub struct SwitchingReducer<R> {
    reducer: R,
    policies: PolicyTable,
    seen: SeenActionTypes,
}

impl<R> fmt::Debug for SwitchingReducer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwitchingReducer")
            .field("policies", &self.policies)
            .field("seen", &self.seen.len())
            .finish_non_exhaustive()
    }
}

impl<R> SwitchingReducer<R> {
    /// Wrap `reducer` with the given rules.
    #[must_use]
    pub fn new(reducer: R, policies: PolicyTable) -> Self {
        Self {
            reducer,
            policies,
            seen: SeenActionTypes::default(),
        }
    }

    /// The rules, in lookup order.
    #[must_use]
    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    /// The base reducer.
    #[must_use]
    pub fn inner(&self) -> &R {
        &self.reducer
    }

    /// Unwrap the base reducer.
    #[must_use]
    pub fn into_inner(self) -> R {
        self.reducer
    }

    /// What a state-changing `action_type` would do if dispatched now.
    #[must_use]
    pub fn decision(&self, action_type: &str) -> Decision {
        self.policies.decide(action_type, self.seen.contains(action_type))
    }

    /// Whether a state-changing `action_type` dispatched now would open a
    /// new checkpoint.
    #[must_use]
    pub fn should_checkpoint(&self, action_type: &str) -> bool {
        self.decision(action_type).is_checkpoint()
    }

    fn reduce_generic<S, A>(
        &mut self,
        state: Arc<HistoryWrapped<S>>,
        action: &A,
    ) -> Arc<HistoryWrapped<S>>
    where
        A: Action,
        R: Reducer<S, A>,
    {
        let action_type = action.action_type();
        let data = self.reducer.reduce(Some(state.data()), action);

        if Arc::ptr_eq(&data, state.data()) {
            trace!(
                target: HISTORY_TARGET,
                action_type,
                "state unchanged; history untouched"
            );
            return state;
        }

        let decision = self.decision(action_type);
        self.seen.record(action_type);

        let next = match decision {
            Decision::Checkpoint => state.checkpoint(data),
            Decision::Merge => state.merge(data),
        };
        debug!(
            target: HISTORY_TARGET,
            action_type,
            decision = decision.as_str(),
            undo_depth = next.history().undo_depth(),
            "state changed"
        );
        Arc::new(next)
    }
}

impl<S, A, R> Reducer<HistoryWrapped<S>, A> for SwitchingReducer<R>
where
    A: Action + From<&'static str>,
    R: Reducer<S, A>,
{
    fn reduce(
        &mut self,
        state: Option<&Arc<HistoryWrapped<S>>>,
        action: &A,
    ) -> Arc<HistoryWrapped<S>> {
        let action_type = action.action_type();
        let _span = tracing::debug_span!("state_switcher.dispatch", action_type).entered();

        let state = HistoryWrapped::normalize::<A, R>(state, &mut self.reducer);

        match action_type {
            UNDO => {
                let next = Arc::clone(&state).undo();
                log_navigation("undo", &state, &next);
                next
            }
            REDO => {
                let next = Arc::clone(&state).redo();
                log_navigation("redo", &state, &next);
                next
            }
            _ => self.reduce_generic(state, action),
        }
    }
}

fn log_navigation<S>(
    command: &'static str,
    before: &Arc<HistoryWrapped<S>>,
    after: &Arc<HistoryWrapped<S>>,
) {
    if Arc::ptr_eq(before, after) {
        trace!(target: HISTORY_TARGET, command, "nothing to {command}");
    } else {
        debug!(
            target: HISTORY_TARGET,
            command,
            undo_depth = after.history().undo_depth(),
            redo_depth = after.history().redo_depth(),
            "history navigated"
        );
    }
}
