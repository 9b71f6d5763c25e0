#![forbid(unsafe_code)]

//! State Switcher
//!
//! Undo/redo history for pure reducers. Given any reducer
//! `(state, action) -> state`, a [`StateSwitcher`] produces a wrapped
//! reducer that also understands the [`UNDO`] and [`REDO`] commands and
//! decides, per action type, whether a state change opens a new history
//! checkpoint or folds into the current one.
//!
//! # Key Components
//!
//! - [`Reducer`] - The reducer contract (any matching closure qualifies)
//! - [`History`] - The `{past, present, future}` checkpoint triple
//! - [`HistoryWrapped`] - Caller state paired with its history
//! - [`PolicyTable`] - Ordered per-action-type checkpoint rules
//! - [`StateSwitcher`] - Builder that wraps a reducer
//! - [`SwitchingReducer`] - The wrapped reducer
//! - [`SwitcherConfig`] - Policy-as-data loading from TOML/JSON
//!
//! # How it fits in the system
//! The host owns dispatch. It registers the [`SwitchingReducer`] where it
//! would have registered the base reducer and threads the returned
//! [`HistoryWrapped`] state through every call. Nothing here knows the
//! shape of the host's state.

pub mod action;
pub mod history;
pub mod policy;
pub mod policy_config;
pub mod reducer;
pub mod switcher;

pub use action::{Action, INIT, NamedAction, REDO, STORE_INIT, UNDO};
pub use history::{History, HistoryWrapped};
pub use policy::{Decision, ParsePolicyError, Policy, PolicyEntry, PolicyTable};
pub use policy_config::{PolicyConfigError, SwitcherConfig};
pub use reducer::Reducer;
pub use switcher::{StateSwitcher, SwitchingReducer};
