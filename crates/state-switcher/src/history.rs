#![forbid(unsafe_code)]

//! Persistent `{past, present, future}` history of state snapshots.
//!
//! [`History`] is the bookkeeping triple; [`HistoryWrapped`] pairs it with
//! the caller-visible state. Every operation is pure: it returns a new value
//! and leaves its input untouched. Snapshots are `Arc<S>` and the two stacks
//! are [`im::Vector`]s, so cloning a history shares structure instead of
//! copying every retained snapshot.
//!
//! # Architecture
//!
//! ```text
//! checkpoint(s3)
//! ┌──────────────────────────────────────────────┐
//! │ Past:     [Arc(s0), Arc(s1), Arc(s2)]        │
//! │ Present:  Arc(s3)                            │
//! │ Future:   []                                 │
//! └──────────────────────────────────────────────┘
//!
//! undo() x2
//! ┌──────────────────────────────────────────────┐
//! │ Past:     [Arc(s0)]                          │
//! │ Present:  Arc(s1)                            │
//! │ Future:   [Arc(s2), Arc(s3)]                 │
//! └──────────────────────────────────────────────┘
//!
//! checkpoint(s4), drops the redo branch
//! ┌──────────────────────────────────────────────┐
//! │ Past:     [Arc(s0), Arc(s1)]                 │
//! │ Present:  Arc(s4)                            │
//! │ Future:   []                                 │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. `present` always exists once a history has been initialized.
//! 2. `past` is ordered oldest first, `future` nearest-next first.
//! 3. `checkpoint` always leaves `future` empty.
//! 4. `undo` and `redo` are exact inverses whenever they are not no-ops.
//! 5. History size is unbounded; nothing is ever evicted.

use std::fmt;
use std::sync::Arc;

use im::Vector;

use crate::action::INIT;
use crate::reducer::Reducer;

/// The `{past, present, future}` checkpoint triple.
pub struct History<S> {
    past: Vector<Arc<S>>,
    present: Arc<S>,
    future: Vector<Arc<S>>,
}

impl<S> Clone for History<S> {
    fn clone(&self) -> Self {
        Self {
            past: self.past.clone(),
            present: Arc::clone(&self.present),
            future: self.future.clone(),
        }
    }
}

impl<S: PartialEq> PartialEq for History<S> {
    fn eq(&self, other: &Self) -> bool {
        self.present == other.present && self.past == other.past && self.future == other.future
    }
}

impl<S: Eq> Eq for History<S> {}

impl<S> fmt::Debug for History<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("undo_depth", &self.past.len())
            .field("redo_depth", &self.future.len())
            .finish()
    }
}

impl<S> History<S> {
    /// A history whose only checkpoint is `present`.
    #[must_use]
    pub fn new(present: Arc<S>) -> Self {
        Self {
            past: Vector::new(),
            present,
            future: Vector::new(),
        }
    }

    /// A fresh history seeded with the reducer's initial state.
    ///
    /// The reducer is called once with the unset state and [`INIT`].
    pub fn initialize<A, R>(reducer: &mut R) -> Self
    where
        A: From<&'static str>,
        R: Reducer<S, A> + ?Sized,
    {
        Self::new(reducer.reduce(None, &A::from(INIT)))
    }

    /// Build a history from explicit parts.
    #[must_use]
    pub fn from_parts(
        past: impl IntoIterator<Item = Arc<S>>,
        present: Arc<S>,
        future: impl IntoIterator<Item = Arc<S>>,
    ) -> Self {
        Self {
            past: past.into_iter().collect(),
            present,
            future: future.into_iter().collect(),
        }
    }

    // ====================================================================
    // Core Operations
    // ====================================================================

    /// Record `new_present` as a new checkpoint.
    ///
    /// The old present moves to the end of `past` and `future` is dropped.
    #[must_use]
    pub fn checkpoint(&self, new_present: Arc<S>) -> Self {
        let mut past = self.past.clone();
        past.push_back(Arc::clone(&self.present));
        Self {
            past,
            present: new_present,
            future: Vector::new(),
        }
    }

    /// Step back one checkpoint.
    ///
    /// Returns `None` when `past` is empty.
    #[must_use]
    pub fn undo(&self) -> Option<Self> {
        let mut past = self.past.clone();
        let previous = past.pop_back()?;
        let mut future = self.future.clone();
        future.push_front(Arc::clone(&self.present));
        Some(Self {
            past,
            present: previous,
            future,
        })
    }

    /// Step forward one checkpoint.
    ///
    /// Returns `None` when `future` is empty.
    #[must_use]
    pub fn redo(&self) -> Option<Self> {
        let mut future = self.future.clone();
        let next = future.pop_front()?;
        let mut past = self.past.clone();
        past.push_back(Arc::clone(&self.present));
        Some(Self {
            past,
            present: next,
            future,
        })
    }

    // ====================================================================
    // Query
    // ====================================================================

    /// Previous checkpoints, oldest first.
    pub fn past(&self) -> impl DoubleEndedIterator<Item = &Arc<S>> + ExactSizeIterator {
        self.past.iter()
    }

    /// The current checkpoint.
    #[must_use]
    pub fn present(&self) -> &Arc<S> {
        &self.present
    }

    /// Checkpoints available to redo, nearest first.
    pub fn future(&self) -> impl DoubleEndedIterator<Item = &Arc<S>> + ExactSizeIterator {
        self.future.iter()
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of checkpoints reachable by undo.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    /// Number of checkpoints reachable by redo.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    /// Total retained snapshots, present included.
    #[must_use]
    pub fn total_snapshots(&self) -> usize {
        self.past.len() + 1 + self.future.len()
    }
}

/// Caller state together with its history.
///
/// `data` is what the host sees. `history.present` is the snapshot taken at
/// the last checkpoint; the two differ after actions that merge into the
/// current checkpoint instead of opening a new one.
pub struct HistoryWrapped<S> {
    data: Arc<S>,
    history: History<S>,
}

impl<S> Clone for HistoryWrapped<S> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            history: self.history.clone(),
        }
    }
}

impl<S: PartialEq> PartialEq for HistoryWrapped<S> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data && self.history == other.history
    }
}

impl<S: Eq> Eq for HistoryWrapped<S> {}

impl<S: fmt::Debug> fmt::Debug for HistoryWrapped<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryWrapped")
            .field("data", &self.data)
            .field("history", &self.history)
            .finish()
    }
}

impl<S> HistoryWrapped<S> {
    /// Pair `data` with an explicit history.
    #[must_use]
    pub fn new(data: Arc<S>, history: History<S>) -> Self {
        Self { data, history }
    }

    /// A freshly initialized state: `data` is the reducer's initial state
    /// and the history holds it as the only checkpoint.
    pub fn initialize<A, R>(reducer: &mut R) -> Self
    where
        A: From<&'static str>,
        R: Reducer<S, A> + ?Sized,
    {
        let history = History::initialize(reducer);
        Self {
            data: Arc::clone(history.present()),
            history,
        }
    }

    /// Adopt a bare caller state that has never carried a history.
    ///
    /// `data` is kept as-is; the attached history is freshly initialized
    /// from the reducer, exactly as if the state had been unset.
    pub fn attach<A, R>(data: Arc<S>, reducer: &mut R) -> Self
    where
        A: From<&'static str>,
        R: Reducer<S, A> + ?Sized,
    {
        Self {
            data,
            history: History::initialize(reducer),
        }
    }

    /// Ensure a state carries a history.
    ///
    /// An existing state is returned untouched; an unset one is initialized.
    pub fn normalize<A, R>(state: Option<&Arc<Self>>, reducer: &mut R) -> Arc<Self>
    where
        A: From<&'static str>,
        R: Reducer<S, A> + ?Sized,
    {
        match state {
            Some(state) => Arc::clone(state),
            None => Arc::new(Self::initialize(reducer)),
        }
    }

    /// The caller-visible state.
    #[must_use]
    pub fn data(&self) -> &Arc<S> {
        &self.data
    }

    /// The attached history.
    #[must_use]
    pub fn history(&self) -> &History<S> {
        &self.history
    }

    /// Split into the caller-visible state and its history.
    #[must_use]
    pub fn into_parts(self) -> (Arc<S>, History<S>) {
        (self.data, self.history)
    }

    /// Replace the caller-visible state, keeping the current checkpoint.
    #[must_use]
    pub fn merge(&self, data: Arc<S>) -> Self {
        Self {
            data,
            history: self.history.clone(),
        }
    }

    /// Make `data` the new checkpoint.
    #[must_use]
    pub fn checkpoint(&self, data: Arc<S>) -> Self {
        Self {
            history: self.history.checkpoint(Arc::clone(&data)),
            data,
        }
    }

    /// Restore the previous checkpoint.
    ///
    /// Returns `self` unchanged (the same `Arc`) when there is nothing to
    /// undo.
    #[must_use]
    pub fn undo(self: Arc<Self>) -> Arc<Self> {
        match self.history.undo() {
            Some(history) => Arc::new(Self::restored(history)),
            None => self,
        }
    }

    /// Restore the next checkpoint.
    ///
    /// Returns `self` unchanged (the same `Arc`) when there is nothing to
    /// redo.
    #[must_use]
    pub fn redo(self: Arc<Self>) -> Arc<Self> {
        match self.history.redo() {
            Some(history) => Arc::new(Self::restored(history)),
            None => self,
        }
    }

    fn restored(history: History<S>) -> Self {
        Self {
            data: Arc::clone(history.present()),
            history,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
