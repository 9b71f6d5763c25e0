#![forbid(unsafe_code)]

//! Property tests for history and policy invariants.
//!
//! Validates:
//! - `redo(undo(s)) == s` and `undo(redo(s)) == s` when not no-ops.
//! - Undo/redo no-ops return the identical `Arc`.
//! - Every checkpoint leaves the redo branch empty.
//! - Undoing every checkpoint returns to the initial present.
//! - Unchanged state never perturbs history, whatever the policy.
//! - FIRST_ONLY and EXCEPT_FIRST are exact complements.

use proptest::prelude::*;
use std::sync::Arc;

use state_switcher::{HistoryWrapped, NamedAction, Policy, REDO, Reducer, StateSwitcher, UNDO};

// ============================================================================
// Model
// ============================================================================

type State = Arc<HistoryWrapped<i64>>;

/// Adds the payload; a zero payload leaves the state untouched.
fn adder(state: Option<&Arc<i64>>, action: &NamedAction<i64>) -> Arc<i64> {
    let Some(state) = state else {
        return Arc::new(0);
    };
    match action.payload().copied() {
        Some(delta) if delta != 0 => Arc::new(**state + delta),
        _ => Arc::clone(state),
    }
}

// ============================================================================
// Strategy helpers
// ============================================================================

/// Operations dispatched through a switching reducer.
#[derive(Debug, Clone)]
enum Op {
    /// Dispatch action type `TYPE{n}` with the given delta.
    Act(u8, i64),
    Undo,
    Redo,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..3, -5i64..=5).prop_map(|(t, d)| Op::Act(t, d)),
        2 => Just(Op::Undo),
        2 => Just(Op::Redo),
    ]
}

fn ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), 1..=max_len)
}

fn policy_strategy() -> impl Strategy<Value = Option<Policy>> {
    prop_oneof![
        Just(None),
        Just(Some(Policy::Always)),
        Just(Some(Policy::FirstOnly)),
        Just(Some(Policy::ExceptFirst)),
    ]
}

fn action_for(op: &Op) -> NamedAction<i64> {
    match op {
        Op::Act(t, d) => NamedAction::new(format!("TYPE{t}")).with_payload(*d),
        Op::Undo => NamedAction::new(UNDO),
        Op::Redo => NamedAction::new(REDO),
    }
}

fn switcher_for(policies: &[Option<Policy>]) -> StateSwitcher {
    policies
        .iter()
        .enumerate()
        .fold(StateSwitcher::default(), |sw, (t, p)| match p {
            Some(p) => sw.with_policy(format!("TYPE{t}"), *p),
            None => sw,
        })
}

fn run(switcher: &StateSwitcher, ops: &[Op]) -> Vec<State> {
    let mut reducer = switcher.wrap(adder);
    let mut states: Vec<State> = Vec::with_capacity(ops.len());
    for op in ops {
        let next = reducer.reduce(states.last(), &action_for(op));
        states.push(next);
    }
    states
}

// ============================================================================
// Invariant 1: undo and redo are inverses
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn redo_after_undo_restores_state(
        policies in prop::collection::vec(policy_strategy(), 3),
        ops in ops_strategy(60)
    ) {
        let switcher = switcher_for(&policies);
        for state in run(&switcher, &ops) {
            if !state.history().can_undo() {
                continue;
            }
            let checkpointed = Arc::new(HistoryWrapped::new(
                Arc::clone(state.history().present()),
                state.history().clone(),
            ));
            let round_trip = Arc::clone(&checkpointed).undo().redo();
            prop_assert_eq!(&*round_trip, &*checkpointed);
        }
    }

    #[test]
    fn undo_after_redo_restores_state(
        policies in prop::collection::vec(policy_strategy(), 3),
        ops in ops_strategy(60)
    ) {
        let switcher = switcher_for(&policies);
        for state in run(&switcher, &ops) {
            if !state.history().can_redo() {
                continue;
            }
            // Merged edits are not part of any checkpoint; compare from the
            // checkpoint itself.
            let checkpointed = Arc::new(HistoryWrapped::new(
                Arc::clone(state.history().present()),
                state.history().clone(),
            ));
            let round_trip = Arc::clone(&checkpointed).redo().undo();
            prop_assert_eq!(&*round_trip, &*checkpointed);
        }
    }
}

// ============================================================================
// Invariant 2: no-op navigation is identity
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn noop_navigation_is_identity(ops in ops_strategy(60)) {
        for state in run(&StateSwitcher::default(), &ops) {
            if !state.history().can_undo() {
                prop_assert!(Arc::ptr_eq(&Arc::clone(&state).undo(), &state));
            }
            if !state.history().can_redo() {
                prop_assert!(Arc::ptr_eq(&Arc::clone(&state).redo(), &state));
            }
        }
    }
}

// ============================================================================
// Invariant 3: checkpoints clear the redo branch
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn checkpoint_always_clears_future(
        policies in prop::collection::vec(policy_strategy(), 3),
        ops in ops_strategy(80)
    ) {
        let switcher = switcher_for(&policies);
        let states = run(&switcher, &ops);
        let mut prev_depth = 0;
        for (op, state) in ops.iter().zip(&states) {
            if matches!(op, Op::Act(..)) && state.history().undo_depth() > prev_depth {
                prop_assert_eq!(state.history().redo_depth(), 0);
            }
            prev_depth = state.history().undo_depth();
        }
    }
}

// ============================================================================
// Invariant 4: undoing every checkpoint reaches the initial present
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn undo_all_reaches_initial_present(deltas in prop::collection::vec(1i64..100, 1..40)) {
        let mut reducer = StateSwitcher::default().wrap(adder);
        let mut state = reducer.reduce(None, &NamedAction::new("INIT_ONLY"));
        let initial = **state.data();

        for d in &deltas {
            state = reducer.reduce(Some(&state), &NamedAction::new("ADD").with_payload(*d));
        }
        prop_assert_eq!(state.history().undo_depth(), deltas.len());

        for _ in 0..deltas.len() {
            state = reducer.reduce(Some(&state), &NamedAction::new(UNDO));
        }
        prop_assert_eq!(**state.data(), initial);
        prop_assert!(!state.history().can_undo());
        prop_assert_eq!(state.history().redo_depth(), deltas.len());
    }
}

// ============================================================================
// Invariant 5: unchanged state never touches history
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn unchanged_state_is_identity(
        policies in prop::collection::vec(policy_strategy(), 3),
        ops in ops_strategy(40),
        noop_type in 0u8..3
    ) {
        let switcher = switcher_for(&policies);
        let mut reducer = switcher.wrap(adder);
        let mut state = reducer.reduce(None, &NamedAction::new("INIT_ONLY"));
        for op in &ops {
            state = reducer.reduce(Some(&state), &action_for(op));
        }

        let noop = NamedAction::new(format!("TYPE{noop_type}")).with_payload(0);
        let after = reducer.reduce(Some(&state), &noop);
        prop_assert!(Arc::ptr_eq(&after, &state));
    }
}

// ============================================================================
// Invariant 6: FIRST_ONLY and EXCEPT_FIRST are complements
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn first_only_and_except_first_are_complements(
        deltas in prop::collection::vec(1i64..10, 1..30)
    ) {
        let mut first_only = StateSwitcher::default()
            .with_policy("TYPE", Policy::FirstOnly)
            .wrap(adder);
        let mut except_first = StateSwitcher::default()
            .with_policy("TYPE", Policy::ExceptFirst)
            .wrap(adder);

        let mut a = first_only.reduce(None, &NamedAction::new("INIT_ONLY"));
        let mut b = except_first.reduce(None, &NamedAction::new("INIT_ONLY"));

        for d in &deltas {
            let action = NamedAction::new("TYPE").with_payload(*d);
            let grew_a = {
                let next = first_only.reduce(Some(&a), &action);
                let grew = next.history().undo_depth() > a.history().undo_depth();
                a = next;
                grew
            };
            let grew_b = {
                let next = except_first.reduce(Some(&b), &action);
                let grew = next.history().undo_depth() > b.history().undo_depth();
                b = next;
                grew
            };
            prop_assert_ne!(grew_a, grew_b);
            prop_assert_eq!(a.data(), b.data());
        }
    }

    #[test]
    fn always_never_grows_past(deltas in prop::collection::vec(1i64..10, 1..50)) {
        let mut reducer = StateSwitcher::default()
            .with_policy("TYPE", Policy::Always)
            .wrap(adder);
        let mut state = reducer.reduce(None, &NamedAction::new("INIT_ONLY"));
        for d in &deltas {
            state = reducer.reduce(Some(&state), &NamedAction::new("TYPE").with_payload(*d));
            prop_assert_eq!(state.history().undo_depth(), 0);
        }
        prop_assert_eq!(**state.data(), deltas.iter().sum::<i64>());
    }
}
