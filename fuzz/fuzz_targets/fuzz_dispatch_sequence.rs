#![no_main]

use std::sync::Arc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use state_switcher::{NamedAction, Policy, REDO, Reducer, StateSwitcher, UNDO};

#[derive(Debug, Arbitrary)]
enum FuzzPolicy {
    Always,
    FirstOnly,
    ExceptFirst,
}

impl From<FuzzPolicy> for Policy {
    fn from(p: FuzzPolicy) -> Self {
        match p {
            FuzzPolicy::Always => Policy::Always,
            FuzzPolicy::FirstOnly => Policy::FirstOnly,
            FuzzPolicy::ExceptFirst => Policy::ExceptFirst,
        }
    }
}

#[derive(Debug, Arbitrary)]
enum Op {
    Act { kind: u8, delta: i8 },
    Undo,
    Redo,
}

#[derive(Debug, Arbitrary)]
struct Input {
    policies: Vec<(u8, FuzzPolicy)>,
    ops: Vec<Op>,
}

fn adder(state: Option<&Arc<i64>>, action: &NamedAction<i64>) -> Arc<i64> {
    let Some(state) = state else {
        return Arc::new(0);
    };
    match action.payload().copied() {
        Some(delta) if delta != 0 => Arc::new(**state + delta),
        _ => Arc::clone(state),
    }
}

fuzz_target!(|input: Input| {
    let switcher = input
        .policies
        .into_iter()
        .take(8)
        .fold(StateSwitcher::default(), |sw, (kind, policy)| {
            sw.with_policy(format!("T{}", kind % 4), policy.into())
        });
    let mut reducer = switcher.wrap(adder);
    let mut state = reducer.reduce(None, &NamedAction::new("INIT_ONLY"));

    for op in input.ops.into_iter().take(256) {
        let is_act = matches!(op, Op::Act { .. });
        let action = match op {
            Op::Act { kind, delta } => {
                NamedAction::new(format!("T{}", kind % 4)).with_payload(i64::from(delta))
            }
            Op::Undo => NamedAction::new(UNDO),
            Op::Redo => NamedAction::new(REDO),
        };
        let before = Arc::clone(&state);
        state = reducer.reduce(Some(&before), &action);

        let (b, a) = (before.history(), state.history());
        // Snapshot count only grows on checkpoints and is otherwise conserved.
        assert!(a.total_snapshots() >= b.total_snapshots() - b.redo_depth());
        if is_act && a.undo_depth() > b.undo_depth() {
            assert_eq!(a.redo_depth(), 0, "checkpoint kept redo branch");
            assert_eq!(a.undo_depth(), b.undo_depth() + 1);
        }
        if !is_act {
            assert_eq!(a.total_snapshots(), b.total_snapshots());
            if Arc::ptr_eq(&before, &state) {
                continue;
            }
            assert!(Arc::ptr_eq(state.data(), a.present()));
        }
    }
});
