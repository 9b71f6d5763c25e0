#![forbid(unsafe_code)]

//! Per-action-type checkpoint policies.
//!
//! By default every state-changing action opens its own checkpoint. A
//! [`PolicyTable`] overrides that for named action types:
//!
//! | Policy        | First occurrence | Later occurrences |
//! |---------------|------------------|-------------------|
//! | (no entry)    | checkpoint       | checkpoint        |
//! | `Always`      | merge            | merge             |
//! | `ExceptFirst` | checkpoint       | merge             |
//! | `FirstOnly`   | merge            | checkpoint        |
//!
//! "Occurrence" is tracked per reducer instance. An
//! action type becomes seen after its first state-changing dispatch and
//! stays seen for the lifetime of that reducer.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "policy-config")]
use serde::{Deserialize, Serialize};

/// How an action type interacts with checkpoint creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Policy {
    /// Never opens a checkpoint; always merges into the current one.
    Always,
    /// The first occurrence merges; every later one opens a checkpoint.
    FirstOnly,
    /// The first occurrence opens a checkpoint; every later one merges.
    ExceptFirst,
}

impl Policy {
    /// All policies, in declaration order.
    pub const ALL: [Self; 3] = [Self::Always, Self::FirstOnly, Self::ExceptFirst];

    /// Canonical upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Always => "ALWAYS",
            Self::FirstOnly => "FIRST_ONLY",
            Self::ExceptFirst => "EXCEPT_FIRST",
        }
    }

    /// Decide what a state-changing action under this policy does, given
    /// whether its type has been seen before.
    #[must_use]
    pub const fn decide(self, seen: bool) -> Decision {
        match (self, seen) {
            (Self::Always, _) => Decision::Merge,
            (Self::ExceptFirst, false) | (Self::FirstOnly, true) => Decision::Checkpoint,
            (Self::ExceptFirst, true) | (Self::FirstOnly, false) => Decision::Merge,
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a [`Policy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePolicyError(String);

impl fmt::Display for ParsePolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown policy {:?} (expected ALWAYS, FIRST_ONLY or EXCEPT_FIRST)",
            self.0
        )
    }
}

impl std::error::Error for ParsePolicyError {}

impl FromStr for Policy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| ParsePolicyError(s.to_string()))
    }
}

/// Outcome of a policy lookup for a state-changing action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Push the current checkpoint onto the past and start a new one.
    Checkpoint,
    /// Fold the change into the current checkpoint.
    Merge,
}

impl Decision {
    /// Whether this decision opens a new checkpoint.
    #[must_use]
    pub const fn is_checkpoint(self) -> bool {
        matches!(self, Self::Checkpoint)
    }

    /// Label used in log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checkpoint => "checkpoint",
            Self::Merge => "merge",
        }
    }
}

/// A single `(action type, policy)` rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
pub struct PolicyEntry {
    /// Action type the rule applies to.
    pub action_name: String,
    /// Policy applied to that action type.
    pub policy: Policy,
}

impl PolicyEntry {
    /// Create a rule.
    #[must_use]
    pub fn new(action_name: impl Into<String>, policy: Policy) -> Self {
        Self {
            action_name: action_name.into(),
            policy,
        }
    }
}

impl<N: Into<String>> From<(N, Policy)> for PolicyEntry {
    fn from((action_name, policy): (N, Policy)) -> Self {
        Self::new(action_name, policy)
    }
}

/// Ordered, append-only list of policy rules.
///
/// Duplicate action names are allowed; the first matching entry governs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyTable {
    entries: Vec<PolicyEntry>,
}

impl PolicyTable {
    /// An empty table: every action opens a checkpoint.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule.
    pub fn push(&mut self, entry: impl Into<PolicyEntry>) {
        self.entries.push(entry.into());
    }

    /// The policy of the first rule naming `action_type`, if any.
    #[must_use]
    pub fn lookup(&self, action_type: &str) -> Option<Policy> {
        self.entries
            .iter()
            .find(|e| e.action_name == action_type)
            .map(|e| e.policy)
    }

    /// Decide for `action_type`, given whether it has been seen.
    #[must_use]
    pub fn decide(&self, action_type: &str, seen: bool) -> Decision {
        self.lookup(action_type)
            .map_or(Decision::Checkpoint, |policy| policy.decide(seen))
    }

    /// Rules in lookup order.
    pub fn iter(&self) -> std::slice::Iter<'_, PolicyEntry> {
        self.entries.iter()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Action names that appear more than once, in first-seen order.
    ///
    /// Only the first rule for each of these is ever consulted.
    #[must_use]
    pub fn shadowed_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut shadowed = Vec::new();
        for entry in &self.entries {
            let name = entry.action_name.as_str();
            if !seen.insert(name) && !shadowed.contains(&name) {
                shadowed.push(name);
            }
        }
        shadowed
    }
}

impl<E: Into<PolicyEntry>> FromIterator<E> for PolicyTable {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<E: Into<PolicyEntry>> Extend<E> for PolicyTable {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        self.entries.extend(iter.into_iter().map(Into::into));
    }
}

impl<'a> IntoIterator for &'a PolicyTable {
    type Item = &'a PolicyEntry;
    type IntoIter = std::slice::Iter<'a, PolicyEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Action types whose first occurrence has been consumed.
///
/// Owned by exactly one reducer; never shared.
#[derive(Debug, Clone, Default)]
pub(crate) struct SeenActionTypes {
    names: HashSet<String>,
}

impl SeenActionTypes {
    pub(crate) fn contains(&self, action_type: &str) -> bool {
        self.names.contains(action_type)
    }

    /// Mark `action_type` as seen. Returns `true` the first time.
    pub(crate) fn record(&mut self, action_type: &str) -> bool {
        if self.names.contains(action_type) {
            return false;
        }
        self.names.insert(action_type.to_string())
    }

    pub(crate) fn len(&self) -> usize {
        self.names.len()
    }
}
