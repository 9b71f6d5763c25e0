#![forbid(unsafe_code)]

//! Actions and the reserved action types.
//!
//! A reducer only ever looks at an action through its type name. Anything
//! that can report one implements [`Action`]: plain strings work out of the
//! box, and [`NamedAction`] carries an optional payload for hosts that need
//! one.

use std::fmt;

/// Command action type that steps one checkpoint back.
pub const UNDO: &str = "UNDO";

/// Command action type that steps one checkpoint forward.
pub const REDO: &str = "REDO";

/// Synthetic action type used when asking a reducer for its initial state.
pub const INIT: &str = "__INIT__";

/// Action type a host store dispatches once when it starts up.
///
/// [`StateSwitcher::prevent_default_init`](crate::StateSwitcher::prevent_default_init)
/// registers it so startup never produces a checkpoint of its own.
pub const STORE_INIT: &str = "@store/init";

/// Anything that can be dispatched through a reducer.
pub trait Action {
    /// The type name used for command interception and policy lookup.
    fn action_type(&self) -> &str;
}

impl Action for str {
    fn action_type(&self) -> &str {
        self
    }
}

impl Action for String {
    fn action_type(&self) -> &str {
        self.as_str()
    }
}

impl<T: Action + ?Sized> Action for &T {
    fn action_type(&self) -> &str {
        (**self).action_type()
    }
}

/// An owned action with a type name and an optional payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedAction<P = ()> {
    action_type: String,
    payload: Option<P>,
}

impl<P> NamedAction<P> {
    /// Create an action without a payload.
    #[must_use]
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            payload: None,
        }
    }

    /// Attach a payload.
    #[must_use]
    pub fn with_payload(mut self, payload: P) -> Self {
        self.payload = Some(payload);
        self
    }

    /// The payload, if any.
    #[must_use]
    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    /// The undo command.
    #[must_use]
    pub fn undo() -> Self {
        Self::new(UNDO)
    }

    /// The redo command.
    #[must_use]
    pub fn redo() -> Self {
        Self::new(REDO)
    }

    /// Whether this is one of the two history commands.
    #[must_use]
    pub fn is_command(&self) -> bool {
        is_command(&self.action_type)
    }
}

impl<P> Action for NamedAction<P> {
    fn action_type(&self) -> &str {
        &self.action_type
    }
}

impl<P> From<&str> for NamedAction<P> {
    fn from(action_type: &str) -> Self {
        Self::new(action_type)
    }
}

impl<P> From<String> for NamedAction<P> {
    fn from(action_type: String) -> Self {
        Self::new(action_type)
    }
}

impl<P> fmt::Display for NamedAction<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.action_type)
    }
}

/// Whether `action_type` names [`UNDO`] or [`REDO`].
#[must_use]
pub fn is_command(action_type: &str) -> bool {
    action_type == UNDO || action_type == REDO
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_report_themselves() {
        assert_eq!("INC".action_type(), "INC");
        assert_eq!(String::from("DEC").action_type(), "DEC");
        let borrowed: &String = &String::from("SET");
        assert_eq!(borrowed.action_type(), "SET");
    }

    #[test]
    fn named_action_carries_payload() {
        let action = NamedAction::new("SET").with_payload(7_i64);
        assert_eq!(action.action_type(), "SET");
        assert_eq!(action.payload(), Some(&7));
        assert_eq!(action.to_string(), "SET");
    }

    #[test]
    fn named_action_without_payload() {
        let action: NamedAction = NamedAction::new("RESET");
        assert!(action.payload().is_none());
        assert!(!action.is_command());
    }

    #[test]
    fn command_constructors() {
        assert_eq!(NamedAction::<()>::undo().action_type(), UNDO);
        assert_eq!(NamedAction::<()>::redo().action_type(), REDO);
        assert!(NamedAction::<()>::undo().is_command());
    }

    #[test]
    fn command_detection() {
        assert!(is_command(UNDO));
        assert!(is_command(REDO));
        assert!(!is_command(INIT));
        assert!(!is_command(STORE_INIT));
        assert!(!is_command("undo"));
    }
}
