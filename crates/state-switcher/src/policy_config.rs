#![forbid(unsafe_code)]

//! Policy-as-data configuration for history reducers.
//!
//! A [`SwitcherConfig`] describes a [`StateSwitcher`] and can be loaded from
//! TOML or JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # switcher.toml
//! prevent_default_init = true
//!
//! [[policies]]
//! action_name = "TYPE"
//! policy = "FIRST_ONLY"
//!
//! [[policies]]
//! action_name = "SCROLL"
//! policy = "ALWAYS"
//! ```
//!
//! ```rust,ignore
//! let switcher = SwitcherConfig::from_toml_file("switcher.toml")?.into_switcher()?;
//! let switcher = SwitcherConfig::from_json_str(json)?.into_switcher()?;
//! ```
//!
//! # Defaults
//!
//! Every field is optional. `SwitcherConfig::default()` describes a
//! switcher with no rules, so every state change opens a checkpoint.

#[cfg(feature = "policy-config")]
use std::path::Path;

#[cfg(feature = "policy-config")]
use serde::{Deserialize, Serialize};

use crate::action::{REDO, UNDO, is_command};
use crate::policy::{PolicyEntry, PolicyTable};
use crate::switcher::StateSwitcher;

// ---------------------------------------------------------------------------
// SwitcherConfig
// ---------------------------------------------------------------------------

/// Serializable description of a [`StateSwitcher`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct SwitcherConfig {
    /// Append a rule keeping the host's startup action from checkpointing.
    pub prevent_default_init: bool,

    /// Rules in lookup order. The first rule naming an action type wins.
    pub policies: Vec<PolicyEntry>,
}

impl SwitcherConfig {
    /// Load from a TOML string.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, PolicyConfigError> {
        toml::from_str(s).map_err(PolicyConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, PolicyConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PolicyConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "policy-config")]
    pub fn from_json_str(s: &str) -> Result<Self, PolicyConfigError> {
        serde_json::from_str(s).map_err(PolicyConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PolicyConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PolicyConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Serialize to a TOML string.
    #[cfg(feature = "policy-config")]
    pub fn to_toml_string(&self) -> Result<String, PolicyConfigError> {
        toml::to_string(self).map_err(PolicyConfigError::TomlSer)
    }

    /// Validate all rules.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (idx, entry) in self.policies.iter().enumerate() {
            if entry.action_name.trim().is_empty() {
                errors.push(format!("policies[{idx}].action_name must not be empty"));
            } else if is_command(&entry.action_name) {
                // Commands are intercepted before the policy lookup.
                errors.push(format!(
                    "policies[{idx}].action_name {:?} is reserved ({UNDO} and {REDO} never reach the policy table)",
                    entry.action_name
                ));
            }
        }

        errors
    }

    /// Validate and build the switcher.
    pub fn into_switcher(self) -> Result<StateSwitcher, PolicyConfigError> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(PolicyConfigError::Validation(errors));
        }

        let table: PolicyTable = self.policies.into_iter().collect();
        let switcher = StateSwitcher::from_table(table);
        tracing::debug!(
            target: "state_switcher.policy",
            entries = switcher.policies().len(),
            prevent_default_init = self.prevent_default_init,
            "switcher config loaded"
        );
        Ok(if self.prevent_default_init {
            switcher.prevent_default_init()
        } else {
            switcher
        })
    }
}

impl From<&StateSwitcher> for SwitcherConfig {
    fn from(switcher: &StateSwitcher) -> Self {
        Self {
            policies: switcher.policies().iter().cloned().collect(),
            prevent_default_init: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a switcher configuration.
#[derive(Debug)]
pub enum PolicyConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "policy-config")]
    Toml(toml::de::Error),
    /// TOML serialization error.
    #[cfg(feature = "policy-config")]
    TomlSer(toml::ser::Error),
    /// JSON parse error.
    #[cfg(feature = "policy-config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for PolicyConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "policy-config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "policy-config")]
            Self::TomlSer(e) => write!(f, "TOML serialization error: {e}"),
            #[cfg(feature = "policy-config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for PolicyConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "policy-config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "policy-config")]
            Self::TomlSer(e) => Some(e),
            #[cfg(feature = "policy-config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
