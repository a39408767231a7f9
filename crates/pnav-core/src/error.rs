#![forbid(unsafe_code)]

//! Instance identifiers and the error taxonomy.
//!
//! Only two things can go wrong, and neither is fatal to the page:
//!
//! | Error | Cause | Effect |
//! |-------|-------|--------|
//! | [`ConfigError`] | bad option | whole initialize call aborted |
//! | [`SetupError`] | required element missing | that instance never activated |
//!
//! Width math never fails; unreadable layout is treated as zero.

use std::fmt;

use crate::config::ConfigError;
use crate::host::NodeId;

/// Sequential, zero-based identifier of one navigation instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct InstanceId(pub u32);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A wrapper matched the selector but is missing a required part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupError {
    /// No element inside the wrapper matches the main nav selector.
    MissingMainNav {
        /// The wrapper that was searched.
        wrapper: NodeId,
    },
    /// The main nav exists but is nested deeper than a direct child.
    MainNavNotDirectChild {
        /// The wrapper that was searched.
        wrapper: NodeId,
        /// The nested main nav.
        main_nav: NodeId,
    },
    /// The dropdown could not be found after scaffolding.
    MissingDropdown {
        /// The wrapper that was searched.
        wrapper: NodeId,
    },
    /// The toggle could not be found after scaffolding.
    MissingToggle {
        /// The wrapper that was searched.
        wrapper: NodeId,
    },
}

impl SetupError {
    /// The wrapper this error refers to.
    #[must_use]
    pub const fn wrapper(&self) -> NodeId {
        match *self {
            Self::MissingMainNav { wrapper }
            | Self::MainNavNotDirectChild { wrapper, .. }
            | Self::MissingDropdown { wrapper }
            | Self::MissingToggle { wrapper } => wrapper,
        }
    }
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMainNav { wrapper } => {
                write!(f, "couldn't find the main nav element in wrapper {wrapper}")
            }
            Self::MainNavNotDirectChild { wrapper, main_nav } => write!(
                f,
                "main nav {main_nav} is not a direct child of wrapper {wrapper}"
            ),
            Self::MissingDropdown { wrapper } => {
                write!(f, "couldn't find the dropdown element in wrapper {wrapper}")
            }
            Self::MissingToggle { wrapper } => {
                write!(f, "couldn't find the dropdown toggle in wrapper {wrapper}")
            }
        }
    }
}

impl std::error::Error for SetupError {}

/// Errors surfaced by the navigation controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    /// Options were rejected; nothing was initialized.
    Config(ConfigError),
    /// One wrapper could not be activated.
    Setup(SetupError),
    /// No active instance has this id.
    UnknownInstance(InstanceId),
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
            Self::Setup(e) => write!(f, "setup failed: {e}"),
            Self::UnknownInstance(id) => write!(f, "unknown navigation instance {id}"),
        }
    }
}

impl std::error::Error for NavError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Setup(e) => Some(e),
            Self::UnknownInstance(_) => None,
        }
    }
}

impl From<ConfigError> for NavError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<SetupError> for NavError {
    fn from(e: SetupError) -> Self {
        Self::Setup(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn setup_error_reports_wrapper() {
        let err = SetupError::MainNavNotDirectChild {
            wrapper: NodeId(3),
            main_nav: NodeId(9),
        };
        assert_eq!(err.wrapper(), NodeId(3));
        assert_eq!(
            err.to_string(),
            "main nav #9 is not a direct child of wrapper #3"
        );
    }

    #[test]
    fn nav_error_chains_source() {
        let err = NavError::from(ConfigError::EmptySelector { option: "main_nav" });
        assert!(err.source().is_some());
        assert!(NavError::UnknownInstance(InstanceId(4)).source().is_none());
    }
}
