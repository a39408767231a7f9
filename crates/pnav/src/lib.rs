#![forbid(unsafe_code)]

//! Priority+ navigation public facade.
//!
//! Re-exports the stable surface of the internal crates and offers a small
//! prelude. Hosts implement [`NavDocument`]; the `web` feature brings in
//! [`SimDocument`], a deterministic in-memory page.
//!
//! ```
//! use pnav::prelude::*;
//!
//! let mut doc = SimDocument::new(1024.0);
//! doc.add_nav(150.0, &[100.0, 100.0, 100.0]);
//!
//! let mut nav = PriorityNav::new(doc);
//! let report = nav.initialize(NavConfig::default().with_break_point(Px::from(0_u32)))?;
//! assert_eq!(report.activated.len(), 1);
//! # Ok::<(), pnav::Error>(())
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use pnav_core::{
    ConfigError, InstanceId, LabelVariant, MoveCallback, NavCallbacks, NavConfig, NavDocument,
    NavError, NavHost, NavLabels, NavMarkers, NavParts, NodeId, NodeKind, Px, SetupError,
    ViewportMetrics, WidthSnapshot,
};

// --- Engine re-exports -----------------------------------------------------

pub use pnav_engine::{
    BreakHistory, InitReport, Instance, InstanceRegistry, MoveDirection, MoveEvent,
    OverflowEngine, PassReport, PriorityNav, ScheduleGate, Target, WidthProbe,
};

// --- Web re-exports --------------------------------------------------------

#[cfg(feature = "web")]
pub use pnav_web::{DeterministicClock, ScaffoldFault, SimDocument};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for priority+ navigation.
#[derive(Debug)]
pub enum Error {
    /// The controller rejected an operation.
    Nav(NavError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nav(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Nav(err) => Some(err),
        }
    }
}

impl From<NavError> for Error {
    fn from(err: NavError) -> Self {
        Self::Nav(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Nav(NavError::Config(err))
    }
}

impl From<SetupError> for Error {
    fn from(err: SetupError) -> Self {
        Self::Nav(NavError::Setup(err))
    }
}

/// Standard result type for pnav APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Error, InstanceId, LabelVariant, NavCallbacks, NavConfig, NavDocument, NavHost,
        NavLabels, PassReport, PriorityNav, Px, Result, Target,
    };

    #[cfg(feature = "web")]
    pub use crate::SimDocument;

    pub use crate::{core, engine};
}

pub use pnav_core as core;
pub use pnav_engine as engine;
#[cfg(feature = "web")]
pub use pnav_web as web;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn config_error_converts_through_nav_error() {
        let err: Error = ConfigError::SelectorInClassName {
            option: "nav_dropdown_class_name",
            value: ".bad".into(),
        }
        .into();
        assert!(matches!(err, Error::Nav(NavError::Config(_))));
    }

    #[test]
    fn unknown_instance_displays_id() {
        let err = Error::from(NavError::UnknownInstance(InstanceId(3)));
        assert_eq!(err.to_string(), "unknown navigation instance 3");
    }
}
