#![forbid(unsafe_code)]

//! Core: pixel widths, viewport metrics, the document collaborator traits,
//! and configuration shared by every priority+ navigation crate.

pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod width;

pub use config::{ConfigError, LabelVariant, MoveCallback, NavCallbacks, NavConfig, NavLabels};
pub use error::{InstanceId, NavError, SetupError};
pub use host::{NavDocument, NavHost, NavMarkers, NavParts, NodeId, NodeKind};
pub use width::{Px, ViewportMetrics, WidthSnapshot};

