#![forbid(unsafe_code)]

//! Priority+ overflow engine.
//!
//! Given a navigation bar whose items may not all fit, the engine moves
//! trailing items into a dropdown and brings them back, most recent first,
//! once there is room again. It only reads widths the host has already
//! laid out and moves existing elements between two existing containers.
//!
//! # Key Components
//!
//! - [`width_probe`] - reads a [`WidthSnapshot`](pnav_core::WidthSnapshot) from the host
//! - [`BreakHistory`] - per-instance stack of recorded break widths
//! - [`OverflowEngine`] - the collapse / restore decision loop
//! - [`ScheduleGate`] - trailing-edge debounce with an immediate first run
//! - [`InstanceRegistry`] - independent instances keyed by [`InstanceId`](pnav_core::InstanceId)
//! - [`PriorityNav`] - the controller hosts call: `initialize`, `recalculate`, `teardown`
//!
//! # How it fits together
//!
//! A trigger (resize, initial mount, manual call) reaches an instance's
//! [`ScheduleGate`]. When the gate fires, [`OverflowEngine::run`] takes a
//! fresh snapshot, consults the instance's [`BreakHistory`], moves items one
//! at a time (re-measuring after each move), and fires `moved` /
//! `moved_back` callbacks in move order.

pub mod break_history;
pub mod nav;
pub mod overflow;
pub mod registry;
pub mod schedule_gate;
pub mod width_probe;

pub use break_history::BreakHistory;
pub use nav::{InitReport, PriorityNav, Target};
pub use overflow::{MoveDirection, MoveEvent, OverflowEngine, PassReport};
pub use registry::{Instance, InstanceRegistry};
pub use schedule_gate::{GateAction, GateStats, ScheduleGate};
pub use width_probe::WidthProbe;
