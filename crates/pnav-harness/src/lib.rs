#![forbid(unsafe_code)]

//! Resize-storm replay for priority+ navigation.
//!
//! - **Storm generation**: seeded, deterministic viewport-width sequences
//!   ([`resize_storm`]).
//! - **Replay**: drives a simulated page through a storm on a deterministic
//!   clock and checks every invariant after every decision pass
//!   ([`replay`]).
//!
//! # Quick Start
//!
//! ```
//! use pnav_harness::{PageSpec, ResizeStorm, StormConfig, StormPattern, replay};
//!
//! let storm = ResizeStorm::new(
//!     StormConfig::default()
//!         .with_seed(7)
//!         .with_pattern(StormPattern::Burst { count: 40 }),
//! );
//! let outcome = replay(&storm, &PageSpec::default()).unwrap();
//! outcome.assert_passed();
//! ```

pub mod replay;
pub mod resize_storm;

pub use replay::{PageSpec, ReplayError, ReplayOutcome, Violation, ViolationKind, replay};
pub use resize_storm::{ResizeEvent, ResizeStorm, StormConfig, StormPattern};
