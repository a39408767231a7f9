#![forbid(unsafe_code)]

//! `pnav-web` provides a host-driven document for priority+ navigation.
//!
//! Design goals:
//! - **Host-driven layout**: the embedder sets widths and viewport size
//!   explicitly; nothing is measured from text.
//! - **Deterministic time**: the host advances a monotonic clock explicitly.
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! [`SimDocument`] implements [`NavDocument`](pnav_core::NavDocument), so
//! the controller runs against it exactly as it would against a browser
//! binding. Tests, benches and the resize-storm harness all drive it.

pub mod document;
pub mod dom;

use core::time::Duration;

use web_time::Instant;

pub use document::{ScaffoldFault, SimDocument};
pub use dom::{Dom, Node, remove_all, remove_element};

/// Deterministic monotonic clock controlled by the host.
///
/// Readings are offsets from an origin captured at construction, so they
/// can be fed to the controller's `*_at` methods.
#[derive(Debug, Clone, Copy)]
pub struct DeterministicClock {
    origin: Instant,
    now: Duration,
}

impl Default for DeterministicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            now: Duration::ZERO,
        }
    }

    /// Set current monotonic time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    /// Time elapsed since the origin.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.now
    }

    /// Current time as an [`Instant`].
    #[must_use]
    pub fn instant(&self) -> Instant {
        self.origin + self.now
    }
}
