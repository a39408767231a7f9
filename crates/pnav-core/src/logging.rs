#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! Only configuration validation logs from this crate; it goes through
//! `warn!`, which is `tracing::warn!` with the `tracing` feature
//! and nothing without it. Crates further up depend on `tracing` directly
//! and share the targets below.
//!
//! Event targets used across the workspace:
//!
//! | Target | Emitted by |
//! |--------|------------|
//! | [`TARGET_CONFIG`] | option validation |
//! | [`TARGET_SETUP`] | instance discovery and scaffolding |
//! | [`TARGET_ENGINE`] | collapse / restore decisions |
//! | [`TARGET_SCHEDULE`] | debounce gate activity |

/// Target for configuration validation events.
pub const TARGET_CONFIG: &str = "pnav.config";
/// Target for setup (wrapper discovery, scaffold creation) events.
pub const TARGET_SETUP: &str = "pnav.setup";
/// Target for overflow decisions.
pub const TARGET_ENGINE: &str = "pnav.engine";
/// Target for schedule gate activity.
pub const TARGET_SCHEDULE: &str = "pnav.schedule";

#[cfg(feature = "tracing")]
pub(crate) use tracing::warn;

/// Stand-in for `tracing::warn!` when the `tracing` feature is off. The
/// arguments are dropped unevaluated.
#[cfg(not(feature = "tracing"))]
macro_rules! warn {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use warn;

/// Install a JSON subscriber filtered by `RUST_LOG` (default `pnav=info`).
///
/// Returns `false` when a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_logging() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pnav=info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(false)
        .try_init()
        .is_ok()
}
