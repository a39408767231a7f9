//! Trailing-edge debounce for decision passes.
//!
//! A burst of triggers (a window being dragged wider fires dozens of
//! resize events) collapses into one decision pass once the burst has been
//! quiet for `delay`. The very first trigger of a gate runs with zero
//! delay so a freshly mounted navigation settles before first paint.
//!
//! # Usage
//!
//! ```
//! use pnav_engine::schedule_gate::{GateAction, ScheduleGate};
//! use std::time::Duration;
//! use web_time::Instant;
//!
//! let mut gate = ScheduleGate::new(Duration::from_millis(50));
//! let t0 = Instant::now();
//!
//! // First trigger: due immediately.
//! gate.trigger_at(t0);
//! assert!(matches!(gate.poll_at(t0), GateAction::Run { .. }));
//!
//! // Later triggers wait out the quiet period, each one resetting it.
//! gate.trigger_at(t0);
//! gate.trigger_at(t0 + Duration::from_millis(30));
//! assert_eq!(gate.poll_at(t0 + Duration::from_millis(60)), GateAction::Idle);
//! assert!(matches!(
//!     gate.poll_at(t0 + Duration::from_millis(80)),
//!     GateAction::Run { coalesced: 2, .. }
//! ));
//! ```
//!
//! # Invariants
//!
//! - **At most one pending run**: a new trigger replaces the pending
//!   deadline, it never queues a second run.
//! - **Superseded runs never happen**: a replaced or cancelled deadline has
//!   no effect.
//! - **Deterministic**: identical `(trigger, poll)` timelines produce
//!   identical actions; all methods have `*_at(now)` variants for tests.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | `delay = 0` | every trigger is due immediately |
//! | `now` earlier than the trigger time | treated as zero elapsed |
//! | poll with nothing pending | [`GateAction::Idle`] |

use std::time::Duration;

use pnav_core::logging::TARGET_SCHEDULE;
use web_time::Instant;

#[inline]
fn duration_since_or_zero(now: Instant, earlier: Instant) -> Duration {
    now.checked_duration_since(earlier)
        .unwrap_or(Duration::ZERO)
}

/// What the caller should do after talking to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    /// Nothing to do.
    Idle,
    /// A run is pending; poll again at `deadline`.
    Scheduled {
        /// When the pending run becomes due.
        deadline: Instant,
    },
    /// Run the decision pass now.
    Run {
        /// Number of triggers folded into this run.
        coalesced: u32,
        /// Time from the first trigger of the burst to this run.
        waited: Duration,
    },
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateStats {
    /// Triggers received.
    pub triggers: u64,
    /// Runs released.
    pub runs: u64,
    /// Pending deadlines replaced by a later trigger.
    pub superseded: u64,
    /// Pending runs discarded by [`ScheduleGate::cancel_pending`].
    pub cancelled: u64,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    deadline: Instant,
    first_trigger: Instant,
    coalesced: u32,
}

/// Per-instance debounce state holding at most one pending run.
#[derive(Debug, Clone)]
pub struct ScheduleGate {
    delay: Duration,
    pending: Option<Pending>,
    primed: bool,
    stats: GateStats,
}

impl ScheduleGate {
    /// Create a gate with the given quiet period.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            primed: false,
            stats: GateStats::default(),
        }
    }

    /// The configured quiet period.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether the first run has already happened.
    ///
    /// Until it has, triggers are due immediately.
    #[must_use]
    pub fn is_primed(&self) -> bool {
        self.primed
    }

    /// Trigger a run.
    pub fn trigger(&mut self) -> GateAction {
        self.trigger_at(Instant::now())
    }

    /// Trigger a run at a specific time (for testing).
    ///
    /// Resets any pending deadline to `now + delay` (or `now` before the
    /// first run).
    pub fn trigger_at(&mut self, now: Instant) -> GateAction {
        self.stats.triggers += 1;
        let wait = if self.primed { self.delay } else { Duration::ZERO };
        let deadline = now + wait;

        let pending = match self.pending.take() {
            Some(prev) => {
                self.stats.superseded += 1;
                Pending {
                    deadline,
                    first_trigger: prev.first_trigger,
                    coalesced: prev.coalesced.saturating_add(1),
                }
            }
            None => Pending {
                deadline,
                first_trigger: now,
                coalesced: 1,
            },
        };
        self.pending = Some(pending);

        tracing::trace!(
            target: TARGET_SCHEDULE,
            coalesced = pending.coalesced,
            wait_ms = wait.as_millis() as u64,
            "trigger"
        );
        GateAction::Scheduled { deadline }
    }

    /// Release the pending run if it is due.
    pub fn poll(&mut self) -> GateAction {
        self.poll_at(Instant::now())
    }

    /// Release the pending run if it is due at `now` (for testing).
    pub fn poll_at(&mut self, now: Instant) -> GateAction {
        let Some(pending) = self.pending else {
            return GateAction::Idle;
        };
        if now < pending.deadline {
            return GateAction::Idle;
        }

        self.pending = None;
        self.primed = true;
        self.stats.runs += 1;
        GateAction::Run {
            coalesced: pending.coalesced,
            waited: duration_since_or_zero(now, pending.first_trigger),
        }
    }

    /// Discard the pending run, if any. Returns whether one was pending.
    pub fn cancel_pending(&mut self) -> bool {
        let had = self.pending.take().is_some();
        if had {
            self.stats.cancelled += 1;
        }
        had
    }

    /// Mark a run that happened outside the gate (a forced recalculation).
    ///
    /// Any pending run is superseded by it and discarded.
    pub fn record_external_run(&mut self) {
        self.cancel_pending();
        self.primed = true;
    }

    /// Whether a run is pending.
    #[inline]
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the pending run.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }

    /// Time until the pending run is due (`Some(ZERO)` if overdue).
    #[must_use]
    pub fn time_until_run(&self, now: Instant) -> Option<Duration> {
        self.pending
            .map(|p| p.deadline.checked_duration_since(now).unwrap_or(Duration::ZERO))
    }

    /// Diagnostic counters.
    #[must_use]
    pub fn stats(&self) -> GateStats {
        self.stats
    }
}
