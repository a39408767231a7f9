#![forbid(unsafe_code)]

//! Storm replay against a simulated page.
//!
//! A [`PageSpec`] describes one page (item widths, horizontal margin, nav
//! options). [`replay`] mounts it in a [`SimDocument`], applies every
//! resize of a [`ResizeStorm`] on a [`DeterministicClock`], lets the
//! debounce gates fire as time passes, and checks every invariant after
//! every decision pass.
//!
//! # JSONL Schema
//!
//! ```json
//! {"event":"storm_start","case":"burst","seed":42,"pattern":"burst","event_count":50,"items":8,"checksum":"..."}
//! {"event":"storm_resize","idx":0,"viewport_width":812,"delay_ms":10}
//! {"event":"pass","elapsed_ms":60,"report":{...}}
//! {"event":"violation","elapsed_ms":60,"kind":"stack_size","detail":"..."}
//! {"event":"storm_complete","outcome":"pass","total_resizes":50,"passes":9,"moves":31}
//! ```

use std::fmt;
use std::time::Duration;

use pnav_core::{InstanceId, LabelVariant, NavConfig, NavHost, NodeId, Px};
use pnav_engine::{PassReport, PriorityNav, Target};
use pnav_web::{DeterministicClock, SimDocument};

use crate::resize_storm::ResizeStorm;

/// One simulated page.
#[derive(Debug, Clone)]
pub struct PageSpec {
    /// Widths of the nav items, in priority order.
    pub item_widths: Vec<f64>,
    /// Horizontal space the page takes from the viewport before the nav.
    pub margin: f64,
    /// Width of the dropdown toggle once shown.
    pub toggle_width: f64,
    /// Nav options.
    pub config: NavConfig,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            item_widths: vec![96.0, 120.0, 84.0, 140.0, 72.0, 110.0, 90.0, 128.0],
            margin: 48.0,
            toggle_width: 64.0,
            config: NavConfig::default(),
        }
    }
}

impl PageSpec {
    /// Nav wrapper width for a viewport width.
    #[must_use]
    pub fn wrapper_width(&self, viewport_width: u32) -> f64 {
        (f64::from(viewport_width) - self.margin).max(0.0)
    }
}

/// An invariant that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Visible and hidden items do not partition the original items.
    Partition,
    /// Visible followed by hidden is not the original order.
    Order,
    /// Break history size differs from the hidden item count.
    StackSize,
    /// Items remain visible below the break point.
    BreakPoint,
    /// Everything is hidden but the break-point label is not showing.
    Label,
    /// Toggle visibility disagrees with the hidden item count.
    Toggle,
    /// A phase hit its iteration bound.
    Capped,
    /// A forced pass right after settling changed the layout.
    Unsettled,
}

impl ViolationKind {
    /// Stable name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Partition => "partition",
            Self::Order => "order",
            Self::StackSize => "stack_size",
            Self::BreakPoint => "break_point",
            Self::Label => "label",
            Self::Toggle => "toggle",
            Self::Capped => "capped",
            Self::Unsettled => "unsettled",
        }
    }
}

/// One invariant failure, with where it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Which invariant.
    pub kind: ViolationKind,
    /// Simulated time of the check.
    pub elapsed_ms: u64,
    /// Human-readable detail.
    pub detail: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}ms] {}: {}",
            self.elapsed_ms,
            self.kind.as_str(),
            self.detail
        )
    }
}

/// Outcome of one replay.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    /// Whether every invariant held throughout.
    pub passed: bool,
    /// Resize events applied.
    pub total_resizes: usize,
    /// Decision passes run (initial pass included).
    pub passes: usize,
    /// Items moved in either direction.
    pub moves: usize,
    /// Every failed check.
    pub violations: Vec<Violation>,
    /// JSONL evidence, one line per entry.
    pub jsonl: Vec<String>,
}

impl ReplayOutcome {
    /// All log lines joined with newlines.
    pub fn to_jsonl(&self) -> String {
        self.jsonl.join("\n")
    }

    /// Panic with every violation if the replay failed.
    pub fn assert_passed(&self) {
        if !self.passed {
            let mut msg = String::from("\n=== Storm Replay Failed ===\n");
            for violation in &self.violations {
                msg.push_str(&format!("  {violation}\n"));
            }
            msg.push_str("\n=== JSONL ===\n");
            msg.push_str(&self.to_jsonl());
            panic!("{msg}");
        }
    }
}

/// Errors that stop a replay before it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// The page could not be initialized.
    Init(pnav_core::NavError),
    /// The page mounted no instance.
    NoInstance,
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(e) => write!(f, "page failed to initialize: {e}"),
            Self::NoInstance => write!(f, "page mounted no navigation instance"),
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Init(e) => Some(e),
            Self::NoInstance => None,
        }
    }
}

struct Session {
    nav: PriorityNav<SimDocument>,
    items: Vec<NodeId>,
    break_point: Px,
    clock: DeterministicClock,
    passes: usize,
    moves: usize,
    violations: Vec<Violation>,
    jsonl: Vec<String>,
}

/// Replay `storm` against the page described by `page`.
pub fn replay(storm: &ResizeStorm, page: &PageSpec) -> Result<ReplayOutcome, ReplayError> {
    let initial = storm.config().initial_width;
    let mut doc = SimDocument::new(f64::from(initial));
    doc.set_default_toggle_width(page.toggle_width);
    let wrapper = doc.add_nav(page.wrapper_width(initial), &page.item_widths);
    let items = doc.list_items(wrapper);

    let clock = DeterministicClock::new();
    let mut nav = PriorityNav::new(doc);
    let init = nav
        .initialize_at(page.config.clone(), clock.instant())
        .map_err(ReplayError::Init)?;
    if init.activated.is_empty() {
        return Err(ReplayError::NoInstance);
    }

    let mut session = Session {
        nav,
        items,
        break_point: page.config.break_point,
        clock,
        passes: 0,
        moves: 0,
        violations: Vec::new(),
        jsonl: Vec::new(),
    };
    let config = storm.config();
    session.jsonl.push(
        serde_json::json!({
            "event": "storm_start",
            "case": config.case_name,
            "seed": config.seed,
            "pattern": config.pattern.name(),
            "event_count": storm.events().len(),
            "items": page.item_widths.len(),
            "checksum": storm.sequence_checksum(),
        })
        .to_string(),
    );
    session.record(init.passes);

    for event in storm.events() {
        // Time passes first: gates whose quiet period ends before this
        // resize fire at their deadline.
        session.advance(Duration::from_millis(event.delay_ms));
        session.jsonl.push(event.to_jsonl());

        let doc = session.nav.host_mut();
        doc.set_viewport_width(f64::from(event.viewport_width));
        doc.set_client_width(wrapper, page.wrapper_width(event.viewport_width));
        let now = session.clock.instant();
        session.nav.handle_resize_at(now);
        let reports = session.nav.poll_at(now);
        session.record(reports);
    }

    // Let the last burst settle, then verify a forced pass changes nothing.
    session.advance(page.config.throttle_delay + Duration::from_millis(1));
    session.check_settled();

    let passed = session.violations.is_empty();
    session.jsonl.push(
        serde_json::json!({
            "event": "storm_complete",
            "outcome": if passed { "pass" } else { "fail" },
            "total_resizes": storm.events().len(),
            "passes": session.passes,
            "moves": session.moves,
        })
        .to_string(),
    );

    Ok(ReplayOutcome {
        passed,
        total_resizes: storm.events().len(),
        passes: session.passes,
        moves: session.moves,
        violations: session.violations,
        jsonl: session.jsonl,
    })
}

impl Session {
    fn elapsed_ms(&self) -> u64 {
        self.clock.elapsed().as_millis() as u64
    }

    /// Advance the clock by `dt`, firing any gate that comes due on the way.
    fn advance(&mut self, dt: Duration) {
        let target = self.clock.elapsed() + dt;
        loop {
            let now = self.clock.instant();
            match self.nav.time_until_next_pass(now) {
                Some(wait) if self.clock.elapsed() + wait <= target => {
                    self.clock.advance(wait);
                    let reports = self.nav.poll_at(self.clock.instant());
                    self.record(reports);
                }
                _ => break,
            }
        }
        self.clock.set(target);
    }

    fn record(&mut self, reports: Vec<PassReport>) {
        for report in reports {
            self.passes += 1;
            self.moves += report.moves.len();
            let line = serde_json::json!({
                "event": "pass",
                "elapsed_ms": self.elapsed_ms(),
                "report": report,
            });
            self.jsonl.push(line.to_string());
            if report.capped {
                self.violate(ViolationKind::Capped, format!("{report:?}"));
            }
            self.check();
        }
    }

    fn violate(&mut self, kind: ViolationKind, detail: String) {
        let violation = Violation {
            kind,
            elapsed_ms: self.elapsed_ms(),
            detail,
        };
        self.jsonl.push(
            serde_json::json!({
                "event": "violation",
                "elapsed_ms": violation.elapsed_ms,
                "kind": violation.kind.as_str(),
                "detail": violation.detail,
            })
            .to_string(),
        );
        self.violations.push(violation);
    }

    fn check(&mut self) {
        let mut found = Vec::new();
        {
            let Some(instance) = self.nav.instance(InstanceId(0)) else {
                return;
            };
            let doc = self.nav.host();
            let parts = instance.parts();
            let visible = doc.visible_items(parts);
            let hidden = doc.dropdown_items(parts);
            let combined: Vec<NodeId> = visible.iter().chain(&hidden).copied().collect();

            let mut sorted = combined.clone();
            sorted.sort();
            sorted.dedup();
            let mut expected = self.items.clone();
            expected.sort();
            if sorted != expected || combined.len() != self.items.len() {
                found.push((
                    ViolationKind::Partition,
                    format!("visible={visible:?} hidden={hidden:?}"),
                ));
            } else if combined != self.items {
                found.push((ViolationKind::Order, format!("combined={combined:?}")));
            }
            if instance.history().size() != hidden.len() {
                found.push((
                    ViolationKind::StackSize,
                    format!(
                        "history={:?} hidden={}",
                        instance.history().as_slice(),
                        hidden.len()
                    ),
                ));
            }
            let viewport = doc.viewport().effective().0;
            if viewport < self.break_point && !visible.is_empty() {
                found.push((
                    ViolationKind::BreakPoint,
                    format!("viewport={viewport} visible={}", visible.len()),
                ));
            }
            if visible.is_empty() && instance.label() != Some(LabelVariant::Breakpoint) {
                found.push((ViolationKind::Label, format!("label={:?}", instance.label())));
            }
            if doc.is_toggle_visible(parts) == hidden.is_empty() {
                found.push((
                    ViolationKind::Toggle,
                    format!(
                        "hidden={} toggle_visible={}",
                        hidden.len(),
                        doc.is_toggle_visible(parts)
                    ),
                ));
            }
        }
        for (kind, detail) in found {
            self.violate(kind, detail);
        }
    }

    fn check_settled(&mut self) {
        let visible_before = self.visible();
        let reports = self.nav.recalculate(Target::All).unwrap_or_default();
        let moved: usize = reports.iter().map(|r| r.moves.len()).sum();
        self.record(reports);
        let visible_after = self.visible();
        if moved > 0 || visible_before != visible_after {
            self.violate(
                ViolationKind::Unsettled,
                format!("moves={moved} before={visible_before:?} after={visible_after:?}"),
            );
        }
    }

    fn visible(&self) -> Vec<NodeId> {
        self.nav
            .instance(InstanceId(0))
            .map(|instance| self.nav.host().visible_items(instance.parts()))
            .unwrap_or_default()
    }
}
