//! The collapse / restore decision loop.
//!
//! # Algorithm
//!
//! One pass over one instance:
//!
//! 1. **Collapse** while the instance has visible items and either the
//!    consumed width reached the available width (`total <= rest`) or the
//!    viewport is narrower than the break point. Each step moves the last
//!    visible item to the front of the dropdown, pushes the pre-move
//!    `rest` onto the break history, and re-measures.
//! 2. **Restore** while the history is non-empty, `total >= top` and the
//!    viewport is wider than the break point. Each step moves the front
//!    dropdown item to the end of the visible list, pops the history, and
//!    re-measures. If the returned item makes `total <= rest` true again it
//!    goes straight back to the dropdown without a callback, its break
//!    width is refreshed, and the phase ends.
//! 3. **Collapse again** if the host's widths moved under the restore phase
//!    and the trigger holds once more.
//! 4. **Reconcile** the presentation: panel closed when nothing is hidden,
//!    "full" state and the break-point label when nothing is visible, and
//!    the toggle shown iff something is hidden.
//!
//! A pass never ends in a state that meets the collapse trigger, so a
//! second pass with unchanged widths moves nothing.
//!
//! Exactly one item moves per step and every step re-measures, so
//! variable-width items are handled by width rather than by count.
//!
//! # Invariants
//!
//! - History size equals dropdown size after every step.
//! - Restores happen in exact reverse order of collapses.
//! - `moved` / `moved_back` fire once per item, in move order, before the
//!   pass returns.
//! - Each phase is bounded by the instance's item count; tripping that
//!   bound is reported as [`PassReport::capped`] and never happens with a
//!   well-behaved host.

use pnav_core::config::LabelVariant;
use pnav_core::logging::TARGET_ENGINE;
use pnav_core::{
    InstanceId, NavConfig, NavHost, NavMarkers, NavParts, NodeId, Px, WidthSnapshot,
};

use crate::registry::Instance;
use crate::width_probe::WidthProbe;

/// Which way an item moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MoveDirection {
    /// Visible list to dropdown.
    ToDropdown,
    /// Dropdown back to visible list.
    ToMenu,
}

impl MoveDirection {
    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToDropdown => "to_dropdown",
            Self::ToMenu => "to_menu",
        }
    }
}

/// One item move, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MoveEvent {
    /// Direction of the move.
    pub direction: MoveDirection,
    /// The item that moved.
    pub item: NodeId,
    /// Break width pushed (collapse) or popped (restore).
    pub break_width: Px,
    /// Hidden item count after the move.
    pub hidden: usize,
    /// Widths measured right after the move.
    pub snapshot: WidthSnapshot,
}

/// Outcome of one decision pass.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PassReport {
    /// The instance the pass ran on.
    pub instance: InstanceId,
    /// Moves in the order they happened.
    pub moves: Vec<MoveEvent>,
    /// Widths at the end of the pass.
    pub snapshot: WidthSnapshot,
    /// Visible items at the end of the pass.
    pub visible: usize,
    /// Hidden items at the end of the pass.
    pub hidden: usize,
    /// Label variant showing at the end of the pass.
    pub label: LabelVariant,
    /// Whether a phase hit its iteration bound.
    pub capped: bool,
}

impl PassReport {
    /// Items moved into the dropdown.
    #[must_use]
    pub fn moved_count(&self) -> usize {
        self.count(MoveDirection::ToDropdown)
    }

    /// Items moved back inline.
    #[must_use]
    pub fn moved_back_count(&self) -> usize {
        self.count(MoveDirection::ToMenu)
    }

    /// The pass changed nothing.
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.moves.is_empty()
    }

    fn count(&self, direction: MoveDirection) -> usize {
        self.moves
            .iter()
            .filter(|m| m.direction == direction)
            .count()
    }
}

/// Running state of one pass.
struct Pass {
    bound: usize,
    capped: bool,
    moves: Vec<MoveEvent>,
    snapshot: WidthSnapshot,
}

/// Runs decision passes against a host using one configuration.
#[derive(Debug, Clone, Copy)]
pub struct OverflowEngine<'a> {
    config: &'a NavConfig,
    probe: WidthProbe,
}

impl<'a> OverflowEngine<'a> {
    /// Create an engine for `config`.
    #[must_use]
    pub fn new(config: &'a NavConfig) -> Self {
        Self {
            config,
            probe: WidthProbe::new(config.offset_pixels),
        }
    }

    /// Run one full pass over `instance`.
    pub fn run<H: NavHost + ?Sized>(&self, instance: &mut Instance, host: &mut H) -> PassReport {
        let parts = *instance.parts();
        let id = instance.id();
        instance.passes += 1;

        let mut pass = Pass {
            bound: host.visible_count(&parts) + host.dropdown_count(&parts) + 1,
            capped: false,
            moves: Vec::new(),
            snapshot: self.probe.measure(host, &parts),
        };

        self.collapse(instance, host, &parts, &mut pass);
        self.restore(instance, host, &parts, &mut pass);
        // Only a host whose widths shift under us gets here with work left.
        if self.wants_collapse(host, &parts, &pass.snapshot) {
            self.collapse(instance, host, &parts, &mut pass);
        }

        // Reconcile.
        let hidden = host.dropdown_count(&parts);
        let visible = host.visible_count(&parts);
        if hidden == 0 {
            host.set_dropdown_open(&parts, false);
            instance.markers.remove(NavMarkers::OPEN);
            self.set_label(instance, host, &parts, LabelVariant::Normal);
        }
        let full = visible == 0;
        if full {
            self.set_label(instance, host, &parts, LabelVariant::Breakpoint);
        }
        host.set_wrapper_full_state(&parts, full);
        instance.markers.set(NavMarkers::FULL, full);
        self.sync_toggle(instance, host, &parts);

        if instance.history.size() != hidden {
            tracing::warn!(
                target: TARGET_ENGINE,
                instance = %id,
                history = instance.history.size(),
                hidden,
                "break history out of step with dropdown"
            );
        }

        instance.last_snapshot = Some(pass.snapshot);
        PassReport {
            instance: id,
            moves: pass.moves,
            snapshot: pass.snapshot,
            visible,
            hidden,
            label: instance.label.unwrap_or_default(),
            capped: pass.capped,
        }
    }

    fn wants_collapse<H: NavHost + ?Sized>(
        &self,
        host: &H,
        parts: &NavParts,
        snapshot: &WidthSnapshot,
    ) -> bool {
        host.visible_count(parts) > 0
            && (snapshot.overflows() || snapshot.below_break_point(self.config.break_point))
    }

    /// Hide trailing items until the collapse trigger no longer holds.
    fn collapse<H: NavHost + ?Sized>(
        &self,
        instance: &mut Instance,
        host: &mut H,
        parts: &NavParts,
        pass: &mut Pass,
    ) {
        let id = instance.id();
        let mut steps = 0usize;
        while self.wants_collapse(host, parts, &pass.snapshot) {
            if steps == pass.bound {
                pass.capped = true;
                tracing::warn!(target: TARGET_ENGINE, instance = %id, bound = pass.bound, "collapse phase hit its bound");
                break;
            }
            steps += 1;

            let Some(item) = host.move_last_visible_to_dropdown_front(parts) else {
                break;
            };
            let break_width = pass.snapshot.rest_width;
            instance.history.push(break_width);
            self.sync_toggle(instance, host, parts);
            pass.snapshot = self.probe.measure(host, parts);

            if pass.snapshot.below_break_point(self.config.break_point) {
                self.set_label(instance, host, parts, LabelVariant::Breakpoint);
            } else if instance.history.size() == 1 {
                self.set_label(instance, host, parts, LabelVariant::Normal);
            }
            self.config.callbacks.fire_moved();
            if self.config.count_enabled {
                host.set_hidden_count(parts, instance.history.size());
            }

            let event = MoveEvent {
                direction: MoveDirection::ToDropdown,
                item,
                break_width,
                hidden: instance.history.size(),
                snapshot: pass.snapshot,
            };
            trace_move(id, &event);
            pass.moves.push(event);
        }
    }

    /// Bring hidden items back while their break width is reached.
    ///
    /// A returning item that would trip the collapse trigger straight
    /// away is put back in front of the dropdown with no callback and no
    /// [`MoveEvent`]; its break width is replaced by the width it was just
    /// measured at. A tie therefore settles on the collapsed side.
    fn restore<H: NavHost + ?Sized>(
        &self,
        instance: &mut Instance,
        host: &mut H,
        parts: &NavParts,
        pass: &mut Pass,
    ) {
        let id = instance.id();
        let break_point = self.config.break_point;
        let mut steps = 0usize;
        loop {
            let Some(top) = instance.history.peek_top() else {
                break;
            };
            if pass.snapshot.total_width < top || !pass.snapshot.above_break_point(break_point) {
                break;
            }
            if steps == pass.bound {
                pass.capped = true;
                tracing::warn!(target: TARGET_ENGINE, instance = %id, bound = pass.bound, "restore phase hit its bound");
                break;
            }
            steps += 1;

            let Some(item) = host.move_dropdown_front_to_visible_end(parts) else {
                tracing::warn!(
                    target: TARGET_ENGINE,
                    instance = %id,
                    history = instance.history.size(),
                    "dropdown empty while breaks remain; dropping stale breaks"
                );
                instance.history.clear();
                break;
            };
            let break_width = instance.history.pop().unwrap_or(top);
            self.sync_toggle(instance, host, parts);
            let trial = self.probe.measure(host, parts);

            if trial.overflows() {
                if host.move_last_visible_to_dropdown_front(parts).is_some() {
                    instance.history.push(trial.rest_width);
                    self.sync_toggle(instance, host, parts);
                }
                pass.snapshot = self.probe.measure(host, parts);
                tracing::debug!(
                    target: TARGET_ENGINE,
                    instance = %id,
                    item = item.0,
                    stale_break = break_width.get(),
                    break_width = trial.rest_width.get(),
                    total_width = trial.total_width.get(),
                    "restore withheld"
                );
                break;
            }
            pass.snapshot = trial;

            self.set_label(instance, host, parts, LabelVariant::Normal);
            self.config.callbacks.fire_moved_back();
            if self.config.count_enabled {
                host.set_hidden_count(parts, instance.history.size());
            }

            let event = MoveEvent {
                direction: MoveDirection::ToMenu,
                item,
                break_width,
                hidden: instance.history.size(),
                snapshot: pass.snapshot,
            };
            trace_move(id, &event);
            pass.moves.push(event);
        }
    }

    /// Show the toggle iff the dropdown holds anything.
    fn sync_toggle<H: NavHost + ?Sized>(&self, instance: &mut Instance, host: &mut H, parts: &NavParts) {
        let visible = host.dropdown_count(parts) > 0;
        host.set_toggle_visibility(parts, visible);
        instance.markers.set(NavMarkers::TOGGLE_VISIBLE, visible);
    }

    fn set_label<H: NavHost + ?Sized>(
        &self,
        instance: &mut Instance,
        host: &mut H,
        parts: &NavParts,
        variant: LabelVariant,
    ) {
        if instance.label == Some(variant) {
            return;
        }
        let (label, icon) = self.config.labels.get(variant);
        host.set_toggle_label(parts, label, icon);
        instance.label = Some(variant);
    }
}

fn trace_move(id: InstanceId, event: &MoveEvent) {
    tracing::debug!(
        target: TARGET_ENGINE,
        instance = %id,
        direction = event.direction.as_str(),
        item = event.item.0,
        break_width = event.break_width.get(),
        rest_width = event.snapshot.rest_width.get(),
        total_width = event.snapshot.total_width.get(),
        viewport_width = event.snapshot.viewport_width.get(),
        hidden = event.hidden,
        "item moved"
    );
}
