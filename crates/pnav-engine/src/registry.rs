//! Independent navigation instances.
//!
//! Each instance owns everything a decision pass mutates: its break
//! history, its debounce gate, the label and markers it last pushed to the
//! host. Nothing is shared between instances, so a pass over one can never
//! read or clobber another's state.

use std::collections::BTreeMap;
use std::time::Duration;

use pnav_core::config::LabelVariant;
use pnav_core::{InstanceId, NavHost, NavMarkers, NavParts, NodeId, WidthSnapshot};

use crate::break_history::BreakHistory;
use crate::schedule_gate::ScheduleGate;

/// One managed navigation bar.
#[derive(Debug, Clone)]
pub struct Instance {
    id: InstanceId,
    parts: NavParts,
    pub(crate) history: BreakHistory,
    pub(crate) gate: ScheduleGate,
    pub(crate) label: Option<LabelVariant>,
    pub(crate) markers: NavMarkers,
    pub(crate) last_snapshot: Option<WidthSnapshot>,
    pub(crate) passes: u64,
}

impl Instance {
    /// Create an instance with an empty history.
    #[must_use]
    pub fn new(id: InstanceId, parts: NavParts, throttle_delay: Duration) -> Self {
        Self {
            id,
            parts,
            history: BreakHistory::new(),
            gate: ScheduleGate::new(throttle_delay),
            label: None,
            markers: NavMarkers::empty(),
            last_snapshot: None,
            passes: 0,
        }
    }

    /// Instance identifier.
    #[inline]
    #[must_use]
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Nodes making up this instance.
    #[inline]
    #[must_use]
    pub fn parts(&self) -> &NavParts {
        &self.parts
    }

    /// The wrapper element.
    #[inline]
    #[must_use]
    pub fn wrapper(&self) -> NodeId {
        self.parts.wrapper
    }

    /// Recorded break widths.
    #[must_use]
    pub fn history(&self) -> &BreakHistory {
        &self.history
    }

    /// The debounce gate.
    #[must_use]
    pub fn gate(&self) -> &ScheduleGate {
        &self.gate
    }

    /// Mutable access to the debounce gate.
    pub fn gate_mut(&mut self) -> &mut ScheduleGate {
        &mut self.gate
    }

    /// Label variant last pushed to the host, if any.
    #[must_use]
    pub fn label(&self) -> Option<LabelVariant> {
        self.label
    }

    /// Markers last pushed to the host.
    #[must_use]
    pub fn markers(&self) -> NavMarkers {
        self.markers
    }

    /// Snapshot taken at the end of the last pass.
    #[must_use]
    pub fn last_snapshot(&self) -> Option<WidthSnapshot> {
        self.last_snapshot
    }

    /// Number of decision passes run.
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Whether the break history holds exactly one width per hidden item.
    #[must_use]
    pub fn history_matches<H: NavHost + ?Sized>(&self, host: &H) -> bool {
        self.history.size() == host.dropdown_count(&self.parts)
    }
}

/// Mapping from [`InstanceId`] to [`Instance`].
///
/// Ids are handed out sequentially from zero, including to wrappers whose
/// setup later fails; such ids simply never get an instance.
#[derive(Debug, Clone, Default)]
pub struct InstanceRegistry {
    instances: BTreeMap<InstanceId, Instance>,
    next_id: u32,
}

impl InstanceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next sequential id.
    pub fn allocate_id(&mut self) -> InstanceId {
        let id = InstanceId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Allocate an id and register a new instance under it.
    pub fn register(&mut self, parts: NavParts, throttle_delay: Duration) -> InstanceId {
        let id = self.allocate_id();
        self.insert(Instance::new(id, parts, throttle_delay));
        id
    }

    /// Insert an instance built from a previously allocated id.
    pub fn insert(&mut self, instance: Instance) {
        self.instances.insert(instance.id(), instance);
    }

    /// Look up an instance.
    #[must_use]
    pub fn get(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(&id)
    }

    /// Look up an instance mutably.
    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut Instance> {
        self.instances.get_mut(&id)
    }

    /// Active instance ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<InstanceId> {
        self.instances.keys().copied().collect()
    }

    /// Iterate over active instances in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.instances.values()
    }

    /// Iterate mutably over active instances in id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Instance> {
        self.instances.values_mut()
    }

    /// Number of active instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether no instance is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// The id the next allocation will return.
    #[must_use]
    pub fn next_id(&self) -> InstanceId {
        InstanceId(self.next_id)
    }

    /// Remove every instance and restart ids at zero.
    ///
    /// Returns the removed instances so the caller can undo their markup.
    pub fn teardown_all(&mut self) -> Vec<Instance> {
        self.next_id = 0;
        std::mem::take(&mut self.instances).into_values().collect()
    }
}
