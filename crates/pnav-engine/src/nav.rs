//! The controller hosts talk to.
//!
//! [`PriorityNav`] owns the document host, the configuration and the
//! instance registry. Hosts forward three kinds of input to it:
//!
//! - **lifecycle**: [`initialize`](PriorityNav::initialize) and
//!   [`teardown`](PriorityNav::teardown),
//! - **layout changes**: [`handle_resize`](PriorityNav::handle_resize)
//!   followed by [`poll`](PriorityNav::poll) once
//!   [`time_until_next_pass`](PriorityNav::time_until_next_pass) elapses,
//!   or a forced [`recalculate`](PriorityNav::recalculate),
//! - **interaction**: toggle clicks, clicks elsewhere, and Escape.
//!
//! Every `*_at` method takes the current time explicitly so tests and
//! replays stay deterministic.
//!
//! # Failure Modes
//!
//! | Failure | Effect |
//! |---------|--------|
//! | Bad class-name option | `initialize` returns [`NavError::Config`]; document untouched |
//! | Wrapper missing a part | that wrapper is listed in [`InitReport::skipped`], others proceed |
//! | Unknown instance id | [`NavError::UnknownInstance`] |

use std::time::Duration;

use web_time::Instant;

use pnav_core::logging::{TARGET_SCHEDULE, TARGET_SETUP};
use pnav_core::{
    InstanceId, NavConfig, NavDocument, NavError, NavMarkers, NavParts, NodeId, SetupError,
};

use crate::overflow::{OverflowEngine, PassReport};
use crate::registry::{Instance, InstanceRegistry};
use crate::schedule_gate::GateAction;

/// Which instances an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Every active instance.
    All,
    /// One instance.
    Instance(InstanceId),
}

impl From<InstanceId> for Target {
    fn from(id: InstanceId) -> Self {
        Self::Instance(id)
    }
}

/// What [`PriorityNav::initialize`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitReport {
    /// Instances that were activated, in document order.
    pub activated: Vec<InstanceId>,
    /// Wrappers that matched but could not be activated.
    pub skipped: Vec<(InstanceId, SetupError)>,
    /// The immediate first pass of every activated instance.
    pub passes: Vec<PassReport>,
}

/// Priority+ navigation controller over a document host.
#[derive(Debug)]
pub struct PriorityNav<H: NavDocument> {
    host: H,
    config: NavConfig,
    registry: InstanceRegistry,
    initialized: bool,
}

impl<H: NavDocument> PriorityNav<H> {
    /// Wrap a document host. Nothing is touched until
    /// [`initialize`](Self::initialize).
    pub fn new(host: H) -> Self {
        Self {
            host,
            config: NavConfig::default(),
            registry: InstanceRegistry::new(),
            initialized: false,
        }
    }

    /// Set up every wrapper matching `config.main_nav_wrapper` and run
    /// each one's first pass immediately.
    pub fn initialize(&mut self, config: NavConfig) -> Result<InitReport, NavError> {
        self.initialize_at(config, Instant::now())
    }

    /// [`initialize`](Self::initialize) at a specific time.
    pub fn initialize_at(
        &mut self,
        config: NavConfig,
        now: Instant,
    ) -> Result<InitReport, NavError> {
        config.validate()?;
        if self.initialized {
            tracing::info!(target: TARGET_SETUP, "re-initializing; tearing down previous instances");
            self.teardown();
        }
        self.config = config;

        let mut report = InitReport::default();
        for wrapper in self.host.query_all(&self.config.main_nav_wrapper) {
            let id = self.registry.allocate_id();
            match self.setup_instance(wrapper) {
                Ok(parts) => {
                    let mut instance = Instance::new(id, parts, self.config.throttle_delay);
                    instance.gate_mut().trigger_at(now);
                    self.registry.insert(instance);
                    report.activated.push(id);
                }
                Err(err) => {
                    tracing::warn!(
                        target: TARGET_SETUP,
                        instance = %id,
                        wrapper = %wrapper,
                        error = %err,
                        "instance not activated"
                    );
                    report.skipped.push((id, err));
                }
            }
        }

        self.host.set_root_class(&self.config.init_class, true);
        self.initialized = true;
        report.passes = self.poll_at(now);

        tracing::info!(
            target: TARGET_SETUP,
            activated = report.activated.len(),
            skipped = report.skipped.len(),
            "initialized"
        );
        Ok(report)
    }

    fn setup_instance(&mut self, wrapper: NodeId) -> Result<NavParts, SetupError> {
        let main_nav = self
            .host
            .query_within(wrapper, &self.config.main_nav)
            .ok_or(SetupError::MissingMainNav { wrapper })?;
        if self.host.parent(main_nav) != Some(wrapper) {
            return Err(SetupError::MainNavNotDirectChild { wrapper, main_nav });
        }

        let built = self.host.build_scaffold(wrapper, main_nav, &self.config);
        let dropdown = self
            .host
            .query_within(wrapper, &class_selector(&self.config.nav_dropdown_class_name));
        let toggle = self.host.query_within(
            wrapper,
            &class_selector(&self.config.nav_dropdown_toggle_class_name),
        );
        match (dropdown, toggle) {
            (Some(dropdown), Some(toggle)) => Ok(NavParts {
                dropdown,
                toggle,
                ..built
            }),
            (None, _) => {
                self.host.remove_scaffold(&built);
                Err(SetupError::MissingDropdown { wrapper })
            }
            (_, None) => {
                self.host.remove_scaffold(&built);
                Err(SetupError::MissingToggle { wrapper })
            }
        }
    }

    /// Force a decision pass now, bypassing the debounce window.
    ///
    /// Any pending debounced run for the targeted instances is discarded.
    pub fn recalculate(&mut self, target: Target) -> Result<Vec<PassReport>, NavError> {
        let ids = self.resolve(target)?;
        let mut reports = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(instance) = self.registry.get_mut(id) {
                instance.gate_mut().record_external_run();
            }
            reports.extend(self.run_pass(id));
        }
        Ok(reports)
    }

    /// Schedule a debounced pass.
    pub fn trigger(&mut self, target: Target) -> Result<(), NavError> {
        self.trigger_at(target, Instant::now())
    }

    /// [`trigger`](Self::trigger) at a specific time.
    pub fn trigger_at(&mut self, target: Target, now: Instant) -> Result<(), NavError> {
        for id in self.resolve(target)? {
            if let Some(instance) = self.registry.get_mut(id) {
                instance.gate_mut().trigger_at(now);
            }
        }
        Ok(())
    }

    /// A resize happened: every instance schedules a debounced pass.
    pub fn handle_resize(&mut self) {
        self.handle_resize_at(Instant::now());
    }

    /// [`handle_resize`](Self::handle_resize) at a specific time.
    pub fn handle_resize_at(&mut self, now: Instant) {
        for instance in self.registry.iter_mut() {
            instance.gate_mut().trigger_at(now);
        }
    }

    /// Run every pass whose quiet period has elapsed.
    pub fn poll(&mut self) -> Vec<PassReport> {
        self.poll_at(Instant::now())
    }

    /// [`poll`](Self::poll) at a specific time.
    pub fn poll_at(&mut self, now: Instant) -> Vec<PassReport> {
        let mut reports = Vec::new();
        for id in self.registry.ids() {
            let action = match self.registry.get_mut(id) {
                Some(instance) => instance.gate_mut().poll_at(now),
                None => continue,
            };
            if let GateAction::Run { coalesced, waited } = action {
                tracing::debug!(
                    target: TARGET_SCHEDULE,
                    instance = %id,
                    coalesced,
                    waited_ms = waited.as_millis() as u64,
                    "debounced pass"
                );
                reports.extend(self.run_pass(id));
            }
        }
        reports
    }

    /// Time until the earliest pending pass is due, if any is pending.
    #[must_use]
    pub fn time_until_next_pass(&self, now: Instant) -> Option<Duration> {
        self.registry
            .iter()
            .filter_map(|instance| instance.gate().time_until_run(now))
            .min()
    }

    /// Open or close one instance's dropdown. Returns the new open state.
    pub fn toggle_dropdown(&mut self, id: InstanceId) -> Result<bool, NavError> {
        let instance = self
            .registry
            .get_mut(id)
            .ok_or(NavError::UnknownInstance(id))?;
        let open = !instance.markers.contains(NavMarkers::OPEN);
        self.host.set_dropdown_open(instance.parts(), open);
        instance.markers.set(NavMarkers::OPEN, open);
        Ok(open)
    }

    /// A click landed on `target`: close every open dropdown whose toggle
    /// wrapper does not contain it. Returns how many were closed.
    pub fn dismiss_on_click(&mut self, target: NodeId) -> usize {
        let ids: Vec<InstanceId> = self
            .open_instances()
            .filter(|instance| !self.host.contains(instance.parts().toggle_wrapper, target))
            .map(Instance::id)
            .collect();
        self.close(&ids)
    }

    /// Escape was pressed: close every open dropdown.
    pub fn dismiss_on_escape(&mut self) -> usize {
        let ids: Vec<InstanceId> = self.open_instances().map(Instance::id).collect();
        self.close(&ids)
    }

    fn open_instances(&self) -> impl Iterator<Item = &Instance> {
        self.registry
            .iter()
            .filter(|instance| instance.markers().contains(NavMarkers::OPEN))
    }

    fn close(&mut self, ids: &[InstanceId]) -> usize {
        for &id in ids {
            if let Some(instance) = self.registry.get_mut(id) {
                self.host.set_dropdown_open(instance.parts(), false);
                instance.markers.remove(NavMarkers::OPEN);
            }
        }
        ids.len()
    }

    /// Release every instance.
    ///
    /// Hidden items go back to their lists (most recent first), the
    /// scaffold is removed, the root class is dropped and ids restart at
    /// zero. Returns how many instances were released.
    pub fn teardown(&mut self) -> usize {
        let instances = self.registry.teardown_all();
        for instance in &instances {
            let parts = instance.parts();
            let mut restored = 0usize;
            while self.host.move_dropdown_front_to_visible_end(parts).is_some() {
                restored += 1;
            }
            self.host.remove_scaffold(parts);
            tracing::debug!(
                target: TARGET_SETUP,
                instance = %instance.id(),
                restored,
                "instance released"
            );
        }
        if self.initialized {
            self.host.set_root_class(&self.config.init_class, false);
            self.initialized = false;
        }
        tracing::info!(target: TARGET_SETUP, released = instances.len(), "teardown");
        instances.len()
    }

    fn resolve(&self, target: Target) -> Result<Vec<InstanceId>, NavError> {
        match target {
            Target::All => Ok(self.registry.ids()),
            Target::Instance(id) if self.registry.get(id).is_some() => Ok(vec![id]),
            Target::Instance(id) => Err(NavError::UnknownInstance(id)),
        }
    }

    fn run_pass(&mut self, id: InstanceId) -> Option<PassReport> {
        let instance = self.registry.get_mut(id)?;
        Some(OverflowEngine::new(&self.config).run(instance, &mut self.host))
    }

    /// The document host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The document host, mutably (for applying layout changes).
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Unwrap the document host.
    pub fn into_host(self) -> H {
        self.host
    }

    /// Active configuration.
    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    /// The instance registry.
    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    /// Look up one instance.
    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.registry.get(id)
    }

    /// Whether `initialize` has succeeded and `teardown` has not run since.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

fn class_selector(class: &str) -> String {
    format!(".{class}")
}
