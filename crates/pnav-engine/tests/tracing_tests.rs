#![forbid(unsafe_code)]

//! Structured logging integration tests.
//!
//! These tests capture events emitted under the `pnav.*` targets and check
//! that setup failures, moves and debounced passes are all observable.
//!
//!   cargo test -p pnav-engine --test tracing_tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pnav_core::{NavConfig, Px};
use pnav_engine::{PriorityNav, Target};
use pnav_web::SimDocument;
use web_time::Instant;

use tracing_subscriber::layer::SubscriberExt;

// ============================================================================
// Test Infrastructure
// ============================================================================

/// A captured event with its target, level and fields.
#[derive(Debug, Clone)]
struct CapturedEvent {
    target: String,
    level: tracing::Level,
    message: String,
    fields: Vec<(String, String)>,
}

impl CapturedEvent {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A tracing Layer that records every event.
struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

/// Visitor that extracts event fields.
struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let message = visitor
            .0
            .iter()
            .find(|(k, _)| k == "message")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        self.events.lock().unwrap().push(CapturedEvent {
            target: event.metadata().target().to_string(),
            level: *event.metadata().level(),
            message,
            fields: visitor.0,
        });
    }
}

/// Run `f` with an event-capturing subscriber and return what it logged.
fn with_captured_events<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCapture {
        events: Arc::clone(&events),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    captured
}

fn with_target<'a>(events: &'a [CapturedEvent], target: &str) -> Vec<&'a CapturedEvent> {
    events.iter().filter(|e| e.target == target).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn every_move_is_logged() {
    let events = with_captured_events(|| {
        let mut doc = SimDocument::new(1024.0);
        doc.add_nav(320.0, &[100.0; 5]);
        let mut nav = PriorityNav::new(doc);
        nav.initialize_at(NavConfig::default().with_break_point(Px::ZERO), Instant::now())
            .unwrap();
    });

    let moves: Vec<_> = with_target(&events, "pnav.engine")
        .into_iter()
        .filter(|e| e.message == "item moved")
        .collect();
    assert_eq!(moves.len(), 2);
    assert!(moves.iter().all(|e| e.level == tracing::Level::DEBUG));
    assert_eq!(moves[0].field("direction"), Some("to_dropdown"));
    assert_eq!(moves[1].field("hidden"), Some("2"));
}

#[test]
fn skipped_wrapper_warns_under_setup_target() {
    let events = with_captured_events(|| {
        let mut doc = SimDocument::new(1024.0);
        doc.add_element(None, "nav", &[]);
        let mut nav = PriorityNav::new(doc);
        nav.initialize_at(NavConfig::default(), Instant::now()).unwrap();
    });

    let setup = with_target(&events, "pnav.setup");
    let warning = setup
        .iter()
        .find(|e| e.level == tracing::Level::WARN)
        .expect("setup warning");
    assert_eq!(warning.message, "instance not activated");
    assert_eq!(warning.field("instance"), Some("0"));
    assert!(setup.iter().any(|e| e.message == "initialized"));
}

#[test]
fn rejected_class_name_warns_under_config_target() {
    let events = with_captured_events(|| {
        let mut nav = PriorityNav::new(SimDocument::new(1024.0));
        let config = NavConfig::default().with_class_names("menu", "#toggle");
        assert!(nav.initialize_at(config, Instant::now()).is_err());
    });

    let config_events = with_target(&events, "pnav.config");
    assert_eq!(config_events.len(), 1);
    assert_eq!(config_events[0].level, tracing::Level::WARN);
    assert!(with_target(&events, "pnav.setup").is_empty());
}

#[test]
fn debounced_pass_reports_coalescing() {
    let events = with_captured_events(|| {
        let start = Instant::now();
        let mut doc = SimDocument::new(1024.0);
        let wrapper = doc.add_nav(800.0, &[100.0; 5]);
        let config = NavConfig::default()
            .with_break_point(Px::ZERO)
            .with_throttle_delay(Duration::from_millis(50));
        let mut nav = PriorityNav::new(doc);
        nav.initialize_at(config, start).unwrap();

        nav.host_mut().set_client_width(wrapper, 350.0);
        nav.handle_resize_at(start);
        nav.handle_resize_at(start + Duration::from_millis(20));
        nav.handle_resize_at(start + Duration::from_millis(40));
        assert_eq!(nav.poll_at(start + Duration::from_millis(90)).len(), 1);
    });

    let passes: Vec<_> = with_target(&events, "pnav.schedule")
        .into_iter()
        .filter(|e| e.message == "debounced pass")
        .collect();
    // The first is the immediate pass at initialize.
    assert_eq!(passes.len(), 2);
    assert_eq!(passes[0].field("coalesced"), Some("1"));
    assert_eq!(passes[1].field("coalesced"), Some("3"));
}

#[test]
fn forced_recalculation_bypasses_schedule() {
    let events = with_captured_events(|| {
        let mut doc = SimDocument::new(1024.0);
        doc.add_nav(320.0, &[100.0; 5]);
        let mut nav = PriorityNav::new(doc);
        nav.initialize_at(NavConfig::default(), Instant::now()).unwrap();
        nav.recalculate(Target::All).unwrap();
    });

    let scheduled = with_target(&events, "pnav.schedule")
        .into_iter()
        .filter(|e| e.message == "debounced pass")
        .count();
    assert_eq!(scheduled, 1);
}

#[test]
fn withheld_restore_logs_refreshed_break_width() {
    let events = with_captured_events(|| {
        let mut doc = SimDocument::new(1024.0);
        let wrapper = doc.add_nav(250.0, &[100.0; 3]);
        let items = doc.list_items(wrapper);
        let mut nav = PriorityNav::new(doc);
        nav.initialize_at(NavConfig::default().with_break_point(Px::ZERO), Instant::now())
            .unwrap();
        for &item in &items {
            nav.host_mut().set_fixed_width(item, 150.0);
        }
        nav.host_mut().set_client_width(wrapper, 305.5);
        nav.recalculate(Target::All).unwrap();
    });

    let engine = with_target(&events, "pnav.engine");
    let withheld: Vec<_> = engine
        .iter()
        .filter(|e| e.message == "restore withheld")
        .collect();
    assert_eq!(withheld.len(), 1);
    assert_eq!(withheld[0].field("stale_break"), Some("300.0"));
    assert_eq!(withheld[0].field("break_width"), Some("450.0"));
    assert_eq!(
        engine.iter().filter(|e| e.message == "item moved").count(),
        1,
        "only the initial collapse counts as a move"
    );
}
