//! End-to-end scenarios through the controller against a simulated page.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pnav_core::{
    InstanceId, LabelVariant, NavCallbacks, NavConfig, NavDocument, NavParts, NodeId, Px,
};
use pnav_engine::{InstanceRegistry, MoveDirection, OverflowEngine, PriorityNav, Target};
use pnav_web::{ScaffoldFault, SimDocument};
use pretty_assertions::assert_eq;
use web_time::Instant;

fn config(break_point: u32) -> NavConfig {
    NavConfig::default()
        .with_break_point(Px::from(break_point))
        .with_throttle_delay(Duration::from_millis(50))
}

fn parts(nav: &PriorityNav<SimDocument>, id: u32) -> NavParts {
    *nav.instance(InstanceId(id)).unwrap().parts()
}

#[test]
fn five_items_in_320px() {
    let mut doc = SimDocument::new(1024.0);
    doc.add_nav(320.0, &[100.0; 5]);
    let mut nav = PriorityNav::new(doc);
    nav.initialize_at(config(300), Instant::now()).unwrap();

    let p = parts(&nav, 0);
    let instance = nav.instance(InstanceId(0)).unwrap();
    assert_eq!(nav.host().visible_items(&p).len(), 3);
    assert_eq!(nav.host().dropdown_items(&p).len(), 2);
    assert_eq!(instance.history().as_slice(), &[Px::from(500), Px::from(400)]);
    assert!(nav.host().is_toggle_visible(&p));
    assert_eq!(nav.host().hidden_count(&p), Some(2));
    assert_eq!(nav.host().toggle_label(&p), "More");
}

#[test]
fn widening_to_600px_restores_both() {
    let mut doc = SimDocument::new(1024.0);
    let wrapper = doc.add_nav(320.0, &[100.0; 5]);
    let mut nav = PriorityNav::new(doc);
    nav.initialize_at(config(300), Instant::now()).unwrap();
    let p = parts(&nav, 0);
    nav.toggle_dropdown(InstanceId(0)).unwrap();

    nav.host_mut().set_client_width(wrapper, 600.0);
    let reports = nav.recalculate(Target::All).unwrap();

    assert_eq!(reports[0].moved_back_count(), 2);
    assert!(nav.instance(InstanceId(0)).unwrap().history().is_empty());
    assert!(nav.host().dropdown_items(&p).is_empty());
    assert!(!nav.host().is_dropdown_open(&p));
    assert!(!nav.host().is_toggle_visible(&p));
    assert_eq!(nav.host().hidden_count(&p), Some(0));
}

#[test]
fn instances_are_independent() {
    let mut doc = SimDocument::new(1024.0);
    let narrow = doc.add_nav(250.0, &[100.0; 4]);
    let roomy = doc.add_nav(900.0, &[100.0; 4]);
    let mut nav = PriorityNav::new(doc);
    nav.initialize_at(config(500), Instant::now()).unwrap();

    let p0 = parts(&nav, 0);
    let p1 = parts(&nav, 1);
    let roomy_items = nav.host().list_items(roomy);
    assert_eq!(nav.host().visible_items(&p0).len(), 2);
    assert_eq!(nav.host().visible_items(&p1), roomy_items);

    // Shrinking the narrow nav further leaves the roomy one alone.
    nav.host_mut().set_client_width(narrow, 120.0);
    nav.recalculate(Target::Instance(InstanceId(0))).unwrap();
    assert_eq!(nav.host().visible_items(&p0).len(), 1);
    assert_eq!(nav.host().visible_items(&p1), roomy_items);
    assert!(nav.instance(InstanceId(1)).unwrap().history().is_empty());
}

#[test]
fn break_point_mode_leaves_other_instance_untouched() {
    let forced = config(500);
    let relaxed = config(300);
    let mut doc = SimDocument::new(400.0);
    let wrappers = [doc.add_nav(2000.0, &[50.0; 3]), doc.add_nav(2000.0, &[50.0; 3])];
    let mut registry = InstanceRegistry::new();
    let mut ids = Vec::new();
    for wrapper in wrappers {
        let main_nav = doc.query_within(wrapper, "ul").unwrap();
        let parts = doc.build_scaffold(wrapper, main_nav, &forced);
        ids.push(registry.register(parts, Duration::ZERO));
    }
    let untouched = doc.list_items(wrappers[1]);

    OverflowEngine::new(&forced).run(registry.get_mut(ids[0]).unwrap(), &mut doc);
    OverflowEngine::new(&relaxed).run(registry.get_mut(ids[1]).unwrap(), &mut doc);

    let forced_parts = *registry.get(ids[0]).unwrap().parts();
    assert!(doc.visible_items(&forced_parts).is_empty());
    assert_eq!(registry.get(ids[0]).unwrap().history().size(), 3);
    assert_eq!(doc.list_items(wrappers[1]), untouched);
    assert!(registry.get(ids[1]).unwrap().history().is_empty());
}

#[test]
fn breakpoint_override_ignores_available_width() {
    let mut doc = SimDocument::new(400.0);
    doc.add_nav(2000.0, &[80.0; 6]);
    let mut nav = PriorityNav::new(doc);
    nav.initialize_at(config(500), Instant::now()).unwrap();

    let p = parts(&nav, 0);
    assert!(nav.host().visible_items(&p).is_empty());
    assert_eq!(nav.host().dropdown_items(&p).len(), 6);
    assert_eq!(nav.host().toggle_label(&p), "Menu");
    assert!(nav.host().has_class(p.wrapper, "is-empty"));
    assert!(nav.host().has_class(p.dropdown, "is-full"));
}

#[test]
fn leaving_break_point_mode_restores_and_relabels() {
    let mut doc = SimDocument::new(400.0);
    doc.add_nav(2000.0, &[80.0; 6]);
    let mut nav = PriorityNav::new(doc);
    nav.initialize_at(config(500), Instant::now()).unwrap();

    nav.host_mut().set_viewport_width(1200.0);
    nav.recalculate(Target::All).unwrap();

    let p = parts(&nav, 0);
    assert_eq!(nav.host().visible_items(&p).len(), 6);
    assert_eq!(nav.host().toggle_label(&p), "More");
    assert!(!nav.host().has_class(p.wrapper, "is-empty"));
}

#[test]
fn full_collapse_switches_label_above_break_point() {
    let mut doc = SimDocument::new(1024.0);
    doc.add_nav(90.0, &[100.0, 100.0]);
    let mut nav = PriorityNav::new(doc);
    let report = nav.initialize_at(config(300), Instant::now()).unwrap();

    let p = parts(&nav, 0);
    assert_eq!(report.passes[0].label, LabelVariant::Breakpoint);
    assert_eq!(nav.host().toggle_label(&p), "Menu");
    assert_eq!(nav.host().attr(p.toggle, "aria-label"), Some("Menu"));
}

#[test]
fn restore_order_is_reverse_of_collapse() {
    let mut doc = SimDocument::new(1024.0);
    let wrapper = doc.add_nav(1000.0, &[100.0; 5]);
    let items = doc.list_items(wrapper);
    let mut nav = PriorityNav::new(doc);
    nav.initialize_at(config(0), Instant::now()).unwrap();

    // Shrink one item's worth at a time, then grow back the same way.
    let mut hidden_order = Vec::new();
    for width in [450.0, 350.0, 250.0] {
        nav.host_mut().set_client_width(wrapper, width);
        for report in nav.recalculate(Target::All).unwrap() {
            hidden_order.extend(report.moves.iter().map(|m| m.item));
        }
    }
    let mut restored_order = Vec::new();
    for width in [350.0, 450.0, 1000.0] {
        nav.host_mut().set_client_width(wrapper, width);
        for report in nav.recalculate(Target::All).unwrap() {
            assert!(report.moves.iter().all(|m| m.direction == MoveDirection::ToMenu));
            restored_order.extend(report.moves.iter().map(|m| m.item));
        }
    }

    assert_eq!(hidden_order, vec![items[4], items[3], items[2]]);
    assert_eq!(restored_order, vec![items[2], items[3], items[4]]);
    assert_eq!(nav.host().list_items(wrapper), items);
}

#[test]
fn callbacks_fire_in_move_order_within_the_call() {
    let log: Arc<Mutex<Vec<&'static str>>> = Arc::default();
    let (moved, back) = (Arc::clone(&log), Arc::clone(&log));
    let callbacks = NavCallbacks::default()
        .on_moved(move || moved.lock().unwrap().push("moved"))
        .on_moved_back(move || back.lock().unwrap().push("moved_back"));

    let mut doc = SimDocument::new(1024.0);
    let wrapper = doc.add_nav(250.0, &[100.0; 4]);
    let mut nav = PriorityNav::new(doc);
    nav.initialize_at(config(0).with_callbacks(callbacks), Instant::now())
        .unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["moved", "moved"]);

    nav.host_mut().set_client_width(wrapper, 1000.0);
    nav.recalculate(Target::All).unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec!["moved", "moved", "moved_back", "moved_back"]
    );
}

#[test]
fn idempotent_at_rest() {
    let mut doc = SimDocument::new(1024.0);
    doc.add_nav(333.0, &[70.0, 110.0, 45.0, 95.0, 130.0]);
    let mut nav = PriorityNav::new(doc);
    nav.initialize_at(config(0), Instant::now()).unwrap();

    let again = nav.recalculate(Target::All).unwrap();
    assert!(again.iter().all(|r| r.is_at_rest()));
}

#[test]
fn offset_biases_consumed_width() {
    let mut doc = SimDocument::new(1024.0);
    doc.add_nav(520.0, &[100.0; 5]);
    let mut nav = PriorityNav::new(doc);
    let report = nav
        .initialize_at(
            config(0).with_offset_pixels(Px::from(30)),
            Instant::now(),
        )
        .unwrap();
    // 500 + 30 >= 520 hides one; 400 + 30 < 520 stops.
    assert_eq!(report.passes[0].hidden, 1);
}

#[test]
fn failed_wrappers_degrade_to_static_markup() {
    let mut doc = SimDocument::new(1024.0);
    let wrapper = doc.add_nav(200.0, &[100.0; 5]);
    let items = doc.list_items(wrapper);
    doc.set_scaffold_fault(Some(ScaffoldFault::MissingToggleClass));
    let mut nav = PriorityNav::new(doc);

    let report = nav.initialize_at(config(0), Instant::now()).unwrap();

    assert!(report.activated.is_empty());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].1.wrapper(), wrapper);
    assert_eq!(nav.host().list_items(wrapper), items);
    assert_eq!(nav.host().dom().element_children(wrapper).len(), 1);
}

#[test]
fn resize_burst_coalesces_into_one_pass() {
    let start = Instant::now();
    let mut doc = SimDocument::new(1024.0);
    let wrapper = doc.add_nav(800.0, &[100.0; 5]);
    let mut nav = PriorityNav::new(doc);
    nav.initialize_at(config(0), start).unwrap();
    let passes_before = nav.instance(InstanceId(0)).unwrap().passes();

    for (i, width) in [700.0, 600.0, 500.0, 400.0, 320.0].into_iter().enumerate() {
        nav.host_mut().set_client_width(wrapper, width);
        nav.handle_resize_at(start + Duration::from_millis(10 * i as u64));
        assert!(nav.poll_at(start + Duration::from_millis(10 * i as u64 + 5)).is_empty());
    }
    let due = nav.time_until_next_pass(start + Duration::from_millis(45)).unwrap();
    let reports = nav.poll_at(start + Duration::from_millis(45) + due);

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].moved_count(), 2);
    assert_eq!(nav.instance(InstanceId(0)).unwrap().passes(), passes_before + 1);
}

#[test]
fn click_inside_toggle_wrapper_keeps_dropdown_open() {
    let mut doc = SimDocument::new(1024.0);
    doc.add_nav(250.0, &[100.0; 4]);
    let mut nav = PriorityNav::new(doc);
    nav.initialize_at(config(0), Instant::now()).unwrap();
    let p = parts(&nav, 0);

    nav.toggle_dropdown(InstanceId(0)).unwrap();
    let hidden_item: NodeId = nav.host().dropdown_items(&p)[0];
    assert_eq!(nav.dismiss_on_click(hidden_item), 0);
    assert!(nav.host().is_dropdown_open(&p));
    assert_eq!(nav.dismiss_on_click(p.main_nav), 1);
}

#[test]
fn exact_fit_is_at_rest_across_recalculations() {
    let log: Arc<Mutex<Vec<&'static str>>> = Arc::default();
    let (moved, back) = (Arc::clone(&log), Arc::clone(&log));
    let callbacks = NavCallbacks::default()
        .on_moved(move || moved.lock().unwrap().push("moved"))
        .on_moved_back(move || back.lock().unwrap().push("moved_back"));

    let mut doc = SimDocument::new(1024.0);
    doc.add_nav(300.0, &[100.0; 3]);
    let mut nav = PriorityNav::new(doc);
    nav.initialize_at(config(0).with_callbacks(callbacks), Instant::now())
        .unwrap();

    for _ in 0..3 {
        let reports = nav.recalculate(Target::All).unwrap();
        assert!(reports[0].is_at_rest());
        assert!(!reports[0].snapshot.overflows());
    }
    let p = parts(&nav, 0);
    assert_eq!(nav.host().visible_items(&p).len(), 2);
    assert_eq!(*log.lock().unwrap(), vec!["moved"]);
}
