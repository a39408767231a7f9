//! A simulated document with a deterministic inline layout model.
//!
//! # Layout model
//!
//! | Node | `offsetWidth` |
//! |------|---------------|
//! | element with a fixed width (items, toggle) | that width |
//! | element with a client width (wrappers) | the client width |
//! | anything else | sum of its in-flow element children (shrink-to-fit) |
//! | detached node | unreadable (`None`) |
//!
//! An element is out of flow when it is absolutely positioned (the
//! dropdown panel), hidden, or a toggle not marked visible. Out-of-flow
//! children do not contribute to their parent's shrink-to-fit width.
//!
//! The model is intentionally simple: widths never depend on text, and
//! moving an item never changes its own width.

use std::collections::BTreeMap;

use pnav_core::{
    LabelVariant, NavConfig, NavDocument, NavHost, NavParts, NodeId, NodeKind, Px, ViewportMetrics,
};

use crate::dom::{Dom, remove_all, remove_element};

/// Class marking the toggle wrapper.
pub const WRAPPER_CLASS: &str = "priority-nav__wrapper";
/// Class marking the dropdown list.
pub const DROPDOWN_CLASS: &str = "priority-nav__dropdown";
/// Class marking the toggle button.
pub const TOGGLE_CLASS: &str = "priority-nav__dropdown-toggle";
/// Class the nav wrapper gains once scaffolded.
pub const NAV_CLASS: &str = "priority-nav";

const IS_VISIBLE: &str = "priority-nav-is-visible";
const IS_HIDDEN: &str = "priority-nav-is-hidden";
const HAS_DROPDOWN: &str = "priority-nav-has-dropdown";
const COUNT_ATTR: &str = "priorityNav-count";

/// Deliberately broken scaffolding, for exercising setup failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaffoldFault {
    /// The dropdown is created without the configured class.
    MissingDropdownClass,
    /// The toggle is created without the configured class.
    MissingToggleClass,
}

#[derive(Debug, Clone, Copy, Default)]
struct Geometry {
    fixed_width: Option<f64>,
    client_width: Option<f64>,
    padding: (f64, f64),
    out_of_flow: bool,
}

/// In-memory document implementing [`NavDocument`].
#[derive(Debug, Clone)]
pub struct SimDocument {
    dom: Dom,
    geometry: BTreeMap<NodeId, Geometry>,
    viewport_width: f64,
    viewport_height: f64,
    inner_width: Option<f64>,
    toggle_width: f64,
    fault: Option<ScaffoldFault>,
}

impl SimDocument {
    /// Create an empty document with the given viewport width.
    #[must_use]
    pub fn new(viewport_width: f64) -> Self {
        Self {
            dom: Dom::new(),
            geometry: BTreeMap::new(),
            viewport_width,
            viewport_height: 800.0,
            inner_width: None,
            toggle_width: 0.0,
            fault: None,
        }
    }

    /// The underlying node arena.
    #[must_use]
    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    /// The underlying node arena, mutably.
    pub fn dom_mut(&mut self) -> &mut Dom {
        &mut self.dom
    }

    fn geometry_mut(&mut self, node: NodeId) -> &mut Geometry {
        self.geometry.entry(node).or_default()
    }

    fn geometry(&self, node: NodeId) -> Geometry {
        self.geometry.get(&node).copied().unwrap_or_default()
    }

    // ---------------------------------------------------------------
    // Building
    // ---------------------------------------------------------------

    /// Append `<nav><ul><li/>…</ul></nav>` to the body.
    ///
    /// The wrapper gets `client_width`; each item gets a fixed width.
    /// Returns the wrapper.
    pub fn add_nav(&mut self, client_width: f64, item_widths: &[f64]) -> NodeId {
        let wrapper = self.add_element(None, "nav", &[]);
        self.set_client_width(wrapper, client_width);
        let list = self.add_element(Some(wrapper), "ul", &[]);
        for &width in item_widths {
            self.add_item(list, width);
        }
        wrapper
    }

    /// Append an element under `parent` (the body when `None`).
    pub fn add_element(&mut self, parent: Option<NodeId>, tag: &str, classes: &[&str]) -> NodeId {
        let node = self.dom.create_element(tag);
        for class in classes {
            self.dom.add_class(node, class);
        }
        let parent = parent.unwrap_or_else(|| self.dom.body());
        self.dom.append_child(parent, node);
        node
    }

    /// Append an `li` of fixed `width` to `list`.
    pub fn add_item(&mut self, list: NodeId, width: f64) -> NodeId {
        let item = self.add_element(Some(list), "li", &[]);
        self.set_fixed_width(item, width);
        item
    }

    /// Append a text node to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let node = self.dom.create_text(text);
        self.dom.append_child(parent, node);
        node
    }

    /// Detach `node` from the document.
    pub fn detach(&mut self, node: NodeId) {
        remove_element(&mut self.dom, node);
    }

    /// Make future scaffolds broken in the given way (or fix them).
    pub fn set_scaffold_fault(&mut self, fault: Option<ScaffoldFault>) {
        self.fault = fault;
    }

    // ---------------------------------------------------------------
    // Layout inputs
    // ---------------------------------------------------------------

    /// Set the `clientWidth` of `node` (padding included).
    pub fn set_client_width(&mut self, node: NodeId, width: f64) {
        self.geometry_mut(node).client_width = Some(width);
    }

    /// Set the horizontal padding of `node`.
    pub fn set_padding(&mut self, node: NodeId, left: f64, right: f64) {
        self.geometry_mut(node).padding = (left, right);
    }

    /// Give `node` a fixed rendered width.
    pub fn set_fixed_width(&mut self, node: NodeId, width: f64) {
        self.geometry_mut(node).fixed_width = Some(width);
    }

    /// Set the rendered width of an instance's toggle button.
    pub fn set_toggle_width(&mut self, parts: &NavParts, width: f64) {
        self.set_fixed_width(parts.toggle, width);
    }

    /// Width given to toggles created by later scaffolds.
    pub fn set_default_toggle_width(&mut self, width: f64) {
        self.toggle_width = width;
    }

    /// Set the document root's `clientWidth`.
    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width;
    }

    /// Set `window.innerWidth`; `None` means the host does not report it.
    pub fn set_inner_width(&mut self, width: Option<f64>) {
        self.inner_width = width;
    }

    // ---------------------------------------------------------------
    // Inspection
    // ---------------------------------------------------------------

    /// Items of an instance's visible list.
    #[must_use]
    pub fn visible_items(&self, parts: &NavParts) -> Vec<NodeId> {
        self.dom.element_children(parts.main_nav)
    }

    /// Items of an instance's dropdown.
    #[must_use]
    pub fn dropdown_items(&self, parts: &NavParts) -> Vec<NodeId> {
        self.dom.element_children(parts.dropdown)
    }

    /// Items of the first list directly under `wrapper`.
    #[must_use]
    pub fn list_items(&self, wrapper: NodeId) -> Vec<NodeId> {
        self.dom
            .element_children(wrapper)
            .into_iter()
            .find(|&child| self.dom.node(child).tag() == "ul")
            .map(|list| self.dom.element_children(list))
            .unwrap_or_default()
    }

    /// Text of the toggle's label span.
    #[must_use]
    pub fn toggle_label(&self, parts: &NavParts) -> String {
        let html = self.dom.node(parts.toggle).inner_html();
        html.split_once("<span class=\"label\">")
            .and_then(|(_, rest)| rest.split_once("</span>"))
            .map(|(label, _)| label.to_owned())
            .unwrap_or_default()
    }

    /// Published hidden-item count, if any.
    #[must_use]
    pub fn hidden_count(&self, parts: &NavParts) -> Option<usize> {
        self.dom
            .attr(parts.toggle, COUNT_ATTR)
            .and_then(|v| v.parse().ok())
    }

    /// Whether the dropdown panel is shown.
    #[must_use]
    pub fn is_dropdown_open(&self, parts: &NavParts) -> bool {
        self.dom.has_class(parts.dropdown, "show")
    }

    /// Whether the toggle is shown.
    #[must_use]
    pub fn is_toggle_visible(&self, parts: &NavParts) -> bool {
        self.dom.has_class(parts.toggle, IS_VISIBLE)
    }

    /// Whether `node` carries `class`.
    #[must_use]
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.dom.has_class(node, class)
    }

    /// Attribute value of `node`.
    #[must_use]
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.dom.attr(node, name)
    }

    /// Whether the document root carries `class`.
    #[must_use]
    pub fn root_has_class(&self, class: &str) -> bool {
        self.dom.has_class(self.dom.root(), class)
    }

    /// Number of nodes reachable from the root (root included).
    #[must_use]
    pub fn node_count_attached(&self) -> usize {
        self.dom.descendants(self.dom.root()).len() + 1
    }

    // ---------------------------------------------------------------
    // Layout
    // ---------------------------------------------------------------

    fn in_flow(&self, node: NodeId) -> bool {
        if self.dom.node(node).kind() != NodeKind::Element {
            return false;
        }
        if self.geometry(node).out_of_flow || self.dom.attr(node, "hidden").is_some() {
            return false;
        }
        !(self.dom.has_class(node, TOGGLE_CLASS) && !self.dom.has_class(node, IS_VISIBLE))
    }

    fn layout_width(&self, node: NodeId) -> f64 {
        let geometry = self.geometry(node);
        if let Some(width) = geometry.fixed_width {
            return width;
        }
        if let Some(width) = geometry.client_width {
            return width;
        }
        self.dom
            .children(node)
            .iter()
            .filter(|&&child| self.in_flow(child))
            .map(|&child| self.layout_width(child))
            .sum()
    }
}

impl NavHost for SimDocument {
    fn client_width(&self, node: NodeId) -> Option<f64> {
        self.dom
            .is_connected(node)
            .then(|| self.layout_width(node))
    }

    fn inline_padding(&self, node: NodeId) -> (f64, f64) {
        self.geometry(node).padding
    }

    fn offset_width(&self, node: NodeId) -> Option<f64> {
        if !self.dom.is_connected(node) {
            return None;
        }
        if self.dom.attr(node, "hidden").is_some() {
            return Some(0.0);
        }
        Some(self.layout_width(node))
    }

    fn child_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.dom.children(node).to_vec()
    }

    fn node_kind(&self, node: NodeId) -> NodeKind {
        self.dom.node(node).kind()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.dom.parent(node)
    }

    fn viewport(&self) -> ViewportMetrics {
        ViewportMetrics {
            client_width: Px::new(self.viewport_width),
            client_height: Px::new(self.viewport_height),
            inner_width: self.inner_width.map(Px::new),
            inner_height: self.inner_width.map(|_| Px::new(self.viewport_height)),
        }
    }

    fn visible_count(&self, parts: &NavParts) -> usize {
        self.dom.element_children(parts.main_nav).len()
    }

    fn dropdown_count(&self, parts: &NavParts) -> usize {
        self.dom.element_children(parts.dropdown).len()
    }

    fn move_last_visible_to_dropdown_front(&mut self, parts: &NavParts) -> Option<NodeId> {
        let item = *self.dom.element_children(parts.main_nav).last()?;
        let front = self.dom.children(parts.dropdown).first().copied();
        self.dom.insert_before(parts.dropdown, item, front);
        Some(item)
    }

    fn move_dropdown_front_to_visible_end(&mut self, parts: &NavParts) -> Option<NodeId> {
        let item = *self.dom.element_children(parts.dropdown).first()?;
        self.dom.append_child(parts.main_nav, item);
        Some(item)
    }

    fn set_toggle_label(&mut self, parts: &NavParts, label: &str, icon: &str) {
        self.dom.set_attr(parts.toggle, "aria-label", label);
        self.dom.set_inner_html(
            parts.toggle,
            format!("<span class=\"label\">{label}</span>{icon}"),
        );
    }

    fn set_hidden_count(&mut self, parts: &NavParts, count: usize) {
        self.dom.set_attr(parts.toggle, COUNT_ATTR, count.to_string());
    }

    fn set_toggle_visibility(&mut self, parts: &NavParts, visible: bool) {
        self.dom.set_class(parts.toggle, IS_VISIBLE, visible);
        self.dom.set_class(parts.toggle, IS_HIDDEN, !visible);
        self.dom.set_class(parts.wrapper, HAS_DROPDOWN, visible);
        self.dom.set_attr(
            parts.toggle_wrapper,
            "aria-haspopup",
            if visible { "true" } else { "false" },
        );
    }

    fn set_wrapper_full_state(&mut self, parts: &NavParts, full: bool) {
        self.dom.set_class(parts.wrapper, "is-empty", full);
        self.dom.set_class(parts.dropdown, "is-full", full);
        self.dom.set_class(parts.toggle, "is-full", full);
    }

    fn set_dropdown_open(&mut self, parts: &NavParts, open: bool) {
        self.dom.set_class(parts.toggle, "is-open", open);
        self.dom.set_class(parts.wrapper, "is-open", open);
        self.dom.set_class(parts.dropdown, "show", open);
        self.dom.set_attr(
            parts.dropdown,
            "aria-hidden",
            if open { "false" } else { "true" },
        );
    }
}

impl NavDocument for SimDocument {
    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.dom.query_all(self.dom.root(), selector)
    }

    fn query_within(&self, root: NodeId, selector: &str) -> Option<NodeId> {
        self.dom.query_first(root, selector)
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.dom.contains(ancestor, node)
    }

    fn build_scaffold(&mut self, wrapper: NodeId, main_nav: NodeId, config: &NavConfig) -> NavParts {
        let toggle_wrapper = self.dom.create_element("span");
        self.dom.add_class(toggle_wrapper, &format!("{}-wrapper", config.nav_dropdown_class_name));
        self.dom.add_class(toggle_wrapper, WRAPPER_CLASS);
        self.dom.set_attr(toggle_wrapper, "aria-haspopup", "false");

        let toggle = self.dom.create_element("button");
        if self.fault != Some(ScaffoldFault::MissingToggleClass) {
            self.dom.add_class(toggle, &config.nav_dropdown_toggle_class_name);
        }
        self.dom.add_class(toggle, TOGGLE_CLASS);
        self.dom.set_attr(toggle, "type", "button");
        self.dom.set_attr(toggle, "aria-controls", "menu");
        let (label, icon) = config.labels.get(LabelVariant::Normal);
        self.dom.set_inner_html(
            toggle,
            format!("<span class=\"label\">{label}</span>{icon}"),
        );
        self.set_fixed_width(toggle, self.toggle_width);

        let dropdown = self.dom.create_element("ul");
        if self.fault != Some(ScaffoldFault::MissingDropdownClass) {
            self.dom.add_class(dropdown, &config.nav_dropdown_class_name);
        }
        self.dom.add_class(dropdown, DROPDOWN_CLASS);
        self.dom.set_attr(dropdown, "aria-hidden", "true");
        self.geometry_mut(dropdown).out_of_flow = true;

        self.dom.append_child(toggle_wrapper, toggle);
        self.dom.append_child(toggle_wrapper, dropdown);
        self.dom.insert_after(main_nav, toggle_wrapper);
        self.dom.add_class(wrapper, NAV_CLASS);

        NavParts {
            wrapper,
            main_nav,
            toggle_wrapper,
            dropdown,
            toggle,
        }
    }

    fn remove_scaffold(&mut self, parts: &NavParts) {
        // Innermost first, so no scaffold node is left holding another.
        remove_all(
            &mut self.dom,
            &[parts.dropdown, parts.toggle, parts.toggle_wrapper],
        );
        for class in [NAV_CLASS, HAS_DROPDOWN, "is-empty", "is-open"] {
            self.dom.remove_class(parts.wrapper, class);
        }
    }

    fn set_root_class(&mut self, class: &str, enabled: bool) {
        let root = self.dom.root();
        self.dom.set_class(root, class, enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scaffolded(widths: &[f64]) -> (SimDocument, NavParts) {
        let mut doc = SimDocument::new(1024.0);
        let wrapper = doc.add_nav(500.0, widths);
        let main_nav = doc.query_within(wrapper, "ul").unwrap();
        let parts = doc.build_scaffold(wrapper, main_nav, &NavConfig::default());
        (doc, parts)
    }

    #[test]
    fn scaffold_markup() {
        let (doc, parts) = scaffolded(&[100.0]);
        assert_eq!(doc.dom().children(parts.wrapper), &[parts.main_nav, parts.toggle_wrapper]);
        assert_eq!(doc.dom().children(parts.toggle_wrapper), &[parts.toggle, parts.dropdown]);
        assert!(doc.has_class(parts.wrapper, NAV_CLASS));
        assert!(doc.has_class(parts.toggle_wrapper, "nav__dropdown-wrapper"));
        assert!(doc.has_class(parts.dropdown, "nav__dropdown"));
        assert!(doc.has_class(parts.toggle, "nav__dropdown-toggle"));
        assert_eq!(doc.attr(parts.toggle, "type"), Some("button"));
        assert_eq!(doc.attr(parts.dropdown, "aria-hidden"), Some("true"));
        assert_eq!(doc.toggle_label(&parts), "More");
    }

    #[test]
    fn moves_preserve_priority_order() {
        let (mut doc, parts) = scaffolded(&[10.0, 20.0, 30.0]);
        let items = doc.visible_items(&parts);
        let c = doc.move_last_visible_to_dropdown_front(&parts).unwrap();
        let b = doc.move_last_visible_to_dropdown_front(&parts).unwrap();
        assert_eq!((b, c), (items[1], items[2]));
        assert_eq!(doc.dropdown_items(&parts), vec![items[1], items[2]]);

        assert_eq!(doc.move_dropdown_front_to_visible_end(&parts), Some(items[1]));
        assert_eq!(doc.visible_items(&parts), vec![items[0], items[1]]);
    }

    #[test]
    fn hidden_toggle_takes_no_space() {
        let (mut doc, parts) = scaffolded(&[100.0, 100.0]);
        doc.set_toggle_width(&parts, 40.0);
        assert_eq!(doc.offset_width(parts.toggle_wrapper), Some(0.0));
        doc.set_toggle_visibility(&parts, true);
        assert_eq!(doc.offset_width(parts.toggle_wrapper), Some(40.0));
        assert_eq!(doc.attr(parts.toggle_wrapper, "aria-haspopup"), Some("true"));
    }

    #[test]
    fn dropdown_is_out_of_flow() {
        let (mut doc, parts) = scaffolded(&[100.0, 100.0]);
        doc.move_last_visible_to_dropdown_front(&parts);
        assert_eq!(doc.offset_width(parts.main_nav), Some(100.0));
        assert_eq!(doc.offset_width(parts.dropdown), Some(100.0));
        assert_eq!(doc.offset_width(parts.toggle_wrapper), Some(0.0));
    }

    #[test]
    fn remove_scaffold_restores_wrapper() {
        let (mut doc, parts) = scaffolded(&[100.0]);
        doc.remove_scaffold(&parts);
        assert_eq!(doc.dom().children(parts.wrapper), &[parts.main_nav]);
        assert!(!doc.has_class(parts.wrapper, NAV_CLASS));
        for node in [parts.toggle_wrapper, parts.toggle, parts.dropdown] {
            assert!(!doc.dom().is_connected(node));
            assert_eq!(doc.dom().parent(node), None);
        }
    }

    #[test]
    fn open_state_mirrors_aria_hidden() {
        let (mut doc, parts) = scaffolded(&[100.0]);
        doc.set_dropdown_open(&parts, true);
        assert!(doc.is_dropdown_open(&parts));
        assert_eq!(doc.attr(parts.dropdown, "aria-hidden"), Some("false"));
        doc.set_dropdown_open(&parts, false);
        assert_eq!(doc.attr(parts.dropdown, "aria-hidden"), Some("true"));
    }

    #[test]
    fn viewport_reports_inner_width_only_when_set() {
        let mut doc = SimDocument::new(980.0);
        assert_eq!(doc.viewport().inner_width, None);
        doc.set_inner_width(Some(390.0));
        assert_eq!(doc.viewport().effective().0, Px::from(390));
    }
}
