//! A minimal node arena with class lists, attributes and simple selectors.
//!
//! Nodes are never freed: removing a node only detaches it, so handles
//! stay valid for the lifetime of the arena.
//!
//! Selectors support comma-separated groups of compound selectors made of
//! a tag name, `#id` and any number of `.class` parts (`nav`, `ul.menu`,
//! `.nav__dropdown`, `#main, .secondary`). Combinators are not supported;
//! a selector that fails to parse matches nothing.

use std::collections::BTreeMap;

use pnav_core::{NodeId, NodeKind};

/// One node in the arena.
#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    tag: String,
    text: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    inner_html: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind, tag: &str) -> Self {
        Self {
            kind,
            tag: tag.to_ascii_lowercase(),
            text: String::new(),
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            inner_html: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Node kind.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Lower-case tag name (empty for text nodes).
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Text content of a text node.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Class list in insertion order.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Opaque markup set through [`Dom::set_inner_html`].
    #[must_use]
    pub fn inner_html(&self) -> &str {
        &self.inner_html
    }
}

/// Arena of nodes rooted at an `html` element with a `body` child.
#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Node>,
    root: NodeId,
    body: NodeId,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// Create `<html><body></body></html>`.
    #[must_use]
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
        };
        dom.root = dom.create_element("html");
        dom.body = dom.create_element("body");
        dom.append_child(dom.root, dom.body);
        dom
    }

    /// The document element.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The `body` element.
    #[must_use]
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Number of nodes ever created.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty (never true once constructed).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::new(NodeKind::Element, tag))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        let mut node = Node::new(NodeKind::Text, "");
        node.text = text.to_owned();
        self.push(node)
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Borrow a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not created by this arena.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    /// Whether `id` belongs to this arena.
    #[must_use]
    pub fn exists(&self, id: NodeId) -> bool {
        (id.0 as usize) < self.nodes.len()
    }

    /// Parent of `id`.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Children of `id`, text nodes included.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Element children of `id`.
    #[must_use]
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.node(c).kind == NodeKind::Element)
            .collect()
    }

    /// Detach `child` from its parent, if any.
    pub fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.node_mut(child).parent.take() {
            self.node_mut(parent).children.retain(|&c| c != child);
        }
    }

    /// Append `child` as the last child of `parent`, moving it if attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Insert `child` into `parent` before `reference` (or at the end).
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        self.detach(child);
        let children = &mut self.nodes[parent.0 as usize].children;
        let at = reference
            .and_then(|r| children.iter().position(|&c| c == r))
            .unwrap_or(children.len());
        children.insert(at, child);
        self.node_mut(child).parent = Some(parent);
    }

    /// Insert `child` right after `reference` under `reference`'s parent.
    ///
    /// Does nothing if `reference` is detached.
    pub fn insert_after(&mut self, reference: NodeId, child: NodeId) {
        let Some(parent) = self.parent(reference) else {
            return;
        };
        let next = {
            let siblings = self.children(parent);
            siblings
                .iter()
                .position(|&c| c == reference)
                .and_then(|i| siblings.get(i + 1).copied())
        };
        self.insert_before(parent, child, next);
    }

    /// Whether `id` is reachable from the document root.
    #[must_use]
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Descendants of `root` in document order, `root` excluded.
    #[must_use]
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Add a class if not already present.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if !self.has_class(id, class) {
            self.node_mut(id).classes.push(class.to_owned());
        }
    }

    /// Remove a class if present.
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        self.node_mut(id).classes.retain(|c| c != class);
    }

    /// Add or remove a class.
    pub fn set_class(&mut self, id: NodeId, class: &str, enabled: bool) {
        if enabled {
            self.add_class(id, class);
        } else {
            self.remove_class(id, class);
        }
    }

    /// Whether `id` carries `class`.
    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.node(id).classes.iter().any(|c| c == class)
    }

    /// Set an attribute.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        self.node_mut(id).attrs.insert(name.to_owned(), value.into());
    }

    /// Read an attribute.
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).attrs.get(name).map(String::as_str)
    }

    /// Replace the opaque inner markup of `id`.
    pub fn set_inner_html(&mut self, id: NodeId, html: impl Into<String>) {
        self.node_mut(id).inner_html = html.into();
    }

    /// Whether element `id` matches `selector`.
    #[must_use]
    pub fn matches(&self, id: NodeId, selector: &str) -> bool {
        Selector::parse(selector).is_some_and(|s| s.matches(self.node(id)))
    }

    /// Every descendant of `root` matching `selector`, in document order.
    #[must_use]
    pub fn query_all(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        let Some(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        self.descendants(root)
            .into_iter()
            .filter(|&id| selector.matches(self.node(id)))
            .collect()
    }

    /// First descendant of `root` matching `selector`.
    #[must_use]
    pub fn query_first(&self, root: NodeId, selector: &str) -> Option<NodeId> {
        let selector = Selector::parse(selector)?;
        self.descendants(root)
            .into_iter()
            .find(|&id| selector.matches(self.node(id)))
    }
}

/// Detach `node` from the document. Returns whether it was attached.
pub fn remove_element(dom: &mut Dom, node: NodeId) -> bool {
    let attached = dom.parent(node).is_some();
    dom.detach(node);
    attached
}

/// Detach every node in `nodes`. Returns how many were attached.
pub fn remove_all(dom: &mut Dom, nodes: &[NodeId]) -> usize {
    nodes
        .iter()
        .filter(|&&node| remove_element(dom, node))
        .count()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() || input.contains(char::is_whitespace) {
            return None;
        }
        let mut out = Self::default();
        let mut rest = input;
        let tag_end = rest.find(['.', '#']).unwrap_or(rest.len());
        if tag_end > 0 {
            let tag = &rest[..tag_end];
            if tag != "*" {
                out.tag = Some(tag.to_ascii_lowercase());
            }
        }
        rest = &rest[tag_end..];
        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['.', '#']).unwrap_or(body.len());
            let name = &body[..end];
            if name.is_empty() {
                return None;
            }
            match marker {
                '.' => out.classes.push(name.to_owned()),
                _ => out.id = Some(name.to_owned()),
            }
            rest = &body[end..];
        }
        Some(out)
    }

    fn matches(&self, node: &Node) -> bool {
        node.kind == NodeKind::Element
            && self.tag.as_deref().is_none_or(|t| t == node.tag)
            && self
                .id
                .as_deref()
                .is_none_or(|id| node.attrs.get("id").is_some_and(|v| v == id))
            && self
                .classes
                .iter()
                .all(|c| node.classes.iter().any(|have| have == c))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Selector(Vec<Compound>);

impl Selector {
    fn parse(input: &str) -> Option<Self> {
        input
            .split(',')
            .map(Compound::parse)
            .collect::<Option<Vec<_>>>()
            .map(Self)
    }

    fn matches(&self, node: &Node) -> bool {
        self.0.iter().any(|c| c.matches(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> (Dom, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let nav = dom.create_element("nav");
        dom.set_attr(nav, "id", "main");
        dom.append_child(dom.body(), nav);
        let ul = dom.create_element("ul");
        dom.add_class(ul, "menu");
        dom.append_child(nav, ul);
        let li = dom.create_element("li");
        dom.append_child(ul, li);
        (dom, nav, ul, li)
    }

    #[test]
    fn selector_forms() {
        let (dom, nav, ul, _) = sample();
        assert_eq!(dom.query_all(dom.root(), "nav"), vec![nav]);
        assert_eq!(dom.query_all(dom.root(), "#main"), vec![nav]);
        assert_eq!(dom.query_all(dom.root(), "ul.menu"), vec![ul]);
        assert_eq!(dom.query_all(dom.root(), ".menu, nav"), vec![nav, ul]);
        assert!(dom.query_all(dom.root(), "nav ul").is_empty());
        assert!(dom.query_all(dom.root(), "ul.").is_empty());
    }

    #[test]
    fn insert_after_and_before() {
        let (mut dom, nav, ul, li) = sample();
        let tail = dom.create_element("div");
        dom.insert_after(ul, tail);
        assert_eq!(dom.children(nav), &[ul, tail]);

        let head = dom.create_element("li");
        dom.insert_before(ul, head, Some(li));
        assert_eq!(dom.children(ul), &[head, li]);
    }

    #[test]
    fn moving_a_node_detaches_it_first() {
        let (mut dom, nav, ul, li) = sample();
        dom.append_child(nav, li);
        assert!(dom.children(ul).is_empty());
        assert_eq!(dom.parent(li), Some(nav));
    }

    #[test]
    fn remove_helpers_report_attachment() {
        let (mut dom, nav, ul, li) = sample();
        assert!(remove_element(&mut dom, li));
        assert!(!remove_element(&mut dom, li));
        assert_eq!(remove_all(&mut dom, &[li, ul]), 1);
        assert!(dom.is_connected(nav));
        assert!(!dom.is_connected(ul));
    }

    #[test]
    fn text_nodes_never_match() {
        let (mut dom, nav, _, _) = sample();
        let text = dom.create_text(" ");
        dom.append_child(nav, text);
        assert!(!dom.matches(text, "*"));
        assert_eq!(dom.element_children(nav).len(), 1);
    }
}
