#![forbid(unsafe_code)]

//! The document collaborator.
//!
//! The overflow engine never owns markup. It reads layout through
//! [`NavHost`] and asks the host to move existing items between two
//! existing containers. Instance discovery and scaffold creation, which
//! only happen at setup, live on the [`NavDocument`] extension trait.
//!
//! Hosts are expected to be cheap to query: the engine re-reads widths
//! after every single move.

use bitflags::bitflags;

use crate::config::NavConfig;
use crate::width::ViewportMetrics;

/// Opaque handle to a node owned by the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node classification relevant to width summing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// An element box.
    Element,
    /// A text node (whitespace between inline items); never measured.
    Text,
    /// Anything else (comments, processing instructions).
    Other,
}

/// The nodes that make up one navigation instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavParts {
    /// The outer navigation container.
    pub wrapper: NodeId,
    /// The list holding visible items.
    pub main_nav: NodeId,
    /// The inline container holding toggle and dropdown.
    pub toggle_wrapper: NodeId,
    /// The list holding hidden items.
    pub dropdown: NodeId,
    /// The button that opens the dropdown.
    pub toggle: NodeId,
}

bitflags! {
    /// Presentation state the engine has pushed to the host.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NavMarkers: u8 {
        /// The toggle is shown (at least one hidden item).
        const TOGGLE_VISIBLE = 1 << 0;
        /// Every item is collapsed into the dropdown.
        const FULL = 1 << 1;
        /// The dropdown panel is open.
        const OPEN = 1 << 2;
    }
}

/// Layout reads and item moves for one document.
///
/// Reads mirror the browser primitives they stand in for (`clientWidth`,
/// computed padding, `offsetWidth`, `childNodes`); the arithmetic on top
/// of them belongs to the width probe, not to hosts.
pub trait NavHost {
    /// `clientWidth` of `node`, or `None` when detached.
    fn client_width(&self, node: NodeId) -> Option<f64>;

    /// Computed `(padding-left, padding-right)` of `node`.
    fn inline_padding(&self, node: NodeId) -> (f64, f64);

    /// `offsetWidth` of `node`, or `None` when it cannot be measured.
    fn offset_width(&self, node: NodeId) -> Option<f64>;

    /// Child nodes of `node` in document order, text nodes included.
    fn child_nodes(&self, node: NodeId) -> Vec<NodeId>;

    /// Kind of `node`.
    fn node_kind(&self, node: NodeId) -> NodeKind;

    /// Parent of `node`, if attached.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Current viewport reads.
    fn viewport(&self) -> ViewportMetrics;

    /// Number of items currently in the visible list.
    fn visible_count(&self, parts: &NavParts) -> usize;

    /// Number of items currently in the dropdown.
    fn dropdown_count(&self, parts: &NavParts) -> usize;

    /// Move the last visible item to the front of the dropdown.
    ///
    /// Returns the moved item, or `None` when the visible list is empty.
    fn move_last_visible_to_dropdown_front(&mut self, parts: &NavParts) -> Option<NodeId>;

    /// Move the first dropdown item to the end of the visible list.
    ///
    /// Returns the moved item, or `None` when the dropdown is empty.
    fn move_dropdown_front_to_visible_end(&mut self, parts: &NavParts) -> Option<NodeId>;

    /// Replace the toggle's label and icon markup.
    fn set_toggle_label(&mut self, parts: &NavParts, label: &str, icon: &str);

    /// Publish the number of hidden items.
    fn set_hidden_count(&mut self, parts: &NavParts, count: usize);

    /// Show or hide the toggle.
    fn set_toggle_visibility(&mut self, parts: &NavParts, visible: bool);

    /// Mark the wrapper as fully collapsed (`true`) or not.
    fn set_wrapper_full_state(&mut self, parts: &NavParts, full: bool);

    /// Open or close the dropdown panel.
    fn set_dropdown_open(&mut self, parts: &NavParts, open: bool);
}

/// Setup-time document operations.
pub trait NavDocument: NavHost {
    /// All elements matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Vec<NodeId>;

    /// First descendant of `root` matching `selector`.
    fn query_within(&self, root: NodeId, selector: &str) -> Option<NodeId>;

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

    /// Insert toggle wrapper, toggle and dropdown right after `main_nav`.
    ///
    /// The returned parts are not trusted blindly: setup re-queries the
    /// dropdown and toggle by their configured class names.
    fn build_scaffold(&mut self, wrapper: NodeId, main_nav: NodeId, config: &NavConfig)
    -> NavParts;

    /// Remove everything [`build_scaffold`](Self::build_scaffold) inserted.
    fn remove_scaffold(&mut self, parts: &NavParts);

    /// Add or remove a class on the document root element.
    fn set_root_class(&mut self, class: &str, enabled: bool);
}

