//! Width measurement.
//!
//! Pure reads: nothing here mutates the host. Each helper mirrors one
//! browser measurement and sanitises the result into [`Px`].

use pnav_core::logging::TARGET_ENGINE;
use pnav_core::{NavHost, NavParts, NodeId, NodeKind, Px, WidthSnapshot};

/// Content width of `node`: `clientWidth` minus horizontal padding.
pub fn measure_content_width<H: NavHost + ?Sized>(host: &H, node: NodeId) -> Px {
    let client = Px::from_read(host.client_width(node));
    let (left, right) = host.inline_padding(node);
    client - Px::new(left) - Px::new(right)
}

/// Sum of `offsetWidth` over the element children of `node`.
///
/// Text nodes are skipped; children that cannot be measured count as zero.
pub fn measure_children_width<H: NavHost + ?Sized>(host: &H, node: NodeId) -> Px {
    host.child_nodes(node)
        .into_iter()
        .filter(|&child| host.node_kind(child) != NodeKind::Text)
        .map(|child| Px::from_read(host.offset_width(child)))
        .sum()
}

/// Effective `(width, height)` of the viewport.
pub fn measure_viewport<H: NavHost + ?Sized>(host: &H) -> (Px, Px) {
    host.viewport().effective()
}

/// Reads [`WidthSnapshot`]s for one instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct WidthProbe {
    offset: Px,
}

impl WidthProbe {
    /// Create a probe that biases the consumed width by `offset`.
    #[must_use]
    pub const fn new(offset: Px) -> Self {
        Self { offset }
    }

    /// Take a fresh snapshot.
    pub fn measure<H: NavHost + ?Sized>(&self, host: &H, parts: &NavParts) -> WidthSnapshot {
        let dropdown_width = if host.parent(parts.dropdown) == Some(parts.wrapper) {
            Px::from_read(host.offset_width(parts.dropdown))
        } else {
            Px::ZERO
        };
        let snapshot = WidthSnapshot {
            total_width: measure_content_width(host, parts.wrapper),
            rest_width: measure_children_width(host, parts.wrapper) + self.offset,
            dropdown_width,
            viewport_width: measure_viewport(host).0,
        };
        tracing::trace!(
            target: TARGET_ENGINE,
            total = snapshot.total_width.get(),
            rest = snapshot.rest_width.get(),
            dropdown = snapshot.dropdown_width.get(),
            viewport = snapshot.viewport_width.get(),
            "snapshot"
        );
        snapshot
    }
}
