//! Recorded break widths.
//!
//! Every time an item is hidden, the consumed width at that moment is
//! pushed. The top of the stack is the width the wrapper must reach again
//! before the most recently hidden item may return.
//!
//! # Invariants
//!
//! - `size()` equals the number of items in the instance's dropdown.
//! - Pops happen in exact reverse order of pushes.

use pnav_core::Px;

/// Last-in-first-out stack of break widths for one instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BreakHistory {
    breaks: Vec<Px>,
}

impl BreakHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the break width of an item that was just hidden.
    pub fn push(&mut self, width: Px) {
        self.breaks.push(width);
    }

    /// Remove and return the most recent break width.
    ///
    /// Returns `None` on an empty history; the engine never pops more than
    /// it pushed, so that only happens on misuse.
    pub fn pop(&mut self) -> Option<Px> {
        self.breaks.pop()
    }

    /// The restore threshold for the most recently hidden item.
    #[must_use]
    pub fn peek_top(&self) -> Option<Px> {
        self.breaks.last().copied()
    }

    /// Number of recorded breaks.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.breaks.len()
    }

    /// Whether no item is hidden.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.breaks.is_empty()
    }

    /// Breaks in push order (oldest first).
    #[must_use]
    pub fn as_slice(&self) -> &[Px] {
        &self.breaks
    }

    /// Forget every break.
    pub fn clear(&mut self) {
        self.breaks.clear();
    }
}
