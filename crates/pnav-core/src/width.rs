#![forbid(unsafe_code)]

//! Pixel widths and the per-pass width snapshot.
//!
//! Layout reads coming from a document are untrusted: detached elements
//! report `NaN`, computed padding can exceed the client box, and zoomed
//! viewports can report nonsense. [`Px`] absorbs all of that at
//! construction time so the decision logic only ever compares finite,
//! non-negative numbers.

use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// A finite, non-negative CSS pixel length.
///
/// # Invariants
///
/// - never `NaN` or infinite (sanitised to `0`)
/// - never negative (clamped to `0`)
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Px(f64);

impl Px {
    /// Zero width.
    pub const ZERO: Self = Self(0.0);

    /// Create a width, sanitising non-finite and negative input to zero.
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_finite() && value > 0.0 {
            Self(value)
        } else {
            Self::ZERO
        }
    }

    /// Create a width from an optional layout read (`None` counts as zero).
    #[must_use]
    pub fn from_read(value: Option<f64>) -> Self {
        value.map_or(Self::ZERO, Self::new)
    }

    /// The raw pixel value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    /// Whether the width is exactly zero.
    #[inline]
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }

    /// The smaller of two widths.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        if other.0 < self.0 { other } else { self }
    }
}

impl From<u32> for Px {
    fn from(value: u32) -> Self {
        Self::new(f64::from(value))
    }
}

impl Add for Px {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.0 + rhs.0)
    }
}

impl AddAssign for Px {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Saturating subtraction: never goes below zero.
impl Sub for Px {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.0 - rhs.0)
    }
}

impl std::iter::Sum for Px {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Px {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px", self.0)
    }
}

/// Raw viewport reads, as a browser reports them.
///
/// `client_*` is the document root's client box (or `body` in quirks
/// mode); `inner_*` is the window's inner size when the host exposes it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportMetrics {
    /// `documentElement.clientWidth`.
    pub client_width: Px,
    /// `documentElement.clientHeight`.
    pub client_height: Px,
    /// `window.innerWidth`, if available.
    pub inner_width: Option<Px>,
    /// `window.innerHeight`, if available.
    pub inner_height: Option<Px>,
}

impl ViewportMetrics {
    /// Metrics where the document and the window agree.
    #[must_use]
    pub fn uniform(width: Px, height: Px) -> Self {
        Self {
            client_width: width,
            client_height: height,
            inner_width: Some(width),
            inner_height: Some(height),
        }
    }

    /// Effective `(width, height)`.
    ///
    /// A pinch-zoomed mobile browser reports the document root wider than
    /// what is actually visible; in that case the window's inner size wins.
    /// An inner width of zero means "not reported" and is ignored.
    #[must_use]
    pub fn effective(&self) -> (Px, Px) {
        match self.inner_width {
            Some(inner) if !inner.is_zero() && self.client_width > inner => {
                (inner, self.inner_height.unwrap_or(self.client_height))
            }
            _ => (self.client_width, self.client_height),
        }
    }
}

/// Widths read at one instant of one navigation instance.
///
/// Recomputed after every single move; never cached across passes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WidthSnapshot {
    /// Content width of the wrapper (padding excluded).
    pub total_width: Px,
    /// Combined width of the wrapper's element children plus the offset bias.
    pub rest_width: Px,
    /// Width of the dropdown when it sits directly in the wrapper, else zero.
    pub dropdown_width: Px,
    /// Effective viewport width.
    pub viewport_width: Px,
}

impl WidthSnapshot {
    /// Items no longer fit: the consumed width reached the available width.
    #[inline]
    #[must_use]
    pub fn overflows(&self) -> bool {
        self.total_width <= self.rest_width
    }

    /// The viewport is narrower than `break_point`.
    #[inline]
    #[must_use]
    pub fn below_break_point(&self, break_point: Px) -> bool {
        self.viewport_width < break_point
    }

    /// The viewport is wider than `break_point` (strictly).
    #[inline]
    #[must_use]
    pub fn above_break_point(&self, break_point: Px) -> bool {
        self.viewport_width > break_point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_and_infinity_become_zero() {
        assert_eq!(Px::new(f64::NAN), Px::ZERO);
        assert_eq!(Px::new(f64::INFINITY), Px::ZERO);
        assert_eq!(Px::new(f64::NEG_INFINITY), Px::ZERO);
    }

    #[test]
    fn negative_is_clamped() {
        assert_eq!(Px::new(-12.5), Px::ZERO);
        assert_eq!(Px::new(40.0) - Px::new(55.0), Px::ZERO);
    }

    #[test]
    fn missing_read_is_zero() {
        assert_eq!(Px::from_read(None), Px::ZERO);
        assert_eq!(Px::from_read(Some(3.5)).get(), 3.5);
    }

    #[test]
    fn sum_of_widths() {
        let total: Px = [10u32, 20, 30].into_iter().map(Px::from).sum();
        assert_eq!(total, Px::from(60));
    }

    #[test]
    fn zoomed_viewport_uses_inner_width() {
        let metrics = ViewportMetrics {
            client_width: Px::from(980),
            client_height: Px::from(1600),
            inner_width: Some(Px::from(390)),
            inner_height: Some(Px::from(700)),
        };
        assert_eq!(metrics.effective(), (Px::from(390), Px::from(700)));
    }

    #[test]
    fn unzoomed_viewport_uses_client_width() {
        // Scrollbars make innerWidth slightly wider than clientWidth.
        let metrics = ViewportMetrics {
            client_width: Px::from(1009),
            client_height: Px::from(800),
            inner_width: Some(Px::from(1024)),
            inner_height: Some(Px::from(800)),
        };
        assert_eq!(metrics.effective().0, Px::from(1009));
    }

    #[test]
    fn missing_inner_width_falls_back() {
        let metrics = ViewportMetrics {
            client_width: Px::from(640),
            client_height: Px::from(480),
            inner_width: None,
            inner_height: None,
        };
        assert_eq!(metrics.effective(), (Px::from(640), Px::from(480)));
    }

    #[test]
    fn overflow_is_inclusive() {
        let snap = WidthSnapshot {
            total_width: Px::from(300),
            rest_width: Px::from(300),
            ..WidthSnapshot::default()
        };
        assert!(snap.overflows());
    }

    #[test]
    fn break_point_comparisons_are_strict() {
        let snap = WidthSnapshot {
            viewport_width: Px::from(500),
            ..WidthSnapshot::default()
        };
        assert!(!snap.below_break_point(Px::from(500)));
        assert!(!snap.above_break_point(Px::from(500)));
    }
}
