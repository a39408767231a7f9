#![forbid(unsafe_code)]

//! Navigation options.
//!
//! [`NavConfig`] is owned by the caller and read-only to the engine. All
//! options have the defaults a plain `<nav><ul>…</ul></nav>` page expects;
//! override them with the `with_*` builders.
//!
//! # Validation
//!
//! Class-name options are class names, not selectors. A value containing
//! `.` or `#` is rejected by [`NavConfig::validate`] and aborts the whole
//! initialization, not just one instance.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::width::Px;

/// Callback invoked once per moved item.
pub type MoveCallback = Arc<dyn Fn() + Send + Sync>;

/// Which toggle label is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LabelVariant {
    /// "More" style label while some items are still inline.
    #[default]
    Normal,
    /// "Menu" style label below the break point or when fully collapsed.
    Breakpoint,
}

/// Toggle label text and icon markup for both variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLabels {
    /// Label while items still fit partially.
    pub dropdown_label: String,
    /// Icon markup appended after [`dropdown_label`](Self::dropdown_label).
    pub dropdown_icon: String,
    /// Label once the break point is reached.
    pub breakpoint_label: String,
    /// Icon markup appended after [`breakpoint_label`](Self::breakpoint_label).
    pub breakpoint_icon: String,
}

impl Default for NavLabels {
    fn default() -> Self {
        Self {
            dropdown_label: "More".into(),
            dropdown_icon: String::new(),
            breakpoint_label: "Menu".into(),
            breakpoint_icon: String::new(),
        }
    }
}

impl NavLabels {
    /// `(label, icon)` for a variant.
    #[must_use]
    pub fn get(&self, variant: LabelVariant) -> (&str, &str) {
        match variant {
            LabelVariant::Normal => (&self.dropdown_label, &self.dropdown_icon),
            LabelVariant::Breakpoint => (&self.breakpoint_label, &self.breakpoint_icon),
        }
    }
}

/// `moved` / `moved_back` notifications.
///
/// Both fire synchronously, once per item, in the order items move.
#[derive(Clone, Default)]
pub struct NavCallbacks {
    moved: Option<MoveCallback>,
    moved_back: Option<MoveCallback>,
}

impl fmt::Debug for NavCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavCallbacks")
            .field("moved", &self.moved.is_some())
            .field("moved_back", &self.moved_back.is_some())
            .finish()
    }
}

impl NavCallbacks {
    /// Set the callback fired when an item moves into the dropdown.
    #[must_use]
    pub fn on_moved<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.moved = Some(Arc::new(callback));
        self
    }

    /// Set the callback fired when an item moves back inline.
    #[must_use]
    pub fn on_moved_back<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.moved_back = Some(Arc::new(callback));
        self
    }

    /// Fire the `moved` callback, if set.
    pub fn fire_moved(&self) {
        if let Some(ref cb) = self.moved {
            cb();
        }
    }

    /// Fire the `moved_back` callback, if set.
    pub fn fire_moved_back(&self) {
        if let Some(ref cb) = self.moved_back {
            cb();
        }
    }
}

/// Options recognised by `initialize`.
#[derive(Debug, Clone)]
pub struct NavConfig {
    /// Class added to the document root once initialized.
    pub init_class: String,
    /// Selector matching every navigation wrapper on the page.
    pub main_nav_wrapper: String,
    /// Selector for the item list; must match a direct child of the wrapper.
    pub main_nav: String,
    /// Extra class for the dropdown list (a class name, not a selector).
    pub nav_dropdown_class_name: String,
    /// Extra class for the toggle button (a class name, not a selector).
    pub nav_dropdown_toggle_class_name: String,
    /// Toggle labels and icons.
    pub labels: NavLabels,
    /// Viewport width below which every item is forced into the dropdown.
    pub break_point: Px,
    /// Debounce window for repeated triggers.
    pub throttle_delay: Duration,
    /// Bias added to the consumed width before comparing.
    pub offset_pixels: Px,
    /// Publish the hidden-item count on the toggle.
    pub count_enabled: bool,
    /// Move notifications.
    pub callbacks: NavCallbacks,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            init_class: "js-priorityNav".into(),
            main_nav_wrapper: "nav".into(),
            main_nav: "ul".into(),
            nav_dropdown_class_name: "nav__dropdown".into(),
            nav_dropdown_toggle_class_name: "nav__dropdown-toggle".into(),
            labels: NavLabels::default(),
            break_point: Px::from(500),
            throttle_delay: Duration::from_millis(50),
            offset_pixels: Px::ZERO,
            count_enabled: true,
            callbacks: NavCallbacks::default(),
        }
    }
}

impl NavConfig {
    /// Set the wrapper selector.
    #[must_use]
    pub fn with_main_nav_wrapper(mut self, selector: impl Into<String>) -> Self {
        self.main_nav_wrapper = selector.into();
        self
    }

    /// Set the item list selector.
    #[must_use]
    pub fn with_main_nav(mut self, selector: impl Into<String>) -> Self {
        self.main_nav = selector.into();
        self
    }

    /// Set the dropdown and toggle class names.
    #[must_use]
    pub fn with_class_names(
        mut self,
        dropdown: impl Into<String>,
        toggle: impl Into<String>,
    ) -> Self {
        self.nav_dropdown_class_name = dropdown.into();
        self.nav_dropdown_toggle_class_name = toggle.into();
        self
    }

    /// Set the root init class.
    #[must_use]
    pub fn with_init_class(mut self, class: impl Into<String>) -> Self {
        self.init_class = class.into();
        self
    }

    /// Set the toggle labels.
    #[must_use]
    pub fn with_labels(mut self, labels: NavLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Set the forced-collapse viewport width.
    #[must_use]
    pub fn with_break_point(mut self, width: Px) -> Self {
        self.break_point = width;
        self
    }

    /// Set the debounce window.
    #[must_use]
    pub fn with_throttle_delay(mut self, delay: Duration) -> Self {
        self.throttle_delay = delay;
        self
    }

    /// Set the consumed-width bias.
    #[must_use]
    pub fn with_offset_pixels(mut self, offset: Px) -> Self {
        self.offset_pixels = offset;
        self
    }

    /// Enable or disable the hidden-item count.
    #[must_use]
    pub fn with_count(mut self, enabled: bool) -> Self {
        self.count_enabled = enabled;
        self
    }

    /// Set the move callbacks.
    #[must_use]
    pub fn with_callbacks(mut self, callbacks: NavCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Check the options before any document work starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (option, value) in [
            ("main_nav_wrapper", &self.main_nav_wrapper),
            ("main_nav", &self.main_nav),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptySelector { option });
            }
        }
        for (option, value) in [
            ("nav_dropdown_class_name", &self.nav_dropdown_class_name),
            (
                "nav_dropdown_toggle_class_name",
                &self.nav_dropdown_toggle_class_name,
            ),
        ] {
            if value.contains(['.', '#']) {
                crate::logging::warn!(
                    target: crate::logging::TARGET_CONFIG,
                    option,
                    value = value.as_str(),
                    "class name options must not contain selector symbols"
                );
                return Err(ConfigError::SelectorInClassName {
                    option,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Rejected options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A class-name option looks like a selector (`.x`, `#x`).
    SelectorInClassName {
        /// Option name.
        option: &'static str,
        /// Offending value.
        value: String,
    },
    /// A selector option is empty.
    EmptySelector {
        /// Option name.
        option: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelectorInClassName { option, value } => write!(
                f,
                "{option} must be a class name, not a selector (got {value:?})"
            ),
            Self::EmptySelector { option } => write!(f, "{option} must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}
