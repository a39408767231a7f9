#![forbid(unsafe_code)]

//! Viewport Resize Storm Generator
//!
//! Generates deterministic viewport-width sequences for replaying against a
//! navigation bar. The same seed always produces the same storm.
//!
//! # JSONL Schema
//!
//! ```json
//! {"event":"storm_resize","idx":0,"viewport_width":812,"delay_ms":10}
//! ```
//!
//! # Usage
//!
//! ```
//! use pnav_harness::resize_storm::{ResizeStorm, StormConfig, StormPattern};
//!
//! let config = StormConfig::default()
//!     .with_seed(42)
//!     .with_pattern(StormPattern::Burst { count: 50 });
//!
//! let storm = ResizeStorm::new(config);
//! assert_eq!(storm.events().len(), 50);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

// ============================================================================
// Configuration
// ============================================================================

/// Pattern type for resize storm generation.
#[derive(Debug, Clone, PartialEq)]
pub enum StormPattern {
    /// Rapid burst of small random resizes with short delays.
    Burst {
        /// Number of resize events.
        count: usize,
    },
    /// Gradual width sweep.
    Sweep {
        /// Starting viewport width.
        start_width: u32,
        /// Ending viewport width.
        end_width: u32,
        /// Number of steps.
        steps: usize,
    },
    /// Alternate between two widths.
    Oscillate {
        /// First width.
        width_a: u32,
        /// Second width.
        width_b: u32,
        /// Number of oscillations.
        cycles: usize,
    },
    /// Jump back and forth across a break point.
    BreakpointCrossing {
        /// The break point to straddle.
        break_point: u32,
        /// Maximum distance from the break point, in px.
        spread: u32,
        /// Number of events.
        count: usize,
    },
    /// Custom resize sequence.
    Custom {
        /// List of `(viewport_width, delay_ms)` tuples.
        events: Vec<(u32, u64)>,
    },
}

impl StormPattern {
    /// Get the pattern name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Burst { .. } => "burst",
            Self::Sweep { .. } => "sweep",
            Self::Oscillate { .. } => "oscillate",
            Self::BreakpointCrossing { .. } => "breakpoint_crossing",
            Self::Custom { .. } => "custom",
        }
    }

    /// Get the total number of events this pattern will generate.
    pub fn event_count(&self) -> usize {
        match self {
            Self::Burst { count } | Self::BreakpointCrossing { count, .. } => *count,
            Self::Sweep { steps, .. } => *steps,
            Self::Oscillate { cycles, .. } => cycles * 2,
            Self::Custom { events } => events.len(),
        }
    }
}

impl Default for StormPattern {
    fn default() -> Self {
        Self::Burst { count: 50 }
    }
}

/// Configuration for resize storm generation.
#[derive(Debug, Clone)]
pub struct StormConfig {
    /// Random seed for deterministic generation.
    pub seed: u64,
    /// Storm pattern to generate.
    pub pattern: StormPattern,
    /// Viewport width before the storm begins.
    pub initial_width: u32,
    /// Minimum delay between resizes (ms).
    pub min_delay_ms: u64,
    /// Maximum delay between resizes (ms).
    pub max_delay_ms: u64,
    /// Minimum viewport width.
    pub min_width: u32,
    /// Maximum viewport width.
    pub max_width: u32,
    /// Test case name for logging.
    pub case_name: String,
}

impl Default for StormConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            pattern: StormPattern::default(),
            initial_width: 1024,
            min_delay_ms: 5,
            max_delay_ms: 120,
            min_width: 240,
            max_width: 1600,
            case_name: "default".into(),
        }
    }
}

impl StormConfig {
    /// Set the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the storm pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: StormPattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Set the initial viewport width.
    #[must_use]
    pub fn with_initial_width(mut self, width: u32) -> Self {
        self.initial_width = width;
        self
    }

    /// Set delay range between resizes.
    #[must_use]
    pub fn with_delay_range(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.min_delay_ms = min_ms;
        self.max_delay_ms = max_ms;
        self
    }

    /// Set width bounds.
    #[must_use]
    pub fn with_width_bounds(mut self, min_width: u32, max_width: u32) -> Self {
        self.min_width = min_width;
        self.max_width = max_width;
        self
    }

    /// Set the test case name.
    #[must_use]
    pub fn with_case_name(mut self, name: impl Into<String>) -> Self {
        self.case_name = name.into();
        self
    }
}

// ============================================================================
// Seeded RNG
// ============================================================================

/// Simple LCG PRNG for deterministic generation.
#[derive(Debug, Clone)]
struct SeededRng {
    state: u64,
}

impl SeededRng {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        // LCG parameters from Numerical Recipes
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    fn next_range(&mut self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        min + (self.next_u64() % (max - min))
    }

    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        self.next_range(u64::from(min), u64::from(max)) as u32
    }

    fn chance(&mut self, p: f64) -> bool {
        ((self.next_u64() >> 11) as f64 / (1u64 << 53) as f64) < p
    }
}

// ============================================================================
// Resize Event
// ============================================================================

/// A single viewport resize in a storm sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResizeEvent {
    /// Target viewport width.
    pub viewport_width: u32,
    /// Delay before this resize (ms).
    pub delay_ms: u64,
    /// Index in the sequence.
    pub index: usize,
}

impl ResizeEvent {
    /// Create a new resize event.
    pub fn new(viewport_width: u32, delay_ms: u64, index: usize) -> Self {
        Self {
            viewport_width,
            delay_ms,
            index,
        }
    }

    /// Convert to a JSONL line.
    pub fn to_jsonl(&self) -> String {
        serde_json::json!({
            "event": "storm_resize",
            "idx": self.index,
            "viewport_width": self.viewport_width,
            "delay_ms": self.delay_ms,
        })
        .to_string()
    }
}

// ============================================================================
// Storm Generator
// ============================================================================

/// Resize storm generator.
#[derive(Debug, Clone)]
pub struct ResizeStorm {
    config: StormConfig,
    events: Vec<ResizeEvent>,
}

impl ResizeStorm {
    /// Create a new storm generator with the given configuration.
    pub fn new(config: StormConfig) -> Self {
        let mut storm = Self {
            config,
            events: Vec::new(),
        };
        storm.generate_events();
        storm
    }

    /// Get the generated events.
    pub fn events(&self) -> &[ResizeEvent] {
        &self.events
    }

    /// Get the configuration.
    pub fn config(&self) -> &StormConfig {
        &self.config
    }

    fn generate_events(&mut self) {
        let mut rng = SeededRng::new(self.config.seed);

        self.events = match &self.config.pattern {
            StormPattern::Burst { count } => self.generate_burst(&mut rng, *count),
            StormPattern::Sweep {
                start_width,
                end_width,
                steps,
            } => self.generate_sweep(*start_width, *end_width, *steps),
            StormPattern::Oscillate {
                width_a,
                width_b,
                cycles,
            } => self.generate_oscillate(&mut rng, *width_a, *width_b, *cycles),
            StormPattern::BreakpointCrossing {
                break_point,
                spread,
                count,
            } => self.generate_crossing(&mut rng, *break_point, *spread, *count),
            StormPattern::Custom { events } => events
                .iter()
                .enumerate()
                .map(|(i, &(w, d))| ResizeEvent::new(w, d, i))
                .collect(),
        };
    }

    fn clamp_width(&self, width: i64) -> u32 {
        width.clamp(
            i64::from(self.config.min_width),
            i64::from(self.config.max_width),
        ) as u32
    }

    fn generate_burst(&self, rng: &mut SeededRng, count: usize) -> Vec<ResizeEvent> {
        let mut events = Vec::with_capacity(count);
        let mut width = self.config.initial_width;

        for i in 0..count {
            // Rapid resizes, mostly inside one debounce window.
            let delay = rng.next_range(self.config.min_delay_ms, self.config.max_delay_ms / 4);
            let delta = i64::from(rng.next_u32_range(1, 80));
            let sign = if rng.chance(0.5) { 1 } else { -1 };
            width = self.clamp_width(i64::from(width) + delta * sign);
            events.push(ResizeEvent::new(width, delay, i));
        }
        events
    }

    fn generate_sweep(&self, start: u32, end: u32, steps: usize) -> Vec<ResizeEvent> {
        let delay = (self.config.min_delay_ms + self.config.max_delay_ms) / 2;
        (0..steps)
            .map(|i| {
                let t = if steps > 1 {
                    i as f64 / (steps - 1) as f64
                } else {
                    1.0
                };
                let width = (f64::from(start) + (f64::from(end) - f64::from(start)) * t).round();
                ResizeEvent::new(width as u32, delay, i)
            })
            .collect()
    }

    fn generate_oscillate(
        &self,
        rng: &mut SeededRng,
        width_a: u32,
        width_b: u32,
        cycles: usize,
    ) -> Vec<ResizeEvent> {
        let mut events = Vec::with_capacity(cycles * 2);
        for cycle in 0..cycles {
            let delay_a = rng.next_range(self.config.min_delay_ms, self.config.max_delay_ms);
            let delay_b = rng.next_range(self.config.min_delay_ms, self.config.max_delay_ms);
            events.push(ResizeEvent::new(width_a, delay_a, cycle * 2));
            events.push(ResizeEvent::new(width_b, delay_b, cycle * 2 + 1));
        }
        events
    }

    fn generate_crossing(
        &self,
        rng: &mut SeededRng,
        break_point: u32,
        spread: u32,
        count: usize,
    ) -> Vec<ResizeEvent> {
        (0..count)
            .map(|i| {
                let distance = i64::from(rng.next_u32_range(0, spread.max(1) + 1));
                // Alternate sides, landing exactly on the break point now and then.
                let width = match i % 3 {
                    0 => i64::from(break_point) - distance,
                    1 => i64::from(break_point) + distance,
                    _ => i64::from(break_point),
                };
                let delay = rng.next_range(self.config.min_delay_ms, self.config.max_delay_ms);
                ResizeEvent::new(self.clamp_width(width), delay, i)
            })
            .collect()
    }

    /// Compute a deterministic checksum of the event sequence.
    pub fn sequence_checksum(&self) -> String {
        let mut hasher = DefaultHasher::new();
        for event in &self.events {
            event.hash(&mut hasher);
        }
        format!("{:016x}", hasher.finish())
    }

    /// Get total duration of the storm (sum of delays).
    pub fn total_duration_ms(&self) -> u64 {
        self.events.iter().map(|e| e.delay_ms).sum()
    }
}
