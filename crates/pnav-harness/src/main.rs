#![forbid(unsafe_code)]

//! Resize storm runner.
//!
//! Replays one seeded storm against the default page and prints a summary.
//! Exits non-zero when any invariant fails.
//!
//! # Running
//!
//! ```sh
//! PNAV_HARNESS_SEED=42 PNAV_HARNESS_PATTERN=crossing cargo run -p pnav-harness
//! ```
//!
//! # Environment
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `PNAV_HARNESS_SEED` | storm seed | `0` |
//! | `PNAV_HARNESS_PATTERN` | `burst`, `sweep`, `oscillate`, `crossing` | `burst` |
//! | `PNAV_HARNESS_COUNT` | events in the storm | `50` |
//! | `PNAV_HARNESS_ITEMS` | comma-separated item widths | eight mixed widths |
//! | `PNAV_HARNESS_BREAK_POINT` | break point in px | `500` |
//! | `PNAV_HARNESS_THROTTLE_MS` | debounce window | `50` |
//! | `PNAV_HARNESS_JSONL` | write JSONL evidence to this path | unset |
//! | `PNAV_HARNESS_LOG_JSON` | JSON logs on stderr (`log-json` feature) | off |

use std::io::Write;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;

use pnav_core::Px;
use pnav_harness::{PageSpec, ResizeStorm, StormConfig, StormPattern, replay};

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.trim().parse().ok()
}

fn env_flag(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let enabled = matches!(
        trimmed,
        "1" | "true" | "TRUE" | "True" | "yes" | "YES" | "on" | "ON"
    );
    Some(enabled)
}

fn pattern_from_env(count: usize, break_point: u32) -> StormPattern {
    match std::env::var("PNAV_HARNESS_PATTERN").as_deref() {
        Ok("sweep") => StormPattern::Sweep {
            start_width: 1600,
            end_width: 240,
            steps: count,
        },
        Ok("oscillate") => StormPattern::Oscillate {
            width_a: 420,
            width_b: 1280,
            cycles: count.div_ceil(2),
        },
        Ok("crossing") => StormPattern::BreakpointCrossing {
            break_point,
            spread: 120,
            count,
        },
        _ => StormPattern::Burst { count },
    }
}

fn page_from_env(break_point: u32) -> PageSpec {
    let mut page = PageSpec::default();
    if let Ok(items) = std::env::var("PNAV_HARNESS_ITEMS") {
        let widths: Vec<f64> = items
            .split(',')
            .filter_map(|w| w.trim().parse().ok())
            .collect();
        if !widths.is_empty() {
            page.item_widths = widths;
        }
    }
    let throttle = env_parse::<u64>("PNAV_HARNESS_THROTTLE_MS").unwrap_or(50);
    page.config = page
        .config
        .with_break_point(Px::from(break_point))
        .with_throttle_delay(Duration::from_millis(throttle));
    page
}

fn main() -> ExitCode {
    if env_flag("PNAV_HARNESS_LOG_JSON").unwrap_or(false) {
        #[cfg(feature = "log-json")]
        pnav_core::logging::init_json_logging();
        #[cfg(not(feature = "log-json"))]
        eprintln!("PNAV_HARNESS_LOG_JSON requires the log-json feature");
    }

    let seed = env_parse::<u64>("PNAV_HARNESS_SEED").unwrap_or(0);
    let count = env_parse::<usize>("PNAV_HARNESS_COUNT").unwrap_or(50);
    let break_point = env_parse::<u32>("PNAV_HARNESS_BREAK_POINT").unwrap_or(500);

    let pattern = pattern_from_env(count, break_point);
    let storm = ResizeStorm::new(
        StormConfig::default()
            .with_seed(seed)
            .with_case_name(pattern.name())
            .with_pattern(pattern),
    );
    let page = page_from_env(break_point);

    let outcome = match replay(&storm, &page) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Ok(path) = std::env::var("PNAV_HARNESS_JSONL") {
        let written = std::fs::File::create(&path).and_then(|mut file| {
            for line in &outcome.jsonl {
                writeln!(file, "{line}")?;
            }
            Ok(())
        });
        if let Err(err) = written {
            eprintln!("error: cannot write {path}: {err}");
            return ExitCode::FAILURE;
        }
    }

    println!(
        "{} seed={} resizes={} passes={} moves={} checksum={}",
        if outcome.passed { "PASS" } else { "FAIL" },
        seed,
        outcome.total_resizes,
        outcome.passes,
        outcome.moves,
        storm.sequence_checksum(),
    );
    for violation in &outcome.violations {
        println!("  {violation}");
    }

    if outcome.passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
