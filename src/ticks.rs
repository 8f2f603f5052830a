//! Zoom-aware X-axis tick planning.
//!
//! Ticks are anchored to the exact domain boundaries rather than globally
//! rounded: the visible window's true edges must stay labeled even when the
//! user has panned to an odd offset.

use serde::{Deserialize, Serialize};

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 86_400_000;

/// Fraction of the tick interval around each boundary where generated
/// ticks are suppressed to avoid crowding the boundary labels.
const BOUNDARY_GUARD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hours,
    Days,
    Weeks,
    Months,
}

impl Granularity {
    /// Minimum tick interval implied by the user's granularity selection.
    fn floor_ms(self) -> i64 {
        match self {
            Granularity::Hours => HOUR_MS,
            Granularity::Days => DAY_MS,
            Granularity::Weeks => 7 * DAY_MS,
            Granularity::Months => 30 * DAY_MS,
        }
    }
}

/// Interval lookup keyed by how much of the domain is actually visible.
fn pick_interval(visible_ms: i64) -> i64 {
    match visible_ms {
        v if v <= 12 * HOUR_MS => HOUR_MS,
        v if v <= 36 * HOUR_MS => 2 * HOUR_MS,
        v if v <= 72 * HOUR_MS => 6 * HOUR_MS,
        v if v <= 7 * DAY_MS => 12 * HOUR_MS,
        v if v <= 21 * DAY_MS => DAY_MS,
        v if v <= 60 * DAY_MS => 2 * DAY_MS,
        _ => 7 * DAY_MS,
    }
}

/// Tick-count target for the sparse-domain fallback interval.
pub const DEFAULT_TICK_DENSITY: u32 = 8;

/// Plan tick timestamps for `[start, end]` under the given zoom factor.
/// The output always begins with `start` and ends with `end`.
pub fn plan_ticks(start: i64, end: i64, granularity: Granularity, zoom: f64) -> Vec<i64> {
    plan_ticks_dense(start, end, granularity, zoom, DEFAULT_TICK_DENSITY)
}

/// [`plan_ticks`] with an explicit density target: when the interval table
/// leaves fewer than 3 ticks on a >1h domain, the fallback interval becomes
/// `max(30min, range / density)`.
pub fn plan_ticks_dense(
    start: i64,
    end: i64,
    granularity: Granularity,
    zoom: f64,
    density: u32,
) -> Vec<i64> {
    if end <= start {
        return vec![start];
    }
    let range = end - start;
    let zoom = zoom.max(1.0);
    let visible = (range as f64 / zoom) as i64;
    let interval = pick_interval(visible).max(granularity.floor_ms());

    let ticks = walk(start, end, interval);
    if ticks.len() < 3 && range > HOUR_MS {
        // Too sparse for the domain: density-driven fallback interval.
        let fallback = (range / i64::from(density.max(1))).max(30 * MINUTE_MS);
        return walk(start, end, fallback);
    }
    ticks
}

fn walk(start: i64, end: i64, interval: i64) -> Vec<i64> {
    let guard = (BOUNDARY_GUARD * interval as f64) as i64;
    let mut ticks = vec![start];
    let mut t = start + interval;
    while t < end {
        if t - start >= guard && end - t >= guard {
            ticks.push(t);
        }
        t += interval;
    }
    ticks.push(end);
    ticks
}

// =============================================================================
// Tests
// =============================================================================
