//! SeriesBuilder: turns an ordered update sequence into plot-ready points.
//!
//! The hard part is the accounting: each update is either a fresh absolute
//! snapshot (its profit replaces the running total) or a comparison-mode
//! delta (its profit adds onto the running total), and each update expands
//! into up to two points (interval start + end) under overlap-suppression
//! rules that keep the rendered line continuous.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::update::{parse_decimal, UpdateRecord, UpdateStatus};

const HOUR_MS_F: f64 = 3_600_000.0;

/// The fixed metric set. Every plot point carries a value for all five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Capital,
    TotalProfit,
    TotalProfitPercent,
    AvgProfitPerDay,
    RealProfitPerDay,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Capital,
        Metric::TotalProfit,
        Metric::TotalProfitPercent,
        Metric::AvgProfitPerDay,
        Metric::RealProfitPerDay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Capital => "capital",
            Metric::TotalProfit => "totalProfit",
            Metric::TotalProfitPercent => "totalProfitPercent",
            Metric::AvgProfitPerDay => "avgProfitPerDay",
            Metric::RealProfitPerDay => "realProfitPerDay",
        }
    }
}

/// Which investment field feeds the `capital` metric (and the percent base).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapitalBase {
    TotalInvestment,
    BaseInvestment,
}

/// Per-call builder configuration. The tolerance and epsilon defaults are
/// carried over from the original behavior, not re-derived.
#[derive(Debug, Clone)]
pub struct SeriesConfig {
    pub capital_base: CapitalBase,
    /// Comparison mode triggers when |gridProfitTotal − absolute| exceeds this.
    pub comparison_epsilon: f64,
    /// Start/end points closer than this are treated as the same instant.
    pub overlap_tolerance_ms: i64,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            capital_base: CapitalBase::TotalInvestment,
            comparison_epsilon: 0.01,
            overlap_tolerance_ms: 60_000,
        }
    }
}

impl SeriesConfig {
    pub fn from_env() -> Self {
        let capital_base = match std::env::var("CAPITAL_BASE").unwrap_or_default().as_str() {
            "base" => CapitalBase::BaseInvestment,
            _ => CapitalBase::TotalInvestment,
        };
        Self {
            capital_base,
            comparison_epsilon: std::env::var("COMPARISON_EPSILON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.01),
            overlap_tolerance_ms: std::env::var("OVERLAP_TOLERANCE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60_000),
        }
    }
}

/// One renderable point of the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotPoint {
    pub timestamp: i64,
    pub is_start_point: bool,
    pub version: u32,
    pub status: UpdateStatus,
    pub values: BTreeMap<Metric, f64>,
    /// Present only on interval end points (UpdateMetrics).
    pub runtime_ms: Option<i64>,
    /// This point continues the prior cumulative sum instead of starting
    /// fresh at zero.
    pub is_comparison_carry: bool,
    /// This end point's values double as the next comparison update's
    /// implicit start; lets a consumer draw a seam annotation without
    /// duplicating geometry.
    pub carries_forward: bool,
}

fn metric_values(
    capital: f64,
    total_profit: f64,
    avg_per_day: f64,
    real_per_day: f64,
) -> BTreeMap<Metric, f64> {
    let percent = if capital > 0.0 {
        total_profit / capital * 100.0
    } else {
        0.0
    };
    BTreeMap::from([
        (Metric::Capital, capital),
        (Metric::TotalProfit, total_profit),
        (Metric::TotalProfitPercent, percent),
        (Metric::AvgProfitPerDay, avg_per_day),
        (Metric::RealProfitPerDay, real_per_day),
    ])
}

/// Build the plot point sequence for one entity.
///
/// `updates` must already be filtered and ordered by resolved timestamp
/// (see [`crate::timerange::filter_updates`]). Deterministic: identical
/// input produces identical output, no state survives the call.
pub fn build_series(updates: &[UpdateRecord], cfg: &SeriesConfig) -> Vec<PlotPoint> {
    let mut points: Vec<PlotPoint> = Vec::with_capacity(updates.len() * 2);
    let mut end_indices: Vec<usize> = Vec::with_capacity(updates.len());
    let mut comparison_flags: Vec<bool> = Vec::with_capacity(updates.len());
    let mut running_total = 0.0_f64;
    let mut last_end_ts: Option<i64> = None;

    for (i, u) in updates.iter().enumerate() {
        let end_ts = u.end_ts();
        let start_ts = u.start_ts().unwrap_or(end_ts);
        let comparison = u.is_comparison(cfg.comparison_epsilon);
        comparison_flags.push(comparison);

        let raw = match u.status {
            UpdateStatus::UpdateMetrics => parse_decimal(u.grid_profit_total.as_deref()),
            UpdateStatus::ClosedBots => parse_decimal(u.profit.as_deref()),
        };
        // The very first update has no prior baseline: always absolute.
        let carried = comparison && i > 0;
        running_total = if carried { running_total + raw } else { raw };

        let capital = match cfg.capital_base {
            CapitalBase::TotalInvestment => parse_decimal(u.total_investment.as_deref()),
            CapitalBase::BaseInvestment => parse_decimal(u.base_investment.as_deref()),
        };
        let avg_per_day = parse_decimal(u.avg_grid_profit_per_day.as_deref());
        let runtime_ms = end_ts - start_ts;
        let real_per_day = match u.status {
            UpdateStatus::UpdateMetrics => {
                let runtime_hours = runtime_ms as f64 / HOUR_MS_F;
                if runtime_hours > 0.0 {
                    running_total / (runtime_hours / 24.0)
                } else {
                    0.0
                }
            }
            UpdateStatus::ClosedBots => 0.0,
        };

        // Start point: only for a genuine interval (start present, before the
        // end by more than the tolerance, not a terminal snapshot). Carried
        // comparison updates skip it so the line flows on from the previous
        // end point; the very first rendered update always gets one so the
        // opening segment is not truncated.
        let has_interval = u.start_ts().is_some()
            && end_ts - start_ts > cfg.overlap_tolerance_ms
            && u.status == UpdateStatus::UpdateMetrics;
        let emit_start = if points.is_empty() {
            has_interval
        } else {
            has_interval
                && !comparison
                && last_end_ts.map_or(true, |prev| start_ts - prev > cfg.overlap_tolerance_ms)
        };
        if emit_start {
            // Interval baseline: the update's capital, profit curve at zero.
            points.push(PlotPoint {
                timestamp: start_ts,
                is_start_point: true,
                version: u.version,
                status: u.status,
                values: metric_values(capital, 0.0, 0.0, 0.0),
                runtime_ms: None,
                is_comparison_carry: false,
                carries_forward: false,
            });
        }

        end_indices.push(points.len());
        points.push(PlotPoint {
            timestamp: end_ts,
            is_start_point: false,
            version: u.version,
            status: u.status,
            values: metric_values(capital, running_total, avg_per_day, real_per_day),
            runtime_ms: (u.status == UpdateStatus::UpdateMetrics).then_some(runtime_ms),
            is_comparison_carry: carried,
            carries_forward: false,
        });
        last_end_ts = Some(end_ts);
    }

    // Second pass: an end point whose successor is a comparison update
    // doubles as that successor's implicit start.
    for (i, &idx) in end_indices.iter().enumerate() {
        if comparison_flags.get(i + 1).copied().unwrap_or(false) {
            points[idx].carries_forward = true;
        }
    }

    points
}

// =============================================================================
// Tests
// =============================================================================
