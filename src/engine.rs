//! The one-call pipeline: filter -> series -> extrema/ticks/viewport.
//!
//! Every call is a full, synchronous recomputation from its inputs. The
//! caller re-invokes on any input change (filter, zoom, pan, entities,
//! active metrics); superseded results are simply discarded.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;

use crate::compose::{compose_entities, EntityUpdates, MergedPoint};
use crate::extrema::{find_extrema, MetricExtrema};
use crate::series::{build_series, Metric, PlotPoint, SeriesConfig};
use crate::ticks::{plan_ticks_dense, Granularity, DEFAULT_TICK_DENSITY};
use crate::timerange::{filter_updates, RangeSpec};
use crate::update::UpdateRecord;
use crate::viewport::{x_domain, x_domain_of, y_domain, y_domain_of, AxisDomain, ZoomPan};

/// Everything one chart computation needs, passed explicitly per call.
#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub range: RangeSpec,
    pub series: SeriesConfig,
    /// Metrics currently toggled on; drives extrema and the Y domain.
    pub metrics: Vec<Metric>,
    pub granularity: Granularity,
    /// Tick-count target for the planner's sparse-domain fallback.
    pub tick_density: u32,
    pub x: ZoomPan,
    pub y: ZoomPan,
    /// Caller-supplied "now" for rolling ranges; wall clock when absent.
    pub now_ms: Option<i64>,
}

impl Default for ChartRequest {
    fn default() -> Self {
        Self {
            range: RangeSpec::AllTime,
            series: SeriesConfig::default(),
            metrics: Metric::ALL.to_vec(),
            granularity: Granularity::Days,
            tick_density: DEFAULT_TICK_DENSITY,
            x: ZoomPan::default(),
            y: ZoomPan::default(),
            now_ms: None,
        }
    }
}

impl ChartRequest {
    /// Defaults with the tunable knobs read from the environment. Range,
    /// metrics, zoom and pan stay interactive state owned by the caller.
    pub fn from_env() -> Self {
        let granularity = match std::env::var("GRANULARITY").unwrap_or_default().as_str() {
            "hours" => Granularity::Hours,
            "weeks" => Granularity::Weeks,
            "months" => Granularity::Months,
            _ => Granularity::Days,
        };
        Self {
            series: SeriesConfig::from_env(),
            granularity,
            tick_density: std::env::var("TICK_DENSITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TICK_DENSITY),
            ..Self::default()
        }
    }
}

/// Plot-ready structure for the single-entity chart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOutput {
    pub points: Vec<PlotPoint>,
    pub extrema: BTreeMap<Metric, MetricExtrema>,
    pub ticks: Vec<i64>,
    pub x_domain: AxisDomain,
    pub y_domain: AxisDomain,
}

impl ChartOutput {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Plot-ready structure for the multi-entity overlay.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiChartOutput {
    pub points: Vec<MergedPoint>,
    pub ticks: Vec<i64>,
    pub x_domain: AxisDomain,
    pub y_domain: AxisDomain,
}

impl MultiChartOutput {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

fn resolve_now(req: &ChartRequest) -> i64 {
    req.now_ms.unwrap_or_else(|| Utc::now().timestamp_millis())
}

/// Ticks cover the effective (visible) window, so its true edges stay
/// labeled at any pan offset; density is already encoded in that window.
fn ticks_for(domain: AxisDomain, granularity: Granularity, density: u32) -> Vec<i64> {
    match domain.bounds() {
        Some((lo, hi)) => plan_ticks_dense(lo as i64, hi as i64, granularity, 1.0, density),
        None => Vec::new(),
    }
}

/// Build the full chart for one entity's updates.
pub fn build_chart(updates: &[UpdateRecord], req: &ChartRequest) -> ChartOutput {
    let filter = req.range.resolve(resolve_now(req));
    let filtered = filter_updates(updates, &filter);
    let points = build_series(&filtered, &req.series);

    let extrema = find_extrema(&points, &req.metrics);
    let x_domain = x_domain(&points, req.x);
    let y_domain = y_domain(&points, &req.metrics, req.y);
    let ticks = ticks_for(x_domain, req.granularity, req.tick_density);

    ChartOutput { points, extrema, ticks, x_domain, y_domain }
}

/// Build the merged overlay chart for two or more entities. Filtering and
/// series semantics are identical to [`build_chart`], applied per entity.
pub fn build_chart_multi(entities: &[EntityUpdates], req: &ChartRequest) -> MultiChartOutput {
    let filter = req.range.resolve(resolve_now(req));
    let filtered: Vec<EntityUpdates> = entities
        .iter()
        .map(|e| EntityUpdates {
            name: e.name.clone(),
            updates: filter_updates(&e.updates, &filter),
        })
        .collect();
    let points = compose_entities(&filtered, &req.series);

    let x_domain = match (points.first(), points.last()) {
        (Some(first), Some(last)) => x_domain_of(first.timestamp, last.timestamp, req.x),
        _ => AxisDomain::Auto,
    };
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for p in &points {
        for entity_values in p.values.values() {
            for m in &req.metrics {
                if let Some(&v) = entity_values.get(m) {
                    min = min.min(v);
                    max = max.max(v);
                }
            }
        }
    }
    let y_domain = y_domain_of(min, max, req.y);
    let ticks = ticks_for(x_domain, req.granularity, req.tick_density);

    MultiChartOutput { points, ticks, x_domain, y_domain }
}

// =============================================================================
// Tests
// =============================================================================
