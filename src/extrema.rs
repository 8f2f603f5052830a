//! Extrema markers: per-metric maximum/minimum annotations with label
//! placement that avoids the line and other markers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::series::{Metric, PlotPoint};

const DEFAULT_OFFSET: f64 = 8.0;
const STACK_OFFSET: f64 = 10.0;
const COLLISION_WINDOW_MS: i64 = 3_600_000;
const VALUE_WINDOW_FRACTION: f64 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelAnchor {
    Below,
    Above,
}

/// One annotated extremum with its placement hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtremumMarker {
    pub metric: Metric,
    pub timestamp: i64,
    pub value: f64,
    /// Vertical label offset in display units.
    pub offset: f64,
    pub anchor: LabelAnchor,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricExtrema {
    pub highest: Option<ExtremumMarker>,
    pub lowest: Option<ExtremumMarker>,
}

/// Scan the built series for each active metric's single maximum and
/// minimum. Only end points count; start points are interval baselines.
pub fn find_extrema(points: &[PlotPoint], metrics: &[Metric]) -> BTreeMap<Metric, MetricExtrema> {
    let ends: Vec<&PlotPoint> = points.iter().filter(|p| !p.is_start_point).collect();
    let mut out: BTreeMap<Metric, MetricExtrema> = BTreeMap::new();
    // Markers placed so far, for collision stacking across metrics.
    let mut placed: Vec<(Metric, i64, f64)> = Vec::new();

    for &metric in metrics {
        let mut extrema = MetricExtrema::default();
        if !ends.is_empty() {
            let mut max_i = 0;
            let mut min_i = 0;
            for (i, p) in ends.iter().enumerate() {
                if p.values[&metric] > ends[max_i].values[&metric] {
                    max_i = i;
                }
                if p.values[&metric] < ends[min_i].values[&metric] {
                    min_i = i;
                }
            }
            let range = ends[max_i].values[&metric] - ends[min_i].values[&metric];

            extrema.highest = Some(place_marker(
                metric,
                ends[max_i],
                range,
                &ends,
                max_i,
                true,
                &mut placed,
            ));
            extrema.lowest = Some(place_marker(
                metric,
                ends[min_i],
                range,
                &ends,
                min_i,
                false,
                &mut placed,
            ));
        }
        out.insert(metric, extrema);
    }
    out
}

fn place_marker(
    metric: Metric,
    point: &PlotPoint,
    range: f64,
    ends: &[&PlotPoint],
    point_idx: usize,
    is_maximum: bool,
    placed: &mut Vec<(Metric, i64, f64)>,
) -> ExtremumMarker {
    let value = point.values[&metric];
    let value_window = range * VALUE_WINDOW_FRACTION;

    // Stack against markers from other metrics sharing this neighborhood.
    let mut offset = DEFAULT_OFFSET;
    for &(other_metric, other_ts, other_value) in placed.iter() {
        if other_metric != metric
            && (point.timestamp - other_ts).abs() <= COLLISION_WINDOW_MS
            && (value - other_value).abs() <= value_window
        {
            offset += STACK_OFFSET;
        }
    }

    // A maximum label sits below the point by default; flip it above when
    // the line passes just underneath inside the collision window.
    let mut anchor = LabelAnchor::Below;
    if is_maximum {
        let crowded = ends.iter().enumerate().any(|(i, p)| {
            i != point_idx
                && (p.timestamp - point.timestamp).abs() <= COLLISION_WINDOW_MS
                && value - p.values[&metric] >= 0.0
                && value - p.values[&metric] <= value_window
        });
        if crowded {
            anchor = LabelAnchor::Above;
        }
    }

    placed.push((metric, point.timestamp, value));
    ExtremumMarker {
        metric,
        timestamp: point.timestamp,
        value,
        offset,
        anchor,
    }
}

// =============================================================================
// Tests
// =============================================================================
