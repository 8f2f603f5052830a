//! Viewport domains: padded X/Y ranges under zoom and pan.
//!
//! Tick planning is separate ([`crate::ticks`]); this only answers "which
//! sub-range of the data is on screen". Pan is a signed fraction of the
//! padded base range; the caller owns the pixel-to-fraction conversion.

use serde::{Deserialize, Serialize};

use crate::series::{Metric, PlotPoint};

const DAY_MS: i64 = 86_400_000;

/// Zoom factor (>= 1) and pan offset for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomPan {
    pub zoom: f64,
    pub pan: f64,
}

impl Default for ZoomPan {
    fn default() -> Self {
        Self { zoom: 1.0, pan: 0.0 }
    }
}

/// A plot axis domain. `Auto` is the no-data sentinel: the renderer picks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AxisDomain {
    Auto,
    Fixed { min: f64, max: f64 },
}

impl AxisDomain {
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match *self {
            AxisDomain::Auto => None,
            AxisDomain::Fixed { min, max } => Some((min, max)),
        }
    }
}

fn apply_zoom_pan(lo: f64, hi: f64, zp: ZoomPan) -> AxisDomain {
    let base_range = hi - lo;
    let effective = base_range / zp.zoom.max(1.0);
    let mid = (lo + hi) / 2.0 + zp.pan * base_range;
    AxisDomain::Fixed {
        min: mid - effective / 2.0,
        max: mid + effective / 2.0,
    }
}

/// Value-axis domain from an observed `[min, max]` value range.
///
/// Padding: at least 15% of the data range symmetrically, plus at least 10%
/// of the maximum value below, so no point sits flush with the bottom edge.
/// All-non-negative data keeps its lower bound clamped near zero.
pub fn y_domain_of(min: f64, max: f64, zp: ZoomPan) -> AxisDomain {
    if !min.is_finite() || !max.is_finite() {
        return AxisDomain::Auto;
    }
    let range = max - min;
    let pad = if range > 0.0 {
        range * 0.15
    } else {
        max.abs().max(1.0) * 0.15
    };
    let mut lo = min - pad - 0.10 * max.abs();
    let hi = max + pad;
    if min >= 0.0 {
        lo = lo.max(-pad);
    }
    apply_zoom_pan(lo, hi, zp)
}

/// Time-axis domain from an observed timestamp range: 5% symmetric padding;
/// a single-instant data set widens to exactly one day on each side instead.
pub fn x_domain_of(min: i64, max: i64, zp: ZoomPan) -> AxisDomain {
    let (lo, hi) = if min == max {
        ((min - DAY_MS) as f64, (max + DAY_MS) as f64)
    } else {
        let pad = (max - min) as f64 * 0.05;
        (min as f64 - pad, max as f64 + pad)
    };
    apply_zoom_pan(lo, hi, zp)
}

/// Value-axis domain over the active metrics of a built series.
pub fn y_domain(points: &[PlotPoint], metrics: &[Metric], zp: ZoomPan) -> AxisDomain {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for p in points {
        for m in metrics {
            let v = p.values[m];
            min = min.min(v);
            max = max.max(v);
        }
    }
    y_domain_of(min, max, zp)
}

/// Time-axis domain over a built series.
pub fn x_domain(points: &[PlotPoint], zp: ZoomPan) -> AxisDomain {
    if points.is_empty() {
        return AxisDomain::Auto;
    }
    let mut min = i64::MAX;
    let mut max = i64::MIN;
    for p in points {
        min = min.min(p.timestamp);
        max = max.max(p.timestamp);
    }
    x_domain_of(min, max, zp)
}

// =============================================================================
// Tests
// =============================================================================
