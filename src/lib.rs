//! Metrics timeline engine for bot performance charts.
//!
//! Turns heterogeneous, irregularly-timed performance snapshots
//! ([`update::UpdateRecord`]) into plot-ready point sequences, extrema
//! annotations, axis ticks and viewport domains. Pure and synchronous:
//! rendering, persistence and data fetching live with the caller.
//!
//! Pipeline: raw updates -> [`timerange::filter_updates`] ->
//! [`series::build_series`] -> {[`extrema`], [`ticks`], [`viewport`]};
//! [`compose`] wraps the series builder for multi-entity overlays and
//! [`engine::build_chart`] wires the whole thing for one call.

pub mod compose;
pub mod engine;
pub mod extrema;
pub mod series;
pub mod ticks;
pub mod timerange;
pub mod update;
pub mod viewport;

pub use compose::{compose_entities, EntityUpdates, MergedPoint};
pub use engine::{build_chart, build_chart_multi, ChartOutput, ChartRequest, MultiChartOutput};
pub use extrema::{find_extrema, ExtremumMarker, LabelAnchor, MetricExtrema};
pub use series::{build_series, CapitalBase, Metric, PlotPoint, SeriesConfig};
pub use ticks::{plan_ticks, plan_ticks_dense, Granularity, DEFAULT_TICK_DENSITY};
pub use timerange::{filter_updates, RangeSpec, TimeFilter};
pub use update::{parse_decimal, parse_timestamp, parse_updates, UpdateRecord, UpdateStatus};
pub use viewport::{x_domain, y_domain, AxisDomain, ZoomPan};
