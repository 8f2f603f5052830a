//! Multi-entity overlay: one series per entity, merged on the time axis.
//!
//! Entities are never pooled. Each gets its own comparison-mode detection
//! and running totals; the merge only aligns points by timestamp. An entity
//! with no point at an instant is simply absent from that merged point, so
//! the renderer can skip gaps instead of drawing zero-dips.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::series::{build_series, Metric, SeriesConfig};
use crate::update::UpdateRecord;

/// One entity's filtered, time-ordered update set plus its display name.
#[derive(Debug, Clone)]
pub struct EntityUpdates {
    pub name: String,
    pub updates: Vec<UpdateRecord>,
}

/// One merged overlay point: per-entity metric values at a shared timestamp.
/// Entities without a point here are absent from the map, never zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedPoint {
    pub timestamp: i64,
    pub values: BTreeMap<String, BTreeMap<Metric, f64>>,
}

/// Build and merge per-entity series into a single timestamp-ordered list.
pub fn compose_entities(entities: &[EntityUpdates], cfg: &SeriesConfig) -> Vec<MergedPoint> {
    let mut merged: BTreeMap<i64, BTreeMap<String, BTreeMap<Metric, f64>>> = BTreeMap::new();

    for entity in entities {
        for point in build_series(&entity.updates, cfg) {
            merged
                .entry(point.timestamp)
                .or_default()
                .insert(entity.name.clone(), point.values);
        }
    }

    merged
        .into_iter()
        .map(|(timestamp, values)| MergedPoint { timestamp, values })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::UpdateStatus;

    const HOUR: i64 = 3_600_000;

    fn update(id: u64, end: i64, total: f64, comparison: bool) -> UpdateRecord {
        let absolute = if comparison { total + 100.0 } else { total };
        UpdateRecord {
            id,
            bot_type_id: id,
            version: 1,
            status: UpdateStatus::UpdateMetrics,
            period_start: None,
            period_end: Some(end.to_string()),
            created_at: None,
            profit: None,
            grid_profit_total: Some(total.to_string()),
            grid_profit_total_absolute: Some(absolute.to_string()),
            total_investment: Some("1000".into()),
            base_investment: None,
            avg_grid_profit_per_day: None,
            runtime_longest: None,
            runtime_average: None,
            calculation_mode: None,
        }
    }

    #[test]
    fn gaps_stay_absent_not_zero() {
        let entities = vec![
            EntityUpdates {
                name: "alpha".into(),
                updates: vec![update(1, HOUR, 10.0, false), update(2, 3 * HOUR, 20.0, false)],
            },
            EntityUpdates {
                name: "beta".into(),
                updates: vec![update(3, 2 * HOUR, 5.0, false)],
            },
        ];
        let merged = compose_entities(&entities, &SeriesConfig::default());
        assert_eq!(merged.len(), 3);

        // beta has no point at alpha's timestamps: the key is missing.
        let at_1h = &merged[0];
        assert_eq!(at_1h.timestamp, HOUR);
        assert!(at_1h.values.contains_key("alpha"));
        assert!(!at_1h.values.contains_key("beta"));

        let at_2h = &merged[1];
        assert!(!at_2h.values.contains_key("alpha"));
        assert_eq!(at_2h.values["beta"][&Metric::TotalProfit], 5.0);
    }

    #[test]
    fn entities_accumulate_independently() {
        let entities = vec![
            EntityUpdates {
                name: "alpha".into(),
                updates: vec![update(1, HOUR, 10.0, false), update(2, 2 * HOUR, 5.0, true)],
            },
            EntityUpdates {
                name: "beta".into(),
                updates: vec![update(3, HOUR, 100.0, false), update(4, 2 * HOUR, 1.0, true)],
            },
        ];
        let merged = compose_entities(&entities, &SeriesConfig::default());
        let last = merged.last().unwrap();
        // alpha: 10 + 5, beta: 100 + 1 — no cross-entity pooling.
        assert_eq!(last.values["alpha"][&Metric::TotalProfit], 15.0);
        assert_eq!(last.values["beta"][&Metric::TotalProfit], 101.0);
    }

    #[test]
    fn merged_output_is_timestamp_ordered() {
        let entities = vec![
            EntityUpdates {
                name: "alpha".into(),
                updates: vec![update(1, 5 * HOUR, 1.0, false), update(2, 9 * HOUR, 2.0, false)],
            },
            EntityUpdates {
                name: "beta".into(),
                updates: vec![update(3, 7 * HOUR, 3.0, false), update(4, 2 * HOUR, 4.0, false)],
            },
        ];
        // beta's updates arrive unsorted; build_series expects sorted input,
        // so sort the way the filter stage does.
        let mut entities = entities;
        for e in &mut entities {
            e.updates.sort_by_key(UpdateRecord::resolved_ts);
        }
        let merged = compose_entities(&entities, &SeriesConfig::default());
        assert!(merged.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }
}
