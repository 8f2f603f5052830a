//! Time-range resolution and update filtering.
//!
//! A user-facing range specifier becomes a concrete timestamp predicate;
//! the filter stage is the single place where out-of-range records are
//! dropped, so unparseable timestamps (sort key 0) fall out here naturally.

use chrono::NaiveDate;

use crate::update::UpdateRecord;

const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 86_400_000;

/// User-facing range specification.
#[derive(Debug, Clone)]
pub enum RangeSpec {
    LastHour,
    Last24h,
    Last7d,
    Last30d,
    AllTime,
    /// Rolling offset from "now", or an explicit calendar range. The
    /// calendar pair wins when both dates are present.
    Custom {
        days: u32,
        hours: u32,
        minutes: u32,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
    /// Explicit bracket between two selected updates, inclusive on both ends.
    Bracket {
        from: Box<UpdateRecord>,
        until: Box<UpdateRecord>,
    },
}

/// Resolved timestamp predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFilter {
    All,
    Since { cutoff: i64 },
    Range { from: i64, until: i64 },
}

impl TimeFilter {
    pub fn contains(&self, ts: i64) -> bool {
        match *self {
            TimeFilter::All => true,
            TimeFilter::Since { cutoff } => ts >= cutoff,
            TimeFilter::Range { from, until } => ts >= from && ts <= until,
        }
    }
}

impl RangeSpec {
    /// Resolve against the caller's "now" (epoch ms).
    pub fn resolve(&self, now_ms: i64) -> TimeFilter {
        match self {
            RangeSpec::LastHour => TimeFilter::Since { cutoff: now_ms - HOUR_MS },
            RangeSpec::Last24h => TimeFilter::Since { cutoff: now_ms - 24 * HOUR_MS },
            RangeSpec::Last7d => TimeFilter::Since { cutoff: now_ms - 7 * DAY_MS },
            RangeSpec::Last30d => TimeFilter::Since { cutoff: now_ms - 30 * DAY_MS },
            RangeSpec::AllTime => TimeFilter::All,
            RangeSpec::Custom { days, hours, minutes, from, to } => {
                if let (Some(from), Some(to)) = (from, to) {
                    return TimeFilter::Range {
                        from: start_of_day_ms(*from),
                        until: end_of_day_ms(*to),
                    };
                }
                let offset = i64::from(*days) * DAY_MS
                    + i64::from(*hours) * HOUR_MS
                    + i64::from(*minutes) * 60_000;
                if offset == 0 {
                    // Nothing entered: behave as "no filtering", never as an
                    // empty result.
                    TimeFilter::All
                } else {
                    TimeFilter::Since { cutoff: now_ms - offset }
                }
            }
            RangeSpec::Bracket { from, until } => {
                let a = from.resolved_ts();
                let b = until.resolved_ts();
                TimeFilter::Range { from: a.min(b), until: a.max(b) }
            }
        }
    }
}

fn start_of_day_ms(d: NaiveDate) -> i64 {
    d.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0)
}

/// Extend the `to` boundary to 23:59:59.999 so the whole selected day is in.
fn end_of_day_ms(d: NaiveDate) -> i64 {
    d.and_hms_milli_opt(23, 59, 59, 999)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0)
}

/// Apply a resolved filter: stable-sort by resolved timestamp, then retain
/// records whose timestamp passes the predicate.
pub fn filter_updates(records: &[UpdateRecord], filter: &TimeFilter) -> Vec<UpdateRecord> {
    let mut out: Vec<UpdateRecord> = records
        .iter()
        .filter(|r| filter.contains(r.resolved_ts()))
        .cloned()
        .collect();
    out.sort_by_key(UpdateRecord::resolved_ts);
    out
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::UpdateStatus;

    fn update_at(id: u64, end_ms: i64) -> UpdateRecord {
        UpdateRecord {
            id,
            bot_type_id: 1,
            version: id as u32,
            status: UpdateStatus::UpdateMetrics,
            period_start: None,
            period_end: Some(end_ms.to_string()),
            created_at: None,
            profit: None,
            grid_profit_total: None,
            grid_profit_total_absolute: None,
            total_investment: None,
            base_investment: None,
            avg_grid_profit_per_day: None,
            runtime_longest: None,
            runtime_average: None,
            calculation_mode: None,
        }
    }

    #[test]
    fn custom_one_day_keeps_exactly_the_last_day() {
        let now = 10 * DAY_MS;
        let spec = RangeSpec::Custom { days: 1, hours: 0, minutes: 0, from: None, to: None };
        let filter = spec.resolve(now);
        assert_eq!(filter, TimeFilter::Since { cutoff: now - DAY_MS });

        let records = vec![
            update_at(1, now - DAY_MS - 1), // just outside
            update_at(2, now - DAY_MS),     // exactly on the cutoff
            update_at(3, now),
        ];
        let kept = filter_updates(&records, &filter);
        let ids: Vec<u64> = kept.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn zero_custom_duration_means_no_filtering() {
        let spec = RangeSpec::Custom { days: 0, hours: 0, minutes: 0, from: None, to: None };
        assert_eq!(spec.resolve(123), TimeFilter::All);
    }

    #[test]
    fn calendar_pair_wins_and_extends_to_end_of_day() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let spec = RangeSpec::Custom { days: 5, hours: 0, minutes: 0, from: Some(from), to: Some(to) };
        let TimeFilter::Range { from, until } = spec.resolve(0) else {
            panic!("expected a range filter");
        };
        assert_eq!(until - from, DAY_MS - 1);
    }

    #[test]
    fn bracket_is_inclusive_and_order_insensitive() {
        let a = update_at(1, 1_000_000);
        let b = update_at(2, 2_000_000);
        let spec = RangeSpec::Bracket { from: Box::new(b.clone()), until: Box::new(a.clone()) };
        let filter = spec.resolve(0);
        assert!(filter.contains(1_000_000));
        assert!(filter.contains(2_000_000));
        assert!(!filter.contains(999_999));
        assert!(!filter.contains(2_000_001));
    }

    #[test]
    fn unparseable_timestamps_sort_first_and_fall_to_the_filter() {
        let mut broken = update_at(9, 0);
        broken.period_end = Some("not a date".into());
        let records = vec![update_at(1, 5_000), broken, update_at(2, 3_000)];

        let all = filter_updates(&records, &TimeFilter::All);
        let ids: Vec<u64> = all.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![9, 2, 1]);

        let ranged = filter_updates(&records, &TimeFilter::Since { cutoff: 1 });
        assert!(ranged.iter().all(|r| r.id != 9));
    }
}
