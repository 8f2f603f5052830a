//! Update records: periodic performance snapshots per bot type.
//!
//! Upstream data is user-entered and locale-formatted, so every numeric and
//! timestamp field is parsed best-effort: bad decimals become 0.0, bad
//! timestamps become a sort key of 0 so the filter stage (not the builder)
//! decides whether the record survives.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Snapshot kind. `ClosedBots` is a terminal snapshot with a single point;
/// `UpdateMetrics` covers an ongoing interval with a start and an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateStatus {
    UpdateMetrics,
    ClosedBots,
}

/// One performance snapshot for a bot type, as delivered by the API layer.
///
/// Financial fields arrive as decimal strings (or are absent entirely);
/// `version` is monotonically assigned per bot type, not globally unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecord {
    pub id: u64,
    pub bot_type_id: u64,
    pub version: u32,
    pub status: UpdateStatus,
    /// Absent only on the very first update of a bot type.
    #[serde(default)]
    pub period_start: Option<String>,
    #[serde(default)]
    pub period_end: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub profit: Option<String>,
    #[serde(default)]
    pub grid_profit_total: Option<String>,
    /// Presence of this field signals the newer comparison-mode detection.
    #[serde(default)]
    pub grid_profit_total_absolute: Option<String>,
    #[serde(default)]
    pub total_investment: Option<String>,
    #[serde(default)]
    pub base_investment: Option<String>,
    #[serde(default)]
    pub avg_grid_profit_per_day: Option<String>,
    #[serde(default)]
    pub runtime_longest: Option<String>,
    #[serde(default)]
    pub runtime_average: Option<String>,
    /// Legacy comparison-mode flag, consulted only when the absolute field
    /// is entirely absent.
    #[serde(default)]
    pub calculation_mode: Option<String>,
}

impl UpdateRecord {
    /// End timestamp in epoch ms; unparseable/missing collapses to 0 so the
    /// record sorts first instead of being dropped here.
    pub fn end_ts(&self) -> i64 {
        self.period_end
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(0)
    }

    /// Start timestamp in epoch ms, if present and parseable.
    pub fn start_ts(&self) -> Option<i64> {
        self.period_start.as_deref().and_then(parse_timestamp)
    }

    /// Timestamp used for filtering and bracket resolution:
    /// end, falling back to start, then record creation, then 0.
    pub fn resolved_ts(&self) -> i64 {
        self.period_end
            .as_deref()
            .and_then(parse_timestamp)
            .or_else(|| self.start_ts())
            .or_else(|| self.created_at.as_deref().and_then(parse_timestamp))
            .unwrap_or(0)
    }

    /// Comparison-mode detection. The absolute-field pair was added after
    /// the legacy `calculationMode` flag; both must be honored for
    /// historical records, with the absolute check taking precedence.
    pub fn is_comparison(&self, epsilon: f64) -> bool {
        match self.grid_profit_total_absolute.as_deref() {
            Some(abs) => {
                let total = parse_decimal(self.grid_profit_total.as_deref());
                (total - parse_decimal(Some(abs))).abs() > epsilon
            }
            None => self.calculation_mode.as_deref() == Some("Normal"),
        }
    }
}

/// Decode an upstream JSON array of update records.
pub fn parse_updates(json: &str) -> Result<Vec<UpdateRecord>> {
    serde_json::from_str(json).context("decoding update records")
}

// =============================================================================
// Tolerant field parsing
// =============================================================================

/// Best-effort decimal parsing. Tolerates comma decimal separators,
/// thousands separators, currency suffixes and whitespace; anything that
/// still fails resolves to 0.0.
///
/// A lone comma is always read as the decimal separator: the upstream
/// locale writes `1,234` for one-point-two-three-four. Commas only count
/// as thousands grouping when the string is unambiguous about it (more
/// than one comma, or a comma followed by a later dot).
pub fn parse_decimal(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else { return 0.0 };
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+'))
        .collect();
    if cleaned.is_empty() {
        return 0.0;
    }

    let normalized = match (cleaned.rfind('.'), cleaned.rfind(',')) {
        // Both present: the later one is the decimal separator.
        (Some(dot), Some(comma)) if comma > dot => {
            cleaned.replace('.', "").replacen(',', ".", 1)
        }
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        // Comma only: decimal separator unless it reads as a thousands group.
        (None, Some(comma)) => {
            if cleaned.len() - comma == 4 && cleaned.matches(',').count() > 1 {
                cleaned.replace(',', "")
            } else {
                cleaned.replacen(',', ".", 1)
            }
        }
        _ => cleaned,
    };

    normalized.parse::<f64>().unwrap_or(0.0)
}

/// Parse a locale-formatted or machine timestamp into epoch ms.
///
/// Accepts epoch milliseconds, epoch seconds, RFC 3339 and the
/// `dd.MM.yyyy`/`yyyy-MM-dd` date-time shapes the upstream UI emits.
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.chars().all(|c| c.is_ascii_digit()) {
        let v: i64 = raw.parse().ok()?;
        // Epoch seconds stay below this until far beyond any plausible data.
        return Some(if v < 100_000_000_000 { v * 1000 } else { v });
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }

    const DATETIME_FORMATS: &[&str] = &[
        "%d.%m.%Y, %H:%M:%S",
        "%d.%m.%Y, %H:%M",
        "%d.%m.%Y %H:%M:%S",
        "%d.%m.%Y %H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    const DATE_FORMATS: &[&str] = &["%d.%m.%Y", "%Y-%m-%d"];
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis());
        }
    }

    None
}

// =============================================================================
// Tests
// =============================================================================
