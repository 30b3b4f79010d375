//! Per-user, per-day, per-application rollup counters and aggregation.

pub mod aggregate;
pub mod period;
pub mod store;

pub use aggregate::{aggregate, AggregateView, DailySummary};
pub use period::Period;
pub use store::{RangeResult, RollupStore};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::Severity;

#[derive(Debug, Error)]
pub enum StatsError {
    /// Rejected before any storage access; no partial effects.
    #[error("validation: {0}")]
    Validation(String),
    /// Store unreachable or a stored document could not be used.
    #[error("persistence: {0}")]
    Persistence(String),
}

impl From<rusqlite::Error> for StatsError {
    fn from(e: rusqlite::Error) -> Self {
        StatsError::Persistence(e.to_string())
    }
}

impl From<r2d2::Error> for StatsError {
    fn from(e: r2d2::Error) -> Self {
        StatsError::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for StatsError {
    fn from(e: serde_json::Error) -> Self {
        StatsError::Persistence(format!("malformed document: {e}"))
    }
}

/// Severity counters for a single application on a single day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppCounter {
    pub total: u32,
    pub low: u32,
    pub medium: u32,
    pub high: u32,
}

impl AppCounter {
    /// Count one event of the given severity. `total` stays equal to
    /// `low + medium + high`.
    pub fn bump(&mut self, severity: Severity) {
        match severity {
            Severity::Mild => self.low += 1,
            Severity::Moderate => self.medium += 1,
            Severity::Explicit => self.high += 1,
            // Caller contract: Safe events are filtered upstream.
            Severity::Safe => return,
        }
        self.total += 1;
    }

    pub fn merge(&mut self, other: &AppCounter) {
        self.total += other.total;
        self.low += other.low;
        self.medium += other.medium;
        self.high += other.high;
    }
}

/// One user's rollup record for one calendar day.
///
/// At most one record exists per (user, date). `grandTotal` equals the sum
/// of all app totals, and each per-severity total equals the sum of the
/// matching app sub-counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    pub user_id: String,
    /// Long-form human date, e.g. "September 19, 2025".
    pub date: String,
    pub grand_total: u32,
    pub total_low: u32,
    pub total_medium: u32,
    pub total_high: u32,
    pub app_counts: BTreeMap<String, AppCounter>,
}

impl DailyRecord {
    /// Construct the record for the first severity>0 event of a day.
    pub fn first_event(user_id: &str, date: String, application: &str, severity: Severity) -> Self {
        let mut counter = AppCounter::default();
        counter.bump(severity);

        let mut app_counts = BTreeMap::new();
        app_counts.insert(application.to_lowercase(), counter);

        let mut record = Self {
            user_id: user_id.to_string(),
            date,
            grand_total: 1,
            total_low: 0,
            total_medium: 0,
            total_high: 0,
            app_counts,
        };
        record.bump_totals(severity);
        record
    }

    /// Apply one more qualifying event to an existing record.
    pub fn apply_event(&mut self, application: &str, severity: Severity) {
        self.app_counts
            .entry(application.to_lowercase())
            .or_default()
            .bump(severity);
        self.grand_total += 1;
        self.bump_totals(severity);
    }

    fn bump_totals(&mut self, severity: Severity) {
        match severity {
            Severity::Mild => self.total_low += 1,
            Severity::Moderate => self.total_medium += 1,
            Severity::Explicit => self.total_high += 1,
            Severity::Safe => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_event_sets_singular_counters() {
        let record =
            DailyRecord::first_event("alice@example.com", "May 1, 2026".into(), "Chrome", Severity::Moderate);
        assert_eq!(record.grand_total, 1);
        assert_eq!(record.total_medium, 1);
        assert_eq!(record.total_low + record.total_high, 0);

        let counter = &record.app_counts["chrome"];
        assert_eq!(counter.total, 1);
        assert_eq!(counter.medium, 1);
    }

    #[test]
    fn totals_stay_consistent_across_events() {
        let mut record =
            DailyRecord::first_event("alice@example.com", "May 1, 2026".into(), "chrome", Severity::Mild);
        record.apply_event("TikTok", Severity::Explicit);
        record.apply_event("chrome", Severity::Mild);
        record.apply_event("gallery", Severity::Moderate);

        assert_eq!(record.grand_total, 4);
        assert_eq!(
            record.grand_total,
            record.total_low + record.total_medium + record.total_high
        );
        let app_sum: u32 = record.app_counts.values().map(|c| c.total).sum();
        assert_eq!(record.grand_total, app_sum);
        for counter in record.app_counts.values() {
            assert_eq!(counter.total, counter.low + counter.medium + counter.high);
        }
    }

    #[test]
    fn application_names_are_lowercased_keys() {
        let mut record =
            DailyRecord::first_event("a@b.c", "May 1, 2026".into(), "Instagram", Severity::Mild);
        record.apply_event("INSTAGRAM", Severity::Mild);
        assert_eq!(record.app_counts.len(), 1);
        assert_eq!(record.app_counts["instagram"].total, 2);
    }

    #[test]
    fn wire_field_names_are_preserved() {
        let record =
            DailyRecord::first_event("a@b.c", "May 1, 2026".into(), "chrome", Severity::Mild);
        let json = serde_json::to_value(&record).unwrap();
        for field in [
            "userId",
            "date",
            "grandTotal",
            "totalLow",
            "totalMedium",
            "totalHigh",
            "appCounts",
        ] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
        let counter = &json["appCounts"]["chrome"];
        for field in ["total", "low", "medium", "high"] {
            assert!(counter.get(field).is_some(), "missing field {field}");
        }
    }
}
