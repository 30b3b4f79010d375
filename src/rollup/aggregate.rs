//! Pure aggregation over range-read rollup records.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{AppCounter, DailyRecord, Period};

/// One day's totals without per-app detail, used in multi-day breakdowns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: String,
    pub grand_total: u32,
    pub total_low: u32,
    pub total_medium: u32,
    pub total_high: u32,
}

/// Aggregated statistics over a period.
///
/// The `today` shape carries totals and the per-app breakdown only; every
/// multi-day shape adds a per-day list without per-app detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateView {
    pub total_grand_total: u32,
    pub total_low: u32,
    pub total_medium: u32,
    pub total_high: u32,
    pub app_breakdown: BTreeMap<String, AppCounter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_breakdown: Option<Vec<DailySummary>>,
}

/// Combine daily records into the period's aggregate shape. Pure: no I/O.
/// Empty input yields zero totals and empty breakdowns, never an error.
pub fn aggregate(records: &[DailyRecord], period: Period) -> AggregateView {
    let mut view = AggregateView {
        total_grand_total: 0,
        total_low: 0,
        total_medium: 0,
        total_high: 0,
        app_breakdown: BTreeMap::new(),
        daily_breakdown: period.has_daily_breakdown().then(Vec::new),
    };

    for record in records {
        view.total_grand_total += record.grand_total;
        view.total_low += record.total_low;
        view.total_medium += record.total_medium;
        view.total_high += record.total_high;

        for (app, counter) in &record.app_counts {
            view.app_breakdown
                .entry(app.clone())
                .or_default()
                .merge(counter);
        }

        if let Some(daily) = view.daily_breakdown.as_mut() {
            daily.push(DailySummary {
                date: record.date.clone(),
                grand_total: record.grand_total,
                total_low: record.total_low,
                total_medium: record.total_medium,
                total_high: record.total_high,
            });
        }
    }

    view
}
