//! Named relative date windows for statistics queries.

use std::str::FromStr;

use chrono::{DateTime, Duration, Local, Months, NaiveDate};

use super::StatsError;

/// A named relative date window, always inclusive of today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    SevenDays,
    OneMonth,
    ThreeMonths,
}

impl Period {
    pub const VALID_OPTIONS: &'static str = "today, 7days, 1month, 3months";

    /// Whether the aggregate view carries a per-day breakdown list.
    pub fn has_daily_breakdown(self) -> bool {
        !matches!(self, Period::Today)
    }

    /// Resolve the window to an inclusive [start, end] pair of calendar
    /// days, anchored at `now`. Month subtraction is calendar arithmetic:
    /// day-of-month clamps to the shorter target month.
    pub fn date_range(self, now: DateTime<Local>) -> (NaiveDate, NaiveDate) {
        let today = now.date_naive();
        let start = match self {
            Period::Today => today,
            Period::SevenDays => today - Duration::days(6),
            Period::OneMonth => today
                .checked_sub_months(Months::new(1))
                .unwrap_or(today),
            Period::ThreeMonths => today
                .checked_sub_months(Months::new(3))
                .unwrap_or(today),
        };
        (start, today)
    }
}

impl FromStr for Period {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(Period::Today),
            "7days" => Ok(Period::SevenDays),
            "1month" => Ok(Period::OneMonth),
            "3months" => Ok(Period::ThreeMonths),
            other => Err(StatsError::Validation(format!(
                "invalid period '{other}'; options: {}",
                Period::VALID_OPTIONS
            ))),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Today => write!(f, "today"),
            Period::SevenDays => write!(f, "7days"),
            Period::OneMonth => write!(f, "1month"),
            Period::ThreeMonths => write!(f, "3months"),
        }
    }
}

/// Format a calendar day the way the rollup documents store it,
/// e.g. "September 19, 2025".
pub fn long_date(day: NaiveDate) -> String {
    format!("{}", day.format("%B %-d, %Y"))
}

/// Iterate every calendar day in [start, end], ascending.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let span = (end - start).num_days().max(-1);
    (0..=span).map(move |offset| start + Duration::days(offset))
}
