//! Dummy statistics generator for development and demos.
//!
//! Writes plausible rollup documents directly, bypassing classification.

use chrono::{Duration, Local, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::identity::VerifiedUser;
use crate::rollup::period::{days_inclusive, long_date};
use crate::rollup::store::doc_key;
use crate::rollup::{AppCounter, DailyRecord, StatsError};
use crate::storage::{self, Pool};

const DUMMY_APPS: &[&str] = &[
    "tiktok",
    "chrome",
    "gallery",
    "instagram",
    "youtube",
    "facebook",
    "twitter",
];

/// Seed random rollup documents for the last `days` calendar days,
/// including today. Existing documents for those days are replaced.
pub fn seed_history(pool: &Pool, user: &VerifiedUser, days: u32) -> Result<u32, StatsError> {
    let today = Local::now().date_naive();
    let start = today - Duration::days(i64::from(days.saturating_sub(1)));

    let conn = pool.get()?;
    let mut rng = rand::thread_rng();
    let mut written = 0u32;

    for day in days_inclusive(start, today) {
        let record = random_record(&mut rng, user, day);
        let payload = serde_json::to_string(&record)?;
        storage::put_document(
            &conn,
            &doc_key(user.local_part(), day),
            user.email(),
            &day.format("%Y-%m-%d").to_string(),
            &payload,
        )?;
        written += 1;
    }

    info!(user = %user.email(), %written, "seeded dummy statistics");
    Ok(written)
}

fn random_record(rng: &mut impl Rng, user: &VerifiedUser, day: NaiveDate) -> DailyRecord {
    // 3 to 6 distinct apps per day.
    let app_count = rng.gen_range(3..=6);
    let mut apps = DUMMY_APPS.to_vec();
    apps.shuffle(rng);

    let mut record = DailyRecord {
        user_id: user.email().to_string(),
        date: long_date(day),
        grand_total: 0,
        total_low: 0,
        total_medium: 0,
        total_high: 0,
        app_counts: Default::default(),
    };

    for app in apps.into_iter().take(app_count) {
        let low = rng.gen_range(0..10);
        let medium = rng.gen_range(0..5);
        let high = rng.gen_range(0..3);
        let counter = AppCounter {
            total: low + medium + high,
            low,
            medium,
            high,
        };
        record.grand_total += counter.total;
        record.total_low += low;
        record.total_medium += medium;
        record.total_high += high;
        record.app_counts.insert(app.to_string(), counter);
    }

    record
}
