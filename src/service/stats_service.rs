use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total: i64,
    pub today: i64,
    pub last7_days: i64,
    pub last30_days: i64,
}

/// Window starts in epoch seconds: local midnight for "today", trailing
/// 7/30-day windows anchored at the current instant.
pub fn window_starts(now: DateTime<Local>) -> (i64, i64, i64) {
    let midnight = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is a valid time")
        .and_local_timezone(Local)
        .earliest()
        .map(|t| t.timestamp())
        .unwrap_or_else(|| now.timestamp());
    let last7 = (now - Duration::days(7)).timestamp();
    let last30 = (now - Duration::days(30)).timestamp();
    (midnight, last7, last30)
}

/// Computed at query time from wall-clock `now`; nothing is cached, so
/// repeated calls with no intervening writes return identical counts.
pub fn compute(created_ats: &[i64], now: DateTime<Local>) -> StatsSnapshot {
    let (today_start, last7_start, last30_start) = window_starts(now);
    let count_since = |start: i64| created_ats.iter().filter(|&&ts| ts >= start).count() as i64;
    StatsSnapshot {
        total: created_ats.len() as i64,
        today: count_since(today_start),
        last7_days: count_since(last7_start),
        last30_days: count_since(last30_start),
    }
}
