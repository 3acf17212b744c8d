use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

static SUBMISSIONS_ACCEPTED: AtomicU64 = AtomicU64::new(0);
static SUBMISSIONS_REJECTED: AtomicU64 = AtomicU64::new(0);
static RECORDS_DELETED: AtomicU64 = AtomicU64::new(0);
static NOTIFICATIONS_FAILED: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub submissions_accepted: u64,
    pub submissions_rejected: u64,
    pub records_deleted: u64,
    pub notifications_failed: u64,
}

pub fn inc_submissions_accepted() {
    SUBMISSIONS_ACCEPTED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_submissions_rejected() {
    SUBMISSIONS_REJECTED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_records_deleted() {
    RECORDS_DELETED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_notifications_failed() {
    NOTIFICATIONS_FAILED.fetch_add(1, Ordering::Relaxed);
}

pub fn start_timer() -> Instant {
    Instant::now()
}

pub fn elapsed_ms(start: Instant) -> u128 {
    start.elapsed().as_millis()
}

pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        submissions_accepted: SUBMISSIONS_ACCEPTED.load(Ordering::Relaxed),
        submissions_rejected: SUBMISSIONS_REJECTED.load(Ordering::Relaxed),
        records_deleted: RECORDS_DELETED.load(Ordering::Relaxed),
        notifications_failed: NOTIFICATIONS_FAILED.load(Ordering::Relaxed),
    }
}
