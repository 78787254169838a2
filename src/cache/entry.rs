use crate::model::{DateRange, HealthLog};
use serde::Serialize;
use std::ops::{Deref, Range};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// TTLs for the two cache tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Lifetime of a per-period entry.
    pub period_ttl: Duration,
    /// Lifetime of the session-wide "all logs" entry.
    pub session_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            period_ttl: Duration::from_secs(5 * 60),
            session_ttl: Duration::from_secs(60),
        }
    }
}

/// An immutable snapshot of logs and when it was read from the source.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    logs: Arc<[HealthLog]>,
    fetched_at: Instant,
}

impl CacheEntry {
    pub fn new(logs: Arc<[HealthLog]>, fetched_at: Instant) -> Self {
        Self { logs, fetched_at }
    }

    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }

    pub fn logs(&self) -> Arc<[HealthLog]> {
        Arc::clone(&self.logs)
    }
}

/// A borrowed date window into a shared, date-sorted snapshot.
///
/// Derefs to the logs inside the window, so callers read them without
/// copying the snapshot.
#[derive(Debug, Clone)]
pub struct LogWindow {
    logs: Arc<[HealthLog]>,
    range: Range<usize>,
}

impl LogWindow {
    /// Narrows `logs` to `range` (the whole snapshot for `None`). `logs` must
    /// be sorted by date.
    pub fn new(logs: Arc<[HealthLog]>, range: Option<DateRange>) -> Self {
        let range = match range {
            Some(r) => {
                let start = logs.partition_point(|log| log.date < r.start);
                let end = logs.partition_point(|log| log.date <= r.end);
                start..end.max(start)
            }
            None => 0..logs.len(),
        };
        Self { logs, range }
    }

    /// The snapshot this window points into.
    pub fn snapshot(&self) -> &Arc<[HealthLog]> {
        &self.logs
    }
}

impl Deref for LogWindow {
    type Target = [HealthLog];

    fn deref(&self) -> &[HealthLog] {
        &self.logs[self.range.clone()]
    }
}

/// Counters describing how well the cache shields the log source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub fetches: u64,
}

impl CacheStats {
    /// Hit rate in 0.0–1.0. Returns 0.0 before any request.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_at_ttl() {
        let entry = CacheEntry::new(Arc::from(Vec::new()), Instant::now());
        let ttl = Duration::from_secs(60);

        assert!(entry.is_fresh(ttl, Instant::now()));
        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(entry.is_fresh(ttl, Instant::now()));
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!entry.is_fresh(ttl, Instant::now()));
    }

    #[test]
    fn test_window_is_inclusive_and_borrows() {
        use chrono::{TimeZone, Utc};

        let day = |d| HealthLog::on(Utc.with_ymd_and_hms(2024, 6, d, 0, 0, 0).unwrap());
        let logs: Arc<[HealthLog]> = vec![day(1), day(2), day(3), day(4)].into();
        let range = DateRange {
            start: Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap(),
        };

        let window = LogWindow::new(Arc::clone(&logs), Some(range));
        assert_eq!(window.len(), 2);
        assert!(std::ptr::eq(&window[0], &logs[1]));

        let everything = LogWindow::new(Arc::clone(&logs), None);
        assert_eq!(everything.len(), 4);
        assert!(Arc::ptr_eq(everything.snapshot(), &logs));
    }

    #[test]
    fn test_window_outside_snapshot_is_empty() {
        use chrono::{TimeZone, Utc};

        let logs: Arc<[HealthLog]> =
            vec![HealthLog::on(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())].into();
        let range = DateRange {
            start: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
        };
        assert!(LogWindow::new(logs, Some(range)).is_empty());
    }

    #[test]
    fn test_hit_rate() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            fetches: 1,
        };
        assert_eq!(stats.hit_rate(), 0.75);
    }
}
