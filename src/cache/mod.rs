//! Time-scoped cache in front of the log store.
//!
//! Per-period entries live for five minutes and one session-wide entry of all
//! logs lives for one minute. Every cache read and write goes through one
//! async mutex. A miss holds that mutex while the source is read, so
//! concurrent requests for the same missing entry wait on a single fetch.
//!
//! The coordinator never sees writes to the store; whoever writes logs must
//! call [`CacheCoordinator::invalidate_all`] or
//! [`CacheCoordinator::invalidate_session`].

mod entry;

pub use entry::{CacheConfig, CacheEntry, CacheStats, LogWindow};

use crate::model::{DateRange, HealthLog, TimePeriod};
use crate::source::LogSource;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Default)]
struct CacheState {
    periods: HashMap<TimePeriod, CacheEntry>,
    session: Option<CacheEntry>,
}

/// Owner of all cached log snapshots for one log source.
pub struct CacheCoordinator<S> {
    source: S,
    config: CacheConfig,
    state: Mutex<CacheState>,
    hits: AtomicU64,
    misses: AtomicU64,
    fetches: AtomicU64,
}

impl<S: LogSource> CacheCoordinator<S> {
    pub fn new(source: S, config: CacheConfig) -> Self {
        Self {
            source,
            config,
            state: Mutex::new(CacheState::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            fetches: AtomicU64::new(0),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Logs inside `period`, sorted by date, from the per-period cache.
    #[tracing::instrument(skip(self))]
    pub async fn logs_for_period(&self, period: TimePeriod) -> Arc<[HealthLog]> {
        let mut state = self.state.lock().await;

        if let Some(entry) = state.periods.get(&period) {
            if entry.is_fresh(self.config.period_ttl, Instant::now()) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Period cache hit");
                return entry.logs();
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let Some(all) = self.fetch().await else {
            return Arc::from(Vec::new());
        };
        let logs: Arc<[HealthLog]> = filter_sorted(&all, period.date_range(Utc::now())).into();
        state
            .periods
            .insert(period, CacheEntry::new(Arc::clone(&logs), Instant::now()));
        debug!(count = logs.len(), "Period cache filled");
        logs
    }

    /// Every log in the source, sorted by date, from the session cache.
    pub async fn all_logs(&self) -> Arc<[HealthLog]> {
        let mut state = self.state.lock().await;

        if let Some(entry) = &state.session {
            if entry.is_fresh(self.config.session_ttl, Instant::now()) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Session cache hit");
                return entry.logs();
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let Some(all) = self.fetch().await else {
            return Arc::from(Vec::new());
        };
        let logs: Arc<[HealthLog]> = filter_sorted(&all, None).into();
        state.session = Some(CacheEntry::new(Arc::clone(&logs), Instant::now()));
        debug!(count = logs.len(), "Session cache filled");
        logs
    }

    /// Logs inside `period`, derived from the session cache so that several
    /// periods can be served from one source read.
    #[tracing::instrument(skip(self))]
    pub async fn filter_by_period(&self, period: TimePeriod) -> LogWindow {
        LogWindow::new(self.all_logs().await, period.date_range(Utc::now()))
    }

    /// Number of logs inside `period` matching `predicate`.
    pub async fn count<P>(&self, period: TimePeriod, predicate: P) -> usize
    where
        P: Fn(&HealthLog) -> bool,
    {
        self.filter_by_period(period)
            .await
            .iter()
            .filter(|&log| predicate(log))
            .count()
    }

    /// Drops every cached entry.
    pub async fn invalidate_all(&self) {
        let mut state = self.state.lock().await;
        state.periods.clear();
        state.session = None;
        info!("Log cache invalidated");
    }

    /// Drops only the session-wide entry.
    pub async fn invalidate_session(&self) {
        self.state.lock().await.session = None;
        debug!("Session cache invalidated");
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
        }
    }

    /// Reads the source. Failures are logged and yield `None`, leaving the
    /// cache untouched so the next request retries.
    async fn fetch(&self) -> Option<Vec<HealthLog>> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        match self.source.fetch_all().await {
            Ok(logs) => {
                debug!(count = logs.len(), "Fetched logs from source");
                Some(logs)
            }
            Err(e) => {
                warn!(error = %e, "Log source fetch failed");
                None
            }
        }
    }
}

fn in_range(log: &HealthLog, range: Option<&DateRange>) -> bool {
    range.is_none_or(|r| r.contains(log.date))
}

/// Copies the logs inside `range` (all of them for `None`), sorted by date.
fn filter_sorted(logs: &[HealthLog], range: Option<DateRange>) -> Vec<HealthLog> {
    let mut filtered: Vec<HealthLog> = logs
        .iter()
        .filter(|log| in_range(log, range.as_ref()))
        .cloned()
        .collect();
    filtered.sort_by_key(|log| log.date);
    filtered
}
