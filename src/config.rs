//! Environment-driven settings for the cache and the day grouper.

use crate::cache::CacheConfig;
use anyhow::{Context, Result, anyhow};
use chrono::{FixedOffset, Offset, Utc};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub cache: CacheConfig,
    /// Calendar used to decide where one day ends and the next begins.
    pub calendar: FixedOffset,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            calendar: Utc.fix(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Reads settings through `get` so tests do not touch the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = CacheConfig::default();
        let period_ttl = parse_or(
            &mut get,
            "CHART_CACHE_PERIOD_TTL_SECS",
            defaults.period_ttl.as_secs(),
        )?;
        let session_ttl = parse_or(
            &mut get,
            "CHART_CACHE_SESSION_TTL_SECS",
            defaults.session_ttl.as_secs(),
        )?;
        let offset_minutes: i32 = parse_or(&mut get, "CHART_UTC_OFFSET_MINUTES", 0)?;

        let calendar = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| anyhow!("CHART_UTC_OFFSET_MINUTES out of range: {offset_minutes}"))?;

        Ok(Self {
            cache: CacheConfig {
                period_ttl: Duration::from_secs(period_ttl),
                session_ttl: Duration::from_secs(session_ttl),
            },
            calendar,
        })
    }
}

fn parse_or<F, T>(get: &mut F, key: &str, default: T) -> Result<T>
where
    F: FnMut(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got '{raw}'")),
        None => Ok(default),
    }
}
