//! Per-caller quota over the usage store.
//!
//! Each hashed identity owns one [`UsageRecord`]. A missing or expired record
//! starts a fresh window with `count = 1`; an active record under the limit is
//! incremented in place; an active record at the limit is denied until its
//! `reset_at`. Store failures never deny a request: they come back as
//! [`QuotaDecision::Unavailable`] and the caller proceeds without enforcement.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::config::QuotaConfig;
use crate::store::{StoreError, UsageRecord, UsageStore};

const KEY_PREFIX: &str = "quota/";
const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug)]
pub enum QuotaDecision {
    Allowed {
        count: u32,
        reset_at: DateTime<Utc>,
    },
    Denied {
        retry_after: Duration,
        message: String,
    },
    /// Enforcement skipped because the store could not be used.
    Unavailable(StoreError),
}

#[derive(Clone)]
pub struct QuotaTracker {
    store: Option<Arc<dyn UsageStore>>,
    config: QuotaConfig,
}

impl QuotaTracker {
    pub fn new(store: Arc<dyn UsageStore>, config: QuotaConfig) -> Self {
        Self {
            store: Some(store),
            config,
        }
    }

    // Tracker whose store failed to initialize, every check fails open
    pub fn without_store(config: QuotaConfig) -> Self {
        Self {
            store: None,
            config,
        }
    }

    pub async fn check(&self, hashed_id: &str) -> QuotaDecision {
        self.check_at(hashed_id, Utc::now()).await
    }

    pub async fn check_at(&self, hashed_id: &str, now: DateTime<Utc>) -> QuotaDecision {
        let Some(store) = &self.store else {
            return QuotaDecision::Unavailable(StoreError::Unconfigured(
                "usage store failed to initialize".to_string(),
            ));
        };
        let key = format!("{KEY_PREFIX}{hashed_id}");

        let current = match store.get(&key).await {
            Ok(record) => record,
            Err(e) => return QuotaDecision::Unavailable(e),
        };

        let next = match current {
            // window still running
            Some(record) if now < record.reset_at => {
                if record.count >= self.config.limit {
                    let retry_after = record.reset_at - now;
                    return QuotaDecision::Denied {
                        message: limit_message(days_until(retry_after)),
                        retry_after,
                    };
                }
                UsageRecord {
                    count: record.count + 1,
                    reset_at: record.reset_at,
                }
            }
            // first request, or the window has passed
            _ => {
                let Some(reset_at) = now.checked_add_signed(self.config.window) else {
                    return QuotaDecision::Unavailable(StoreError::Unconfigured(format!(
                        "quota window of {} days overflows the clock",
                        self.config.window.num_days()
                    )));
                };
                UsageRecord { count: 1, reset_at }
            }
        };

        match store.set(&key, &next).await {
            Ok(()) => QuotaDecision::Allowed {
                count: next.count,
                reset_at: next.reset_at,
            },
            Err(e) => QuotaDecision::Unavailable(e),
        }
    }
}

// Whole days left, rounded up, never below one
pub fn days_until(remaining: Duration) -> i64 {
    let secs = remaining.num_seconds().max(0);
    let days = (secs + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY;
    days.max(1)
}

fn limit_message(days: i64) -> String {
    let unit = if days == 1 { "day" } else { "days" };
    format!("Message limit reached. Try again in {days} {unit}.")
}
