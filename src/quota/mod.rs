// src/quota/mod.rs

//! Daily message quota for non-privileged identities.
//!
//! The day boundary is the UTC calendar date. Reads and writes are not
//! transactional: two concurrent requests can both see 9 and both write 10.

mod store;

pub use store::{QuotaStore, SqliteQuotaStore};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Messages per identity per UTC day
pub const DAILY_MESSAGE_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaRecord {
    pub identity_id: String,
    pub count: u32,
    pub last_reset_date: NaiveDate,
    /// Epoch millis of the last write
    pub updated_at_ms: i64,
}

impl QuotaRecord {
    /// Count as seen on `today`; a record from an earlier day reads as 0.
    pub fn effective_count(&self, today: NaiveDate) -> u32 {
        if self.last_reset_date == today {
            self.count
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    /// Privileged caller, meter not consulted
    Unlimited,
    Allowed { count: u32, remaining: u32 },
    Exceeded { limit: u32 },
}

/// Read-only view for the quota endpoint
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuotaSnapshot {
    pub identity_id: String,
    pub used: u32,
    pub limit: u32,
    pub messages_left: u32,
    pub unlimited: bool,
}

pub struct QuotaMeter {
    store: Arc<dyn QuotaStore>,
    limit: u32,
}

impl QuotaMeter {
    pub fn new(store: Arc<dyn QuotaStore>) -> Self {
        Self {
            store,
            limit: DAILY_MESSAGE_LIMIT,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Check and, when allowed, spend one message for `identity_id`.
    /// The quota day is the UTC date of `now`.
    pub async fn consume(
        &self,
        identity_id: &str,
        privileged: bool,
        now: DateTime<Utc>,
    ) -> Result<QuotaDecision, sqlx::Error> {
        if privileged {
            return Ok(QuotaDecision::Unlimited);
        }

        let today = now.date_naive();

        let used = self
            .store
            .load(identity_id)
            .await?
            .map(|record| record.effective_count(today))
            .unwrap_or(0);

        if used >= self.limit {
            info!("Daily quota exhausted for {} ({}/{})", identity_id, used, self.limit);
            return Ok(QuotaDecision::Exceeded { limit: self.limit });
        }

        let record = QuotaRecord {
            identity_id: identity_id.to_string(),
            count: used + 1,
            last_reset_date: today,
            updated_at_ms: now.timestamp_millis(),
        };
        self.store.save(&record).await?;
        debug!("Quota for {}: {}/{}", identity_id, record.count, self.limit);

        Ok(QuotaDecision::Allowed {
            count: record.count,
            remaining: self.limit.saturating_sub(record.count),
        })
    }

    /// Current usage without spending anything.
    pub async fn snapshot(
        &self,
        identity_id: &str,
        privileged: bool,
        today: NaiveDate,
    ) -> Result<QuotaSnapshot, sqlx::Error> {
        let used = if privileged {
            0
        } else {
            self.store
                .load(identity_id)
                .await?
                .map(|record| record.effective_count(today))
                .unwrap_or(0)
        };

        Ok(QuotaSnapshot {
            identity_id: identity_id.to_string(),
            used,
            limit: self.limit,
            messages_left: self.limit.saturating_sub(used),
            unlimited: privileged,
        })
    }
}
