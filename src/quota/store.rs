// src/quota/store.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};
use tracing::warn;

use super::QuotaRecord;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Persistence for quota rows. One row per identity.
#[async_trait]
pub trait QuotaStore: Send + Sync {
    async fn load(&self, identity_id: &str) -> Result<Option<QuotaRecord>, sqlx::Error>;
    async fn save(&self, record: &QuotaRecord) -> Result<(), sqlx::Error>;
}

pub struct SqliteQuotaStore {
    db: SqlitePool,
}

impl SqliteQuotaStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl QuotaStore for SqliteQuotaStore {
    async fn load(&self, identity_id: &str) -> Result<Option<QuotaRecord>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT identity_id, count, last_reset_date, updated_at FROM message_quota WHERE identity_id = ?",
        )
        .bind(identity_id)
        .fetch_optional(&self.db)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw_date: String = row.get("last_reset_date");
        let last_reset_date = match NaiveDate::parse_from_str(&raw_date, DATE_FORMAT) {
            Ok(date) => date,
            Err(_) => {
                // Unreadable date: treat the row as stale so it resets today
                warn!("Bad last_reset_date '{}' for {}", raw_date, identity_id);
                NaiveDate::MIN
            }
        };
        let count: i64 = row.get("count");

        Ok(Some(QuotaRecord {
            identity_id: row.get("identity_id"),
            count: u32::try_from(count).unwrap_or(0),
            last_reset_date,
            updated_at_ms: row.get("updated_at"),
        }))
    }

    async fn save(&self, record: &QuotaRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO message_quota (identity_id, count, last_reset_date, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(identity_id) DO UPDATE SET
                count = excluded.count,
                last_reset_date = excluded.last_reset_date,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&record.identity_id)
        .bind(i64::from(record.count))
        .bind(record.last_reset_date.format(DATE_FORMAT).to_string())
        .bind(record.updated_at_ms)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[tokio::test]
    async fn test_unparseable_date_reads_as_stale() {
        let pool = db::memory_pool().await.unwrap();
        sqlx::query("INSERT INTO message_quota VALUES ('zed', 10, 'yesterday', 0)")
            .execute(&pool)
            .await
            .unwrap();

        let store = SqliteQuotaStore::new(pool);
        let record = store.load("zed").await.unwrap().unwrap();
        assert_eq!(record.last_reset_date, NaiveDate::MIN);
        assert_eq!(record.effective_count(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()), 0);
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = SqliteQuotaStore::new(db::memory_pool().await.unwrap());
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        for count in [3, 4] {
            store
                .save(&QuotaRecord {
                    identity_id: "kim".into(),
                    count,
                    last_reset_date: date,
                    updated_at_ms: i64::from(count) * 1000,
                })
                .await
                .unwrap();
        }
        let record = store.load("kim").await.unwrap().unwrap();
        assert_eq!((record.count, record.updated_at_ms), (4, 4000));
    }
}
