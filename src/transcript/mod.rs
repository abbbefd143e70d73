// src/transcript/mod.rs

//! Chat transcript persistence, keyed by identity.
//!
//! Writes are best-effort: callers log failures and still answer the user.

use serde::Serialize;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::persona::Role;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredTurn {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub has_image: bool,
    pub created_at: i64,
}

/// One user message plus the reply it got
#[derive(Debug, Clone, Copy)]
pub struct Exchange<'a> {
    pub identity_id: &'a str,
    pub session_id: Option<&'a str>,
    pub user_text: &'a str,
    pub has_image: bool,
    pub reply: &'a str,
    /// Epoch millis stamped on both rows
    pub created_at_ms: i64,
}

#[derive(Clone)]
pub struct TranscriptStore {
    db: SqlitePool,
}

impl TranscriptStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Append both sides of an exchange in one transaction.
    pub async fn append_exchange(&self, exchange: Exchange<'_>) -> Result<(), sqlx::Error> {
        let now = exchange.created_at_ms;
        let mut tx = self.db.begin().await?;

        let rows = [
            (Role::User, exchange.user_text, exchange.has_image),
            (Role::Assistant, exchange.reply, false),
        ];
        for (role, content, has_image) in rows {
            sqlx::query(
                r#"
                INSERT INTO chat_transcripts
                    (id, identity_id, session_id, role, content, has_image, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(exchange.identity_id)
            .bind(exchange.session_id)
            .bind(role.as_str())
            .bind(content)
            .bind(has_image)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("Stored exchange for {}", exchange.identity_id);
        Ok(())
    }

    /// Most recent `limit` turns for an identity, oldest first.
    pub async fn recent(&self, identity_id: &str, limit: usize) -> Result<Vec<StoredTurn>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, role, content, has_image, created_at FROM (
                SELECT id, role, content, has_image, created_at, rowid AS rid
                FROM chat_transcripts
                WHERE identity_id = ?
                ORDER BY rid DESC
                LIMIT ?
            )
            ORDER BY rid ASC
            "#,
        )
        .bind(identity_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let role: String = row.get("role");
                Some(StoredTurn {
                    id: row.get("id"),
                    role: role.parse().ok()?,
                    content: row.get("content"),
                    has_image: row.get("has_image"),
                    created_at: row.get("created_at"),
                })
            })
            .collect())
    }
}
