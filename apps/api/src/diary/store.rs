//! Record store for diary entries.
//!
//! Append-only: rows are inserted once and never updated or deleted.
//! Ids come from SQLite `AUTOINCREMENT`, so they are never reused and the
//! counter survives restarts.

use sqlx::SqlitePool;
use tracing::debug;

use crate::models::entry::{DiaryEntry, DiaryEntryRow, NewDiaryEntry};

#[derive(Clone)]
pub struct DiaryStore {
    pool: SqlitePool,
}

impl DiaryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a new entry and returns it with the assigned id.
    pub async fn create(&self, entry: NewDiaryEntry) -> sqlx::Result<DiaryEntry> {
        let context = serde_json::Value::Object(entry.context.clone()).to_string();

        let result = sqlx::query(
            r#"
            INSERT INTO diary_entries
                (user_id, content, enhanced_content, created_at, context)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.user_id)
        .bind(&entry.content)
        .bind(&entry.enhanced_content)
        .bind(&entry.created_at)
        .bind(&context)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!("Inserted diary entry {id} for user {}", entry.user_id);

        Ok(entry.into_entry(id))
    }

    /// Entries for one user, newest first. Ties on `created_at` fall back to
    /// the later id. `None` means no limit.
    pub async fn list_by_user(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> sqlx::Result<Vec<DiaryEntry>> {
        // SQLite treats a negative LIMIT as unbounded.
        let limit = limit.map(i64::from).unwrap_or(-1);

        let rows = sqlx::query_as::<_, DiaryEntryRow>(
            r#"
            SELECT id, user_id, content, enhanced_content, created_at, context
            FROM diary_entries
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DiaryEntry::from).collect())
    }

    /// Exact id lookup. Absence is `Ok(None)`, not an error.
    pub async fn get(&self, id: i64) -> sqlx::Result<Option<DiaryEntry>> {
        let row = sqlx::query_as::<_, DiaryEntryRow>(
            r#"
            SELECT id, user_id, content, enhanced_content, created_at, context
            FROM diary_entries
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(DiaryEntry::from))
    }
}
