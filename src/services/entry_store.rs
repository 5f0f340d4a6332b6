//! src/services/entry_store.rs
//!
//! The persistence port for guestbook entries, plus the SQLite
//! backend used by the binary. The store owns the canonical collection; the
//! rest of the crate only ever holds per-request copies.

use crate::models::entry::{EntryId, GuestbookEntry};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("entry {0} not found")]
    NotFound(EntryId),
    #[error("entry has not been saved yet")]
    Unsaved,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence contract for guestbook entries.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Insert a transient entry or update a persisted one, returning the
    /// stored representation with its identifier populated.
    async fn save(&self, entry: &GuestbookEntry) -> StoreResult<GuestbookEntry>;

    /// Snapshot of every entry, oldest first.
    async fn find_all(&self) -> StoreResult<Vec<GuestbookEntry>>;

    async fn find_by_id(&self, id: EntryId) -> StoreResult<Option<GuestbookEntry>>;

    /// Remove the entry with the given identifier.
    async fn delete_by_id(&self, id: EntryId) -> StoreResult<()>;

    async fn count(&self) -> StoreResult<i64>;

    /// Add `delta` to the stored rating in a single statement, so concurrent
    /// votes never overwrite each other. The result saturates at the `i32`
    /// bounds.
    async fn apply_vote(&self, id: EntryId, delta: i32) -> StoreResult<GuestbookEntry>;

    /// Append `marker` to the stored author name and replace the text, in a
    /// single statement.
    async fn mark_edited(
        &self,
        id: EntryId,
        marker: &str,
        text: &str,
    ) -> StoreResult<GuestbookEntry>;

    /// Remove `entry`, which must have been saved before.
    async fn delete(&self, entry: &GuestbookEntry) -> StoreResult<()> {
        match entry.id() {
            Some(id) => self.delete_by_id(id).await,
            None => Err(StoreError::Unsaved),
        }
    }
}

const ENTRY_COLUMNS: &str = "id, name, text, image_url, created_at, rating";

/// SQLite-backed [`EntryStore`].
#[derive(Clone)]
pub struct SqliteEntryStore {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl SqliteEntryStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    async fn insert(&self, entry: &GuestbookEntry) -> StoreResult<GuestbookEntry> {
        let query = format!(
            "INSERT INTO entries (name, text, image_url, created_at, rating)
             VALUES (?, ?, ?, ?, ?)
             RETURNING {ENTRY_COLUMNS}"
        );
        let saved = sqlx::query_as::<_, GuestbookEntry>(&query)
            .bind(entry.name())
            .bind(entry.text())
            .bind(entry.image_url())
            .bind(entry.created_at())
            .bind(entry.rating())
            .fetch_one(&*self.db)
            .await?;
        debug!(id = ?saved.id(), "inserted entry");
        Ok(saved)
    }

    /// Update the mutable columns; the creation timestamp is never rewritten.
    async fn update(&self, id: EntryId, entry: &GuestbookEntry) -> StoreResult<GuestbookEntry> {
        let query = format!(
            "UPDATE entries SET name = ?, text = ?, image_url = ?, rating = ?
             WHERE id = ?
             RETURNING {ENTRY_COLUMNS}"
        );
        let saved = sqlx::query_as::<_, GuestbookEntry>(&query)
            .bind(entry.name())
            .bind(entry.text())
            .bind(entry.image_url())
            .bind(entry.rating())
            .bind(id)
            .fetch_optional(&*self.db)
            .await?
            .ok_or(StoreError::NotFound(id))?;
        debug!(id, "updated entry");
        Ok(saved)
    }
}

#[async_trait]
impl EntryStore for SqliteEntryStore {
    async fn save(&self, entry: &GuestbookEntry) -> StoreResult<GuestbookEntry> {
        match entry.id() {
            Some(id) => self.update(id, entry).await,
            None => self.insert(entry).await,
        }
    }

    async fn find_all(&self) -> StoreResult<Vec<GuestbookEntry>> {
        let query = format!("SELECT {ENTRY_COLUMNS} FROM entries ORDER BY created_at ASC, id ASC");
        let entries = sqlx::query_as::<_, GuestbookEntry>(&query)
            .fetch_all(&*self.db)
            .await?;
        Ok(entries)
    }

    async fn find_by_id(&self, id: EntryId) -> StoreResult<Option<GuestbookEntry>> {
        let query = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?");
        let entry = sqlx::query_as::<_, GuestbookEntry>(&query)
            .bind(id)
            .fetch_optional(&*self.db)
            .await?;
        Ok(entry)
    }

    async fn delete_by_id(&self, id: EntryId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM entries WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        debug!(id, "deleted entry");
        Ok(())
    }

    async fn count(&self) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM entries")
            .fetch_one(&*self.db)
            .await?;
        Ok(count)
    }

    async fn apply_vote(&self, id: EntryId, delta: i32) -> StoreResult<GuestbookEntry> {
        // SQLite integers are 64-bit, so the sum cannot overflow before the clamp.
        let query = format!(
            "UPDATE entries SET rating = MAX(MIN(rating + ?, {max}), {min})
             WHERE id = ?
             RETURNING {ENTRY_COLUMNS}",
            max = i32::MAX,
            min = i32::MIN,
        );
        let saved = sqlx::query_as::<_, GuestbookEntry>(&query)
            .bind(delta)
            .bind(id)
            .fetch_optional(&*self.db)
            .await?
            .ok_or(StoreError::NotFound(id))?;
        debug!(id, delta, rating = saved.rating(), "applied vote");
        Ok(saved)
    }

    async fn mark_edited(
        &self,
        id: EntryId,
        marker: &str,
        text: &str,
    ) -> StoreResult<GuestbookEntry> {
        let query = format!(
            "UPDATE entries SET name = name || ?, text = ?
             WHERE id = ?
             RETURNING {ENTRY_COLUMNS}"
        );
        let saved = sqlx::query_as::<_, GuestbookEntry>(&query)
            .bind(marker)
            .bind(text)
            .bind(id)
            .fetch_optional(&*self.db)
            .await?
            .ok_or(StoreError::NotFound(id))?;
        debug!(id, "marked entry as edited");
        Ok(saved)
    }
}
