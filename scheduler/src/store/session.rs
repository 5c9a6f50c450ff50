//! Store Session — scoped transactional access to the `schedule` table.
//!
//! `cursor_open` begins a read-write transaction; every read and mutation
//! happens through the resulting `StoreSession` cursor. Callers must
//! either `commit` or `abort` exactly once. Dropping a session without
//! doing either aborts it (sqlx rolls back an un-committed transaction on
//! drop), which is what makes `cursor_abort`-on-the-error-path idempotent
//! and safe.

use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use crate::error::SchedulerError;
use crate::key::ScheduleKey;

pub struct StoreSession<'p> {
    tx: Option<Transaction<'p, Sqlite>>,
}

impl<'p> StoreSession<'p> {
    /// Begins a read-write transaction and positions a cursor over
    /// `schedule`. The table itself is created ahead of time by
    /// `store::schema::migrate`, once per environment, not per session.
    pub async fn cursor_open(pool: &'p SqlitePool) -> Result<Self, SchedulerError> {
        let tx = pool.begin().await?;
        Ok(Self { tx: Some(tx) })
    }

    fn tx_mut(&mut self) -> &mut Transaction<'p, Sqlite> {
        self.tx
            .as_mut()
            .expect("cursor used after cursor_commit/cursor_abort")
    }

    /// Reads the smallest-key entry without removing it.
    pub async fn cursor_first(&mut self) -> Result<Option<(ScheduleKey, f32)>, SchedulerError> {
        let row = sqlx::query(
            "SELECT score, hash, freq FROM schedule ORDER BY score ASC, hash ASC LIMIT 1",
        )
        .fetch_optional(&mut *self.tx_mut())
        .await?;

        Ok(row.map(row_to_entry))
    }

    /// All entries in ascending `(score, hash)` order. Used only by
    /// read-only admin iteration (`dump`), never by the request loop.
    pub async fn cursor_all(&mut self) -> Result<Vec<(ScheduleKey, f32)>, SchedulerError> {
        let rows = sqlx::query("SELECT score, hash, freq FROM schedule ORDER BY score ASC, hash ASC")
            .fetch_all(&mut *self.tx_mut())
            .await?;

        Ok(rows.into_iter().map(row_to_entry).collect())
    }

    /// Inserts or overwrites the entry at `key`.
    pub async fn cursor_put(&mut self, key: ScheduleKey, freq: f32) -> Result<(), SchedulerError> {
        sqlx::query("INSERT OR REPLACE INTO schedule (score, hash, freq) VALUES (?, ?, ?)")
            .bind(key.score as f64)
            .bind(key.hash.to_be_bytes().to_vec())
            .bind(freq as f64)
            .execute(&mut *self.tx_mut())
            .await?;
        Ok(())
    }

    /// Removes the entry at `key`, if present.
    pub async fn cursor_del(&mut self, key: ScheduleKey) -> Result<(), SchedulerError> {
        sqlx::query("DELETE FROM schedule WHERE score = ? AND hash = ?")
            .bind(key.score as f64)
            .bind(key.hash.to_be_bytes().to_vec())
            .execute(&mut *self.tx_mut())
            .await?;
        Ok(())
    }

    /// Number of entries currently in the schedule, within this session's
    /// transaction.
    pub async fn cursor_len(&mut self) -> Result<u64, SchedulerError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM schedule")
            .fetch_one(&mut *self.tx_mut())
            .await?;
        Ok(row.get::<i64, _>("n") as u64)
    }

    /// Commits the underlying transaction. On failure the transaction is
    /// already gone (sqlx drops and rolls back failed commits); the error
    /// still propagates to the caller.
    pub async fn cursor_commit(mut self) -> Result<(), SchedulerError> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
        }
        Ok(())
    }

    /// Aborts unconditionally. Safe to call on a session whose transaction
    /// was already consumed by `cursor_commit`.
    pub async fn cursor_abort(mut self) -> Result<(), SchedulerError> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
        }
        Ok(())
    }
}

fn row_to_entry(row: sqlx::sqlite::SqliteRow) -> (ScheduleKey, f32) {
    let score: f64 = row.get("score");
    let hash_bytes: Vec<u8> = row.get("hash");
    let hash = u64::from_be_bytes(
        hash_bytes
            .try_into()
            .expect("schedule.hash is always an 8-byte blob"),
    );
    let freq: f64 = row.get("freq");
    (ScheduleKey::new(score as f32, hash), freq as f32)
}
