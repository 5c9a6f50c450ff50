//! SqlitePageDb
//! ------------
//! SQLite-backed implementation of the `PageDb` trait. Responsible for
//! durable page metadata so that:
//!
//!  - crawl counts and last-crawl timestamps survive restarts
//!  - the scheduler's bulk loader can stream the full page set without
//!    holding it all in memory at once

use async_trait::async_trait;
use futures::StreamExt;
use sqlx::{Row, SqlitePool};

use crate::db::{HashInfoStream, PageDb};
use crate::error::PageDbError;
use crate::model::{CrawledPage, PageHash, PageInfo};

pub struct SqlitePageDb {
    pool: SqlitePool,
}

impl SqlitePageDb {
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if absent) a SQLite-backed PageDB at `path`.
    pub async fn open(path: &str) -> Result<Self, PageDbError> {
        let pool = SqlitePool::connect(path)
            .await
            .map_err(|e| PageDbError::InvalidPath(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pages (
                hash               BLOB PRIMARY KEY,
                url                TEXT NOT NULL,
                n_crawls           INTEGER NOT NULL DEFAULT 0,
                successful_crawls  INTEGER NOT NULL DEFAULT 0,
                last_crawl         INTEGER NOT NULL DEFAULT 0,
                is_seed            INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_page(row: &sqlx::sqlite::SqliteRow) -> Result<(PageHash, PageInfo), PageDbError> {
    let hash_i64: i64 = row.get("hash");
    let info = PageInfo {
        url: row.get("url"),
        n_crawls: row.get::<i64, _>("n_crawls") as u64,
        successful_crawls: row.get::<i64, _>("successful_crawls") as u64,
        last_crawl: row.get::<i64, _>("last_crawl") as u64,
        is_seed: row.get::<i64, _>("is_seed") != 0,
    };
    Ok((PageHash(hash_i64 as u64), info))
}

#[async_trait]
impl PageDb for SqlitePageDb {
    async fn get_info(&self, hash: PageHash) -> Result<Option<PageInfo>, PageDbError> {
        let row = sqlx::query(
            r#"
            SELECT url, n_crawls, successful_crawls, last_crawl, is_seed
            FROM pages WHERE hash = ?;
            "#,
        )
        .bind(hash.get() as i64)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| PageInfo {
            url: r.get("url"),
            n_crawls: r.get::<i64, _>("n_crawls") as u64,
            successful_crawls: r.get::<i64, _>("successful_crawls") as u64,
            last_crawl: r.get::<i64, _>("last_crawl") as u64,
            is_seed: r.get::<i64, _>("is_seed") != 0,
        }))
    }

    async fn add(&self, page: CrawledPage) -> Result<(), PageDbError> {
        sqlx::query(
            r#"
            INSERT INTO pages (hash, url, n_crawls, successful_crawls, last_crawl, is_seed)
            VALUES (?, ?, 1, ?, ?, 0)
            ON CONFLICT(hash) DO UPDATE SET
                n_crawls          = n_crawls + 1,
                successful_crawls = successful_crawls + excluded.successful_crawls,
                last_crawl        = excluded.last_crawl;
            "#,
        )
        .bind(page.hash.get() as i64)
        .bind(&page.url)
        .bind(if page.success { 1i64 } else { 0i64 })
        .bind(page.fetched_at as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn stream_all(&self) -> HashInfoStream<'_> {
        let stream = sqlx::query(
            r#"SELECT hash, url, n_crawls, successful_crawls, last_crawl, is_seed FROM pages;"#,
        )
        .fetch(&self.pool)
        .map(|res| match res {
            Ok(row) => row_to_page(&row),
            Err(e) => Err(PageDbError::from(e)),
        });

        Box::pin(stream)
    }
}
