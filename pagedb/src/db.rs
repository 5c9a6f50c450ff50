use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::PageDbError;
use crate::model::{CrawledPage, PageHash, PageInfo};

/// Lazy sequence of `(hash, PageInfo)` pairs, as produced by PageDB for
/// bulk loading. A stream that terminates abnormally (yields an `Err`)
/// must fail the whole load; consumers abort on the first error rather
/// than skipping it.
pub type HashInfoStream<'a> = BoxStream<'a, Result<(PageHash, PageInfo), PageDbError>>;

/// The PageDB contract, as consumed by the scheduler. PageDB owns URL
/// dedup and general page metadata; the scheduler only reads it via
/// `get_info` and writes via `add`.
#[async_trait]
pub trait PageDb: Send + Sync {
    /// Looks up a page by hash. A missing entry is not an error: PageDB
    /// and the schedule may drift apart during normal operation.
    async fn get_info(&self, hash: PageHash) -> Result<Option<PageInfo>, PageDbError>;

    /// Records that a fetch completed.
    async fn add(&self, page: CrawledPage) -> Result<(), PageDbError>;

    /// Streams every known page, for bulk loading into the schedule.
    fn stream_all(&self) -> HashInfoStream<'_>;
}
