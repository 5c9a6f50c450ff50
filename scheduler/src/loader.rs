//! Bulk Loader — populates the schedule from either a PageInfo stream
//! (`load_simple`) or a flat frequency table (`load_mmap`).

use futures::StreamExt;
use pagedb::{PageDb, PageHash};
use sqlx::SqlitePool;
use tracing::{info, instrument};

use crate::error::SchedulerError;
use crate::key::ScheduleKey;
use crate::store::StoreSession;

/// One record of the external, caller-supplied flat frequency table
/// consumed by `load_mmap`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFreq {
    pub hash: PageHash,
    pub freq: f32,
}

pub struct BulkLoader<'p> {
    pool: &'p SqlitePool,
}

impl<'p> BulkLoader<'p> {
    pub fn new(pool: &'p SqlitePool) -> Self {
        Self { pool }
    }

    /// Streams every `(hash, PageInfo)` pair from PageDB and loads eligible
    /// pages into the schedule at `score = 0`. All insertions commit
    /// atomically: a stream that terminates abnormally aborts the whole
    /// load.
    #[instrument(skip(self, pagedb), target = "scheduler")]
    pub async fn load_simple(
        &self,
        pagedb: &dyn PageDb,
        freq_default: f32,
        freq_scale: f32,
        max_n_crawls: u64,
    ) -> Result<u64, SchedulerError> {
        let mut session = StoreSession::cursor_open(self.pool).await?;
        let mut inserted = 0u64;
        let mut stream = pagedb.stream_all();

        loop {
            let item = match stream.next().await {
                Some(item) => item,
                None => break,
            };

            // Each PageInfo is inspected and dropped exactly once per
            // iteration, whether or not it ends up inserted — there is no
            // Rust analogue of the source's double-free-on-abnormal-stream
            // concern, ownership already guarantees this.
            let (hash, info) = match item {
                Ok(pair) => pair,
                Err(e) => {
                    session.cursor_abort().await.ok();
                    return Err(e.into());
                }
            };

            let eligible = info.n_crawls > 0
                && (max_n_crawls == 0 || info.n_crawls < max_n_crawls)
                && !info.is_seed;
            if !eligible {
                continue;
            }

            let freq = if freq_scale > 0.0 && info.rate() > 0.0 {
                freq_scale * info.rate() as f32
            } else {
                freq_default
            };
            if freq <= 0.0 {
                continue;
            }

            if let Err(e) = session
                .cursor_put(ScheduleKey::new(0.0, hash.get()), freq)
                .await
            {
                session.cursor_abort().await.ok();
                return Err(e);
            }
            inserted += 1;
        }

        session.cursor_commit().await?;
        info!(inserted, "load_simple committed");
        Ok(inserted)
    }

    /// Accepts an external flat array of `{hash, freq}` records. The
    /// Ordered Store is asked to ensure capacity for at least
    /// `2 * n_elements * element_size` bytes before writing — on SQLite
    /// this is a documented no-op, the file grows on demand, so there is
    /// nothing to call here.
    #[instrument(skip(self, freqs), fields(n = freqs.len()), target = "scheduler")]
    pub async fn load_mmap(&self, freqs: &[PageFreq]) -> Result<u64, SchedulerError> {
        let mut session = StoreSession::cursor_open(self.pool).await?;
        let mut inserted = 0u64;

        for pf in freqs {
            if pf.freq <= 0.0 {
                continue;
            }

            let score = 1.0 / pf.freq;
            if let Err(e) = session
                .cursor_put(ScheduleKey::new(score, pf.hash.get()), pf.freq)
                .await
            {
                session.cursor_abort().await.ok();
                return Err(e);
            }
            inserted += 1;
        }

        session.cursor_commit().await?;
        info!(inserted, "load_mmap committed");
        Ok(inserted)
    }
}
