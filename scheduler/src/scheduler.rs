//! The frequency scheduler itself: ties together the Ordered Store, the
//! Request Engine, and the Admin operations (`dump`, `delete`) behind one
//! value object.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pagedb::{CrawledPage, PageDb, PageHash};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{debug, info, instrument, warn};

use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::key::ScheduleKey;
use crate::store::{StoreSession, registry, schema};
use crate::time::now_unix_seconds;

/// Result of a `request` call: the URLs to crawl next, plus whether the
/// batch was cut short (empty schedule or a margin-check interruption).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageRequest {
    pub urls: Vec<String>,
    pub interrupt: bool,
}

/// Holds the on-disk schedule directory, the Ordered Store environment,
/// a handle to PageDB, and the scheduler's configuration knobs.
pub struct Scheduler {
    path: PathBuf,
    canonical_path: PathBuf,
    pool: SqlitePool,
    pagedb: Arc<dyn PageDb>,
    config: SchedulerConfig,
}

impl Scheduler {
    /// Opens (creating if absent) the schedule directory at `path`.
    /// Rejects a directory that is already open by another `Scheduler` in
    /// this process.
    #[instrument(skip(pagedb, config), fields(path = %path.as_ref().display()))]
    pub async fn open(
        path: impl AsRef<Path>,
        pagedb: Arc<dyn PageDb>,
        config: SchedulerConfig,
    ) -> Result<Self, SchedulerError> {
        let path = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&path).map_err(|e| SchedulerError::InvalidPath(e.to_string()))?;

        let canonical_path = match registry::register(&path) {
            Ok(p) => p,
            Err(e) => return Err(e),
        };

        let db_path = path.join("data.sqlite3");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());

        let pool = match SqlitePoolOptions::new()
            .max_connections(1) // at most one live write transaction per environment
            .connect(&url)
            .await
        {
            Ok(pool) => pool,
            Err(e) => {
                registry::deregister(&canonical_path);
                return Err(SchedulerError::InvalidPath(e.to_string()));
            }
        };

        if let Err(e) = Self::configure_pragmas(&pool, config.busy_timeout_ms).await {
            registry::deregister(&canonical_path);
            return Err(e);
        }

        if let Err(e) = schema::migrate(&pool).await {
            registry::deregister(&canonical_path);
            return Err(e.into());
        }

        info!(path = %path.display(), "schedule opened");

        Ok(Self {
            path,
            canonical_path,
            pool,
            pagedb,
            config,
        })
    }

    async fn configure_pragmas(pool: &SqlitePool, busy_timeout_ms: u64) -> Result<(), SchedulerError> {
        // fsync disabled: a process crash survives but a power loss may
        // lose the last transaction.
        sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;
        sqlx::query("PRAGMA synchronous = OFF").execute(pool).await?;
        sqlx::query(&format!("PRAGMA busy_timeout = {busy_timeout_ms}"))
            .execute(pool)
            .await?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Populates the schedule from PageDB's full page stream.
    #[instrument(skip(self), target = "scheduler")]
    pub async fn load_simple(&self) -> Result<u64, SchedulerError> {
        crate::loader::BulkLoader::new(&self.pool)
            .load_simple(
                self.pagedb.as_ref(),
                self.config.freq_default,
                self.config.freq_scale,
                self.config.max_n_crawls,
            )
            .await
    }

    /// Populates the schedule from a caller-supplied flat frequency table.
    #[instrument(skip(self, freqs), fields(n = freqs.len()), target = "scheduler")]
    pub async fn load_mmap(&self, freqs: &[crate::loader::PageFreq]) -> Result<u64, SchedulerError> {
        crate::loader::BulkLoader::new(&self.pool)
            .load_mmap(freqs)
            .await
    }

    /// Dequeues up to `max_requests` URLs, rotating each dequeued entry's
    /// score forward in place.
    #[instrument(skip(self), fields(max_requests), target = "scheduler")]
    pub async fn request(&self, max_requests: u64) -> Result<PageRequest, SchedulerError> {
        let mut session = StoreSession::cursor_open(&self.pool).await?;
        let mut urls = Vec::new();
        let mut interrupt = false;

        for _ in 0..max_requests {
            let head = match session.cursor_first().await {
                Ok(head) => head,
                Err(e) => {
                    session.cursor_abort().await.ok();
                    return Err(e);
                }
            };

            // Step 1: stop if the schedule is empty.
            let (sk, freq) = match head {
                Some(entry) => entry,
                None => {
                    interrupt = true;
                    break;
                }
            };

            // Step 3: look up PageDB. Absence is permitted, not an error.
            let info = match self.pagedb.get_info(PageHash(sk.hash)).await {
                Ok(info) => info,
                Err(e) => {
                    session.cursor_abort().await.ok();
                    return Err(e.into());
                }
            };

            // Step 4: margin backpressure check. Does not mutate the
            // schedule; interrupts the batch instead.
            if self.config.margin >= 0.0 {
                if let Some(ref info) = info {
                    let elapsed = now_unix_seconds() - info.last_crawl as f64;
                    let min_elapsed = 1.0 / (freq as f64 * (1.0 + self.config.margin as f64));
                    if elapsed < min_elapsed {
                        debug!(hash = %sk.hash, elapsed, min_elapsed, "margin check interrupted batch");
                        interrupt = true;
                        break;
                    }
                }
            }

            // Step 5: crawl decision.
            let crawl = match &info {
                Some(info) => self.config.max_n_crawls == 0 || info.n_crawls < self.config.max_n_crawls,
                None => false,
            };

            // Step 6: delete the current head, copy-by-value already done
            // above (sk/freq are owned `Copy` values, safe across the
            // mutation that follows).
            if let Err(e) = session.cursor_del(sk).await {
                session.cursor_abort().await.ok();
                return Err(e);
            }

            if crawl {
                let info = info.expect("crawl is only true when info is present");
                urls.push(info.url);

                let mut advanced = sk;
                advanced.score += 1.0 / freq;
                if let Err(e) = session.cursor_put(advanced, freq).await {
                    session.cursor_abort().await.ok();
                    return Err(e);
                }
            } else {
                debug!(hash = %sk.hash, "entry retired without reinsertion");
            }
        }

        session.cursor_commit().await?;
        info!(returned = urls.len(), interrupt, "request batch complete");
        Ok(PageRequest { urls, interrupt })
    }

    /// Pass-through to PageDB: records a completed fetch. Does not touch
    /// the schedule; scores only advance in `request`.
    #[instrument(skip(self, page), fields(hash = %page.hash), target = "scheduler")]
    pub async fn add(&self, page: CrawledPage) -> Result<(), SchedulerError> {
        self.pagedb.add(page).await.map_err(SchedulerError::from)
    }

    /// Writes one text line per schedule entry, in ascending `(score,
    /// hash)` order: `"<score:.2e> <hash:016x> <freq:.2e>"`. Read-only;
    /// the transaction is aborted on completion, never committed.
    #[instrument(skip(self, out), target = "scheduler")]
    pub async fn dump(&self, out: &mut dyn Write) -> Result<(), SchedulerError> {
        let mut session = StoreSession::cursor_open(&self.pool).await?;
        let entries = match session.cursor_all().await {
            Ok(entries) => entries,
            Err(e) => {
                session.cursor_abort().await.ok();
                return Err(e);
            }
        };
        session.cursor_abort().await?;

        for (key, freq) in entries {
            writeln!(
                out,
                "{} {:016x} {}",
                format_sci(key.score),
                key.hash,
                format_sci(freq)
            )
            .map_err(|e| SchedulerError::Internal(e.to_string()))?;
        }
        Ok(())
    }

    /// Closes the environment; if `persist=false`, removes the schedule
    /// directory. Consumes `self` — the scheduler object is freed on
    /// return.
    #[instrument(skip(self), target = "scheduler")]
    pub async fn delete(self) -> Result<(), SchedulerError> {
        let persist = self.config.persist;
        let path = self.path.clone();

        self.pool.close().await;

        if !persist {
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(error = %e, path = %path.display(), "failed to remove schedule directory");
                return Err(SchedulerError::Internal(e.to_string()));
            }
        }

        Ok(())
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        registry::deregister(&self.canonical_path);
    }
}

/// Formats a value the way C's `%.2e` does: two mantissa digits after the
/// point, a signed exponent padded to at least two digits (`1.50e+00`,
/// `5.00e-04`). Rust's built-in `{:e}` formatter does neither.
fn format_sci(value: f32) -> String {
    let v = value as f64;
    if v == 0.0 {
        return "0.00e+00".to_string();
    }

    let sign = if v < 0.0 { "-" } else { "" };
    let av = v.abs();
    let mut exp = av.log10().floor() as i32;
    let mut mantissa = av / 10f64.powi(exp);

    // Rounding to two decimals can push the mantissa to 10.0; renormalize.
    mantissa = (mantissa * 100.0).round() / 100.0;
    if mantissa >= 10.0 {
        mantissa /= 10.0;
        exp += 1;
    }

    let exp_sign = if exp >= 0 { "+" } else { "-" };
    format!("{sign}{mantissa:.2}e{exp_sign}{:02}", exp.abs())
}
