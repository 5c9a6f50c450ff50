#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Directory the schedule's SQLite files live in. Derived as
    /// `"<pagedb_path>_freqs"` when not explicitly supplied.
    pub schedule_dir: String,

    /// Retain the schedule directory on shutdown. If `false`, `delete`
    /// removes the directory entirely.
    pub persist: bool,

    /// Fractional earliness slack for the request-engine margin check.
    /// `-1.0` (default) disables backpressure; `>= 0.0` enables it.
    pub margin: f32,

    /// Per-page lifetime crawl cap. `0` (default) means unlimited.
    pub max_n_crawls: u64,

    /// Fallback crawl frequency (crawls/second) used by `load_simple`
    /// when `freq_scale` is disabled or the page has no observed rate.
    pub freq_default: f32,

    /// Multiplier applied to a page's observed crawl rate by
    /// `load_simple`. `<= 0.0` disables rate-based scaling.
    pub freq_scale: f32,

    /// How long a writer waits on SQLite's lock before the Ordered Store
    /// surfaces a contention error.
    pub busy_timeout_ms: u64,
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        let schedule_dir =
            std::env::var("SCHEDULE_DIR").unwrap_or_else(|_| "./schedule".to_string());

        let persist = std::env::var("SCHEDULE_PERSIST")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(true);

        let margin = std::env::var("SCHEDULE_MARGIN")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(-1.0);

        let max_n_crawls = std::env::var("SCHEDULE_MAX_N_CRAWLS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);

        let busy_timeout_ms = std::env::var("SCHEDULE_BUSY_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5_000);

        Self {
            schedule_dir,
            persist,
            margin,
            max_n_crawls,
            freq_default: 1.0 / 86_400.0,
            freq_scale: 0.0,
            busy_timeout_ms,
        }
    }

    /// Derives a schedule directory from a PageDB path, per the
    /// `"<pagedb_path>_freqs"` convention, when the caller has not
    /// supplied one explicitly.
    pub fn derive_schedule_dir(pagedb_path: &str) -> String {
        format!("{pagedb_path}_freqs")
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            schedule_dir: "./schedule".to_string(),
            persist: true,
            margin: -1.0,
            max_n_crawls: 0,
            freq_default: 1.0 / 86_400.0,
            freq_scale: 0.0,
            busy_timeout_ms: 5_000,
        }
    }
}
