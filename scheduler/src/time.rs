use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as epoch seconds, matching `PageInfo.last_crawl`'s
/// unit. The margin check's `elapsed` is "seconds since last_crawl".
pub fn now_unix_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_secs_f64()
}
