use std::fmt;

/// Content-addressed page identifier. Doubles as the schedule's tie-breaker
/// key and as the lookup key into PageDB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageHash(pub u64);

impl PageHash {
    pub fn new(hash: u64) -> Self {
        Self(hash)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PageHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl From<u64> for PageHash {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Page metadata as known to PageDB. The scheduler treats everything here
/// as opaque except for the fields used by the bulk loader and the margin
/// check.
#[derive(Debug, Clone, PartialEq)]
pub struct PageInfo {
    pub url: String,
    /// Count of completed fetch attempts.
    pub n_crawls: u64,
    /// Count of fetch attempts PageDB considers successful.
    pub successful_crawls: u64,
    /// Epoch seconds of the last completed fetch; 0 if never crawled.
    pub last_crawl: u64,
    /// Seed pages are crawl starting points and are excluded from
    /// frequency scheduling.
    pub is_seed: bool,
}

impl PageInfo {
    /// Observed crawl success rate, in `[0.0, 1.0]`. `0.0` if never crawled.
    pub fn rate(&self) -> f64 {
        if self.n_crawls == 0 {
            0.0
        } else {
            self.successful_crawls as f64 / self.n_crawls as f64
        }
    }
}

/// Argument to `PageDb::add` — a page the crawler just attempted to fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawledPage {
    pub hash: PageHash,
    pub url: String,
    pub fetched_at: u64,
    pub success: bool,
}
