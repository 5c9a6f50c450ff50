//! End-to-end scenarios exercising the scheduler's full request lifecycle:
//! an empty schedule, repeated dequeue, priority ordering, margin
//! backpressure, retirement at the crawl cap, and the dump format.

use std::sync::Arc;

use pagedb::{MockPageDb, PageDb, PageHash, PageInfo};
use scheduler::loader::PageFreq;
use scheduler::{Scheduler, SchedulerConfig};
use tempfile::tempdir;

fn page(url: &str, n_crawls: u64, last_crawl: u64) -> PageInfo {
    PageInfo {
        url: url.to_string(),
        n_crawls,
        successful_crawls: n_crawls,
        last_crawl,
        is_seed: false,
    }
}

async fn open_scheduler(pagedb: Arc<dyn PageDb>, config: SchedulerConfig) -> Scheduler {
    let dir = tempdir().unwrap();
    // Leak the tempdir so it outlives the scheduler within the test; the
    // OS reclaims it at process exit, acceptable for a short-lived test.
    let path = dir.into_path();
    Scheduler::open(path, pagedb, config).await.unwrap()
}

#[tokio::test]
async fn s1_empty_schedule_returns_empty_request() {
    let pagedb = Arc::new(MockPageDb::new());
    let scheduler = open_scheduler(pagedb, SchedulerConfig::default()).await;

    let result = scheduler.request(10).await.unwrap();
    assert!(result.urls.is_empty());
}

#[tokio::test]
async fn s2_single_page_repeated_dequeue_advances_score() {
    let pagedb = Arc::new(MockPageDb::seeded([(
        PageHash(0x1),
        page("https://example.test/1", 0, 0),
    )]));
    let scheduler = open_scheduler(pagedb, SchedulerConfig::default()).await;

    scheduler
        .load_mmap(&[PageFreq {
            hash: PageHash(0x1),
            freq: 2.0,
        }])
        .await
        .unwrap();

    let result = scheduler.request(3).await.unwrap();
    assert_eq!(
        result.urls,
        vec![
            "https://example.test/1".to_string(),
            "https://example.test/1".to_string(),
            "https://example.test/1".to_string(),
        ]
    );

    let mut out = Vec::new();
    scheduler.dump(&mut out).await.unwrap();
    let dump = String::from_utf8(out).unwrap();
    assert_eq!(dump.trim_end(), "2.00e+00 0000000000000001 2.00e+00");
}

#[tokio::test]
async fn s3_priority_orders_by_score() {
    let pagedb = Arc::new(MockPageDb::seeded([
        (PageHash(0x1), page("https://example.test/1", 0, 0)),
        (PageHash(0x2), page("https://example.test/2", 0, 0)),
    ]));
    let scheduler = open_scheduler(pagedb, SchedulerConfig::default()).await;

    scheduler
        .load_mmap(&[
            PageFreq {
                hash: PageHash(0x1),
                freq: 1.0,
            },
            PageFreq {
                hash: PageHash(0x2),
                freq: 4.0,
            },
        ])
        .await
        .unwrap();

    let result = scheduler.request(5).await.unwrap();
    assert_eq!(
        result.urls,
        vec![
            "https://example.test/2",
            "https://example.test/2",
            "https://example.test/2",
            "https://example.test/2",
            "https://example.test/1",
        ]
    );
}

#[tokio::test]
async fn s4_margin_cutoff_leaves_schedule_unchanged() {
    let pagedb = Arc::new(MockPageDb::new());
    pagedb.insert_direct(
        PageHash(0x1),
        PageInfo {
            url: "https://example.test/1".into(),
            n_crawls: 0,
            successful_crawls: 0,
            last_crawl: (scheduler::time::now_unix_seconds() - 0.5) as u64,
            is_seed: false,
        },
    );

    let mut config = SchedulerConfig::default();
    config.margin = 0.0;

    let scheduler = open_scheduler(pagedb, config).await;
    scheduler
        .load_mmap(&[PageFreq {
            hash: PageHash(0x1),
            freq: 1.0,
        }])
        .await
        .unwrap();

    let result = scheduler.request(1).await.unwrap();
    assert!(result.urls.is_empty());
    assert!(result.interrupt);

    let mut out = Vec::new();
    scheduler.dump(&mut out).await.unwrap();
    // Schedule is unchanged: still exactly the one entry at its initial score.
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
}

#[tokio::test]
async fn s5_retirement_at_max_n_crawls() {
    let pagedb = Arc::new(MockPageDb::seeded([(
        PageHash(0x1),
        page("https://example.test/1", 1, 0),
    )]));

    let mut config = SchedulerConfig::default();
    config.max_n_crawls = 1;

    let scheduler = open_scheduler(pagedb, config).await;
    scheduler
        .load_mmap(&[PageFreq {
            hash: PageHash(0x1),
            freq: 1.0,
        }])
        .await
        .unwrap();

    let first = scheduler.request(1).await.unwrap();
    assert!(first.urls.is_empty());

    let second = scheduler.request(1).await.unwrap();
    assert!(second.urls.is_empty());
}

#[tokio::test]
async fn s6_dump_format_matches_c_style_scientific_notation() {
    let pagedb = Arc::new(MockPageDb::seeded([(
        PageHash(0x1),
        page("https://example.test/1", 0, 0),
    )]));
    let scheduler = open_scheduler(pagedb, SchedulerConfig::default()).await;

    scheduler
        .load_mmap(&[PageFreq {
            hash: PageHash(0x1),
            freq: 2.0,
        }])
        .await
        .unwrap();
    scheduler.request(3).await.unwrap();

    let mut out = Vec::new();
    scheduler.dump(&mut out).await.unwrap();
    let dump = String::from_utf8(out).unwrap();
    let line = dump.lines().next().unwrap();
    assert_eq!(line, "2.00e+00 0000000000000001 2.00e+00");
}
