//! Order invariant and score-monotonicity properties, checked with
//! randomly generated frequency tables.

use std::sync::Arc;

use pagedb::{MockPageDb, PageHash, PageInfo};
use proptest::prelude::*;
use scheduler::loader::PageFreq;
use scheduler::{Scheduler, SchedulerConfig};
use tempfile::tempdir;

fn run<F: std::future::Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(fut)
}

fn freq_table(n: usize) -> impl Strategy<Value = Vec<(u64, f32)>> {
    proptest::collection::vec((1u64..10_000, 0.1f32..10.0), 1..=n)
        .prop_map(|mut v| {
            v.sort_by_key(|(hash, _)| *hash);
            v.dedup_by_key(|(hash, _)| *hash);
            v
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn order_invariant_holds_after_any_sequence_of_requests(
        entries in freq_table(20),
        n_requests in 0u64..50,
    ) {
        run(async {
            let pagedb = Arc::new(MockPageDb::seeded(entries.iter().map(|(hash, _)| {
                (
                    PageHash(*hash),
                    PageInfo {
                        url: format!("https://example.test/{hash:x}"),
                        n_crawls: 0,
                        successful_crawls: 0,
                        last_crawl: 0,
                        is_seed: false,
                    },
                )
            })));

            let dir = tempdir().unwrap();
            let scheduler = Scheduler::open(dir.path(), pagedb, SchedulerConfig::default())
                .await
                .unwrap();

            let freqs: Vec<PageFreq> = entries
                .iter()
                .map(|(hash, freq)| PageFreq {
                    hash: PageHash(*hash),
                    freq: *freq,
                })
                .collect();
            scheduler.load_mmap(&freqs).await.unwrap();

            scheduler.request(n_requests).await.unwrap();

            let mut out = Vec::new();
            scheduler.dump(&mut out).await.unwrap();
            let dump = String::from_utf8(out).unwrap();

            let mut prev: Option<(f64, u64)> = None;
            for line in dump.lines() {
                let mut parts = line.split(' ');
                let score: f64 = parts.next().unwrap().parse().unwrap();
                let hash = u64::from_str_radix(parts.next().unwrap(), 16).unwrap();
                if let Some((pscore, phash)) = prev {
                    let ascending = score > pscore || (score == pscore && hash > phash);
                    prop_assert!(ascending, "dump is not strictly ascending by (score, hash)");
                }
                prev = Some((score, hash));
            }

            scheduler.delete().await.unwrap();
            Ok(())
        })?;
    }

    #[test]
    fn score_advances_by_exactly_one_over_freq_on_every_dequeue(
        freq in 0.25f32..8.0,
    ) {
        run(async {
            let hash = PageHash(0x2a);
            let pagedb = Arc::new(MockPageDb::seeded([(
                hash,
                PageInfo {
                    url: "https://example.test/fixed".into(),
                    n_crawls: 0,
                    successful_crawls: 0,
                    last_crawl: 0,
                    is_seed: false,
                },
            )]));

            let dir = tempdir().unwrap();
            let scheduler = Scheduler::open(dir.path(), pagedb, SchedulerConfig::default())
                .await
                .unwrap();

            scheduler
                .load_mmap(&[PageFreq { hash, freq }])
                .await
                .unwrap();

            let initial_score = 1.0 / freq;

            scheduler.request(1).await.unwrap();

            let mut out = Vec::new();
            scheduler.dump(&mut out).await.unwrap();
            let dump = String::from_utf8(out).unwrap();
            let line = dump.lines().next().unwrap();
            let score: f64 = line.split(' ').next().unwrap().parse().unwrap();

            let expected = (initial_score + 1.0 / freq) as f64;
            prop_assert!((score - expected).abs() < 1e-2, "got {score}, expected {expected}");

            scheduler.delete().await.unwrap();
            Ok(())
        })?;
    }
}
