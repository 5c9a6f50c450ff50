//! In-memory `PageDb` test double, in the shape of the corpus's
//! `MockStore`/`InMemorySessionStore` fixtures: an `Arc<Mutex<HashMap<...>>>`
//! guarding the backing map, with a small set of test-convenience methods.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use parking_lot::Mutex;

use crate::db::{HashInfoStream, PageDb};
use crate::error::PageDbError;
use crate::model::{CrawledPage, PageHash, PageInfo};

#[derive(Clone, Default)]
pub struct MockPageDb {
    pages: Arc<Mutex<HashMap<PageHash, PageInfo>>>,
}

impl MockPageDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test-convenience constructor: seed the store directly, bypassing
    /// `add`'s crawl-counting semantics.
    pub fn seeded(entries: impl IntoIterator<Item = (PageHash, PageInfo)>) -> Self {
        let db = Self::new();
        db.pages.lock().extend(entries);
        db
    }

    pub fn insert_direct(&self, hash: PageHash, info: PageInfo) {
        self.pages.lock().insert(hash, info);
    }

    pub fn len(&self) -> usize {
        self.pages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PageDb for MockPageDb {
    async fn get_info(&self, hash: PageHash) -> Result<Option<PageInfo>, PageDbError> {
        Ok(self.pages.lock().get(&hash).cloned())
    }

    async fn add(&self, page: CrawledPage) -> Result<(), PageDbError> {
        let mut pages = self.pages.lock();
        let entry = pages.entry(page.hash).or_insert_with(|| PageInfo {
            url: page.url.clone(),
            n_crawls: 0,
            successful_crawls: 0,
            last_crawl: 0,
            is_seed: false,
        });

        entry.n_crawls += 1;
        if page.success {
            entry.successful_crawls += 1;
        }
        entry.last_crawl = page.fetched_at;
        Ok(())
    }

    fn stream_all(&self) -> HashInfoStream<'_> {
        let snapshot: Vec<_> = self
            .pages
            .lock()
            .iter()
            .map(|(h, i)| Ok((*h, i.clone())))
            .collect();
        Box::pin(stream::iter(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn add_initializes_then_accumulates() {
        let db = MockPageDb::new();
        db.add(CrawledPage {
            hash: PageHash(1),
            url: "https://example.test".into(),
            fetched_at: 5,
            success: true,
        })
        .await
        .unwrap();

        let info = db.get_info(PageHash(1)).await.unwrap().unwrap();
        assert_eq!(info.n_crawls, 1);
        assert_eq!(info.successful_crawls, 1);
    }

    #[tokio::test]
    async fn stream_all_reflects_seeded_entries() {
        let db = MockPageDb::seeded([(
            PageHash(9),
            PageInfo {
                url: "https://example.test/seed".into(),
                n_crawls: 3,
                successful_crawls: 2,
                last_crawl: 42,
                is_seed: false,
            },
        )]);

        let all: Vec<_> = db.stream_all().try_collect().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].0, PageHash(9));
    }
}
