//! PageDB — the page metadata store consumed by the frequency scheduler.
//!
//! The scheduler treats PageDB as an external collaborator: it calls
//! `get_info`/`add` and consumes a stream of `(PageHash, PageInfo)` pairs
//! for bulk loading. This crate defines that contract plus two concrete
//! implementations: a SQLite-backed store for real use, and an in-memory
//! mock (behind the `mock` feature) for tests.

pub mod db;
pub mod error;
pub mod model;
pub mod sqlite_store;

#[cfg(feature = "mock")]
pub mod mock;

pub use db::{HashInfoStream, PageDb};
pub use error::PageDbError;
pub use model::{CrawledPage, PageHash, PageInfo};
pub use sqlite_store::SqlitePageDb;

#[cfg(feature = "mock")]
pub use mock::MockPageDb;
