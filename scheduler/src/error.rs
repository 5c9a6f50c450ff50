use std::error::Error as StdError;

use thiserror::Error;

/// Error kinds a public scheduler operation can surface. Every public
/// operation returns one of these; a missing `PageInfo` during `request`
/// is not among them — that case is treated as "skip this entry".
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("memory allocation failed: {0}")]
    Memory(String),

    #[error("cannot create or open schedule directory: {0}")]
    InvalidPath(String),

    #[error("internal scheduler error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for SchedulerError {
    fn from(e: sqlx::Error) -> Self {
        SchedulerError::Internal(e.to_string())
    }
}

impl From<pagedb::PageDbError> for SchedulerError {
    fn from(e: pagedb::PageDbError) -> Self {
        match e {
            pagedb::PageDbError::InvalidPath(m) => SchedulerError::InvalidPath(m),
            pagedb::PageDbError::Internal(m) => SchedulerError::Internal(m),
        }
    }
}

/// Renders an error's cause chain as a short stack of messages, outer
/// cause first, inner cause last — the scheduler's error buffer, minus
/// the C-style mutable accumulator: `anyhow`/`thiserror`'s `source()`
/// chain already holds this, so we just walk it.
pub fn chain_of(err: &(dyn StdError + 'static)) -> Vec<String> {
    let mut out = vec![err.to_string()];
    let mut cur = err.source();
    while let Some(e) = cur {
        out.push(e.to_string());
        cur = e.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_of_single_error_has_one_entry() {
        let err = SchedulerError::Internal("boom".into());
        assert_eq!(chain_of(&err), vec!["internal scheduler error: boom"]);
    }
}
