use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageDbError {
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("internal pagedb error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for PageDbError {
    fn from(e: sqlx::Error) -> Self {
        PageDbError::Internal(e.to_string())
    }
}
