use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("timestamp out of range: {0} ms")]
    InvalidTimestamp(i64),

    #[error("unknown table: {0}")]
    UnknownTable(String),
}

pub type Result<T> = std::result::Result<T, Error>;
