//! Error types for the load pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can abort a load.
///
/// Lookup misses and duplicate keys are not errors; they are counted in the
/// load statistics instead.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A data directory does not exist.
    #[error("data directory not found: {}", .0.display())]
    MissingRoot(PathBuf),

    /// Walking a data directory failed part-way.
    #[error("failed to walk {}: {source}", root.display())]
    Walk {
        root: PathBuf,
        source: walkdir::Error,
    },

    /// A data file could not be opened or read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A record is not valid JSON or does not have the expected shape.
    #[error("malformed record {record} in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        record: usize,
        source: serde_json::Error,
    },

    /// A song-play event lacks a field the fact or dimension rows need.
    #[error("record {record} in {} is missing required field `{field}`", path.display())]
    MissingField {
        path: PathBuf,
        record: usize,
        field: &'static str,
    },

    /// A record parsed but holds a value that cannot be loaded.
    #[error("invalid record {record} in {}: {message}", path.display())]
    InvalidRecord {
        path: PathBuf,
        record: usize,
        message: String,
    },

    /// A song file holds no record at all.
    #[error("{} contains no records", .0.display())]
    EmptyFile(PathBuf),

    /// An error propagated from the store.
    #[error("database error: {0}")]
    Database(#[from] sparkify_core::Error),
}

impl LoadError {
    /// Returns `true` when the error comes from the content of an input file
    /// rather than from the filesystem or the store.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. }
                | Self::MissingField { .. }
                | Self::InvalidRecord { .. }
                | Self::EmptyFile(_)
        )
    }
}

/// Convenience alias for load results.
pub type LoadResult<T> = std::result::Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_input_classification() {
        let missing = LoadError::MissingField {
            path: PathBuf::from("/data/log_data/2018-11-01-events.json"),
            record: 3,
            field: "userId",
        };
        assert!(missing.is_malformed_input());
        assert_eq!(
            missing.to_string(),
            "record 3 in /data/log_data/2018-11-01-events.json is missing required field `userId`"
        );

        let root = LoadError::MissingRoot(PathBuf::from("/nowhere"));
        assert!(!root.is_malformed_input());
        assert_eq!(root.to_string(), "data directory not found: /nowhere");
    }
}
