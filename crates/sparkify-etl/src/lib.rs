//! Load pipeline for sparkify.
//!
//! Walks the song-metadata and event-log trees, turns each file into
//! star-schema rows and writes them with conflict-tolerant inserts, one
//! transaction per file. Song data always loads before log data, since
//! song plays are resolved against the song catalog.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod records;
pub mod scan;
pub mod transform;

pub use config::Config;
pub use error::{LoadError, LoadResult};
pub use pipeline::{load_log_data, load_song_data, Dataset, LoadEvent, LoadReport, Pipeline, SongCatalog};
pub use records::{LogEvent, RecordStream, SongPlayEvent, SongRecord, SONG_PLAY_PAGE};
pub use scan::find_json_files;
pub use transform::{load_log_file, load_song_file, LogFileStats, SongFileStats};
