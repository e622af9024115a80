//! The load driver: reset, song data, then log data.

use std::fmt;
use std::path::{Path, PathBuf};

use sparkify_core::schema::{Batch, Database};

use crate::config::Config;
use crate::error::LoadResult;
use crate::scan::find_json_files;
use crate::transform::{load_log_file, load_song_file, LogFileStats, SongFileStats};

/// The two input datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    SongData,
    LogData,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SongData => f.write_str("song data"),
            Self::LogData => f.write_str("log data"),
        }
    }
}

/// Progress notifications emitted while a dataset loads.
#[derive(Debug, Clone, Copy)]
pub enum LoadEvent<'a> {
    /// Files were discovered; none processed yet.
    DatasetStarted {
        dataset: Dataset,
        root: &'a Path,
        files: usize,
    },
    /// A file was loaded and committed. `index` counts from 1.
    FileLoaded {
        dataset: Dataset,
        index: usize,
        total: usize,
        path: &'a Path,
    },
    DatasetFinished {
        dataset: Dataset,
        files: usize,
    },
}

/// Proof that the song catalog has been loaded.
///
/// Song plays are resolved by looking up songs and artists, so log data
/// can only be loaded once song data is in. [`load_log_data`] takes this
/// token to make that ordering explicit; the only way to get one is
/// [`load_song_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SongCatalog {
    files: usize,
    stats: SongFileStats,
}

impl SongCatalog {
    /// Song files loaded.
    pub fn files(&self) -> usize {
        self.files
    }

    pub fn stats(&self) -> SongFileStats {
        self.stats
    }
}

/// Totals for a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub catalog: SongCatalog,
    pub log_files: usize,
    pub logs: LogFileStats,
}

/// Load every song-metadata file under `root`, committing after each file.
pub fn load_song_data(
    db: &Database,
    root: &Path,
    observer: &mut dyn FnMut(&LoadEvent<'_>),
) -> LoadResult<SongCatalog> {
    let mut stats = SongFileStats::default();
    let files = load_dataset(db, Dataset::SongData, root, observer, |batch, path| {
        stats += load_song_file(batch, path)?;
        Ok(())
    })?;

    log::info!(
        "Song data loaded: {} files, {} new songs, {} new artists",
        files,
        stats.songs,
        stats.artists
    );
    Ok(SongCatalog { files, stats })
}

/// Load every event-log file under `root`, committing after each file.
pub fn load_log_data(
    db: &Database,
    root: &Path,
    _catalog: &SongCatalog,
    observer: &mut dyn FnMut(&LoadEvent<'_>),
) -> LoadResult<(usize, LogFileStats)> {
    let mut stats = LogFileStats::default();
    let files = load_dataset(db, Dataset::LogData, root, observer, |batch, path| {
        stats += load_log_file(batch, path)?;
        Ok(())
    })?;

    log::info!(
        "Log data loaded: {} files, {} song plays ({} matched, {} unmatched), {} other events skipped",
        files,
        stats.songplays,
        stats.matched,
        stats.unmatched,
        stats.skipped
    );
    Ok((files, stats))
}

/// Walk one dataset and run `load_file` on each file inside its own batch.
///
/// A failing file aborts the dataset; files before it stay committed.
fn load_dataset(
    db: &Database,
    dataset: Dataset,
    root: &Path,
    observer: &mut dyn FnMut(&LoadEvent<'_>),
    mut load_file: impl FnMut(&Batch<'_>, &Path) -> LoadResult<()>,
) -> LoadResult<usize> {
    let files = find_json_files(root)?;
    let total = files.len();
    log::info!("Loading {} from {} ({} files)", dataset, root.display(), total);
    observer(&LoadEvent::DatasetStarted {
        dataset,
        root,
        files: total,
    });

    for (i, path) in files.iter().enumerate() {
        log::debug!("Loading {}", path.display());
        let batch = db.begin()?;
        load_file(&batch, path)?;
        batch.commit()?;

        observer(&LoadEvent::FileLoaded {
            dataset,
            index: i + 1,
            total,
            path,
        });
    }

    observer(&LoadEvent::DatasetFinished {
        dataset,
        files: total,
    });
    Ok(total)
}

/// A full load: optional schema reset, then song data, then log data.
#[derive(Debug)]
pub struct Pipeline<'db> {
    db: &'db Database,
    song_data_dir: PathBuf,
    log_data_dir: PathBuf,
    reset: bool,
}

impl<'db> Pipeline<'db> {
    #[must_use]
    pub fn new(db: &'db Database, song_data_dir: PathBuf, log_data_dir: PathBuf) -> Self {
        Self {
            db,
            song_data_dir,
            log_data_dir,
            reset: true,
        }
    }

    #[must_use]
    pub fn from_config(db: &'db Database, config: &Config) -> Self {
        Self::new(db, config.song_data_dir.clone(), config.log_data_dir.clone())
            .with_reset(!config.keep_existing)
    }

    /// Whether to drop and recreate every table before loading.
    #[must_use]
    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    pub fn run(&self, observer: &mut dyn FnMut(&LoadEvent<'_>)) -> LoadResult<LoadReport> {
        if self.reset {
            log::info!("Resetting schema");
            self.db.reset()?;
        }

        let catalog = load_song_data(self.db, &self.song_data_dir, observer)?;
        let (log_files, logs) = load_log_data(self.db, &self.log_data_dir, &catalog, observer)?;

        Ok(LoadReport {
            catalog,
            log_files,
            logs,
        })
    }
}
