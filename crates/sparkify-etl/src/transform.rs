//! Per-file transforms: one song file or one log file into star-schema rows.
//!
//! Each function writes through the [`Batch`] it is given and never
//! commits; the caller decides the transaction boundary.

use std::ops::AddAssign;
use std::path::Path;

use sparkify_core::schema::Batch;

use crate::error::{LoadError, LoadResult};
use crate::records::{LogEvent, RecordStream, SongPlayEvent, SongRecord};

/// Rows written while loading song files.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SongFileStats {
    pub songs: usize,
    pub artists: usize,
}

impl AddAssign for SongFileStats {
    fn add_assign(&mut self, other: Self) {
        self.songs += other.songs;
        self.artists += other.artists;
    }
}

/// What happened to the events of one or more log files.
///
/// Row counters only count rows that were new; a duplicate key is skipped
/// by the store and not counted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LogFileStats {
    /// Events read, of any page type.
    pub events: usize,
    /// Events dropped because they are not song plays.
    pub skipped: usize,
    pub time_rows: usize,
    pub users: usize,
    pub songplays: usize,
    /// Song plays resolved to a catalog song.
    pub matched: usize,
    /// Song plays whose song is not in the catalog.
    pub unmatched: usize,
}

impl AddAssign for LogFileStats {
    fn add_assign(&mut self, other: Self) {
        self.events += other.events;
        self.skipped += other.skipped;
        self.time_rows += other.time_rows;
        self.users += other.users;
        self.songplays += other.songplays;
        self.matched += other.matched;
        self.unmatched += other.unmatched;
    }
}

/// Load one song-metadata file: upsert its song and its artist.
///
/// Only the first record is used, but the rest of the file must still
/// parse.
pub fn load_song_file(batch: &Batch<'_>, path: &Path) -> LoadResult<SongFileStats> {
    let mut records = RecordStream::<_, SongRecord>::open(path)?;
    let record = records
        .next()
        .ok_or_else(|| LoadError::EmptyFile(path.to_path_buf()))??;

    let mut extra = 0;
    for record in records {
        record?;
        extra += 1;
    }
    if extra > 0 {
        log::warn!(
            "Ignoring {} extra record(s) in song file {}",
            extra,
            path.display()
        );
    }

    let mut stats = SongFileStats::default();
    if batch.upsert_song(&record.song())? {
        stats.songs += 1;
    }
    if batch.upsert_artist(&record.artist())? {
        stats.artists += 1;
    }

    Ok(stats)
}

/// Load one event-log file.
///
/// Events other than song plays are dropped. The retained events are then
/// written in three passes, time rows first, then users, then song plays,
/// each pass in file order. Song plays are resolved against whatever the
/// catalog holds when this runs, so song files must be loaded first.
pub fn load_log_file(batch: &Batch<'_>, path: &Path) -> LoadResult<LogFileStats> {
    let mut stats = LogFileStats::default();
    let mut plays = Vec::new();

    for (index, event) in RecordStream::<_, LogEvent>::open(path)?.enumerate() {
        let event = event?;
        stats.events += 1;

        if !event.is_song_play() {
            stats.skipped += 1;
            log::trace!(
                "Skipping {:?} event in {}",
                event.page.as_deref().unwrap_or_default(),
                path.display()
            );
            continue;
        }

        let play = SongPlayEvent::try_from(event).map_err(|missing| LoadError::MissingField {
            path: path.to_path_buf(),
            record: index + 1,
            field: missing.0,
        })?;
        plays.push((index + 1, play));
    }

    for (record, play) in &plays {
        let slot = play.time_slot().map_err(|e| LoadError::InvalidRecord {
            path: path.to_path_buf(),
            record: *record,
            message: e.to_string(),
        })?;
        if batch.upsert_time_slot(&slot)? {
            stats.time_rows += 1;
        }
    }

    for (_, play) in &plays {
        if batch.upsert_user(&play.user())? {
            stats.users += 1;
        }
    }

    for (_, play) in &plays {
        let catalog_match = batch.find_song(&play.song, &play.artist)?;
        if catalog_match.is_some() {
            stats.matched += 1;
        } else {
            stats.unmatched += 1;
            log::debug!("No catalog match for {:?} by {:?}", play.song, play.artist);
        }

        if batch.upsert_songplay(&play.songplay(catalog_match))? {
            stats.songplays += 1;
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparkify_core::model::{ArtistId, SongId, UserId};
    use sparkify_core::schema::Database;
    use std::fs;
    use tempfile::TempDir;

    const SONG: &str = r#"{"song_id":"S1","title":"T","artist_id":"A1","year":2000,"duration":200.5,"artist_name":"N","artist_location":"L","artist_latitude":null,"artist_longitude":null}"#;

    fn play(ts: i64, user: &str, song: &str, artist: &str) -> String {
        format!(
            r#"{{"artist":"{artist}","firstName":"Lily","gender":"F","lastName":"Koch","level":"paid","location":"Chicago-Naperville-Elgin, IL-IN-WI","page":"NextSong","sessionId":172,"song":"{song}","ts":{ts},"userAgent":"Mozilla/5.0","userId":"{user}"}}"#
        )
    }

    const HOME: &str = r#"{"artist":null,"firstName":null,"gender":null,"lastName":null,"level":"free","location":null,"page":"Home","sessionId":52,"song":null,"ts":1541207073796,"userAgent":null,"userId":""}"#;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn load_songs(db: &Database, path: &Path) -> SongFileStats {
        let batch = db.begin().unwrap();
        let stats = load_song_file(&batch, path).unwrap();
        batch.commit().unwrap();
        stats
    }

    fn load_log(db: &Database, path: &Path) -> LogFileStats {
        let batch = db.begin().unwrap();
        let stats = load_log_file(&batch, path).unwrap();
        batch.commit().unwrap();
        stats
    }

    #[test]
    fn test_load_song_file() {
        let dir = TempDir::new().unwrap();
        let db = Database::open_in_memory().unwrap();
        let path = write(&dir, "song.json", SONG);

        let stats = load_songs(&db, &path);
        assert_eq!(stats, SongFileStats { songs: 1, artists: 1 });

        let song = db.get_song(&SongId::new("S1")).unwrap().unwrap();
        assert_eq!(song.year, 2000);
        let artist = db.get_artist(&ArtistId::new("A1")).unwrap().unwrap();
        assert!(artist.latitude.is_none());
        assert!(artist.longitude.is_none());
    }

    #[test]
    fn test_load_song_file_twice_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let db = Database::open_in_memory().unwrap();
        let path = write(&dir, "song.json", SONG);

        load_songs(&db, &path);
        let again = load_songs(&db, &path);

        assert_eq!(again, SongFileStats::default());
        assert_eq!(db.count_rows("songs").unwrap(), 1);
        assert_eq!(db.count_rows("artists").unwrap(), 1);
    }

    #[test]
    fn test_load_song_file_empty() {
        let dir = TempDir::new().unwrap();
        let db = Database::open_in_memory().unwrap();
        let path = write(&dir, "empty.json", "\n");

        let batch = db.begin().unwrap();
        let result = load_song_file(&batch, &path);
        assert!(matches!(result, Err(LoadError::EmptyFile(_))));
    }

    #[test]
    fn test_load_song_file_rejects_trailing_garbage() {
        let dir = TempDir::new().unwrap();
        let db = Database::open_in_memory().unwrap();
        let path = write(&dir, "song.json", &format!("{SONG}\n{{not json"));

        let batch = db.begin().unwrap();
        let err = load_song_file(&batch, &path).unwrap_err();
        assert!(matches!(err, LoadError::Parse { record: 2, .. }));
        drop(batch);

        assert_eq!(db.count_rows("songs").unwrap(), 0);
        assert_eq!(db.count_rows("artists").unwrap(), 0);
    }

    #[test]
    fn test_load_song_file_with_coordinates() {
        let dir = TempDir::new().unwrap();
        let db = Database::open_in_memory().unwrap();
        let song = r#"{"song_id":"S2","title":"Der Kleine Dompfaff","artist_id":"A2","year":0,"duration":152.92036,"artist_name":"Jimmy Wakely","artist_location":"Mineola, AR","artist_latitude":35.31184,"artist_longitude":-92.40474}"#;
        let path = write(&dir, "song.json", song);

        load_songs(&db, &path);

        let artist = db.get_artist(&ArtistId::new("A2")).unwrap().unwrap();
        assert_eq!(artist.location.as_deref(), Some("Mineola, AR"));
        assert_eq!(artist.latitude, Some(35.31184));
        assert_eq!(artist.longitude, Some(-92.40474));
    }

    #[test]
    fn test_load_log_file_filters_and_resolves() {
        let dir = TempDir::new().unwrap();
        let db = Database::open_in_memory().unwrap();
        load_songs(&db, &write(&dir, "song.json", SONG));

        let log = [
            play(1_541_121_934_796, "8", "T", "N"),
            HOME.to_string(),
            play(1_541_122_241_796, "8", "Unknown", "N"),
        ]
        .join("\n");
        let stats = load_log(&db, &write(&dir, "events.json", &log));

        assert_eq!(
            stats,
            LogFileStats {
                events: 3,
                skipped: 1,
                time_rows: 2,
                users: 1,
                songplays: 2,
                matched: 1,
                unmatched: 1,
            }
        );

        let hit = db
            .get_songplay("1541121934796", UserId::new(8))
            .unwrap()
            .unwrap();
        assert_eq!(hit.song_id, Some(SongId::new("S1")));
        assert_eq!(hit.artist_id, Some(ArtistId::new("A1")));
        assert_eq!(hit.level, "paid");

        let miss = db
            .get_songplay("1541122241796", UserId::new(8))
            .unwrap()
            .unwrap();
        assert!(miss.song_id.is_none());
        assert!(miss.artist_id.is_none());
    }

    #[test]
    fn test_load_log_file_twice_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let db = Database::open_in_memory().unwrap();
        let path = write(&dir, "events.json", &play(1_541_121_934_796, "8", "T", "N"));

        load_log(&db, &path);
        let again = load_log(&db, &path);

        assert_eq!(again.songplays, 0);
        assert_eq!(again.time_rows, 0);
        assert_eq!(db.count_rows("songplays").unwrap(), 1);
        assert_eq!(db.count_rows("time").unwrap(), 1);
        assert_eq!(db.count_rows("users").unwrap(), 1);
    }

    #[test]
    fn test_load_log_file_only_non_song_plays() {
        let dir = TempDir::new().unwrap();
        let db = Database::open_in_memory().unwrap();
        let stats = load_log(&db, &write(&dir, "events.json", HOME));

        assert_eq!(stats.events, 1);
        assert_eq!(stats.skipped, 1);
        for (table, count) in db.table_counts().unwrap() {
            assert_eq!(count, 0, "{table} should be empty");
        }
    }

    #[test]
    fn test_load_log_file_missing_user_id() {
        let dir = TempDir::new().unwrap();
        let db = Database::open_in_memory().unwrap();
        let log = format!(
            "{}\n{}",
            HOME,
            play(1_541_121_934_796, "", "T", "N")
        );
        let path = write(&dir, "events.json", &log);

        let batch = db.begin().unwrap();
        let err = load_log_file(&batch, &path).unwrap_err();
        assert!(err.is_malformed_input());
        assert!(matches!(
            err,
            LoadError::MissingField {
                record: 2,
                field: "userId",
                ..
            }
        ));
    }
}
