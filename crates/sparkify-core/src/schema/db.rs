use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{Artist, ArtistId, Song, SongId, Songplay, TimeSlot, User, UserId};

use super::tables::{self, TABLES};

/// A database connection holding the star schema.
///
/// Reads go through `Database` directly; writes go through a [`Batch`],
/// which wraps one transaction and is committed once per input file.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

/// The first rows of a table, rendered as text for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub table: &'static str,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Database {
    /// Open (or create) a database at the given path and create any
    /// missing tables. Existing rows are kept.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.create_tables()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.create_tables()?;
        Ok(db)
    }

    /// Drop every table, then create them all again, empty.
    ///
    /// This is the only path that deletes rows. The first failing statement
    /// aborts the reset.
    pub fn reset(&self) -> Result<()> {
        self.drop_tables()?;
        self.create_tables()
    }

    /// Issue `DROP TABLE IF EXISTS` for every table.
    pub fn drop_tables(&self) -> Result<()> {
        for table in TABLES {
            log::debug!("Dropping table {}", table.name);
            self.conn.execute_batch(table.drop_sql)?;
        }
        Ok(())
    }

    /// Issue `CREATE TABLE IF NOT EXISTS` for every table.
    pub fn create_tables(&self) -> Result<()> {
        for table in TABLES {
            log::debug!("Creating table {}", table.name);
            self.conn.execute_batch(table.create_sql)?;
        }
        Ok(())
    }

    /// Start a write batch. Nothing it writes is visible to other
    /// connections until [`Batch::commit`]; dropping it rolls back.
    pub fn begin(&self) -> Result<Batch<'_>> {
        Ok(Batch {
            tx: self.conn.unchecked_transaction()?,
        })
    }
}

/// A unit of writes, committed together.
///
/// Every insert is conflict-tolerant: a row whose primary key already
/// exists is skipped and the existing row is left untouched. The insert
/// methods return `true` when a new row was written.
#[derive(Debug)]
pub struct Batch<'conn> {
    tx: Transaction<'conn>,
}

impl Batch<'_> {
    pub fn upsert_song(&self, song: &Song) -> Result<bool> {
        let changed = self.tx.execute(
            "INSERT INTO songs (song_id, title, artist_id, year, duration)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (song_id) DO NOTHING",
            params![
                song.song_id,
                song.title,
                song.artist_id,
                song.year,
                song.duration,
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn upsert_artist(&self, artist: &Artist) -> Result<bool> {
        let changed = self.tx.execute(
            "INSERT INTO artists (artist_id, name, location, latitude, longitude)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (artist_id) DO NOTHING",
            params![
                artist.artist_id,
                artist.name,
                artist.location,
                artist.latitude,
                artist.longitude,
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn upsert_user(&self, user: &User) -> Result<bool> {
        let changed = self.tx.execute(
            "INSERT INTO users (user_id, first_name, last_name, gender, level)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (user_id) DO NOTHING",
            params![
                user.user_id,
                user.first_name,
                user.last_name,
                user.gender,
                user.level,
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn upsert_time_slot(&self, slot: &TimeSlot) -> Result<bool> {
        let changed = self.tx.execute(
            "INSERT INTO time (start_time, hour, day, week, month, year, weekday)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (start_time) DO NOTHING",
            params![
                slot.start_time,
                slot.hour,
                slot.day,
                slot.week,
                slot.month,
                slot.year,
                slot.weekday,
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn upsert_songplay(&self, play: &Songplay) -> Result<bool> {
        let changed = self.tx.execute(
            "INSERT INTO songplays (
                start_time, user_id, level, song_id, artist_id,
                session_id, location, user_agent
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT (start_time, user_id) DO NOTHING",
            params![
                play.start_time,
                play.user_id,
                play.level,
                play.song_id,
                play.artist_id,
                play.session_id,
                play.location,
                play.user_agent,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Resolve a played song against the catalog, including rows written
    /// earlier in this batch.
    pub fn find_song(&self, title: &str, artist_name: &str) -> Result<Option<(SongId, ArtistId)>> {
        find_song(&self.tx, title, artist_name)
    }

    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }
}

/// Look up the song whose title and artist name both match exactly.
///
/// The pair must be a song together with its own artist: the artist name
/// is matched on the artist row the song references, not on any artist.
/// Title and name alone do not identify a song uniquely; when several
/// catalog entries match, the lowest `song_id` is used.
fn find_song(conn: &Connection, title: &str, artist_name: &str) -> Result<Option<(SongId, ArtistId)>> {
    let mut stmt = conn.prepare_cached(
        "SELECT s.song_id, a.artist_id
         FROM songs s
         JOIN artists a ON a.artist_id = s.artist_id
         WHERE s.title = ?1 AND a.name = ?2
         ORDER BY s.song_id
         LIMIT 2",
    )?;

    let matches = stmt
        .query_map(params![title, artist_name], |row| {
            Ok((row.get::<_, SongId>(0)?, row.get::<_, ArtistId>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    if matches.len() > 1 {
        log::warn!(
            "Ambiguous catalog match for {:?} by {:?}; using {}",
            title,
            artist_name,
            matches[0].0
        );
    }

    Ok(matches.into_iter().next())
}

// Inspection queries
impl Database {
    pub fn find_song(&self, title: &str, artist_name: &str) -> Result<Option<(SongId, ArtistId)>> {
        find_song(&self.conn, title, artist_name)
    }

    /// Count the rows of one table.
    pub fn count_rows(&self, table: &str) -> Result<i64> {
        let def = tables::table(table).ok_or_else(|| Error::UnknownTable(table.to_string()))?;
        let count = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", def.name),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Row counts for every table, in schema order.
    pub fn table_counts(&self) -> Result<Vec<(&'static str, i64)>> {
        TABLES
            .iter()
            .map(|t| Ok((t.name, self.count_rows(t.name)?)))
            .collect()
    }

    /// The first `limit` rows of a table, every value rendered as text and
    /// SQL NULL shown as `NULL`.
    pub fn sample_rows(&self, table: &str, limit: usize) -> Result<Sample> {
        let def = tables::table(table).ok_or_else(|| Error::UnknownTable(table.to_string()))?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM {} LIMIT ?1",
            def.columns.join(", "),
            def.name
        ))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let rows = stmt
            .query_map([limit], |row| {
                (0..width)
                    .map(|i| row.get_ref(i).map(render_value))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Sample {
            table: def.name,
            columns,
            rows,
        })
    }

    pub fn get_song(&self, song_id: &SongId) -> Result<Option<Song>> {
        let song = self
            .conn
            .query_row(
                "SELECT song_id, title, artist_id, year, duration FROM songs WHERE song_id = ?1",
                [song_id],
                |row| {
                    Ok(Song {
                        song_id: row.get(0)?,
                        title: row.get(1)?,
                        artist_id: row.get(2)?,
                        year: row.get(3)?,
                        duration: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(song)
    }

    pub fn get_artist(&self, artist_id: &ArtistId) -> Result<Option<Artist>> {
        let artist = self
            .conn
            .query_row(
                "SELECT artist_id, name, location, latitude, longitude
                 FROM artists WHERE artist_id = ?1",
                [artist_id],
                |row| {
                    Ok(Artist {
                        artist_id: row.get(0)?,
                        name: row.get(1)?,
                        location: row.get(2)?,
                        latitude: row.get(3)?,
                        longitude: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(artist)
    }

    pub fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT user_id, first_name, last_name, gender, level
                 FROM users WHERE user_id = ?1",
                [user_id],
                |row| {
                    Ok(User {
                        user_id: row.get(0)?,
                        first_name: row.get(1)?,
                        last_name: row.get(2)?,
                        gender: row.get(3)?,
                        level: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    pub fn get_time_slot(&self, start_time: &str) -> Result<Option<TimeSlot>> {
        let slot = self
            .conn
            .query_row(
                "SELECT start_time, hour, day, week, month, year, weekday
                 FROM time WHERE start_time = ?1",
                [start_time],
                |row| {
                    Ok(TimeSlot {
                        start_time: row.get(0)?,
                        hour: row.get(1)?,
                        day: row.get(2)?,
                        week: row.get(3)?,
                        month: row.get(4)?,
                        year: row.get(5)?,
                        weekday: row.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(slot)
    }

    pub fn get_songplay(&self, start_time: &str, user_id: UserId) -> Result<Option<Songplay>> {
        let play = self
            .conn
            .query_row(
                "SELECT start_time, user_id, level, song_id, artist_id,
                        session_id, location, user_agent
                 FROM songplays WHERE start_time = ?1 AND user_id = ?2",
                params![start_time, user_id],
                |row| {
                    Ok(Songplay {
                        start_time: row.get(0)?,
                        user_id: row.get(1)?,
                        level: row.get(2)?,
                        song_id: row.get(3)?,
                        artist_id: row.get(4)?,
                        session_id: row.get(5)?,
                        location: row.get(6)?,
                        user_agent: row.get(7)?,
                    })
                },
            )
            .optional()?;
        Ok(play)
    }
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<{} bytes>", b.len()),
    }
}
