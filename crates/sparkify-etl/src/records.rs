//! Typed records read from the song-metadata and event-log files.
//!
//! Both datasets are JSON: a song file holds a single object, a log file
//! holds one object per line. [`RecordStream`] reads either shape as a
//! finite sequence of typed records.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::de::IoRead;
use serde_json::StreamDeserializer;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

use sparkify_core::model::{Artist, ArtistId, Song, SongId, Songplay, TimeSlot, User, UserId};

use crate::error::{LoadError, LoadResult};

/// The `page` value that marks a song-play event.
pub const SONG_PLAY_PAGE: &str = "NextSong";

/// A stream of JSON records read from one file.
///
/// The stream is consumed as it is read and cannot be restarted. It ends at
/// end of input, or after yielding the first error.
pub struct RecordStream<R: Read, T> {
    inner: StreamDeserializer<'static, IoRead<R>, T>,
    path: PathBuf,
    record: usize,
    failed: bool,
}

impl<T: DeserializeOwned> RecordStream<BufReader<File>, T> {
    /// Open a data file for streaming.
    pub fn open(path: &Path) -> LoadResult<Self> {
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(BufReader::new(file), path))
    }
}

impl<R: Read, T: DeserializeOwned> RecordStream<R, T> {
    /// Stream records from any reader; `path` is only used in errors.
    pub fn from_reader(reader: R, path: &Path) -> Self {
        Self {
            inner: serde_json::Deserializer::from_reader(reader).into_iter(),
            path: path.to_path_buf(),
            record: 0,
            failed: false,
        }
    }
}

impl<R: Read, T: DeserializeOwned> Iterator for RecordStream<R, T> {
    type Item = LoadResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let next = self.inner.next()?;
        self.record += 1;

        match next {
            Ok(record) => Some(Ok(record)),
            Err(source) => {
                self.failed = true;
                let err = if source.is_io() {
                    LoadError::Io {
                        path: self.path.clone(),
                        source: source.into(),
                    }
                } else {
                    LoadError::Parse {
                        path: self.path.clone(),
                        record: self.record,
                        source,
                    }
                };
                Some(Err(err))
            }
        }
    }
}

impl<R: Read, T> fmt::Debug for RecordStream<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStream")
            .field("path", &self.path)
            .field("record", &self.record)
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

/// One song-metadata record: a song and its primary artist.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SongRecord {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i32,
    pub duration: f64,
    pub artist_name: String,
    #[serde(default)]
    pub artist_location: Option<String>,
    #[serde(default)]
    pub artist_latitude: Option<f64>,
    #[serde(default)]
    pub artist_longitude: Option<f64>,
}

impl SongRecord {
    pub fn song(&self) -> Song {
        Song::new(self.song_id.as_str(), self.title.as_str(), self.artist_id.as_str())
            .with_year(self.year)
            .with_duration(self.duration)
    }

    pub fn artist(&self) -> Artist {
        Artist {
            artist_id: ArtistId::new(self.artist_id.as_str()),
            name: self.artist_name.clone(),
            location: self.artist_location.clone(),
            latitude: self.artist_latitude,
            longitude: self.artist_longitude,
        }
    }
}

/// One line of an event log, as written by the listening service.
///
/// Every field is optional here: which ones are set depends on the page
/// the event was logged from. [`SongPlayEvent`] is the validated form.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    pub page: Option<String>,
    pub ts: Option<i64>,
    #[serde(default, deserialize_with = "user_id_field")]
    pub user_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
    pub song: Option<String>,
    pub artist: Option<String>,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl LogEvent {
    pub fn is_song_play(&self) -> bool {
        self.page.as_deref() == Some(SONG_PLAY_PAGE)
    }
}

/// `userId` is written as a string, or as an empty string for logged-out
/// sessions; older exports use a number.
fn user_id_field<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawUserId {
        Number(i64),
        Text(String),
    }

    match Option::<RawUserId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawUserId::Number(id)) => Ok(Some(id)),
        Some(RawUserId::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawUserId::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid userId {text:?}"))),
    }
}

/// A required field was absent (or null) on a song-play event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("missing required field `{0}`")]
pub struct MissingField(pub &'static str);

/// A song-play event with every field the star schema needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongPlayEvent {
    pub ts: i64,
    pub user_id: UserId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: String,
    pub song: String,
    pub artist: String,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl TryFrom<LogEvent> for SongPlayEvent {
    type Error = MissingField;

    fn try_from(event: LogEvent) -> Result<Self, Self::Error> {
        Ok(Self {
            ts: event.ts.ok_or(MissingField("ts"))?,
            user_id: UserId::new(event.user_id.ok_or(MissingField("userId"))?),
            level: event.level.ok_or(MissingField("level"))?,
            song: event.song.ok_or(MissingField("song"))?,
            artist: event.artist.ok_or(MissingField("artist"))?,
            session_id: event.session_id.ok_or(MissingField("sessionId"))?,
            first_name: event.first_name,
            last_name: event.last_name,
            gender: event.gender,
            location: event.location,
            user_agent: event.user_agent,
        })
    }
}

impl SongPlayEvent {
    pub fn time_slot(&self) -> sparkify_core::Result<TimeSlot> {
        TimeSlot::from_millis(self.ts)
    }

    pub fn user(&self) -> User {
        User {
            user_id: self.user_id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            gender: self.gender.clone(),
            level: self.level.clone(),
        }
    }

    /// Build the fact row; `catalog_match` is the resolved song and artist,
    /// if the catalog has them.
    pub fn songplay(&self, catalog_match: Option<(SongId, ArtistId)>) -> Songplay {
        let (song_id, artist_id) = catalog_match.unzip();
        Songplay {
            start_time: TimeSlot::key_for(self.ts),
            user_id: self.user_id,
            level: self.level.clone(),
            song_id,
            artist_id,
            session_id: self.session_id,
            location: self.location.clone(),
            user_agent: self.user_agent.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SONG_JSON: &str = r#"{"num_songs": 1, "artist_id": "ARD7TVE1187B99BFB1", "artist_latitude": null, "artist_longitude": null, "artist_location": "California - LA", "artist_name": "Casual", "song_id": "SOMZWCG12A8C13C480", "title": "I Didn't Mean To", "duration": 218.93179, "year": 0}"#;

    const PLAY_JSON: &str = r#"{"artist":"Pavement","auth":"Logged In","firstName":"Sylvie","gender":"F","itemInSession":0,"lastName":"Cruz","length":99.16036,"level":"free","location":"Washington-Arlington-Alexandria, DC-VA-MD-WV","method":"PUT","page":"NextSong","registration":1540266185796.0,"sessionId":345,"song":"Mercy:The Laundromat","status":200,"ts":1541990258796,"userAgent":"Mozilla/5.0","userId":"10"}"#;

    const HOME_JSON: &str = r#"{"artist":null,"auth":"Logged Out","firstName":null,"gender":null,"itemInSession":0,"lastName":null,"length":null,"level":"free","location":null,"method":"GET","page":"Home","registration":null,"sessionId":52,"song":null,"status":200,"ts":1541207073796,"userAgent":null,"userId":""}"#;

    fn stream<T: DeserializeOwned>(input: &str) -> RecordStream<&[u8], T> {
        RecordStream::from_reader(input.as_bytes(), Path::new("test.json"))
    }

    #[test]
    fn test_song_record() {
        let record: SongRecord = stream(SONG_JSON).next().unwrap().unwrap();

        let song = record.song();
        assert_eq!(song.song_id.as_str(), "SOMZWCG12A8C13C480");
        assert_eq!(song.title, "I Didn't Mean To");
        assert_eq!(song.year, 0);

        let artist = record.artist();
        assert_eq!(artist.name, "Casual");
        assert_eq!(artist.location.as_deref(), Some("California - LA"));
        assert!(artist.latitude.is_none());
        assert!(artist.longitude.is_none());
    }

    #[test]
    fn test_song_record_missing_field() {
        let json = r#"{"song_id": "S1", "artist_id": "A1", "year": 2000, "duration": 1.0, "artist_name": "N"}"#;
        let result: LoadResult<SongRecord> = stream(json).next().unwrap();
        match result {
            Err(LoadError::Parse { record, source, .. }) => {
                assert_eq!(record, 1);
                assert!(source.to_string().contains("title"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_log_stream_reads_lines() {
        let input = format!("{PLAY_JSON}\n{HOME_JSON}\n\n");
        let events: Vec<LogEvent> = stream(&input).collect::<LoadResult<_>>().unwrap();

        assert_eq!(events.len(), 2);
        assert!(events[0].is_song_play());
        assert!(!events[1].is_song_play());
        assert_eq!(events[0].user_id, Some(10));
        assert_eq!(events[1].user_id, None);
    }

    #[test]
    fn test_stream_stops_after_error() {
        let input = format!("{PLAY_JSON}\n{{not json\n{PLAY_JSON}\n");
        let mut records = stream::<LogEvent>(&input);

        assert!(records.next().unwrap().is_ok());
        assert!(matches!(
            records.next(),
            Some(Err(LoadError::Parse { record: 2, .. }))
        ));
        assert!(records.next().is_none());
    }

    #[test]
    fn test_numeric_user_id() {
        let event: LogEvent = serde_json::from_str(r#"{"page":"NextSong","userId":26}"#).unwrap();
        assert_eq!(event.user_id, Some(26));

        let bad = serde_json::from_str::<LogEvent>(r#"{"userId":"abc"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_song_play_event() {
        let event: LogEvent = serde_json::from_str(PLAY_JSON).unwrap();
        let play = SongPlayEvent::try_from(event).unwrap();

        assert_eq!(play.user_id, UserId::new(10));
        assert_eq!(play.song, "Mercy:The Laundromat");

        let user = play.user();
        assert_eq!(user.first_name.as_deref(), Some("Sylvie"));
        assert_eq!(user.level, "free");

        let slot = play.time_slot().unwrap();
        assert_eq!(slot.start_time, "1541990258796");

        let unmatched = play.songplay(None);
        assert_eq!(unmatched.start_time, "1541990258796");
        assert!(unmatched.song_id.is_none());
        assert!(unmatched.artist_id.is_none());
        assert_eq!(unmatched.session_id, 345);

        let matched = play.songplay(Some((SongId::new("S1"), ArtistId::new("A1"))));
        assert!(matched.is_resolved());
    }

    #[test]
    fn test_song_play_event_missing_field() {
        let event = LogEvent {
            page: Some(SONG_PLAY_PAGE.to_string()),
            ts: Some(1_541_990_258_796),
            level: Some("paid".to_string()),
            song: Some("T".to_string()),
            artist: Some("N".to_string()),
            session_id: Some(1),
            ..LogEvent::default()
        };

        assert_eq!(
            SongPlayEvent::try_from(event),
            Err(MissingField("userId"))
        );
    }
}
