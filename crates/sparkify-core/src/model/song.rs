use serde::{Deserialize, Serialize};

use crate::model::ids::{ArtistId, SongId};

/// A song in the catalog (`songs` dimension).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub song_id: SongId,
    pub title: String,

    /// Soft reference to `artists.artist_id`; not enforced by the schema.
    pub artist_id: ArtistId,

    /// Release year. The source data writes `0` when unknown.
    pub year: i32,

    /// Track length in seconds.
    pub duration: f64,
}

impl Song {
    #[must_use]
    pub fn new(
        song_id: impl Into<SongId>,
        title: impl Into<String>,
        artist_id: impl Into<ArtistId>,
    ) -> Self {
        Self {
            song_id: song_id.into(),
            title: title.into(),
            artist_id: artist_id.into(),
            year: 0,
            duration: 0.0,
        }
    }

    #[must_use]
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }
}
