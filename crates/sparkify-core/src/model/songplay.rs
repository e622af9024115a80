use serde::{Deserialize, Serialize};

use crate::model::ids::{ArtistId, SongId, UserId};

/// One song-play event (`songplays` fact table).
///
/// Keyed by `(start_time, user_id)`. `song_id` and `artist_id` are resolved
/// against the catalog at load time and are `None` when the played song is
/// not in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Songplay {
    /// Raw event timestamp in epoch milliseconds, as text.
    pub start_time: String,
    pub user_id: UserId,
    pub level: String,
    pub song_id: Option<SongId>,
    pub artist_id: Option<ArtistId>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl Songplay {
    /// Whether the play was matched to a catalog song.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.song_id.is_some() && self.artist_id.is_some()
    }
}
