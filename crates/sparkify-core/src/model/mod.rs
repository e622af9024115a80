pub mod artist;
pub mod ids;
pub mod song;
pub mod songplay;
pub mod time_slot;
pub mod user;

pub use artist::Artist;
pub use ids::{ArtistId, SongId, UserId};
pub use song::Song;
pub use songplay::Songplay;
pub use time_slot::TimeSlot;
pub use user::User;
