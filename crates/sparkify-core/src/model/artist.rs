use serde::{Deserialize, Serialize};

use crate::model::ids::ArtistId;

/// A song's primary artist (`artists` dimension).
///
/// Location and coordinates are frequently missing in the source data and
/// stay `None`; they are never defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub artist_id: ArtistId,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Artist {
    #[must_use]
    pub fn new(artist_id: impl Into<ArtistId>, name: impl Into<String>) -> Self {
        Self {
            artist_id: artist_id.into(),
            name: name.into(),
            location: None,
            latitude: None,
            longitude: None,
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artist_new() {
        let artist = Artist::new("ARMJAGH1187FB546F3", "The Box Tops");
        assert_eq!(artist.name, "The Box Tops");
        assert!(artist.location.is_none());
        assert!(artist.latitude.is_none());
        assert!(artist.longitude.is_none());
    }

    #[test]
    fn test_artist_builder() {
        let artist = Artist::new("ARMJAGH1187FB546F3", "The Box Tops")
            .with_location("Memphis, TN")
            .with_coordinates(35.14968, -90.04892);

        assert_eq!(artist.location, Some("Memphis, TN".to_string()));
        assert_eq!(artist.latitude, Some(35.14968));
        assert_eq!(artist.longitude, Some(-90.04892));
    }
}
