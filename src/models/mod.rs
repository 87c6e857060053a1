mod details;
mod identifiers;
mod identity;
mod item;
mod list;
mod media;
mod sync_state;

pub use details::{Artwork, MediaDetails, Rating};
pub use identifiers::{ClientId, MediaItemId, UserId};
pub use identity::{ClientType, ExternalId, ExternalIds, SyncClient, SyncClients};
pub use item::MediaItem;
pub use list::{
    ChangeRecord, ChangeType, Collection, ItemContainer, ItemList, ListItem, Playlist, Positioned,
    validate_positions,
};
pub use media::{
    Album, AlbumEntry, Artist, Episode, MediaContent, MediaData, Movie, Season, Series, Track,
};
pub use sync_state::{ListSyncState, ListSyncStates, SyncListItem, SyncMergeSummary};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Series,
    Season,
    Episode,
    Artist,
    Album,
    Track,
    Playlist,
    Collection,
    #[serde(other)]
    Unknown,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Series => "series",
            MediaType::Season => "season",
            MediaType::Episode => "episode",
            MediaType::Artist => "artist",
            MediaType::Album => "album",
            MediaType::Track => "track",
            MediaType::Playlist => "playlist",
            MediaType::Collection => "collection",
            MediaType::Unknown => "unknown",
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, MediaType::Playlist | MediaType::Collection)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = std::convert::Infallible;

    /// Never fails: unrecognised names map to [`MediaType::Unknown`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let media_type = match s.trim().to_ascii_lowercase().as_str() {
            "movie" => MediaType::Movie,
            "series" | "show" => MediaType::Series,
            "season" => MediaType::Season,
            "episode" => MediaType::Episode,
            "artist" => MediaType::Artist,
            "album" => MediaType::Album,
            "track" => MediaType::Track,
            "playlist" => MediaType::Playlist,
            "collection" => MediaType::Collection,
            _ => MediaType::Unknown,
        };
        Ok(media_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_strings() {
        assert_eq!("Movie".parse::<MediaType>().unwrap(), MediaType::Movie);
        assert_eq!("show".parse::<MediaType>().unwrap(), MediaType::Series);
        assert_eq!("photo".parse::<MediaType>().unwrap(), MediaType::Unknown);
        assert_eq!(MediaType::Collection.to_string(), "collection");
    }

    #[test]
    fn test_media_type_serde() {
        assert_eq!(serde_json::to_string(&MediaType::Track).unwrap(), "\"track\"");
        let parsed: MediaType = serde_json::from_str("\"podcast\"").unwrap();
        assert_eq!(parsed, MediaType::Unknown);
    }
}
