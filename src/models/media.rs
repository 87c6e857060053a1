use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::details::MediaDetails;
use super::identifiers::MediaItemId;
use super::list::{Collection, Playlist};
use super::MediaType;

/// Capability shared by every media payload.
pub trait MediaData {
    fn details(&self) -> &MediaDetails;

    fn details_mut(&mut self) -> &mut MediaDetails;

    fn set_details(&mut self, details: MediaDetails) {
        *self.details_mut() = details;
    }

    fn media_type(&self) -> MediaType;
}

macro_rules! impl_media_data {
    ($ty:ident, $media_type:expr) => {
        impl MediaData for $ty {
            fn details(&self) -> &MediaDetails {
                &self.details
            }

            fn details_mut(&mut self) -> &mut MediaDetails {
                &mut self.details
            }

            fn media_type(&self) -> MediaType {
                $media_type
            }
        }
    };
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Movie {
    pub details: MediaDetails,
    pub trailer_url: Option<String>,
    pub edition: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Series {
    pub details: MediaDetails,
    pub season_count: u32,
    pub episode_count: u32,
    pub network: Option<String>,
    pub status: Option<String>,
}

/// A season. `number <= 0` means the season number is unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Season {
    pub details: MediaDetails,
    pub number: i32,
    pub series_id: Option<MediaItemId>,
    pub series_title: Option<String>,
    episode_ids: Vec<MediaItemId>,
    episode_count: usize,
}

impl Season {
    pub fn new(details: MediaDetails, number: i32) -> Self {
        Self {
            details,
            number,
            ..Default::default()
        }
    }

    pub fn episode_ids(&self) -> &[MediaItemId] {
        &self.episode_ids
    }

    /// Always `episode_ids().len()`.
    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    /// Append ids that are not present yet.
    pub fn add_episode_ids(&mut self, ids: impl IntoIterator<Item = MediaItemId>) {
        for id in ids {
            if !self.episode_ids.contains(&id) {
                self.episode_ids.push(id);
            }
        }
        self.episode_count = self.episode_ids.len();
    }

    pub fn merge_episode_ids(&mut self, other: &Season) {
        self.add_episode_ids(other.episode_ids.iter().copied());
    }

    /// Restore the derived count after deserializing untrusted data.
    pub(crate) fn recompute_counts(&mut self) {
        let ids = std::mem::take(&mut self.episode_ids);
        self.add_episode_ids(ids);
    }
}

/// An episode. `number` and `season_number` are unknown when `<= 0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Episode {
    pub details: MediaDetails,
    pub number: i32,
    pub season_number: i32,
    pub series_id: Option<MediaItemId>,
    pub season_id: Option<MediaItemId>,
    pub series_title: Option<String>,
}

/// Tracks known for one album of an artist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumEntry {
    pub album_id: MediaItemId,
    #[serde(default)]
    pub track_ids: Vec<MediaItemId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Artist {
    pub details: MediaDetails,
    albums: Vec<AlbumEntry>,
    album_count: usize,
    track_count: usize,
}

impl Artist {
    pub fn new(details: MediaDetails) -> Self {
        Self {
            details,
            ..Default::default()
        }
    }

    pub fn albums(&self) -> &[AlbumEntry] {
        &self.albums
    }

    /// Always `albums().len()`.
    pub fn album_count(&self) -> usize {
        self.album_count
    }

    /// Always the sum of every album's track ids.
    pub fn track_count(&self) -> usize {
        self.track_count
    }

    /// Register `track_ids` under `album_id`, creating the album entry on first use.
    pub fn add_album_track_ids(
        &mut self,
        album_id: MediaItemId,
        track_ids: impl IntoIterator<Item = MediaItemId>,
    ) {
        let index = match self.albums.iter().position(|a| a.album_id == album_id) {
            Some(index) => index,
            None => {
                self.albums.push(AlbumEntry {
                    album_id,
                    track_ids: Vec::new(),
                });
                self.albums.len() - 1
            }
        };

        let entry = &mut self.albums[index];
        for track_id in track_ids {
            if !entry.track_ids.contains(&track_id) {
                entry.track_ids.push(track_id);
            }
        }
        self.recompute_counts();
    }

    /// Fold every album index of `other` into this artist.
    pub fn merge_track_ids_by_album(&mut self, other: &Artist) {
        for album in &other.albums {
            self.add_album_track_ids(album.album_id, album.track_ids.iter().copied());
        }
        self.recompute_counts();
    }

    pub(crate) fn recompute_counts(&mut self) {
        self.album_count = self.albums.len();
        self.track_count = self.albums.iter().map(|a| a.track_ids.len()).sum();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Album {
    pub details: MediaDetails,
    pub artist_id: Option<MediaItemId>,
    pub artist_name: Option<String>,
    pub track_count: u32,
    pub disc_count: u32,
    pub release_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Track {
    pub details: MediaDetails,
    pub album_id: Option<MediaItemId>,
    pub artist_id: Option<MediaItemId>,
    pub album_name: Option<String>,
    pub artist_name: Option<String>,
    pub number: i32,
    pub disc_number: i32,
    pub composer: Option<String>,
}

impl_media_data!(Movie, MediaType::Movie);
impl_media_data!(Series, MediaType::Series);
impl_media_data!(Season, MediaType::Season);
impl_media_data!(Episode, MediaType::Episode);
impl_media_data!(Artist, MediaType::Artist);
impl_media_data!(Album, MediaType::Album);
impl_media_data!(Track, MediaType::Track);

/// Exactly one concrete media payload.
///
/// Serialized as the bare payload; the variant is carried separately by the
/// owner (see [`MediaItem`](super::MediaItem)) and supplied back to
/// [`MediaContent::from_json`].
#[derive(Debug, Clone, PartialEq)]
pub enum MediaContent {
    Movie(Movie),
    Series(Series),
    Season(Season),
    Episode(Episode),
    Artist(Artist),
    Album(Album),
    Track(Track),
    Playlist(Playlist),
    Collection(Collection),
}

macro_rules! for_each_variant {
    ($value:expr, $inner:ident => $body:expr) => {
        match $value {
            MediaContent::Movie($inner) => $body,
            MediaContent::Series($inner) => $body,
            MediaContent::Season($inner) => $body,
            MediaContent::Episode($inner) => $body,
            MediaContent::Artist($inner) => $body,
            MediaContent::Album($inner) => $body,
            MediaContent::Track($inner) => $body,
            MediaContent::Playlist($inner) => $body,
            MediaContent::Collection($inner) => $body,
        }
    };
}

impl MediaContent {
    /// Decode a payload with the schema selected by `media_type`.
    pub fn from_json(media_type: MediaType, value: Value) -> Result<Self, serde_json::Error> {
        let content = match media_type {
            MediaType::Movie => MediaContent::Movie(serde_json::from_value(value)?),
            MediaType::Series => MediaContent::Series(serde_json::from_value(value)?),
            MediaType::Season => {
                let mut season: Season = serde_json::from_value(value)?;
                season.recompute_counts();
                MediaContent::Season(season)
            }
            MediaType::Episode => MediaContent::Episode(serde_json::from_value(value)?),
            MediaType::Artist => {
                let mut artist: Artist = serde_json::from_value(value)?;
                artist.recompute_counts();
                MediaContent::Artist(artist)
            }
            MediaType::Album => MediaContent::Album(serde_json::from_value(value)?),
            MediaType::Track => MediaContent::Track(serde_json::from_value(value)?),
            MediaType::Playlist => MediaContent::Playlist(serde_json::from_value(value)?),
            MediaType::Collection => {
                let mut collection: Collection = serde_json::from_value(value)?;
                collection.ensure_no_duplicates();
                MediaContent::Collection(collection)
            }
            MediaType::Unknown => {
                return Err(serde::de::Error::custom("cannot decode payload of unknown media type"))
            }
        };
        Ok(content)
    }

    pub fn title(&self) -> &str {
        &self.details().title
    }

    pub fn as_dyn(&self) -> &dyn MediaData {
        for_each_variant!(self, inner => inner as &dyn MediaData)
    }
}

impl MediaData for MediaContent {
    fn details(&self) -> &MediaDetails {
        for_each_variant!(self, inner => inner.details())
    }

    fn details_mut(&mut self) -> &mut MediaDetails {
        for_each_variant!(self, inner => inner.details_mut())
    }

    fn media_type(&self) -> MediaType {
        for_each_variant!(self, inner => inner.media_type())
    }
}

impl Serialize for MediaContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        for_each_variant!(self, inner => inner.serialize(serializer))
    }
}

macro_rules! impl_from_variant {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for MediaContent {
                fn from(value: $ty) -> Self {
                    MediaContent::$ty(value)
                }
            }
        )*
    };
}

impl_from_variant!(Movie, Series, Season, Episode, Artist, Album, Track, Playlist, Collection);
