use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

use super::details::MediaDetails;
use super::identifiers::{ClientId, MediaItemId, UserId};
use super::identity::{ClientType, ExternalIds, SyncClients};
use super::list::{Collection, Playlist};
use super::media::{Album, Artist, Episode, MediaContent, MediaData, Movie, Season, Series, Track};
use super::MediaType;
use crate::merge::Merge;

/// The durable envelope around one media payload.
///
/// The type tag, title and release year are kept in step with the payload;
/// the payload can only be replaced through [`MediaItem::set_data`].
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub id: MediaItemId,
    pub uuid: Uuid,
    pub sync_clients: SyncClients,
    pub external_ids: ExternalIds,
    pub owner_id: UserId,
    media_type: MediaType,
    title: String,
    release_year: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    data: MediaContent,
}

macro_rules! narrowing_accessors {
    ($($variant:ident: $ty:ty => $get:ident, $get_mut:ident;)*) => {
        $(
            pub fn $get(&self) -> Option<&$ty> {
                if self.media_type != MediaType::$variant {
                    return None;
                }
                match &self.data {
                    MediaContent::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            pub fn $get_mut(&mut self) -> Option<&mut $ty> {
                if self.media_type != MediaType::$variant {
                    return None;
                }
                match &mut self.data {
                    MediaContent::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        )*
    };
}

impl MediaItem {
    /// Wrap a freshly fetched or imported payload. This is the only place a
    /// media item UUID is minted.
    pub fn new(data: impl Into<MediaContent>) -> Self {
        let data = data.into();
        let now = Utc::now();
        Self {
            id: MediaItemId::default(),
            uuid: Uuid::new_v4(),
            sync_clients: SyncClients::new(),
            external_ids: ExternalIds::new(),
            owner_id: UserId::SYSTEM,
            media_type: data.media_type(),
            title: data.details().title.clone(),
            release_year: data.details().year(),
            created_at: now,
            updated_at: now,
            data,
        }
    }

    pub fn with_owner(mut self, owner_id: UserId) -> Self {
        self.owner_id = owner_id;
        self
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn release_year(&self) -> Option<i32> {
        self.release_year
    }

    pub fn data(&self) -> &MediaContent {
        &self.data
    }

    pub fn details(&self) -> &MediaDetails {
        self.data.details()
    }

    /// Edit the payload's details and refresh the denormalized fields.
    pub fn update_details(&mut self, f: impl FnOnce(&mut MediaDetails)) {
        f(self.data.details_mut());
        self.refresh();
    }

    /// Replace the payload. The type tag follows the new payload.
    pub fn set_data(&mut self, data: impl Into<MediaContent>) {
        self.data = data.into();
        self.refresh();
    }

    /// Record that `client_id` (a `client_type` backend) knows this item as `item_key`.
    pub fn set_client_info(
        &mut self,
        client_id: ClientId,
        client_type: ClientType,
        item_key: impl Into<String>,
    ) {
        self.sync_clients.upsert(client_id, client_type, item_key);
    }

    /// Upsert an external id. An empty `id` never creates or changes an entry.
    pub fn add_external_id(&mut self, source: &str, id: &str) {
        if id.is_empty() {
            return;
        }
        self.external_ids.add_or_update(source, id);
    }

    /// Promote the payload's external ids onto the envelope.
    pub fn adopt_external_ids(&mut self) {
        let found = self.data.details().external_ids.clone();
        for ext in found.iter() {
            self.add_external_id(&ext.source, &ext.id);
        }
    }

    /// Key of this item on `client_id`, if that client knows it.
    pub fn client_key(&self, client_id: ClientId) -> Option<&str> {
        self.sync_clients.get_client_item_id(client_id)
    }

    narrowing_accessors! {
        Movie: Movie => as_movie, as_movie_mut;
        Series: Series => as_series, as_series_mut;
        Season: Season => as_season, as_season_mut;
        Episode: Episode => as_episode, as_episode_mut;
        Artist: Artist => as_artist, as_artist_mut;
        Album: Album => as_album, as_album_mut;
        Track: Track => as_track, as_track_mut;
        Playlist: Playlist => as_playlist, as_playlist_mut;
        Collection: Collection => as_collection, as_collection_mut;
    }

    /// Fold a second observation of the same entity into this one.
    ///
    /// Returns `false` and changes nothing when the media types differ.
    pub fn merge(&mut self, other: &MediaItem) -> bool {
        if self.media_type != other.media_type {
            return false;
        }

        self.sync_clients.merge(&other.sync_clients);
        self.external_ids.merge(&other.external_ids);
        self.data.merge(&other.data);
        self.refresh();
        self.updated_at = Utc::now();
        true
    }

    fn refresh(&mut self) {
        self.media_type = self.data.media_type();
        self.title = self.data.details().title.clone();
        self.release_year = self.data.details().year();
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// Self-contained JSON blob for storage.
    pub fn to_blob(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_blob(blob: &str) -> serde_json::Result<Self> {
        serde_json::from_str(blob)
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    id: MediaItemId,
    uuid: Uuid,
    sync_clients: &'a SyncClients,
    external_ids: &'a ExternalIds,
    owner_id: UserId,
    #[serde(rename = "type")]
    media_type: MediaType,
    title: &'a str,
    release_year: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    data: &'a MediaContent,
}

/// Envelope fields with the payload left undecoded.
#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    id: MediaItemId,
    uuid: Uuid,
    #[serde(default)]
    sync_clients: SyncClients,
    #[serde(default)]
    external_ids: ExternalIds,
    #[serde(default)]
    owner_id: UserId,
    #[serde(rename = "type")]
    media_type: MediaType,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    data: Value,
}

impl Serialize for MediaItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EnvelopeRef {
            id: self.id,
            uuid: self.uuid,
            sync_clients: &self.sync_clients,
            external_ids: &self.external_ids,
            owner_id: self.owner_id,
            media_type: self.media_type,
            title: &self.title,
            release_year: self.release_year,
            created_at: self.created_at,
            updated_at: self.updated_at,
            data: &self.data,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MediaItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawEnvelope::deserialize(deserializer)?;
        let data = MediaContent::from_json(raw.media_type, raw.data)
            .map_err(|e| D::Error::custom(format!("invalid {} payload: {}", raw.media_type, e)))?;

        // Denormalized fields are rebuilt from the payload rather than trusted.
        let mut item = MediaItem {
            id: raw.id,
            uuid: raw.uuid,
            sync_clients: raw.sync_clients,
            external_ids: raw.external_ids,
            owner_id: raw.owner_id,
            media_type: raw.media_type,
            title: String::new(),
            release_year: None,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            data,
        };
        item.refresh();
        Ok(item)
    }
}
