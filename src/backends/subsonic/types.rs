use serde::Deserialize;

use crate::mapper::transforms::deserialize_opt_string_or_number;

/// Body of a `subsonic-response` JSON document (`f=json`).
#[derive(Debug, Deserialize)]
pub struct SubsonicEnvelope {
    #[serde(rename = "subsonic-response")]
    pub response: SubsonicResponse,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsonicResponse {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub error: Option<SubsonicApiError>,
    #[serde(default)]
    pub artists: Option<ArtistsIndex>,
    #[serde(default)]
    pub artist: Option<SubsonicArtist>,
    #[serde(default)]
    pub album: Option<SubsonicAlbum>,
    #[serde(default)]
    pub album_list2: Option<AlbumList>,
    #[serde(default)]
    pub playlists: Option<PlaylistList>,
    #[serde(default)]
    pub playlist: Option<SubsonicPlaylist>,
    #[serde(default)]
    pub song: Option<SubsonicSong>,
}

impl SubsonicResponse {
    pub fn from_body(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<SubsonicEnvelope>(body).map(|envelope| envelope.response)
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubsonicApiError {
    pub code: i32,
    #[serde(default)]
    pub message: Option<String>,
}

/// `getArtists`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtistsIndex {
    #[serde(default)]
    pub index: Vec<ArtistIndexEntry>,
}

impl ArtistsIndex {
    pub fn into_artists(self) -> Vec<SubsonicArtist> {
        self.index.into_iter().flat_map(|entry| entry.artist).collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtistIndexEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artist: Vec<SubsonicArtist>,
}

/// `getAlbumList2`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlbumList {
    #[serde(default)]
    pub album: Vec<SubsonicAlbum>,
}

/// `getPlaylists`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistList {
    #[serde(default)]
    pub playlist: Vec<SubsonicPlaylist>,
}

/// `ArtistID3`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsonicArtist {
    #[serde(default, deserialize_with = "deserialize_opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sort_name: Option<String>,
    #[serde(default)]
    pub cover_art: Option<String>,
    #[serde(default)]
    pub artist_image_url: Option<String>,
    #[serde(default)]
    pub album_count: Option<u32>,
    #[serde(default)]
    pub starred: Option<String>,
    #[serde(default)]
    pub user_rating: Option<f32>,
    #[serde(default)]
    pub average_rating: Option<f32>,
    #[serde(default)]
    pub music_brainz_id: Option<String>,
    /// Present on `getArtist`.
    #[serde(default)]
    pub album: Vec<SubsonicAlbum>,
}

/// `AlbumID3`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsonicAlbum {
    #[serde(default, deserialize_with = "deserialize_opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sort_name: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string_or_number")]
    pub artist_id: Option<String>,
    #[serde(default)]
    pub cover_art: Option<String>,
    #[serde(default)]
    pub song_count: Option<u32>,
    /// Seconds.
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub starred: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub user_rating: Option<f32>,
    #[serde(default)]
    pub music_brainz_id: Option<String>,
    #[serde(default)]
    pub release_types: Vec<String>,
    /// Present on `getAlbum`.
    #[serde(default)]
    pub song: Vec<SubsonicSong>,
}

/// `Child` with `type = "music"`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsonicSong {
    #[serde(default, deserialize_with = "deserialize_opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub sort_name: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string_or_number")]
    pub album_id: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string_or_number")]
    pub artist_id: Option<String>,
    #[serde(default)]
    pub track: Option<i32>,
    #[serde(default)]
    pub disc_number: Option<i32>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub cover_art: Option<String>,
    /// Seconds.
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub starred: Option<String>,
    #[serde(default)]
    pub user_rating: Option<f32>,
    #[serde(default)]
    pub average_rating: Option<f32>,
    #[serde(default)]
    pub music_brainz_id: Option<String>,
    #[serde(default)]
    pub composer: Option<String>,
    #[serde(rename = "type", default)]
    pub media_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsonicPlaylist {
    #[serde(default, deserialize_with = "deserialize_opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub song_count: Option<u32>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub changed: Option<String>,
    #[serde(default)]
    pub cover_art: Option<String>,
    /// Present on `getPlaylist`.
    #[serde(default)]
    pub entry: Vec<SubsonicSong>,
}
