use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use super::jellyfin::BaseItemDto;
use super::plex::PlexMetadata;
use super::subsonic::{SubsonicAlbum, SubsonicArtist, SubsonicPlaylist, SubsonicSong};
use crate::models::{ClientId, ClientType, MediaType};
use crate::utils::errors::BackendError;

/// Wire shape of a raw backend item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RawKind {
    PlexMetadata,
    /// Jellyfin and Emby share this DTO.
    BaseItem,
    SubsonicArtist,
    SubsonicAlbum,
    SubsonicSong,
    SubsonicPlaylist,
}

impl fmt::Display for RawKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RawKind::PlexMetadata => "metadata",
            RawKind::BaseItem => "BaseItemDto",
            RawKind::SubsonicArtist => "artist",
            RawKind::SubsonicAlbum => "album",
            RawKind::SubsonicSong => "song",
            RawKind::SubsonicPlaylist => "playlist",
        };
        f.write_str(s)
    }
}

/// One item as returned by a backend, before conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawItem {
    Plex(PlexMetadata),
    BaseItem(BaseItemDto),
    SubsonicArtist(SubsonicArtist),
    SubsonicAlbum(SubsonicAlbum),
    SubsonicSong(SubsonicSong),
    SubsonicPlaylist(SubsonicPlaylist),
}

impl RawItem {
    pub fn kind(&self) -> RawKind {
        match self {
            RawItem::Plex(_) => RawKind::PlexMetadata,
            RawItem::BaseItem(_) => RawKind::BaseItem,
            RawItem::SubsonicArtist(_) => RawKind::SubsonicArtist,
            RawItem::SubsonicAlbum(_) => RawKind::SubsonicAlbum,
            RawItem::SubsonicSong(_) => RawKind::SubsonicSong,
            RawItem::SubsonicPlaylist(_) => RawKind::SubsonicPlaylist,
        }
    }

    /// Backend key, when present. Used for log context only.
    pub fn key(&self) -> Option<&str> {
        match self {
            RawItem::Plex(item) => item.rating_key.as_deref(),
            RawItem::BaseItem(item) => item.id.as_deref(),
            RawItem::SubsonicArtist(item) => item.id.as_deref(),
            RawItem::SubsonicAlbum(item) => item.id.as_deref(),
            RawItem::SubsonicSong(item) => item.id.as_deref(),
            RawItem::SubsonicPlaylist(item) => item.id.as_deref(),
        }
    }
}

/// Which backend instance a raw item came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientContext {
    pub client_id: ClientId,
    pub client_type: ClientType,
    pub base_url: Url,
}

impl ClientContext {
    pub fn new(client_id: ClientId, client_type: ClientType, base_url: Url) -> Self {
        Self {
            client_id,
            client_type,
            base_url,
        }
    }
}

/// List operations a backend may or may not offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListOperation {
    CreatePlaylist,
    EditPlaylist,
    ReorderPlaylist,
    CreateCollection,
    CreateEmptyCollection,
    EditCollection,
}

impl ListOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListOperation::CreatePlaylist => "creating playlists",
            ListOperation::EditPlaylist => "editing playlists",
            ListOperation::ReorderPlaylist => "reordering playlists",
            ListOperation::CreateCollection => "creating collections",
            ListOperation::CreateEmptyCollection => "creating empty collections",
            ListOperation::EditCollection => "editing collections",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub client_type: ClientType,
    pub playlists: bool,
    pub playlist_reorder: bool,
    pub collections: bool,
    pub empty_collections: bool,
}

impl Capabilities {
    pub fn for_client(client_type: ClientType) -> Self {
        match client_type {
            // Plex collections are a tag on their members, so one cannot exist empty.
            ClientType::Plex => Self {
                client_type,
                playlists: true,
                playlist_reorder: true,
                collections: true,
                empty_collections: false,
            },
            ClientType::Jellyfin | ClientType::Emby => Self {
                client_type,
                playlists: true,
                playlist_reorder: true,
                collections: true,
                empty_collections: true,
            },
            ClientType::Subsonic => Self {
                client_type,
                playlists: true,
                playlist_reorder: false,
                collections: false,
                empty_collections: false,
            },
        }
    }

    pub fn supports(&self, operation: ListOperation) -> bool {
        match operation {
            ListOperation::CreatePlaylist | ListOperation::EditPlaylist => self.playlists,
            ListOperation::ReorderPlaylist => self.playlists && self.playlist_reorder,
            ListOperation::CreateCollection | ListOperation::EditCollection => self.collections,
            ListOperation::CreateEmptyCollection => self.collections && self.empty_collections,
        }
    }

    pub fn require(&self, operation: ListOperation) -> Result<(), BackendError> {
        if self.supports(operation) {
            Ok(())
        } else {
            Err(BackendError::not_supported(self.client_type, operation.as_str()))
        }
    }
}

/// A media server client. Transport lives behind this trait.
#[async_trait]
pub trait MediaBackend: Send + Sync + fmt::Debug {
    fn context(&self) -> &ClientContext;

    fn capabilities(&self) -> Capabilities {
        Capabilities::for_client(self.context().client_type)
    }

    /// One page of raw items of `media_type`. A page shorter than `limit` is the last one.
    async fn fetch_page(
        &self,
        media_type: MediaType,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<RawItem>, BackendError>;

    async fn fetch_item(&self, key: &str) -> Result<Option<RawItem>, BackendError>;

    /// Backend keys of a list's members, in list order.
    async fn fetch_list_keys(&self, _list_key: &str) -> Result<Vec<String>, BackendError> {
        Err(BackendError::not_supported(
            self.context().client_type,
            "reading list members",
        ))
    }

    /// Returns the new playlist's key.
    async fn create_playlist(
        &self,
        _title: &str,
        _item_keys: &[String],
    ) -> Result<String, BackendError> {
        Err(BackendError::not_supported(
            self.context().client_type,
            ListOperation::CreatePlaylist.as_str(),
        ))
    }

    async fn add_to_playlist(
        &self,
        _playlist_key: &str,
        _item_keys: &[String],
    ) -> Result<(), BackendError> {
        Err(BackendError::not_supported(
            self.context().client_type,
            ListOperation::EditPlaylist.as_str(),
        ))
    }

    async fn remove_from_playlist(
        &self,
        _playlist_key: &str,
        _item_keys: &[String],
    ) -> Result<(), BackendError> {
        Err(BackendError::not_supported(
            self.context().client_type,
            ListOperation::EditPlaylist.as_str(),
        ))
    }

    /// Returns the new collection's key.
    async fn create_collection(
        &self,
        _title: &str,
        _item_keys: &[String],
    ) -> Result<String, BackendError> {
        Err(BackendError::not_supported(
            self.context().client_type,
            ListOperation::CreateCollection.as_str(),
        ))
    }

    async fn add_to_collection(
        &self,
        _collection_key: &str,
        _item_keys: &[String],
    ) -> Result<(), BackendError> {
        Err(BackendError::not_supported(
            self.context().client_type,
            ListOperation::EditCollection.as_str(),
        ))
    }
}
