//! Subsonic-compatible music servers (Navidrome, Airsonic, Gonic)

mod convert;
mod types;

pub use types::{
    AlbumList, ArtistIndexEntry, ArtistsIndex, PlaylistList, SubsonicAlbum, SubsonicApiError,
    SubsonicArtist, SubsonicEnvelope, SubsonicPlaylist, SubsonicResponse, SubsonicSong,
};

use super::{RawItem, RawKind};
use crate::mapper::ConverterRegistry;
use crate::models::ClientType;

impl From<SubsonicArtist> for RawItem {
    fn from(item: SubsonicArtist) -> Self {
        RawItem::SubsonicArtist(item)
    }
}

impl From<SubsonicAlbum> for RawItem {
    fn from(item: SubsonicAlbum) -> Self {
        RawItem::SubsonicAlbum(item)
    }
}

impl From<SubsonicSong> for RawItem {
    fn from(item: SubsonicSong) -> Self {
        RawItem::SubsonicSong(item)
    }
}

impl From<SubsonicPlaylist> for RawItem {
    fn from(item: SubsonicPlaylist) -> Self {
        RawItem::SubsonicPlaylist(item)
    }
}

pub fn register(registry: &mut ConverterRegistry) {
    crate::register_converters! {
        registry, ClientType::Subsonic, RawItem::SubsonicArtist => RawKind::SubsonicArtist {
            Artist => convert::artist,
        }
    }
    crate::register_converters! {
        registry, ClientType::Subsonic, RawItem::SubsonicAlbum => RawKind::SubsonicAlbum {
            Album => convert::album,
        }
    }
    crate::register_converters! {
        registry, ClientType::Subsonic, RawItem::SubsonicSong => RawKind::SubsonicSong {
            Track => convert::track,
        }
    }
    crate::register_converters! {
        registry, ClientType::Subsonic, RawItem::SubsonicPlaylist => RawKind::SubsonicPlaylist {
            Playlist => convert::playlist,
        }
    }
}

#[cfg(test)]
mod tests;
