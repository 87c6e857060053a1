//! Plex Media Server items (`MediaContainer.Metadata[]`)

mod convert;
mod types;

pub use convert::parse_guid;
pub use types::{PlexGuid, PlexMetadata, PlexMetadataContainer, PlexMetadataResponse, PlexTag};

use super::{RawItem, RawKind};
use crate::mapper::ConverterRegistry;
use crate::models::ClientType;

impl From<PlexMetadata> for RawItem {
    fn from(item: PlexMetadata) -> Self {
        RawItem::Plex(item)
    }
}

pub fn register(registry: &mut ConverterRegistry) {
    crate::register_converters! {
        registry, ClientType::Plex, RawItem::Plex => RawKind::PlexMetadata {
            Movie => convert::movie,
            Series => convert::series,
            Season => convert::season,
            Episode => convert::episode,
            Artist => convert::artist,
            Album => convert::album,
            Track => convert::track,
            Playlist => convert::playlist,
            Collection => convert::collection,
        }
    }
}
