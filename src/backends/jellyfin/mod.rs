//! Jellyfin items (`BaseItemDto`)

mod convert;
mod types;

pub use types::{BaseItemDto, BaseItemPerson, ItemsResponse, MediaUrl, NameIdPair, UserItemData};

use super::{RawItem, RawKind};
use crate::mapper::ConverterRegistry;
use crate::models::ClientType;

impl From<BaseItemDto> for RawItem {
    fn from(item: BaseItemDto) -> Self {
        RawItem::BaseItem(item)
    }
}

/// Register the `BaseItemDto` converters under `client_type`.
pub(crate) fn register_for(registry: &mut ConverterRegistry, client_type: ClientType) {
    crate::register_converters! {
        registry, client_type, RawItem::BaseItem => RawKind::BaseItem {
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

pub fn register(registry: &mut ConverterRegistry) {
    register_for(registry, ClientType::Jellyfin);
}
