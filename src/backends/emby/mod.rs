//! Emby items
//!
//! Emby returns the Jellyfin `BaseItemDto` schema, so the Jellyfin converters
//! are registered again under [`ClientType::Emby`]. Keys land in the `emby`
//! external-id namespace and artwork resolves under `/emby/Items/...`.

pub use super::jellyfin::{BaseItemDto, ItemsResponse};

use crate::mapper::ConverterRegistry;
use crate::models::ClientType;

pub fn register(registry: &mut ConverterRegistry) {
    super::jellyfin::register_for(registry, ClientType::Emby);
}
