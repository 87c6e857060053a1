pub mod emby;
pub mod jellyfin;
pub mod plex;
pub mod subsonic;
mod traits;

pub use traits::{Capabilities, ClientContext, ListOperation, MediaBackend, RawItem, RawKind};

use crate::mapper::ConverterRegistry;

/// Register the converters of every supported backend.
pub fn register_all(registry: &mut ConverterRegistry) {
    plex::register(registry);
    jellyfin::register(registry);
    emby::register(registry);
    subsonic::register(registry);
}
