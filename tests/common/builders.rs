use reelhub::backends::RawItem;
use reelhub::backends::jellyfin::BaseItemDto;
use reelhub::backends::plex::{PlexGuid, PlexMetadata};
use std::collections::HashMap;

pub fn plex_movie(rating_key: &str, title: &str, year: i32, guids: &[&str]) -> RawItem {
    PlexMetadata {
        rating_key: Some(rating_key.to_string()),
        type_: Some("movie".to_string()),
        title: Some(title.to_string()),
        year: Some(year),
        guids: guids
            .iter()
            .map(|id| PlexGuid { id: id.to_string() })
            .collect(),
        ..Default::default()
    }
    .into()
}

pub fn jellyfin_movie(id: &str, name: &str, year: i32, provider_ids: &[(&str, &str)]) -> RawItem {
    BaseItemDto {
        id: Some(id.to_string()),
        name: Some(name.to_string()),
        item_type: Some("Movie".to_string()),
        production_year: Some(year),
        provider_ids: provider_ids
            .iter()
            .map(|(source, value)| (source.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>(),
        ..Default::default()
    }
    .into()
}
