//! Converters for `BaseItemDto`, shared by the Jellyfin and Emby backends.
//!
//! The backend namespace and artwork URL layout follow `ctx.client_type`.

use super::types::BaseItemDto;
use crate::backends::{ClientContext, RawKind};
use crate::mapper::transforms::{
    build_url, non_empty, parse_date, parse_datetime, ticks_to_seconds,
};
use crate::models::{
    Album, Artist, Artwork, ClientType, Collection, Episode, MediaDetails, MediaType, Movie,
    Playlist, Rating, Season, Series, Track,
};
use crate::utils::errors::ConversionError;

/// Image URL for one tagged image of an item.
fn image_url(
    ctx: &ClientContext,
    item_id: &str,
    kind: &str,
    index: Option<&str>,
    tag: &str,
) -> Option<String> {
    let mut segments = Vec::with_capacity(6);
    // Emby serves its API under `/emby` unless the configured base already points there.
    if ctx.client_type == ClientType::Emby
        && !ctx.base_url.path().trim_end_matches('/').ends_with("/emby")
    {
        segments.push("emby");
    }
    segments.extend(["Items", item_id, "Images", kind]);
    if let Some(index) = index {
        segments.push(index);
    }
    build_url(&ctx.base_url, &segments, &[("tag", tag)])
}

fn artwork(ctx: &ClientContext, item_id: &str, item: &BaseItemDto) -> Artwork {
    let tagged = |kind: &str| {
        item.image_tags
            .get(kind)
            .and_then(|tag| image_url(ctx, item_id, kind, None, tag))
    };
    Artwork {
        poster: tagged("Primary"),
        background: item
            .backdrop_image_tags
            .first()
            .and_then(|tag| image_url(ctx, item_id, "Backdrop", Some("0"), tag)),
        banner: tagged("Banner"),
        thumbnail: tagged("Thumb"),
        logo: tagged("Logo"),
    }
}

fn base(
    ctx: &ClientContext,
    item: &BaseItemDto,
    dto_type: &str,
    target: MediaType,
) -> Result<MediaDetails, ConversionError> {
    let id = non_empty(item.id.as_deref())
        .ok_or(ConversionError::missing(ctx.client_type, RawKind::BaseItem, "Id"))?;

    if let Some(actual) = item.item_type.as_deref() {
        if actual != dto_type {
            return Err(ConversionError::TypeMismatch {
                item_id: id,
                target,
                actual: actual.to_string(),
            });
        }
    }

    let mut details = MediaDetails::new(non_empty(item.name.as_deref()).unwrap_or_default());
    details.sort_title = non_empty(item.sort_name.as_deref());
    details.original_title = non_empty(item.original_title.as_deref());
    details.description = non_empty(item.overview.as_deref());
    details.tagline = item.taglines.first().and_then(|t| non_empty(Some(t.as_str())));
    details.release_date = parse_date(item.premiere_date.as_deref());
    details.release_year = item.production_year.filter(|y| *y > 0);
    details.added_at = parse_datetime(item.date_created.as_deref());
    details.genres = item.genres.clone();
    details.tags = item.tags.clone();
    details.studios = item
        .studios
        .iter()
        .filter_map(|s| non_empty(s.name.as_deref()))
        .collect();
    details.content_rating = non_empty(item.official_rating.as_deref());
    details.language = non_empty(item.preferred_metadata_language.as_deref());
    details.duration = ticks_to_seconds(item.run_time_ticks);
    details.artwork = artwork(ctx, &id, item);

    if let Some(value) = item.community_rating {
        details.ratings.push(Rating::new(ctx.client_type.as_str(), value));
    }
    if let Some(percent) = item.critic_rating {
        details.ratings.push(Rating::new("rottentomatoes", percent / 10.0));
    }
    if let Some(user_data) = &item.user_data {
        details.user_rating = user_data.rating;
        details.is_favorite = user_data.is_favorite;
    }

    // Sorted so the stored order does not depend on map iteration.
    let mut providers: Vec<_> = item.provider_ids.iter().collect();
    providers.sort();
    for (source, value) in providers {
        if !value.trim().is_empty() {
            details.external_ids.add_or_update(source, value.trim());
        }
    }
    details.external_ids.add_or_update(ctx.client_type.as_str(), id);

    Ok(details)
}

pub fn movie(ctx: &ClientContext, item: &BaseItemDto) -> Result<Movie, ConversionError> {
    let details = base(ctx, item, "Movie", MediaType::Movie)?;
    Ok(Movie {
        details,
        trailer_url: item
            .remote_trailers
            .iter()
            .find_map(|t| non_empty(t.url.as_deref())),
        edition: None,
    })
}

pub fn series(ctx: &ClientContext, item: &BaseItemDto) -> Result<Series, ConversionError> {
    let details = base(ctx, item, "Series", MediaType::Series)?;
    Ok(Series {
        network: details.studios.first().cloned(),
        details,
        season_count: item.child_count.unwrap_or_default(),
        episode_count: item.recursive_item_count.unwrap_or_default(),
        status: non_empty(item.status.as_deref()),
    })
}

pub fn season(ctx: &ClientContext, item: &BaseItemDto) -> Result<Season, ConversionError> {
    let details = base(ctx, item, "Season", MediaType::Season)?;
    let mut season = Season::new(details, item.index_number.unwrap_or_default());
    season.series_title = non_empty(item.series_name.as_deref());
    Ok(season)
}

pub fn episode(ctx: &ClientContext, item: &BaseItemDto) -> Result<Episode, ConversionError> {
    let mut details = base(ctx, item, "Episode", MediaType::Episode)?;
    if details.artwork.thumbnail.is_none() {
        details.artwork.thumbnail = details.artwork.poster.take();
    }
    Ok(Episode {
        details,
        number: item.index_number.unwrap_or_default(),
        season_number: item.parent_index_number.unwrap_or_default(),
        series_id: None,
        season_id: None,
        series_title: non_empty(item.series_name.as_deref()),
    })
}

pub fn artist(ctx: &ClientContext, item: &BaseItemDto) -> Result<Artist, ConversionError> {
    let details = base(ctx, item, "MusicArtist", MediaType::Artist)?;
    Ok(Artist::new(details))
}

pub fn album(ctx: &ClientContext, item: &BaseItemDto) -> Result<Album, ConversionError> {
    let details = base(ctx, item, "MusicAlbum", MediaType::Album)?;
    let artist_name = non_empty(item.album_artist.as_deref()).or_else(|| {
        item.album_artists
            .iter()
            .find_map(|a| non_empty(a.name.as_deref()))
    });
    Ok(Album {
        details,
        artist_id: None,
        artist_name,
        track_count: item.child_count.unwrap_or_default(),
        disc_count: 0,
        release_type: None,
    })
}

pub fn track(ctx: &ClientContext, item: &BaseItemDto) -> Result<Track, ConversionError> {
    let details = base(ctx, item, "Audio", MediaType::Track)?;
    let artist_name = item
        .artists
        .first()
        .and_then(|a| non_empty(Some(a.as_str())))
        .or_else(|| non_empty(item.album_artist.as_deref()));
    let composer = item
        .people
        .iter()
        .filter(|p| p.person_type.as_deref() == Some("Composer"))
        .find_map(|p| non_empty(p.name.as_deref()));
    Ok(Track {
        details,
        album_id: None,
        artist_id: None,
        album_name: non_empty(item.album.as_deref()),
        artist_name,
        number: item.index_number.unwrap_or_default(),
        disc_number: item.parent_index_number.unwrap_or_default(),
        composer,
    })
}

pub fn playlist(ctx: &ClientContext, item: &BaseItemDto) -> Result<Playlist, ConversionError> {
    let details = base(ctx, item, "Playlist", MediaType::Playlist)?;
    Ok(Playlist::new(details))
}

pub fn collection(ctx: &ClientContext, item: &BaseItemDto) -> Result<Collection, ConversionError> {
    let details = base(ctx, item, "BoxSet", MediaType::Collection)?;
    Ok(Collection::new(details))
}
