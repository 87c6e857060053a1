use super::types::PlexMetadata;
use crate::backends::{ClientContext, RawKind};
use crate::mapper::transforms::{
    absolute_url, millis_to_seconds, non_empty, parse_date, unix_to_datetime,
};
use crate::models::{
    Album, Artist, Artwork, ClientType, Collection, Episode, MediaDetails, MediaType, Movie,
    Playlist, Rating, Season, Series, Track,
};
use crate::utils::errors::ConversionError;

/// Split a Plex guid into an external id.
///
/// Handles modern `tmdb://603`, legacy agent `com.plexapp.agents.imdb://tt0133093?lang=en`
/// and Plex's own `plex://movie/5d77...` (kept whole under `plexguid`).
pub fn parse_guid(guid: &str) -> Option<(String, String)> {
    let (scheme, rest) = guid.split_once("://")?;
    let id = rest.split('?').next().unwrap_or(rest);
    if id.is_empty() {
        return None;
    }

    let agent = scheme.rsplit('.').next().unwrap_or(scheme);
    let source = match agent {
        "plex" => return Some(("plexguid".to_string(), guid.to_string())),
        "local" | "none" | "file" | "collection" => return None,
        other => normalize_agent(other),
    };
    Some((source.to_string(), id.to_string()))
}

fn normalize_agent(agent: &str) -> &str {
    match agent {
        "themoviedb" => "tmdb",
        "thetvdb" => "tvdb",
        other => other,
    }
}

/// Rating source named by a `ratingImage` such as `rottentomatoes://image.rating.ripe`.
fn rating_source(image: Option<&str>) -> Option<&str> {
    image
        .and_then(|i| i.split_once("://"))
        .map(|(scheme, _)| normalize_agent(scheme))
        .filter(|s| !s.is_empty())
}

fn ratings(item: &PlexMetadata) -> Vec<Rating> {
    let mut ratings = Vec::new();
    let critic_source = rating_source(item.rating_image.as_deref()).unwrap_or("plex");
    if let Some(value) = item.rating {
        ratings.push(Rating::new(critic_source, value));
    }
    if let Some(value) = item.audience_rating {
        let source = match rating_source(item.audience_rating_image.as_deref()) {
            Some(source) if source != critic_source || item.rating.is_none() => source.to_string(),
            Some(source) => format!("{}_audience", source),
            None => "plex_audience".to_string(),
        };
        ratings.push(Rating::new(source, value));
    }
    ratings
}

/// Check key and type, and build the details every Plex item shares.
fn base(
    ctx: &ClientContext,
    item: &PlexMetadata,
    plex_type: &str,
    target: MediaType,
) -> Result<MediaDetails, ConversionError> {
    let key = non_empty(item.rating_key.as_deref())
        .ok_or(ConversionError::missing(ClientType::Plex, RawKind::PlexMetadata, "ratingKey"))?;

    if let Some(actual) = item.type_.as_deref() {
        if actual != plex_type {
            return Err(ConversionError::TypeMismatch {
                item_id: key,
                target,
                actual: actual.to_string(),
            });
        }
    }

    let mut details = MediaDetails::new(non_empty(item.title.as_deref()).unwrap_or_default());
    details.sort_title = non_empty(item.title_sort.as_deref());
    details.original_title = non_empty(item.original_title.as_deref());
    details.description = non_empty(item.summary.as_deref());
    details.tagline = non_empty(item.tagline.as_deref());
    details.release_date = parse_date(item.originally_available_at.as_deref());
    details.release_year = item.year.filter(|y| *y > 0);
    details.added_at = unix_to_datetime(item.added_at);
    details.updated_at = unix_to_datetime(item.updated_at);
    details.genres = item.genres.iter().map(|g| g.tag.clone()).collect();
    details.tags = item.labels.iter().map(|l| l.tag.clone()).collect();
    details.studios = non_empty(item.studio.as_deref()).into_iter().collect();
    details.content_rating = non_empty(item.content_rating.as_deref());
    details.duration = millis_to_seconds(item.duration);
    details.ratings = ratings(item);
    details.user_rating = item.user_rating;
    details.artwork = Artwork {
        poster: absolute_url(&ctx.base_url, item.thumb.as_deref()),
        background: absolute_url(&ctx.base_url, item.art.as_deref()),
        banner: absolute_url(&ctx.base_url, item.banner.as_deref()),
        thumbnail: None,
        logo: None,
    };

    details.external_ids.add_or_update(ClientType::Plex.as_str(), key);
    let guids = item
        .guid
        .iter()
        .chain(item.guids.iter().map(|g| &g.id))
        .filter_map(|g| parse_guid(g));
    for (source, id) in guids {
        details.external_ids.add_or_update(&source, id);
    }

    Ok(details)
}

pub fn movie(ctx: &ClientContext, item: &PlexMetadata) -> Result<Movie, ConversionError> {
    let details = base(ctx, item, "movie", MediaType::Movie)?;
    Ok(Movie {
        details,
        trailer_url: None,
        edition: None,
    })
}

pub fn series(ctx: &ClientContext, item: &PlexMetadata) -> Result<Series, ConversionError> {
    let details = base(ctx, item, "show", MediaType::Series)?;
    Ok(Series {
        network: details.studios.first().cloned(),
        details,
        season_count: item.child_count.unwrap_or_default(),
        episode_count: item.leaf_count.unwrap_or_default(),
        status: None,
    })
}

/// `leafCount` is ignored: a season's episode count follows its episode ids.
pub fn season(ctx: &ClientContext, item: &PlexMetadata) -> Result<Season, ConversionError> {
    let mut details = base(ctx, item, "season", MediaType::Season)?;
    if details.artwork.poster.is_none() {
        details.artwork.poster = absolute_url(&ctx.base_url, item.parent_thumb.as_deref());
    }
    let mut season = Season::new(details, item.index.unwrap_or_default());
    season.series_title = non_empty(item.parent_title.as_deref());
    Ok(season)
}

pub fn episode(ctx: &ClientContext, item: &PlexMetadata) -> Result<Episode, ConversionError> {
    let mut details = base(ctx, item, "episode", MediaType::Episode)?;
    // An episode's thumb is a still; the show poster is the grandparent's.
    details.artwork.thumbnail = details.artwork.poster.take();
    details.artwork.poster = absolute_url(&ctx.base_url, item.grandparent_thumb.as_deref());
    Ok(Episode {
        details,
        number: item.index.unwrap_or_default(),
        season_number: item.parent_index.unwrap_or_default(),
        series_id: None,
        season_id: None,
        series_title: non_empty(item.grandparent_title.as_deref()),
    })
}

pub fn artist(ctx: &ClientContext, item: &PlexMetadata) -> Result<Artist, ConversionError> {
    let details = base(ctx, item, "artist", MediaType::Artist)?;
    Ok(Artist::new(details))
}

pub fn album(ctx: &ClientContext, item: &PlexMetadata) -> Result<Album, ConversionError> {
    let details = base(ctx, item, "album", MediaType::Album)?;
    Ok(Album {
        details,
        artist_id: None,
        artist_name: non_empty(item.parent_title.as_deref()),
        track_count: item.leaf_count.unwrap_or_default(),
        disc_count: 0,
        release_type: non_empty(item.subtype.as_deref()),
    })
}

pub fn track(ctx: &ClientContext, item: &PlexMetadata) -> Result<Track, ConversionError> {
    let mut details = base(ctx, item, "track", MediaType::Track)?;
    // On tracks `originalTitle` is the performing artist, not an alternate title.
    let track_artist = details.original_title.take();
    if details.artwork.poster.is_none() {
        details.artwork.poster = absolute_url(&ctx.base_url, item.parent_thumb.as_deref());
    }
    Ok(Track {
        details,
        album_id: None,
        artist_id: None,
        album_name: non_empty(item.parent_title.as_deref()),
        artist_name: track_artist.or_else(|| non_empty(item.grandparent_title.as_deref())),
        number: item.index.unwrap_or_default(),
        disc_number: item.parent_index.unwrap_or_default(),
        composer: None,
    })
}

pub fn playlist(ctx: &ClientContext, item: &PlexMetadata) -> Result<Playlist, ConversionError> {
    let details = base(ctx, item, "playlist", MediaType::Playlist)?;
    let mut playlist = Playlist::new(details);
    playlist.is_smart = item.smart.unwrap_or(false);
    Ok(playlist)
}

pub fn collection(ctx: &ClientContext, item: &PlexMetadata) -> Result<Collection, ConversionError> {
    let details = base(ctx, item, "collection", MediaType::Collection)?;
    let mut collection = Collection::new(details);
    collection.set_smart(item.smart.unwrap_or(false));
    Ok(collection)
}
