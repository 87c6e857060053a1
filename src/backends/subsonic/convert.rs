use chrono::Utc;

use super::types::{SubsonicAlbum, SubsonicArtist, SubsonicPlaylist, SubsonicSong};
use crate::backends::{ClientContext, RawKind};
use crate::mapper::transforms::{absolute_url, build_url, non_empty, parse_datetime};
use crate::models::{Album, Artist, ListSyncState, MediaDetails, Playlist, Rating, Track};
use crate::utils::errors::ConversionError;

/// `getCoverArt` URL. Authentication parameters are appended by the transport.
fn cover_art_url(ctx: &ClientContext, cover_art: Option<&str>) -> Option<String> {
    let id = non_empty(cover_art)?;
    build_url(&ctx.base_url, &["rest", "getCoverArt"], &[("id", id.as_str())])
}

fn seconds(duration: Option<i64>) -> Option<u64> {
    duration.filter(|d| *d > 0).map(|d| d as u64)
}

fn details(
    ctx: &ClientContext,
    raw_kind: RawKind,
    id: Option<&str>,
    title: Option<&str>,
) -> Result<MediaDetails, ConversionError> {
    let id = non_empty(id).ok_or(ConversionError::missing(ctx.client_type, raw_kind, "id"))?;
    let mut details = MediaDetails::new(non_empty(title).unwrap_or_default());
    details.external_ids.add_or_update(ctx.client_type.as_str(), id);
    Ok(details)
}

fn set_common(
    details: &mut MediaDetails,
    starred: Option<&str>,
    user_rating: Option<f32>,
    average_rating: Option<f32>,
    music_brainz_id: Option<&str>,
) {
    details.is_favorite = non_empty(starred).is_some();
    details.user_rating = user_rating.filter(|r| *r > 0.0);
    if let Some(average) = average_rating.filter(|r| *r > 0.0) {
        details.ratings.push(Rating::new("subsonic", average));
    }
    if let Some(mbid) = non_empty(music_brainz_id) {
        details.external_ids.add_or_update("musicbrainz", mbid);
    }
}

pub fn artist(ctx: &ClientContext, item: &SubsonicArtist) -> Result<Artist, ConversionError> {
    let mut details = details(
        ctx,
        RawKind::SubsonicArtist,
        item.id.as_deref(),
        item.name.as_deref(),
    )?;
    details.sort_title = non_empty(item.sort_name.as_deref());
    details.artwork.poster = cover_art_url(ctx, item.cover_art.as_deref());
    details.artwork.background = absolute_url(&ctx.base_url, item.artist_image_url.as_deref());
    set_common(
        &mut details,
        item.starred.as_deref(),
        item.user_rating,
        item.average_rating,
        item.music_brainz_id.as_deref(),
    );
    Ok(Artist::new(details))
}

pub fn album(ctx: &ClientContext, item: &SubsonicAlbum) -> Result<Album, ConversionError> {
    let mut details = details(
        ctx,
        RawKind::SubsonicAlbum,
        item.id.as_deref(),
        item.name.as_deref(),
    )?;
    details.sort_title = non_empty(item.sort_name.as_deref());
    details.release_year = item.year.filter(|y| *y > 0);
    details.added_at = parse_datetime(item.created.as_deref());
    details.duration = seconds(item.duration);
    details.genres = non_empty(item.genre.as_deref()).into_iter().collect();
    details.artwork.poster = cover_art_url(ctx, item.cover_art.as_deref());
    set_common(
        &mut details,
        item.starred.as_deref(),
        item.user_rating,
        None,
        item.music_brainz_id.as_deref(),
    );

    let disc_count = item
        .song
        .iter()
        .filter_map(|song| song.disc_number)
        .max()
        .map(|max| max.max(0) as u32)
        .unwrap_or_default();

    Ok(Album {
        details,
        artist_id: None,
        artist_name: non_empty(item.artist.as_deref()),
        track_count: item
            .song_count
            .unwrap_or(item.song.len() as u32),
        disc_count,
        release_type: item.release_types.first().and_then(|t| non_empty(Some(t.as_str()))),
    })
}

pub fn track(ctx: &ClientContext, item: &SubsonicSong) -> Result<Track, ConversionError> {
    let mut details = details(
        ctx,
        RawKind::SubsonicSong,
        item.id.as_deref(),
        item.title.as_deref(),
    )?;
    details.sort_title = non_empty(item.sort_name.as_deref());
    details.release_year = item.year.filter(|y| *y > 0);
    details.added_at = parse_datetime(item.created.as_deref());
    details.duration = seconds(item.duration);
    details.genres = non_empty(item.genre.as_deref()).into_iter().collect();
    details.artwork.poster = cover_art_url(ctx, item.cover_art.as_deref());
    set_common(
        &mut details,
        item.starred.as_deref(),
        item.user_rating,
        item.average_rating,
        item.music_brainz_id.as_deref(),
    );

    Ok(Track {
        details,
        album_id: None,
        artist_id: None,
        album_name: non_empty(item.album.as_deref()),
        artist_name: non_empty(item.artist.as_deref()),
        number: item.track.unwrap_or_default(),
        disc_number: item.disc_number.unwrap_or_default(),
        composer: non_empty(item.composer.as_deref()),
    })
}

/// Inline entries become the playlist's sync-state snapshot for this client.
pub fn playlist(ctx: &ClientContext, item: &SubsonicPlaylist) -> Result<Playlist, ConversionError> {
    let mut details = details(
        ctx,
        RawKind::SubsonicPlaylist,
        item.id.as_deref(),
        item.name.as_deref(),
    )?;
    details.description = non_empty(item.comment.as_deref());
    details.added_at = parse_datetime(item.created.as_deref());
    details.updated_at = parse_datetime(item.changed.as_deref());
    details.duration = seconds(item.duration);
    details.artwork.poster = cover_art_url(ctx, item.cover_art.as_deref());

    let list_id = details
        .external_ids
        .get_id(ctx.client_type.as_str())
        .unwrap_or_default()
        .to_string();
    let changed_at = details
        .updated_at
        .or(details.added_at)
        .unwrap_or_else(Utc::now);

    let mut playlist = Playlist::new(details);
    playlist.is_public = item.public;
    if !item.entry.is_empty() {
        let keys = item
            .entry
            .iter()
            .filter_map(|song| non_empty(song.id.as_deref()));
        playlist
            .sync_states
            .upsert(ListSyncState::from_keys(ctx.client_id, list_id, keys, changed_at));
    }
    Ok(playlist)
}
