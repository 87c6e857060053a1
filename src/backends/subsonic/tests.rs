use super::*;
use crate::backends::ClientContext;
use crate::models::{ClientId, MediaContent, MediaType};
use crate::utils::errors::ConversionError;
use serde_json::json;
use url::Url;

fn ctx() -> ClientContext {
    ClientContext::new(
        ClientId::new(4),
        ClientType::Subsonic,
        Url::parse("https://music.example.com").unwrap(),
    )
}

#[test]
fn test_artist() {
    let registry = ConverterRegistry::with_defaults();
    let raw: SubsonicArtist = serde_json::from_value(json!({
        "id": "ar-1", "name": "Portishead", "coverArt": "ar-1", "albumCount": 3,
        "starred": "2023-01-02T03:04:05Z", "musicBrainzId": "8f6bd1e4-fbe1-4f50-aa9b-94c450ec0f11"
    }))
    .unwrap();

    let MediaContent::Artist(artist) =
        registry.convert(&ctx(), &raw.into(), MediaType::Artist).unwrap()
    else {
        panic!("expected an artist");
    };
    assert_eq!(artist.details.title, "Portishead");
    assert!(artist.details.is_favorite);
    assert_eq!(artist.details.external_ids.get_id("subsonic"), Some("ar-1"));
    assert_eq!(
        artist.details.external_ids.get_id("musicbrainz"),
        Some("8f6bd1e4-fbe1-4f50-aa9b-94c450ec0f11")
    );
    assert_eq!(
        artist.details.artwork.poster.as_deref(),
        Some("https://music.example.com/rest/getCoverArt?id=ar-1")
    );
    assert_eq!(artist.album_count(), 0);
}

#[test]
fn test_album_with_songs() {
    let registry = ConverterRegistry::with_defaults();
    let raw: SubsonicAlbum = serde_json::from_value(json!({
        "id": 200, "name": "Dummy", "artist": "Portishead", "artistId": 1,
        "year": 1994, "genre": "Trip-Hop", "duration": 2940,
        "song": [
            {"id": 201, "title": "Mysterons", "discNumber": 1},
            {"id": 202, "title": "Sour Times", "discNumber": 1}
        ]
    }))
    .unwrap();

    let MediaContent::Album(album) =
        registry.convert(&ctx(), &raw.into(), MediaType::Album).unwrap()
    else {
        panic!("expected an album");
    };
    assert_eq!(album.details.external_ids.get_id("subsonic"), Some("200"));
    assert_eq!(album.artist_name.as_deref(), Some("Portishead"));
    assert_eq!(album.track_count, 2);
    assert_eq!(album.disc_count, 1);
    assert_eq!(album.details.genres, vec!["Trip-Hop"]);
    assert_eq!(album.details.duration, Some(2940));
}

#[test]
fn test_song() {
    let registry = ConverterRegistry::with_defaults();
    let raw: SubsonicSong = serde_json::from_value(json!({
        "id": "so-5", "title": "Roads", "album": "Dummy", "artist": "Portishead",
        "track": 5, "discNumber": 1, "duration": 305, "averageRating": 4.5, "type": "music"
    }))
    .unwrap();

    let MediaContent::Track(track) =
        registry.convert(&ctx(), &raw.into(), MediaType::Track).unwrap()
    else {
        panic!("expected a track");
    };
    assert_eq!(track.number, 5);
    assert_eq!(track.details.duration, Some(305));
    assert_eq!(track.details.rating_from("subsonic"), Some(4.5));
    assert!(!track.details.is_favorite);
}

#[test]
fn test_playlist_entries_become_sync_state() {
    let registry = ConverterRegistry::with_defaults();
    let raw: SubsonicPlaylist = serde_json::from_value(json!({
        "id": "pl-9", "name": "Late Night", "public": true,
        "changed": "2024-05-06T07:08:09Z",
        "entry": [{"id": "so-5"}, {"id": "so-7"}, {"title": "no id"}]
    }))
    .unwrap();

    let MediaContent::Playlist(playlist) =
        registry.convert(&ctx(), &raw.into(), MediaType::Playlist).unwrap()
    else {
        panic!("expected a playlist");
    };
    assert!(playlist.is_public);
    assert!(playlist.is_empty());

    let state = playlist
        .sync_states
        .find_by_client_list_id(ClientId::new(4), "pl-9")
        .expect("snapshot");
    assert_eq!(state.item_keys().collect::<Vec<_>>(), vec!["so-5", "so-7"]);
    assert!(state.validate_item_ordering().is_ok());
    assert_eq!(state.last_synced, playlist.details.updated_at);
}

#[test]
fn test_wrong_raw_shape() {
    let registry = ConverterRegistry::with_defaults();
    let raw = RawItem::SubsonicSong(SubsonicSong {
        id: Some("1".into()),
        ..Default::default()
    });
    let err = registry
        .convert(&ctx(), &raw, MediaType::Album)
        .unwrap_err();
    assert_eq!(
        err,
        ConversionError::NoConverter {
            client_type: ClientType::Subsonic,
            raw_kind: RawKind::SubsonicSong,
            target: MediaType::Album,
        }
    );
}

#[test]
fn test_missing_id() {
    let registry = ConverterRegistry::with_defaults();
    let raw = RawItem::SubsonicArtist(SubsonicArtist {
        name: Some("Anonymous".into()),
        ..Default::default()
    });
    let err = registry
        .convert(&ctx(), &raw, MediaType::Artist)
        .unwrap_err();
    assert_eq!(err.to_string(), "subsonic artist is missing required field `id`");
}

#[test]
fn test_response_envelope() {
    let body = json!({
        "subsonic-response": {
            "status": "ok", "version": "1.16.1",
            "artists": {"index": [
                {"name": "P", "artist": [{"id": "1", "name": "Portishead"}]},
                {"name": "M", "artist": [{"id": "2", "name": "Massive Attack"}]}
            ]}
        }
    })
    .to_string();
    let response = SubsonicResponse::from_body(&body).unwrap();
    assert!(response.is_ok());
    let artists = response.artists.unwrap().into_artists();
    assert_eq!(artists.len(), 2);
    assert_eq!(artists[1].name.as_deref(), Some("Massive Attack"));

    let failed = json!({
        "subsonic-response": {
            "status": "failed",
            "error": {"code": 40, "message": "Wrong username or password"}
        }
    })
    .to_string();
    let response = SubsonicResponse::from_body(&failed).unwrap();
    assert!(!response.is_ok());
    assert_eq!(response.error.unwrap().code, 40);
}
