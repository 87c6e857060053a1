use crate::common::TestContext;
use crate::common::builders::{jellyfin_movie, plex_movie};
use crate::common::mocks::ScriptedBackend;
use reelhub::backends::MediaBackend;
use reelhub::db::repository::{MediaRepository, Repository};
use reelhub::models::{ClientId, ClientType, ListItem, MediaDetails, MediaItem, MediaType, Playlist};
use reelhub::services::{ListSyncService, ReconcileSummary};
use std::sync::Arc;

const PLEX: ClientId = ClientId::new(1);
const JELLYFIN: ClientId = ClientId::new(2);

fn plex_backend() -> ScriptedBackend {
    ScriptedBackend::new(1, ClientType::Plex, "http://plex.lan:32400").with_library(
        MediaType::Movie,
        vec![
            plex_movie("101", "Heat", 1995, &["tmdb://949", "imdb://tt0113277"]),
            plex_movie("102", "Alien", 1979, &["tmdb://348"]),
            plex_movie("103", "Up", 2009, &[]),
        ],
    )
}

fn jellyfin_backend() -> ScriptedBackend {
    ScriptedBackend::new(2, ClientType::Jellyfin, "http://jellyfin.lan:8096").with_library(
        MediaType::Movie,
        vec![
            jellyfin_movie("jf-heat", "Heat", 1995, &[("Tmdb", "949")]),
            jellyfin_movie("jf-arrival", "Arrival", 2016, &[("Tmdb", "329865")]),
        ],
    )
}

async fn sync_movies(ctx: &TestContext, backends: &[Arc<dyn MediaBackend>]) -> ReconcileSummary {
    let mut total = ReconcileSummary::default();
    for (client_id, result) in ctx.fetcher.fetch_from_backends(backends, MediaType::Movie).await {
        let report = result.unwrap_or_else(|e| panic!("client {client_id} failed: {e}"));
        assert!(report.failures.is_empty());
        let summary = ctx.reconciler.reconcile_all(report.items).await.unwrap();
        total.inserted += summary.inserted;
        total.merged += summary.merged;
        total.conflicts += summary.conflicts;
    }
    total
}

fn backends() -> Vec<Arc<dyn MediaBackend>> {
    vec![Arc::new(plex_backend()), Arc::new(jellyfin_backend())]
}

#[tokio::test]
async fn test_movies_from_two_backends_are_reconciled() {
    let ctx = TestContext::new().await;

    let summary = sync_movies(&ctx, &backends()).await;
    assert_eq!(summary.inserted, 4);
    assert_eq!(summary.merged, 1);
    assert_eq!(summary.conflicts, 0);
    assert_eq!(ctx.repo.count().await.unwrap(), 4);

    let from_plex = ctx.repo.find_by_client_item(PLEX, "101").await.unwrap().unwrap();
    let from_jellyfin = ctx.repo.find_by_client_item(JELLYFIN, "jf-heat").await.unwrap().unwrap();
    assert_eq!(from_plex.uuid, from_jellyfin.uuid);
    assert_eq!(from_plex.client_key(JELLYFIN), Some("jf-heat"));
    assert_eq!(from_plex.external_ids.get_id("imdb"), Some("tt0113277"));
    assert_eq!(from_plex.release_year(), Some(1995));

    let by_tmdb = ctx
        .repo
        .find_by_external_id(MediaType::Movie, "TMDB", "329865")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_tmdb.title(), "Arrival");
    assert!(by_tmdb.client_key(PLEX).is_none());

    let titles: Vec<_> = ctx
        .repo
        .find_by_type(MediaType::Movie)
        .await
        .unwrap()
        .iter()
        .map(|item| item.title().to_string())
        .collect();
    assert_eq!(titles, vec!["Alien", "Arrival", "Heat", "Up"]);
}

#[tokio::test]
async fn test_second_sync_only_merges() {
    let ctx = TestContext::new().await;
    sync_movies(&ctx, &backends()).await;
    let before = ctx.repo.find_by_client_item(PLEX, "102").await.unwrap().unwrap();

    let summary = sync_movies(&ctx, &backends()).await;
    assert_eq!(summary.inserted, 0);
    assert_eq!(summary.merged, 5);
    assert_eq!(ctx.repo.count().await.unwrap(), 4);

    let after = ctx.repo.find_by_client_item(PLEX, "102").await.unwrap().unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.uuid, before.uuid);
}

#[tokio::test]
async fn test_stored_playlist_is_pushed_with_mapped_keys() {
    let ctx = TestContext::new().await;
    sync_movies(&ctx, &backends()).await;

    let heat = ctx.repo.find_by_client_item(PLEX, "101").await.unwrap().unwrap();
    let up = ctx.repo.find_by_client_item(PLEX, "103").await.unwrap().unwrap();
    let mut playlist = Playlist::new(MediaDetails::new("Weekend"));
    playlist.add_item(ListItem::new(heat.id), PLEX);
    playlist.add_item(ListItem::new(up.id), PLEX);
    let stored = ctx.repo.insert(MediaItem::new(playlist)).await.unwrap();

    let jellyfin = jellyfin_backend();
    let service = ListSyncService::new(ctx.repo.clone());
    let list_key = service.push_playlist(&jellyfin, stored.id).await.unwrap();
    assert_eq!(list_key, "jellyfin-playlist-1");

    // Up is unknown to Jellyfin and is left out.
    let created = jellyfin.created_playlists.lock().unwrap().clone();
    assert_eq!(created, vec![("Weekend".to_string(), vec!["jf-heat".to_string()])]);

    let reloaded = ctx.repo.find_by_id(stored.id).await.unwrap().unwrap();
    let playlist = reloaded.as_playlist().unwrap();
    assert_eq!(playlist.item_ids(), vec![heat.id, up.id]);
    let state = playlist.sync_states.get_list_sync_state(JELLYFIN).unwrap();
    assert_eq!(state.client_list_id, "jellyfin-playlist-1");
}
