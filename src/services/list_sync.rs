//! Playlists and collections across backends.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::backends::{ListOperation, MediaBackend};
use crate::db::repository::MediaRepository;
use crate::models::{
    ClientId, ItemContainer, ItemList, ListItem, ListSyncState, MediaItem, MediaItemId, MediaType,
    SyncMergeSummary,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotReport {
    pub merge: SyncMergeSummary,
    /// Members added to the list because a stored item maps to a snapshot key.
    pub appended: usize,
    /// Snapshot keys with no stored item on that client.
    pub unresolved: Vec<String>,
}

fn container_mut(item: &mut MediaItem) -> Option<&mut dyn ItemContainer> {
    match item.media_type() {
        MediaType::Playlist => item.as_playlist_mut().map(|p| p as &mut dyn ItemContainer),
        MediaType::Collection => item.as_collection_mut().map(|c| c as &mut dyn ItemContainer),
        _ => None,
    }
}

pub struct ListSyncService<R: MediaRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: MediaRepository + ?Sized> ListSyncService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    async fn load_list(&self, list_id: MediaItemId) -> Result<MediaItem> {
        let item = self
            .repo
            .find_by_id(list_id)
            .await?
            .with_context(|| format!("List {} not found", list_id))?;
        if !item.media_type().is_list() {
            bail!("Item {} is a {}, not a playlist or collection", list_id, item.media_type());
        }
        Ok(item)
    }

    /// Backend keys of the list's members on `client_id`, in list order.
    /// Members that client does not know are skipped.
    pub async fn client_keys_for(
        &self,
        list: &ItemList,
        client_id: ClientId,
    ) -> Result<Vec<String>> {
        let mut keys = Vec::with_capacity(list.len());
        for member in list.items() {
            let Some(item) = self.repo.find_by_id(member.item_id).await? else {
                debug!(item_id = %member.item_id, "List member no longer stored");
                continue;
            };
            if let Some(key) = item.client_key(client_id) {
                keys.push(key.to_string());
            }
        }
        Ok(keys)
    }

    /// Fold a backend's view of a list into the stored list and add members
    /// that can be resolved to stored items.
    pub async fn apply_snapshot(
        &self,
        list_id: MediaItemId,
        snapshot: ListSyncState,
    ) -> Result<SnapshotReport> {
        let mut stored = self.load_list(list_id).await?;
        let client_id = snapshot.client_id;

        let mut resolved = Vec::new();
        let mut unresolved = Vec::new();
        for key in snapshot.item_keys() {
            match self.repo.find_by_client_item(client_id, key).await? {
                Some(item) => resolved.push(item.id),
                None => unresolved.push(key.to_string()),
            }
        }

        let Some(container) = container_mut(&mut stored) else {
            bail!("Item {} has no list payload", list_id);
        };
        let merge = container.list_sync_states_mut().merge(snapshot);
        let mut appended = 0;
        for item_id in resolved {
            if !container.list().contains(item_id)
                && container.append(ListItem::new(item_id), client_id)
            {
                appended += 1;
            }
        }

        stored.updated_at = Utc::now();
        self.repo.update(stored).await?;

        info!(
            %list_id,
            %client_id,
            appended,
            unresolved = unresolved.len(),
            "Applied list snapshot"
        );
        Ok(SnapshotReport {
            merge,
            appended,
            unresolved,
        })
    }

    /// Create the stored playlist on `backend` and remember the new list's
    /// key. Returns that key.
    pub async fn push_playlist(
        &self,
        backend: &dyn MediaBackend,
        list_id: MediaItemId,
    ) -> Result<String> {
        let ctx = backend.context();
        backend.capabilities().require(ListOperation::CreatePlaylist)?;

        let mut stored = self.load_list(list_id).await?;
        let Some(playlist) = stored.as_playlist() else {
            bail!("Item {} is not a playlist", list_id);
        };
        let keys = self.client_keys_for(playlist, ctx.client_id).await?;

        let list_key = backend
            .create_playlist(stored.title(), &keys)
            .await
            .with_context(|| {
                format!(
                    "Failed to create playlist {} on client {}",
                    list_id, ctx.client_id
                )
            })?;

        let snapshot = ListSyncState::from_keys(ctx.client_id, list_key.clone(), keys, Utc::now());
        if let Some(playlist) = stored.as_playlist_mut() {
            playlist.sync_states.upsert(snapshot);
        }
        stored.updated_at = Utc::now();
        self.repo.update(stored).await?;

        info!(%list_id, client_id = %ctx.client_id, %list_key, "Pushed playlist");
        Ok(list_key)
    }
}
