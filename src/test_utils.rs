#![cfg(test)]

use crate::backends::{Capabilities, ClientContext, MediaBackend, RawItem};
use crate::backends::plex::PlexMetadata;
use crate::db::connection::Database;
use crate::db::repository::{MediaRepository, MediaRepositoryImpl, Repository};
use crate::models::{ClientId, ClientType, MediaDetails, MediaItem, MediaItemId, MediaType, Movie};
use crate::utils::errors::BackendError;
use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tempfile::TempDir;
use tokio::sync::RwLock;
use url::Url;
use uuid::Uuid;

/// Migrated SQLite database in a temporary directory
pub struct TestDatabase {
    pub db: Database,
    _temp_dir: TempDir,
}

impl TestDatabase {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let db = Database::connect(&temp_dir.path().join("test.db")).await?;
        db.migrate().await?;
        Ok(Self {
            db,
            _temp_dir: temp_dir,
        })
    }

    pub fn media_repository(&self) -> MediaRepositoryImpl {
        MediaRepositoryImpl::new(self.db.get_connection())
    }
}

/// Plex movie as it comes off the wire.
pub fn plex_movie(rating_key: &str, title: &str) -> RawItem {
    RawItem::Plex(PlexMetadata {
        rating_key: Some(rating_key.to_string()),
        type_: Some("movie".to_string()),
        title: Some(title.to_string()),
        ..Default::default()
    })
}

/// Converted movie known to one client, with optional external ids.
pub fn movie_item(
    client_id: u64,
    client_type: ClientType,
    key: &str,
    title: &str,
    external_ids: &[(&str, &str)],
) -> MediaItem {
    let mut details = MediaDetails::new(title);
    for (source, id) in external_ids {
        details.external_ids.add_or_update(source, *id);
    }
    let mut item = MediaItem::new(Movie {
        details,
        ..Default::default()
    });
    item.set_client_info(ClientId::new(client_id), client_type, key);
    item.adopt_external_ids();
    item
}

/// `MediaRepository` over a vector, for service tests.
#[derive(Debug, Default)]
pub struct InMemoryMediaRepository {
    items: RwLock<Vec<MediaItem>>,
    next_id: Mutex<u64>,
}

impl InMemoryMediaRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository<MediaItem> for InMemoryMediaRepository {
    type Id = MediaItemId;

    async fn find_by_id(&self, id: MediaItemId) -> Result<Option<MediaItem>> {
        Ok(self.items.read().await.iter().find(|i| i.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<MediaItem>> {
        Ok(self.items.read().await.clone())
    }

    async fn insert(&self, mut entity: MediaItem) -> Result<MediaItem> {
        let mut items = self.items.write().await;
        let id = {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            *next_id
        };
        entity.id = MediaItemId::new(id);
        items.push(entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: MediaItem) -> Result<MediaItem> {
        let mut items = self.items.write().await;
        match items.iter_mut().find(|i| i.id == entity.id) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(entity)
            }
            None => bail!("Media item {} not found", entity.id),
        }
    }

    async fn delete(&self, id: MediaItemId) -> Result<()> {
        self.items.write().await.retain(|i| i.id != id);
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.items.read().await.len() as u64)
    }
}

#[async_trait]
impl MediaRepository for InMemoryMediaRepository {
    async fn find_by_uuid(&self, uuid: Uuid) -> Result<Option<MediaItem>> {
        Ok(self.items.read().await.iter().find(|i| i.uuid == uuid).cloned())
    }

    async fn find_by_client_item(
        &self,
        client_id: ClientId,
        client_item_id: &str,
    ) -> Result<Option<MediaItem>> {
        Ok(self
            .items
            .read()
            .await
            .iter()
            .find(|i| i.client_key(client_id) == Some(client_item_id))
            .cloned())
    }

    async fn find_by_external_id(
        &self,
        media_type: MediaType,
        source: &str,
        value: &str,
    ) -> Result<Option<MediaItem>> {
        let source = source.trim().to_ascii_lowercase();
        Ok(self
            .items
            .read()
            .await
            .iter()
            .find(|i| i.media_type() == media_type && i.external_ids.get_id(&source) == Some(value))
            .cloned())
    }

    async fn find_by_type(&self, media_type: MediaType) -> Result<Vec<MediaItem>> {
        let mut found: Vec<_> = self
            .items
            .read()
            .await
            .iter()
            .filter(|i| i.media_type() == media_type)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.title().cmp(b.title()).then(a.id.cmp(&b.id)));
        Ok(found)
    }
}

/// Scripted backend serving raw items from memory.
#[derive(Debug)]
pub struct MockBackend {
    context: ClientContext,
    items: HashMap<MediaType, Vec<RawItem>>,
    fail_at_offset: Option<usize>,
    capabilities: Option<Capabilities>,
    requested_offsets: Mutex<Vec<usize>>,
    created_lists: Mutex<Vec<(String, Vec<String>)>>,
}

impl MockBackend {
    pub fn new(client_id: u64, client_type: ClientType, base_url: &str) -> Self {
        Self {
            context: ClientContext::new(
                ClientId::new(client_id),
                client_type,
                Url::parse(base_url).unwrap(),
            ),
            items: HashMap::new(),
            fail_at_offset: None,
            capabilities: None,
            requested_offsets: Mutex::new(Vec::new()),
            created_lists: Mutex::new(Vec::new()),
        }
    }

    pub fn plex(client_id: u64) -> Self {
        Self::new(client_id, ClientType::Plex, "http://plex.test:32400")
    }

    pub fn jellyfin(client_id: u64) -> Self {
        Self::new(client_id, ClientType::Jellyfin, "http://jellyfin.test:8096")
    }

    pub fn with_items(mut self, media_type: MediaType, items: Vec<RawItem>) -> Self {
        self.items.insert(media_type, items);
        self
    }

    pub fn failing_at_offset(mut self, offset: usize) -> Self {
        self.fail_at_offset = Some(offset);
        self
    }

    pub fn without_playlists(mut self) -> Self {
        let mut capabilities = Capabilities::for_client(self.context.client_type);
        capabilities.playlists = false;
        self.capabilities = Some(capabilities);
        self
    }

    pub fn requested_offsets(&self) -> Vec<usize> {
        self.requested_offsets.lock().unwrap().clone()
    }

    pub fn created_lists(&self) -> Vec<(String, Vec<String>)> {
        self.created_lists.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaBackend for MockBackend {
    fn context(&self) -> &ClientContext {
        &self.context
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
            .unwrap_or_else(|| Capabilities::for_client(self.context.client_type))
    }

    async fn fetch_page(
        &self,
        media_type: MediaType,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<RawItem>, BackendError> {
        self.requested_offsets.lock().unwrap().push(offset);
        if self.fail_at_offset == Some(offset) {
            return Err(BackendError::transport("requesting library page", "connection reset"));
        }
        let items = self.items.get(&media_type).map(Vec::as_slice).unwrap_or_default();
        Ok(items.iter().skip(offset).take(limit).cloned().collect())
    }

    async fn fetch_item(&self, key: &str) -> Result<Option<RawItem>, BackendError> {
        Ok(self
            .items
            .values()
            .flatten()
            .find(|item| item.key() == Some(key))
            .cloned())
    }

    async fn create_playlist(
        &self,
        title: &str,
        item_keys: &[String],
    ) -> Result<String, BackendError> {
        let mut created = self.created_lists.lock().unwrap();
        created.push((title.to_string(), item_keys.to_vec()));
        Ok(format!("list-{}", created.len()))
    }
}
