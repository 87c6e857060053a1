use async_trait::async_trait;
use reelhub::backends::{ClientContext, MediaBackend, RawItem};
use reelhub::models::{ClientId, ClientType, MediaType};
use reelhub::utils::BackendError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

/// Backend that serves a fixed library and records list writes.
#[derive(Debug)]
pub struct ScriptedBackend {
    context: ClientContext,
    library: HashMap<MediaType, Vec<RawItem>>,
    pub created_playlists: Arc<Mutex<Vec<(String, Vec<String>)>>>,
}

impl ScriptedBackend {
    pub fn new(client_id: u64, client_type: ClientType, base_url: &str) -> Self {
        Self {
            context: ClientContext::new(
                ClientId::new(client_id),
                client_type,
                Url::parse(base_url).expect("valid test url"),
            ),
            library: HashMap::new(),
            created_playlists: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_library(mut self, media_type: MediaType, items: Vec<RawItem>) -> Self {
        self.library.insert(media_type, items);
        self
    }
}

#[async_trait]
impl MediaBackend for ScriptedBackend {
    fn context(&self) -> &ClientContext {
        &self.context
    }

    async fn fetch_page(
        &self,
        media_type: MediaType,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<RawItem>, BackendError> {
        Ok(self
            .library
            .get(&media_type)
            .map(|items| items.iter().skip(offset).take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn fetch_item(&self, key: &str) -> Result<Option<RawItem>, BackendError> {
        Ok(self
            .library
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
        let mut created = self.created_playlists.lock().unwrap();
        created.push((title.to_string(), item_keys.to_vec()));
        Ok(format!("{}-playlist-{}", self.context.client_type, created.len()))
    }
}
