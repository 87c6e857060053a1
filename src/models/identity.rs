//! Identity ledgers: which external namespaces and which backend instances know
//! an item, and under what key.
//!
//! Both containers are append-or-update only. Once a correspondence has been
//! learned it stays until the whole item is deleted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::identifiers::ClientId;

/// Kind of media server a client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientType {
    Plex,
    Jellyfin,
    Emby,
    Subsonic,
}

impl ClientType {
    pub const ALL: [ClientType; 4] = [
        ClientType::Plex,
        ClientType::Jellyfin,
        ClientType::Emby,
        ClientType::Subsonic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClientType::Plex => "plex",
            ClientType::Jellyfin => "jellyfin",
            ClientType::Emby => "emby",
            ClientType::Subsonic => "subsonic",
        }
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plex" => Ok(ClientType::Plex),
            "jellyfin" => Ok(ClientType::Jellyfin),
            "emby" => Ok(ClientType::Emby),
            "subsonic" => Ok(ClientType::Subsonic),
            other => Err(format!("unknown client type: {}", other)),
        }
    }
}

/// "In namespace `source`, this entity is identified by `id`."
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalId {
    pub source: String,
    pub id: String,
}

impl ExternalId {
    pub fn new(source: impl AsRef<str>, id: impl Into<String>) -> Self {
        Self {
            source: normalize_source(source.as_ref()),
            id: id.into(),
        }
    }
}

fn normalize_source(source: &str) -> String {
    source.trim().to_ascii_lowercase()
}

/// At most one id per source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalIds(Vec<ExternalId>);

impl ExternalIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id known for `source`, if any. Source names are case-insensitive.
    pub fn get_id(&self, source: &str) -> Option<&str> {
        let source = normalize_source(source);
        self.0
            .iter()
            .find(|ext| ext.source == source)
            .map(|ext| ext.id.as_str())
    }

    /// Insert the mapping, or replace the id already stored for `source`.
    pub fn add_or_update(&mut self, source: &str, id: impl Into<String>) {
        let source = normalize_source(source);
        let id = id.into();
        match self.0.iter_mut().find(|ext| ext.source == source) {
            Some(existing) => existing.id = id,
            None => self.0.push(ExternalId { source, id }),
        }
    }

    /// Upsert every non-empty entry of `other`.
    pub fn merge(&mut self, other: &ExternalIds) {
        for ext in other.iter().filter(|ext| !ext.id.is_empty()) {
            self.add_or_update(&ext.source, ext.id.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExternalId> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ExternalId> for ExternalIds {
    fn from_iter<I: IntoIterator<Item = ExternalId>>(iter: I) -> Self {
        let mut ids = ExternalIds::new();
        for ext in iter {
            ids.add_or_update(&ext.source, ext.id);
        }
        ids
    }
}

/// "On backend instance `client_id` (of kind `client_type`), this entity's key is `item_id`."
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyncClient {
    pub client_id: ClientId,
    pub client_type: ClientType,
    pub item_id: String,
}

/// Per-item map of backend correspondences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncClients(Vec<SyncClient>);

impl SyncClients {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key of this item on `client_id`, if the client knows it.
    pub fn get_client_item_id(&self, client_id: ClientId) -> Option<&str> {
        self.0
            .iter()
            .find(|c| c.client_id == client_id)
            .map(|c| c.item_id.as_str())
    }

    /// Like [`get_client_item_id`](Self::get_client_item_id) but also requires
    /// the client kind to match.
    pub fn get(&self, client_id: ClientId, client_type: ClientType) -> Option<&SyncClient> {
        self.0
            .iter()
            .find(|c| c.client_id == client_id && c.client_type == client_type)
    }

    /// True when some client known to both sides maps them to different keys.
    pub fn conflicts_with(&self, other: &SyncClients) -> bool {
        other.iter().any(|theirs| {
            self.get(theirs.client_id, theirs.client_type)
                .is_some_and(|ours| ours.item_id != theirs.item_id)
        })
    }

    /// Upsert keyed by `client_id` alone.
    pub fn add_client(
        &mut self,
        client_id: ClientId,
        client_type: ClientType,
        item_id: impl Into<String>,
    ) {
        let item_id = item_id.into();
        match self.0.iter_mut().find(|c| c.client_id == client_id) {
            Some(existing) => {
                existing.client_type = client_type;
                existing.item_id = item_id;
            }
            None => self.0.push(SyncClient {
                client_id,
                client_type,
                item_id,
            }),
        }
    }

    /// Upsert keyed by the `(client_id, client_type)` pair. Two clients of
    /// different kinds may share a numeric id in a multi-tenant store.
    pub fn upsert(
        &mut self,
        client_id: ClientId,
        client_type: ClientType,
        item_id: impl Into<String>,
    ) {
        let item_id = item_id.into();
        match self
            .0
            .iter_mut()
            .find(|c| c.client_id == client_id && c.client_type == client_type)
        {
            Some(existing) => existing.item_id = item_id,
            None => self.0.push(SyncClient {
                client_id,
                client_type,
                item_id,
            }),
        }
    }

    pub fn merge(&mut self, other: &SyncClients) {
        for client in other.iter().filter(|c| !c.item_id.is_empty()) {
            self.upsert(client.client_id, client.client_type, client.item_id.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SyncClient> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_id_upsert_is_idempotent() {
        let mut ids = ExternalIds::new();
        ids.add_or_update("tmdb", "603");
        ids.add_or_update("tmdb", "603");
        assert_eq!(ids.len(), 1);
        assert_eq!(ids.get_id("tmdb"), Some("603"));

        ids.add_or_update("tmdb", "604");
        assert_eq!(ids.len(), 1);
        assert_eq!(ids.get_id("tmdb"), Some("604"));
    }

    #[test]
    fn test_external_id_sources_are_case_insensitive() {
        let mut ids = ExternalIds::new();
        ids.add_or_update("Tmdb", "603");
        ids.add_or_update("TMDB", "605");
        assert_eq!(ids.len(), 1);
        assert_eq!(ids.get_id("tmdb"), Some("605"));
    }

    #[test]
    fn test_missing_external_id_is_none() {
        let ids = ExternalIds::new();
        assert_eq!(ids.get_id("imdb"), None);
    }

    #[test]
    fn test_external_ids_merge_skips_empty_values() {
        let mut ids: ExternalIds = vec![ExternalId::new("imdb", "tt0133093")].into_iter().collect();
        let other: ExternalIds = vec![ExternalId::new("imdb", ""), ExternalId::new("tmdb", "603")]
            .into_iter()
            .collect();

        ids.merge(&other);
        assert_eq!(ids.get_id("imdb"), Some("tt0133093"));
        assert_eq!(ids.get_id("tmdb"), Some("603"));
    }

    #[test]
    fn test_add_client_is_visible_to_caller() {
        let mut clients = SyncClients::new();
        clients.add_client(ClientId::new(1), ClientType::Plex, "100");
        assert_eq!(clients.get_client_item_id(ClientId::new(1)), Some("100"));

        clients.add_client(ClientId::new(1), ClientType::Plex, "101");
        assert_eq!(clients.len(), 1);
        assert_eq!(clients.get_client_item_id(ClientId::new(1)), Some("101"));
        assert_eq!(clients.get_client_item_id(ClientId::new(2)), None);
    }

    #[test]
    fn test_upsert_distinguishes_client_types() {
        let mut clients = SyncClients::new();
        clients.upsert(ClientId::new(3), ClientType::Plex, "a");
        clients.upsert(ClientId::new(3), ClientType::Jellyfin, "b");
        clients.upsert(ClientId::new(3), ClientType::Plex, "c");

        assert_eq!(clients.len(), 2);
        assert_eq!(clients.get(ClientId::new(3), ClientType::Plex).unwrap().item_id, "c");
        assert_eq!(clients.get(ClientId::new(3), ClientType::Jellyfin).unwrap().item_id, "b");
    }

    #[test]
    fn test_conflicting_keys_for_same_client() {
        let mut stored = SyncClients::new();
        stored.upsert(ClientId::new(1), ClientType::Plex, "100");

        let mut same_key = SyncClients::new();
        same_key.upsert(ClientId::new(1), ClientType::Plex, "100");
        let mut other_key = SyncClients::new();
        other_key.upsert(ClientId::new(1), ClientType::Plex, "200");
        let mut other_client = SyncClients::new();
        other_client.upsert(ClientId::new(2), ClientType::Jellyfin, "abc");

        assert!(!stored.conflicts_with(&same_key));
        assert!(stored.conflicts_with(&other_key));
        assert!(!stored.conflicts_with(&other_client));
        assert!(!stored.conflicts_with(&SyncClients::new()));
    }

    #[test]
    fn test_client_type_round_trip() {
        for client_type in ClientType::ALL {
            assert_eq!(client_type.as_str().parse::<ClientType>().unwrap(), client_type);
        }
        assert!("kodi".parse::<ClientType>().is_err());
        assert_eq!(serde_json::to_string(&ClientType::Emby).unwrap(), "\"emby\"");
    }
}
