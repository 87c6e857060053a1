//! Matching converted items against the store.
//!
//! An incoming item is matched first by its client key, then by any shared
//! external id of the same media type. A match is merged and written back;
//! anything else is inserted.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::db::repository::MediaRepository;
use crate::models::{ClientType, MediaItem, MediaItemId};

/// Async mutexes keyed by string, created on first use.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    const PRUNE_THRESHOLD: usize = 1024;

    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: impl Into<String>) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            if locks.len() >= Self::PRUNE_THRESHOLD {
                // Only the map holds these, so nobody is waiting on them.
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            locks.entry(key.into()).or_default().clone()
        };
        lock.lock_owned().await
    }

    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchedBy {
    ClientKey,
    ExternalId { source: String, id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Inserted(MediaItemId),
    Merged { id: MediaItemId, matched_by: MatchedBy },
    /// The match has a different media type; nothing was written.
    TypeConflict { existing: MediaItemId },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub inserted: usize,
    pub merged: usize,
    pub conflicts: usize,
}

impl ReconcileSummary {
    fn record(&mut self, outcome: &ReconcileOutcome) {
        match outcome {
            ReconcileOutcome::Inserted(_) => self.inserted += 1,
            ReconcileOutcome::Merged { .. } => self.merged += 1,
            ReconcileOutcome::TypeConflict { .. } => self.conflicts += 1,
        }
    }
}

/// Backend namespaces hold per-server keys and never identify an entity
/// across servers.
fn is_global_source(source: &str) -> bool {
    !ClientType::ALL.iter().any(|client_type| client_type.as_str() == source)
}

pub struct Reconciler<R: MediaRepository + ?Sized> {
    repo: Arc<R>,
    locks: KeyedLocks,
}

impl<R: MediaRepository + ?Sized> Reconciler<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            locks: KeyedLocks::new(),
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    /// Find the stored counterpart of `incoming`, if any.
    ///
    /// An external-id candidate that the same client already knows under a
    /// different key is a distinct entity and is not returned.
    pub async fn find_match(
        &self,
        incoming: &MediaItem,
    ) -> Result<Option<(MediaItem, MatchedBy)>> {
        for client in incoming.sync_clients.iter() {
            if let Some(found) = self
                .repo
                .find_by_client_item(client.client_id, &client.item_id)
                .await?
            {
                return Ok(Some((found, MatchedBy::ClientKey)));
            }
        }

        for external in incoming.external_ids.iter() {
            if !is_global_source(&external.source) {
                continue;
            }
            if let Some(found) = self
                .repo
                .find_by_external_id(incoming.media_type(), &external.source, &external.id)
                .await?
            {
                if found.sync_clients.conflicts_with(&incoming.sync_clients) {
                    debug!(
                        existing = %found.id,
                        source = %external.source,
                        "External id shared by two keys of one client; not merging"
                    );
                    continue;
                }
                let matched_by = MatchedBy::ExternalId {
                    source: external.source.clone(),
                    id: external.id.clone(),
                };
                return Ok(Some((found, matched_by)));
            }
        }

        Ok(None)
    }

    pub async fn reconcile(&self, incoming: MediaItem) -> Result<ReconcileOutcome> {
        // Serialize work on the same backend key so two observations of one
        // entity cannot both miss and insert.
        let primary_key = match incoming.sync_clients.iter().next() {
            Some(client) => format!("client:{}:{}", client.client_id, client.item_id),
            None => format!("item:{}", incoming.uuid),
        };
        let _client_guard = self.locks.lock(primary_key).await;

        let Some((found, matched_by)) = self.find_match(&incoming).await? else {
            let stored = self.repo.insert(incoming).await?;
            debug!(id = %stored.id, title = %stored.title(), "Inserted new media item");
            return Ok(ReconcileOutcome::Inserted(stored.id));
        };

        let _item_guard = self.locks.lock(format!("item:{}", found.uuid)).await;
        // Re-read under the item lock so a concurrent merge is not lost.
        let mut stored = self.repo.find_by_id(found.id).await?.unwrap_or(found);

        if !stored.merge(&incoming) {
            warn!(
                existing = %stored.id,
                existing_type = %stored.media_type(),
                incoming_type = %incoming.media_type(),
                "Matched item has a different media type; leaving it untouched"
            );
            return Ok(ReconcileOutcome::TypeConflict { existing: stored.id });
        }

        let stored = self.repo.update(stored).await?;
        debug!(id = %stored.id, ?matched_by, "Merged into existing media item");
        Ok(ReconcileOutcome::Merged {
            id: stored.id,
            matched_by,
        })
    }

    pub async fn reconcile_all(&self, items: Vec<MediaItem>) -> Result<ReconcileSummary> {
        let mut summary = ReconcileSummary::default();
        for item in items {
            let outcome = self.reconcile(item).await?;
            summary.record(&outcome);
        }
        info!(
            inserted = summary.inserted,
            merged = summary.merged,
            conflicts = summary.conflicts,
            "Reconciliation finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::Repository;
    use crate::models::{ClientId, MediaType};
    use crate::test_utils::{InMemoryMediaRepository, movie_item};

    fn reconciler() -> Reconciler<InMemoryMediaRepository> {
        Reconciler::new(Arc::new(InMemoryMediaRepository::new()))
    }

    #[tokio::test]
    async fn test_insert_then_merge_by_client_key() {
        let reconciler = reconciler();

        let first = movie_item(1, ClientType::Plex, "5521", "Heat", &[]);
        let ReconcileOutcome::Inserted(id) = reconciler.reconcile(first).await.unwrap() else {
            panic!("expected an insert");
        };

        let mut again = movie_item(1, ClientType::Plex, "5521", "Heat", &[("imdb", "tt0113277")]);
        again.update_details(|d| d.description = Some("A heist.".into()));
        let outcome = reconciler.reconcile(again).await.unwrap();
        assert_eq!(
            outcome,
            ReconcileOutcome::Merged {
                id,
                matched_by: MatchedBy::ClientKey
            }
        );

        let stored = reconciler.repository().find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.details().description.as_deref(), Some("A heist."));
        assert_eq!(stored.external_ids.get_id("imdb"), Some("tt0113277"));
        assert_eq!(reconciler.repository().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cross_backend_match_by_external_id() {
        let reconciler = reconciler();

        let plex = movie_item(1, ClientType::Plex, "5521", "Heat", &[("tmdb", "949")]);
        let ReconcileOutcome::Inserted(id) = reconciler.reconcile(plex).await.unwrap() else {
            panic!("expected an insert");
        };

        let jellyfin = movie_item(2, ClientType::Jellyfin, "abc", "Heat", &[("tmdb", "949")]);
        let outcome = reconciler.reconcile(jellyfin).await.unwrap();
        assert_eq!(
            outcome,
            ReconcileOutcome::Merged {
                id,
                matched_by: MatchedBy::ExternalId {
                    source: "tmdb".into(),
                    id: "949".into()
                }
            }
        );

        let stored = reconciler.repository().find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.client_key(ClientId::new(1)), Some("5521"));
        assert_eq!(stored.client_key(ClientId::new(2)), Some("abc"));
    }

    #[tokio::test]
    async fn test_backend_namespaces_do_not_match_across_servers() {
        let reconciler = reconciler();

        reconciler
            .reconcile(movie_item(1, ClientType::Plex, "100", "Heat", &[]))
            .await
            .unwrap();
        // Same ratingKey on a different Plex server is a different entity.
        let outcome = reconciler
            .reconcile(movie_item(5, ClientType::Plex, "100", "Alien", &[]))
            .await
            .unwrap();
        assert!(matches!(outcome, ReconcileOutcome::Inserted(_)));
        assert_eq!(reconciler.repository().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_shared_external_id_on_one_server_keeps_both_keys() {
        let reconciler = reconciler();
        let repo = reconciler.repository().clone();
        let plex = ClientId::new(1);

        // Same film in two libraries of one Plex server.
        let first = reconciler
            .reconcile(movie_item(1, ClientType::Plex, "100", "Heat", &[("tmdb", "949")]))
            .await
            .unwrap();
        let second = reconciler
            .reconcile(movie_item(1, ClientType::Plex, "200", "Heat (4K)", &[("tmdb", "949")]))
            .await
            .unwrap();
        assert!(matches!(first, ReconcileOutcome::Inserted(_)));
        assert!(matches!(second, ReconcileOutcome::Inserted(_)));
        assert_eq!(repo.count().await.unwrap(), 2);

        // A resync of either key lands on its own item.
        let again = reconciler
            .reconcile(movie_item(1, ClientType::Plex, "100", "Heat", &[("tmdb", "949")]))
            .await
            .unwrap();
        assert!(matches!(
            again,
            ReconcileOutcome::Merged {
                matched_by: MatchedBy::ClientKey,
                ..
            }
        ));
        let by_100 = repo.find_by_client_item(plex, "100").await.unwrap().unwrap();
        let by_200 = repo.find_by_client_item(plex, "200").await.unwrap().unwrap();
        assert_ne!(by_100.id, by_200.id);
        assert_eq!(by_100.client_key(plex), Some("100"));
        assert_eq!(by_200.client_key(plex), Some("200"));
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_same_external_id_other_type_is_not_a_match() {
        let reconciler = reconciler();
        reconciler
            .reconcile(movie_item(1, ClientType::Plex, "1", "Movie 603", &[("tmdb", "603")]))
            .await
            .unwrap();

        let repo = reconciler.repository();
        assert!(repo
            .find_by_external_id(MediaType::Series, "tmdb", "603")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_concurrent_observations_insert_once() {
        let reconciler = Arc::new(reconciler());

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let reconciler = reconciler.clone();
                tokio::spawn(async move {
                    reconciler
                        .reconcile(movie_item(1, ClientType::Plex, "42", "Heat", &[]))
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut inserted = 0;
        for task in tasks {
            if matches!(task.await.unwrap(), ReconcileOutcome::Inserted(_)) {
                inserted += 1;
            }
        }
        assert_eq!(inserted, 1);
        assert_eq!(reconciler.repository().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reconcile_all_summary() {
        let reconciler = reconciler();
        let summary = reconciler
            .reconcile_all(vec![
                movie_item(1, ClientType::Plex, "1", "Heat", &[("tmdb", "949")]),
                movie_item(1, ClientType::Plex, "2", "Alien", &[]),
                movie_item(2, ClientType::Emby, "e1", "Heat", &[("tmdb", "949")]),
            ])
            .await
            .unwrap();
        assert_eq!(
            summary,
            ReconcileSummary {
                inserted: 2,
                merged: 1,
                conflicts: 0
            }
        );
    }

    #[tokio::test]
    async fn test_keyed_locks_reuse_entries() {
        let locks = KeyedLocks::new();
        {
            let _a = locks.lock("a").await;
            let _b = locks.lock("b").await;
        }
        let _a = locks.lock("a").await;
        assert_eq!(locks.len().await, 2);
    }
}
