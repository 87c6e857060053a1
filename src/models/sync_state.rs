//! Per-backend snapshots of a list's ordering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::identifiers::ClientId;
use super::list::{resequence, validate_positions, ChangeRecord, ChangeType, Positioned};
use crate::utils::errors::ListError;

/// A list entry keyed by the backend's own item key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncListItem {
    pub item_id: String,
    pub position: usize,
    pub last_changed: DateTime<Utc>,
    #[serde(default)]
    pub history: Vec<ChangeRecord>,
}

impl SyncListItem {
    pub fn new(item_id: impl Into<String>, position: usize, last_changed: DateTime<Utc>) -> Self {
        Self {
            item_id: item_id.into(),
            position,
            last_changed,
            history: Vec::new(),
        }
    }
}

impl Positioned for SyncListItem {
    fn position(&self) -> usize {
        self.position
    }

    fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}

/// Outcome of folding a snapshot into a stored one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncMergeSummary {
    pub added: usize,
    pub replaced: usize,
    pub kept: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSyncState {
    pub client_id: ClientId,
    pub client_list_id: String,
    #[serde(default)]
    pub items: Vec<SyncListItem>,
    #[serde(default)]
    pub last_synced: Option<DateTime<Utc>>,
}

impl ListSyncState {
    pub fn new(client_id: ClientId, client_list_id: impl Into<String>) -> Self {
        Self {
            client_id,
            client_list_id: client_list_id.into(),
            items: Vec::new(),
            last_synced: None,
        }
    }

    /// Snapshot built from backend keys in list order, all stamped with `changed_at`.
    pub fn from_keys<I, S>(
        client_id: ClientId,
        client_list_id: impl Into<String>,
        keys: I,
        changed_at: DateTime<Utc>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = keys
            .into_iter()
            .enumerate()
            .map(|(position, key)| SyncListItem::new(key, position, changed_at))
            .collect();
        Self {
            client_id,
            client_list_id: client_list_id.into(),
            items,
            last_synced: Some(changed_at),
        }
    }

    pub fn item_keys(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.item_id.as_str())
    }

    pub fn validate_item_ordering(&self) -> Result<(), ListError> {
        validate_positions(&self.items)
    }

    /// Fold `incoming` into this snapshot.
    ///
    /// An incoming entry replaces a stored entry with the same key only when its
    /// `last_changed` is strictly later; on a tie the stored entry stays as it is.
    /// Unknown keys are appended. Every applied entry gets a `sync` record, and
    /// positions are re-sequenced afterwards.
    pub fn merge_items_into_sync_state(&mut self, incoming: Vec<SyncListItem>) -> SyncMergeSummary {
        let mut summary = SyncMergeSummary::default();
        let now = Utc::now();

        for mut item in incoming {
            match self.items.iter().position(|e| e.item_id == item.item_id) {
                Some(index) => {
                    let existing = &mut self.items[index];
                    if item.last_changed > existing.last_changed {
                        let position = existing.position;
                        // Keep the audit trail of the stored entry.
                        let mut history = std::mem::take(&mut existing.history);
                        history.append(&mut item.history);
                        item.history = history;
                        item.position = position;
                        self.push_sync_record(&mut item, now);
                        self.items[index] = item;
                        summary.replaced += 1;
                    } else {
                        summary.kept += 1;
                    }
                }
                None => {
                    item.position = self.items.len();
                    self.push_sync_record(&mut item, now);
                    self.items.push(item);
                    summary.added += 1;
                }
            }
        }

        resequence(&mut self.items);
        self.last_synced = Some(now);
        debug!(
            client_id = %self.client_id,
            list = %self.client_list_id,
            added = summary.added,
            replaced = summary.replaced,
            kept = summary.kept,
            "Merged list snapshot"
        );
        summary
    }

    fn push_sync_record(&self, item: &mut SyncListItem, at: DateTime<Utc>) {
        item.history.push(ChangeRecord {
            client_id: self.client_id,
            item_id: item.item_id.clone(),
            change_type: ChangeType::Sync,
            timestamp: at,
        });
    }
}

/// All backend snapshots known for one list. At most one per `(client_id, client_list_id)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListSyncStates(Vec<ListSyncState>);

impl ListSyncStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// First snapshot taken from `client_id`.
    pub fn get_list_sync_state(&self, client_id: ClientId) -> Option<&ListSyncState> {
        self.0.iter().find(|s| s.client_id == client_id)
    }

    pub fn find_by_client_list_id(
        &self,
        client_id: ClientId,
        client_list_id: &str,
    ) -> Option<&ListSyncState> {
        self.0
            .iter()
            .find(|s| s.client_id == client_id && s.client_list_id == client_list_id)
    }

    fn find_mut(
        &mut self,
        client_id: ClientId,
        client_list_id: &str,
    ) -> Option<&mut ListSyncState> {
        self.0
            .iter_mut()
            .find(|s| s.client_id == client_id && s.client_list_id == client_list_id)
    }

    /// Replace the snapshot for the same client list, or add it.
    pub fn upsert(&mut self, state: ListSyncState) {
        match self.find_mut(state.client_id, &state.client_list_id) {
            Some(existing) => *existing = state,
            None => self.0.push(state),
        }
    }

    /// Merge `state` into the stored snapshot for the same client list, creating it if needed.
    pub fn merge(&mut self, state: ListSyncState) -> SyncMergeSummary {
        match self.find_mut(state.client_id, &state.client_list_id) {
            Some(existing) => existing.merge_items_into_sync_state(state.items),
            None => {
                let mut fresh = ListSyncState::new(state.client_id, state.client_list_id);
                let summary = fresh.merge_items_into_sync_state(state.items);
                self.0.push(fresh);
                summary
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ListSyncState> {
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
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn state(keys: &[&str], changed: DateTime<Utc>) -> ListSyncState {
        ListSyncState::from_keys(ClientId::new(1), "pl-1", keys.iter().copied(), changed)
    }

    #[test]
    fn test_from_keys_is_well_ordered() {
        let snapshot = state(&["a", "b", "c"], at(0));
        assert!(snapshot.validate_item_ordering().is_ok());
        assert_eq!(snapshot.item_keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_validate_detects_gap() {
        let mut snapshot = state(&["a", "b"], at(0));
        snapshot.items[1].position = 3;
        assert_eq!(
            snapshot.validate_item_ordering(),
            Err(ListError::PositionMismatch { index: 1, position: 3 })
        );
    }

    #[test]
    fn test_older_incoming_keeps_existing() {
        let mut snapshot = state(&["a"], at(100));
        let before = snapshot.items[0].clone();

        let summary = snapshot.merge_items_into_sync_state(vec![SyncListItem::new("a", 0, at(50))]);

        assert_eq!(summary.kept, 1);
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0], before);
    }

    #[test]
    fn test_equal_timestamp_keeps_existing() {
        let mut snapshot = state(&["a"], at(100));
        let before = snapshot.items[0].clone();

        let mut incoming = SyncListItem::new("a", 0, at(100));
        incoming.history.push(ChangeRecord {
            client_id: ClientId::new(9),
            item_id: "a".into(),
            change_type: ChangeType::Update,
            timestamp: at(100),
        });
        let summary = snapshot.merge_items_into_sync_state(vec![incoming]);

        assert_eq!(summary, SyncMergeSummary { added: 0, replaced: 0, kept: 1 });
        assert_eq!(snapshot.items[0], before);
    }

    #[test]
    fn test_newer_incoming_replaces_and_records_sync() {
        let mut snapshot = state(&["a", "b"], at(0));
        let newer = at(0) + Duration::seconds(30);

        let summary = snapshot.merge_items_into_sync_state(vec![SyncListItem::new("b", 7, newer)]);

        assert_eq!(summary.replaced, 1);
        let b = &snapshot.items[1];
        assert_eq!(b.last_changed, newer);
        assert_eq!(b.position, 1);
        assert_eq!(b.history.last().unwrap().change_type, ChangeType::Sync);
        assert!(snapshot.validate_item_ordering().is_ok());
    }

    #[test]
    fn test_unknown_keys_are_appended() {
        let mut snapshot = state(&["a"], at(0));
        let summary = snapshot.merge_items_into_sync_state(vec![
            SyncListItem::new("c", 0, at(1)),
            SyncListItem::new("d", 0, at(1)),
        ]);

        assert_eq!(summary.added, 2);
        assert_eq!(snapshot.item_keys().collect::<Vec<_>>(), vec!["a", "c", "d"]);
        assert!(snapshot.validate_item_ordering().is_ok());
        assert!(snapshot.items[2].history.iter().any(|r| r.change_type == ChangeType::Sync));
        assert!(snapshot.last_synced.is_some());
    }

    #[test]
    fn test_states_lookup_and_upsert() {
        let mut states = ListSyncStates::new();
        states.upsert(state(&["a"], at(0)));
        states.upsert(ListSyncState::new(ClientId::new(2), "other"));
        states.upsert(state(&["x", "y"], at(0)));

        assert_eq!(states.len(), 2);
        let found = states.find_by_client_list_id(ClientId::new(1), "pl-1").unwrap();
        assert_eq!(found.items.len(), 2);
        assert!(states.find_by_client_list_id(ClientId::new(1), "missing").is_none());
        assert_eq!(
            states.get_list_sync_state(ClientId::new(2)).unwrap().client_list_id,
            "other"
        );
        assert!(states.get_list_sync_state(ClientId::new(3)).is_none());
    }

    #[test]
    fn test_states_merge_creates_then_merges() {
        let mut states = ListSyncStates::new();
        let first = states.merge(state(&["a", "b"], at(0)));
        assert_eq!(first.added, 2);

        let second = states.merge(state(&["b", "c"], at(10)));
        assert_eq!(second, SyncMergeSummary { added: 1, replaced: 1, kept: 0 });

        let merged = states.find_by_client_list_id(ClientId::new(1), "pl-1").unwrap();
        assert_eq!(merged.item_keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }
}
