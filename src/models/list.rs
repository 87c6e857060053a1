//! Ordered item containers.
//!
//! [`Playlist`] keeps user order and allows the same item more than once.
//! [`Collection`] is a set: adding an item that is already present does nothing.
//! For both, `items[i].position == i` and `item_count == items.len()` hold after
//! every mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};

use super::details::MediaDetails;
use super::identifiers::{ClientId, MediaItemId};
use super::media::MediaData;
use super::sync_state::ListSyncStates;
use super::MediaType;
use crate::utils::errors::ListError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Add,
    Remove,
    Update,
    Reorder,
    Sync,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeType::Add => "add",
            ChangeType::Remove => "remove",
            ChangeType::Update => "update",
            ChangeType::Reorder => "reorder",
            ChangeType::Sync => "sync",
        };
        f.write_str(s)
    }
}

/// One entry of a list item's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub client_id: ClientId,
    pub item_id: String,
    pub change_type: ChangeType,
    pub timestamp: DateTime<Utc>,
}

/// Anything that carries a list position.
pub trait Positioned {
    fn position(&self) -> usize;
    fn set_position(&mut self, position: usize);
}

/// Check that every entry sits at the position it claims.
pub fn validate_positions<T: Positioned>(items: &[T]) -> Result<(), ListError> {
    match items
        .iter()
        .enumerate()
        .find(|(index, item)| item.position() != *index)
    {
        Some((index, item)) => Err(ListError::PositionMismatch {
            index,
            position: item.position(),
        }),
        None => Ok(()),
    }
}

pub(crate) fn resequence<T: Positioned>(items: &mut [T]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.set_position(index);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub item_id: MediaItemId,
    pub position: usize,
    pub last_changed: DateTime<Utc>,
    #[serde(default)]
    pub history: Vec<ChangeRecord>,
}

impl ListItem {
    pub fn new(item_id: MediaItemId) -> Self {
        Self {
            item_id,
            position: 0,
            last_changed: Utc::now(),
            history: Vec::new(),
        }
    }

    fn record(&mut self, client_id: ClientId, change_type: ChangeType) {
        let now = Utc::now();
        self.last_changed = now;
        self.history.push(ChangeRecord {
            client_id,
            item_id: self.item_id.to_string(),
            change_type,
            timestamp: now,
        });
    }
}

impl Positioned for ListItem {
    fn position(&self) -> usize {
        self.position
    }

    fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}

/// Shared state of playlists and collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemList {
    pub details: MediaDetails,
    items: Vec<ListItem>,
    item_count: usize,
    pub is_public: bool,
    pub is_smart: bool,
    pub sync_states: ListSyncStates,
}

impl ItemList {
    pub fn new(details: MediaDetails) -> Self {
        Self {
            details,
            ..Default::default()
        }
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_ids(&self) -> Vec<MediaItemId> {
        self.items.iter().map(|item| item.item_id).collect()
    }

    pub fn position_of(&self, item_id: MediaItemId) -> Option<usize> {
        self.items.iter().position(|item| item.item_id == item_id)
    }

    pub fn contains(&self, item_id: MediaItemId) -> bool {
        self.position_of(item_id).is_some()
    }

    /// Append `item` at the end of the list. Returns its position.
    pub fn add_item(&mut self, mut item: ListItem, client_id: ClientId) -> usize {
        let position = self.items.len();
        item.position = position;
        item.record(client_id, ChangeType::Add);
        self.items.push(item);
        self.item_count = self.items.len();
        position
    }

    /// Remove the first entry for `item_id` and close the gap it leaves.
    pub fn remove_item(&mut self, item_id: MediaItemId, client_id: ClientId) -> Option<ListItem> {
        let index = self.position_of(item_id)?;
        let mut removed = self.items.remove(index);
        removed.record(client_id, ChangeType::Remove);
        resequence(&mut self.items);
        self.item_count = self.items.len();
        Some(removed)
    }

    /// Move the entry at `from` so that it ends up at `to`.
    pub fn move_item(
        &mut self,
        from: usize,
        to: usize,
        client_id: ClientId,
    ) -> Result<(), ListError> {
        let len = self.items.len();
        if from >= len {
            return Err(ListError::OutOfRange { index: from, len });
        }
        if to >= len {
            return Err(ListError::OutOfRange { index: to, len });
        }
        if from == to {
            return Ok(());
        }

        let mut item = self.items.remove(from);
        item.record(client_id, ChangeType::Reorder);
        self.items.insert(to, item);
        resequence(&mut self.items);
        Ok(())
    }

    /// Record that the entry for `item_id` changed without moving.
    pub fn touch_item(&mut self, item_id: MediaItemId, client_id: ClientId) -> bool {
        match self.items.iter_mut().find(|item| item.item_id == item_id) {
            Some(item) => {
                item.record(client_id, ChangeType::Update);
                true
            }
            None => false,
        }
    }

    pub fn validate_item_ordering(&self) -> Result<(), ListError> {
        validate_positions(&self.items)?;
        if self.item_count != self.items.len() {
            return Err(ListError::CountMismatch {
                count: self.item_count,
                len: self.items.len(),
            });
        }
        Ok(())
    }

    /// Append copies of `items` as they are, without recording changes.
    pub(crate) fn extend_items(&mut self, items: &[ListItem]) {
        for item in items {
            let mut item = item.clone();
            item.position = self.items.len();
            self.items.push(item);
        }
        self.item_count = self.items.len();
    }

    /// Drop every entry whose id was already seen, keeping first-seen order.
    fn dedup_items(&mut self) -> usize {
        let before = self.items.len();
        let mut seen = std::collections::HashSet::with_capacity(before);
        self.items.retain(|item| seen.insert(item.item_id));
        resequence(&mut self.items);
        self.item_count = self.items.len();
        before - self.items.len()
    }
}

/// Ordered list, duplicates allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Playlist {
    list: ItemList,
}

impl Playlist {
    pub fn new(details: MediaDetails) -> Self {
        Self {
            list: ItemList::new(details),
        }
    }

    pub fn into_inner(self) -> ItemList {
        self.list
    }
}

impl From<ItemList> for Playlist {
    fn from(list: ItemList) -> Self {
        Self { list }
    }
}

impl Deref for Playlist {
    type Target = ItemList;

    fn deref(&self) -> &ItemList {
        &self.list
    }
}

impl DerefMut for Playlist {
    fn deref_mut(&mut self) -> &mut ItemList {
        &mut self.list
    }
}

/// Unordered set of items, stored as a sequence.
///
/// Only shared access to the inner [`ItemList`] is exposed so the uniqueness
/// of item ids cannot be bypassed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    list: ItemList,
    #[serde(skip)]
    item_map: Option<HashMap<MediaItemId, usize>>,
}

impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        self.list == other.list
    }
}

impl Collection {
    pub fn new(details: MediaDetails) -> Self {
        Self {
            list: ItemList::new(details),
            item_map: None,
        }
    }

    fn rebuild_item_map(&mut self) {
        let map = self
            .list
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| (item.item_id, index))
            .collect();
        self.item_map = Some(map);
    }

    fn item_map(&mut self) -> &HashMap<MediaItemId, usize> {
        if self.item_map.is_none() {
            self.rebuild_item_map();
        }
        self.item_map.get_or_insert_with(HashMap::new)
    }

    pub fn contains(&self, item_id: MediaItemId) -> bool {
        match &self.item_map {
            Some(map) => map.contains_key(&item_id),
            None => self.list.contains(item_id),
        }
    }

    /// Add `item` unless an entry with the same id exists. Returns whether it was added.
    pub fn add_item(&mut self, item: ListItem, client_id: ClientId) -> bool {
        if self.item_map().contains_key(&item.item_id) {
            return false;
        }
        let item_id = item.item_id;
        let position = self.list.add_item(item, client_id);
        if let Some(map) = self.item_map.as_mut() {
            map.insert(item_id, position);
        }
        true
    }

    pub fn remove_item(&mut self, item_id: MediaItemId, client_id: ClientId) -> Option<ListItem> {
        let removed = self.list.remove_item(item_id, client_id)?;
        self.rebuild_item_map();
        Some(removed)
    }

    pub fn move_item(
        &mut self,
        from: usize,
        to: usize,
        client_id: ClientId,
    ) -> Result<(), ListError> {
        self.list.move_item(from, to, client_id)?;
        self.rebuild_item_map();
        Ok(())
    }

    pub fn touch_item(&mut self, item_id: MediaItemId, client_id: ClientId) -> bool {
        self.list.touch_item(item_id, client_id)
    }

    /// Repair the set invariant. Safe to call at any time; a second call is a no-op.
    pub fn ensure_no_duplicates(&mut self) -> usize {
        let removed = self.list.dedup_items();
        self.rebuild_item_map();
        removed
    }

    pub fn sync_states_mut(&mut self) -> &mut ListSyncStates {
        &mut self.list.sync_states
    }

    pub fn set_public(&mut self, is_public: bool) {
        self.list.is_public = is_public;
    }

    pub fn set_smart(&mut self, is_smart: bool) {
        self.list.is_smart = is_smart;
    }

    pub fn into_inner(self) -> ItemList {
        self.list
    }
}

impl From<ItemList> for Collection {
    /// Duplicates present in `list` are removed.
    fn from(list: ItemList) -> Self {
        let mut collection = Self {
            list,
            item_map: None,
        };
        collection.ensure_no_duplicates();
        collection
    }
}

impl Deref for Collection {
    type Target = ItemList;

    fn deref(&self) -> &ItemList {
        &self.list
    }
}

impl MediaData for Playlist {
    fn details(&self) -> &MediaDetails {
        &self.list.details
    }

    fn details_mut(&mut self) -> &mut MediaDetails {
        &mut self.list.details
    }

    fn media_type(&self) -> MediaType {
        MediaType::Playlist
    }
}

impl MediaData for Collection {
    fn details(&self) -> &MediaDetails {
        &self.list.details
    }

    fn details_mut(&mut self) -> &mut MediaDetails {
        &mut self.list.details
    }

    fn media_type(&self) -> MediaType {
        MediaType::Collection
    }
}

/// Common surface used by list synchronisation.
pub trait ItemContainer {
    fn list(&self) -> &ItemList;

    fn list_sync_states_mut(&mut self) -> &mut ListSyncStates;

    /// Add an item, honouring the container's duplicate policy.
    fn append(&mut self, item: ListItem, client_id: ClientId) -> bool;
}

impl ItemContainer for Playlist {
    fn list(&self) -> &ItemList {
        &self.list
    }

    fn list_sync_states_mut(&mut self) -> &mut ListSyncStates {
        &mut self.list.sync_states
    }

    fn append(&mut self, item: ListItem, client_id: ClientId) -> bool {
        self.list.add_item(item, client_id);
        true
    }
}

impl ItemContainer for Collection {
    fn list(&self) -> &ItemList {
        &self.list
    }

    fn list_sync_states_mut(&mut self) -> &mut ListSyncStates {
        &mut self.list.sync_states
    }

    fn append(&mut self, item: ListItem, client_id: ClientId) -> bool {
        self.add_item(item, client_id)
    }
}
