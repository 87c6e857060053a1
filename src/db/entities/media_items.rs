use crate::models::{MediaItem, MediaItemId};
use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};
use serde::{Deserialize, Serialize};

/// One reconciled item. `data` is the full `MediaItem` blob; the other
/// columns are copies of envelope fields for filtering.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "media_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub uuid: Uuid,
    pub media_type: String,
    pub title: String,
    pub release_year: Option<i32>,
    pub owner_id: i64,
    #[sea_orm(column_type = "Text")]
    pub data: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::media_item_clients::Entity")]
    Clients,
    #[sea_orm(has_many = "super::media_item_external_ids::Entity")]
    ExternalIds,
}

impl Related<super::media_item_clients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clients.def()
    }
}

impl Related<super::media_item_external_ids::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExternalIds.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decode the stored blob. The row id wins over whatever id the blob carries.
    pub fn to_media_item(&self) -> serde_json::Result<MediaItem> {
        let mut item = MediaItem::from_blob(&self.data)?;
        item.id = MediaItemId::new(self.id as u64);
        Ok(item)
    }
}

impl ActiveModel {
    /// Row for `item`; the primary key is left unset for items not stored yet.
    pub fn from_media_item(item: &MediaItem) -> serde_json::Result<Self> {
        Ok(Self {
            id: if item.id.is_unset() {
                NotSet
            } else {
                Set(item.id.get() as i64)
            },
            uuid: Set(item.uuid),
            media_type: Set(item.media_type().as_str().to_string()),
            title: Set(item.title().to_string()),
            release_year: Set(item.release_year()),
            owner_id: Set(item.owner_id.get() as i64),
            data: Set(item.to_blob()?),
            created_at: Set(item.created_at),
            updated_at: Set(item.updated_at),
        })
    }
}
