use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Index of `(client_id, client_item_id)` pairs held by each stored item.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "media_item_clients")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub media_item_id: i64,
    pub client_id: i64,
    pub client_type: String,
    pub client_item_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::media_items::Entity",
        from = "Column::MediaItemId",
        to = "super::media_items::Column::Id",
        on_delete = "Cascade"
    )]
    MediaItem,
}

impl Related<super::media_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MediaItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
