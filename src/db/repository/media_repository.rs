use super::{BaseRepository, Repository};
use crate::db::entities::{
    MediaItemActiveModel, MediaItemClient, MediaItemClientActiveModel, MediaItemEntity,
    MediaItemExternalId, MediaItemExternalIdActiveModel, MediaItemModel, media_item_clients,
    media_item_external_ids, media_items,
};
use crate::models::{ClientId, MediaItem, MediaItemId, MediaType};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Storage for reconciled media items.
#[async_trait]
pub trait MediaRepository: Repository<MediaItem, Id = MediaItemId> {
    async fn find_by_uuid(&self, uuid: Uuid) -> Result<Option<MediaItem>>;

    /// The item that `client_id` knows as `client_item_id`.
    async fn find_by_client_item(
        &self,
        client_id: ClientId,
        client_item_id: &str,
    ) -> Result<Option<MediaItem>>;

    /// First item of `media_type` carrying the external id `source:value`.
    async fn find_by_external_id(&self, media_type: MediaType, source: &str, value: &str)
    -> Result<Option<MediaItem>>;

    async fn find_by_type(&self, media_type: MediaType) -> Result<Vec<MediaItem>>;
}


#[derive(Debug)]
pub struct MediaRepositoryImpl {
    base: BaseRepository,
}

impl MediaRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn decode(model: MediaItemModel) -> Result<MediaItem> {
        model
            .to_media_item()
            .with_context(|| format!("Failed to decode stored media item {}", model.id))
    }

    fn decode_all(models: Vec<MediaItemModel>) -> Result<Vec<MediaItem>> {
        models.into_iter().map(Self::decode).collect()
    }

    /// Replace the lookup rows for one item.
    async fn write_index(txn: &DatabaseTransaction, item: &MediaItem) -> Result<()> {
        let row_id = item.id.get() as i64;
        Self::clear_index(txn, row_id).await?;

        let clients: Vec<MediaItemClientActiveModel> = item
            .sync_clients
            .iter()
            .map(|client| MediaItemClientActiveModel {
                id: NotSet,
                media_item_id: Set(row_id),
                client_id: Set(client.client_id.get() as i64),
                client_type: Set(client.client_type.as_str().to_string()),
                client_item_id: Set(client.item_id.clone()),
            })
            .collect();
        if !clients.is_empty() {
            MediaItemClient::insert_many(clients)
                .exec(txn)
                .await
                .with_context(|| format!("Failed to index client keys of media item {}", item.id))?;
        }

        let external_ids: Vec<MediaItemExternalIdActiveModel> = item
            .external_ids
            .iter()
            .map(|external| MediaItemExternalIdActiveModel {
                id: NotSet,
                media_item_id: Set(row_id),
                source: Set(external.source.clone()),
                value: Set(external.id.clone()),
            })
            .collect();
        if !external_ids.is_empty() {
            MediaItemExternalId::insert_many(external_ids)
                .exec(txn)
                .await
                .with_context(|| {
                    format!("Failed to index external ids of media item {}", item.id)
                })?;
        }

        Ok(())
    }

    async fn clear_index(txn: &DatabaseTransaction, row_id: i64) -> Result<()> {
        MediaItemClient::delete_many()
            .filter(media_item_clients::Column::MediaItemId.eq(row_id))
            .exec(txn)
            .await?;
        MediaItemExternalId::delete_many()
            .filter(media_item_external_ids::Column::MediaItemId.eq(row_id))
            .exec(txn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Repository<MediaItem> for MediaRepositoryImpl {
    type Id = MediaItemId;

    async fn find_by_id(&self, id: MediaItemId) -> Result<Option<MediaItem>> {
        MediaItemEntity::find_by_id(id.get() as i64)
            .one(self.base.db.as_ref())
            .await?
            .map(Self::decode)
            .transpose()
    }

    async fn find_all(&self) -> Result<Vec<MediaItem>> {
        let models = MediaItemEntity::find()
            .order_by_asc(media_items::Column::Id)
            .all(self.base.db.as_ref())
            .await?;
        Self::decode_all(models)
    }

    async fn insert(&self, mut item: MediaItem) -> Result<MediaItem> {
        let mut active_model = MediaItemActiveModel::from_media_item(&item)
            .context("Failed to serialize media item")?;
        active_model.id = NotSet;

        let txn = self.base.db.begin().await?;
        let row = active_model
            .insert(&txn)
            .await
            .with_context(|| format!("Failed to insert media item {}", item.uuid))?;
        item.id = MediaItemId::new(row.id as u64);

        // The blob is written again so it carries the assigned id.
        let mut active_model: MediaItemActiveModel = row.into();
        active_model.data = Set(item.to_blob().context("Failed to serialize media item")?);
        active_model.update(&txn).await?;

        Self::write_index(&txn, &item).await?;
        txn.commit().await?;

        debug!(
            id = %item.id,
            uuid = %item.uuid,
            media_type = %item.media_type(),
            "Inserted media item"
        );
        Ok(item)
    }

    async fn update(&self, item: MediaItem) -> Result<MediaItem> {
        if item.id.is_unset() {
            bail!("Cannot update media item {} before it is inserted", item.uuid);
        }
        let active_model = MediaItemActiveModel::from_media_item(&item)
            .context("Failed to serialize media item")?;

        let txn = self.base.db.begin().await?;
        active_model
            .update(&txn)
            .await
            .with_context(|| format!("Failed to update media item {}", item.id))?;
        Self::write_index(&txn, &item).await?;
        txn.commit().await?;

        debug!(id = %item.id, title = %item.title(), "Updated media item");
        Ok(item)
    }

    async fn delete(&self, id: MediaItemId) -> Result<()> {
        let row_id = id.get() as i64;
        let txn = self.base.db.begin().await?;
        Self::clear_index(&txn, row_id).await?;
        MediaItemEntity::delete_by_id(row_id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        Ok(MediaItemEntity::find().count(self.base.db.as_ref()).await?)
    }
}

#[async_trait]
impl MediaRepository for MediaRepositoryImpl {
    async fn find_by_uuid(&self, uuid: Uuid) -> Result<Option<MediaItem>> {
        MediaItemEntity::find()
            .filter(media_items::Column::Uuid.eq(uuid))
            .one(self.base.db.as_ref())
            .await?
            .map(Self::decode)
            .transpose()
    }

    async fn find_by_client_item(
        &self,
        client_id: ClientId,
        client_item_id: &str,
    ) -> Result<Option<MediaItem>> {
        MediaItemEntity::find()
            .inner_join(MediaItemClient)
            .filter(media_item_clients::Column::ClientId.eq(client_id.get() as i64))
            .filter(media_item_clients::Column::ClientItemId.eq(client_item_id))
            .one(self.base.db.as_ref())
            .await?
            .map(Self::decode)
            .transpose()
    }

    async fn find_by_external_id(
        &self,
        media_type: MediaType,
        source: &str,
        value: &str,
    ) -> Result<Option<MediaItem>> {
        let source = source.trim().to_ascii_lowercase();
        MediaItemEntity::find()
            .inner_join(MediaItemExternalId)
            .filter(media_items::Column::MediaType.eq(media_type.as_str()))
            .filter(media_item_external_ids::Column::Source.eq(source))
            .filter(media_item_external_ids::Column::Value.eq(value))
            .order_by_asc(media_items::Column::Id)
            .one(self.base.db.as_ref())
            .await?
            .map(Self::decode)
            .transpose()
    }

    async fn find_by_type(&self, media_type: MediaType) -> Result<Vec<MediaItem>> {
        let models = MediaItemEntity::find()
            .filter(media_items::Column::MediaType.eq(media_type.as_str()))
            .order_by_asc(media_items::Column::Title)
            .order_by_asc(media_items::Column::Id)
            .all(self.base.db.as_ref())
            .await?;
        Self::decode_all(models)
    }
}
