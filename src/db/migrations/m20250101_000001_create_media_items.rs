use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MediaItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MediaItems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MediaItems::Uuid).uuid().not_null().unique_key())
                    .col(ColumnDef::new(MediaItems::MediaType).string().not_null())
                    .col(ColumnDef::new(MediaItems::Title).string().not_null())
                    .col(ColumnDef::new(MediaItems::ReleaseYear).integer())
                    .col(
                        ColumnDef::new(MediaItems::OwnerId)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(MediaItems::Data).text().not_null())
                    .col(
                        ColumnDef::new(MediaItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MediaItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MediaItemClients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MediaItemClients::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MediaItemClients::MediaItemId).big_integer().not_null())
                    .col(ColumnDef::new(MediaItemClients::ClientId).big_integer().not_null())
                    .col(ColumnDef::new(MediaItemClients::ClientType).string().not_null())
                    .col(ColumnDef::new(MediaItemClients::ClientItemId).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_media_item_clients_item")
                            .from(MediaItemClients::Table, MediaItemClients::MediaItemId)
                            .to(MediaItems::Table, MediaItems::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MediaItemExternalIds::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MediaItemExternalIds::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MediaItemExternalIds::MediaItemId).big_integer().not_null())
                    .col(ColumnDef::new(MediaItemExternalIds::Source).string().not_null())
                    .col(ColumnDef::new(MediaItemExternalIds::Value).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_media_item_external_ids_item")
                            .from(MediaItemExternalIds::Table, MediaItemExternalIds::MediaItemId)
                            .to(MediaItems::Table, MediaItems::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_media_items_type")
                    .table(MediaItems::Table)
                    .col(MediaItems::MediaType)
                    .to_owned(),
            )
            .await?;

        // A backend key belongs to at most one stored item.
        manager
            .create_index(
                Index::create()
                    .name("idx_media_item_clients_key")
                    .table(MediaItemClients::Table)
                    .col(MediaItemClients::ClientId)
                    .col(MediaItemClients::ClientItemId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_media_item_external_ids_lookup")
                    .table(MediaItemExternalIds::Table)
                    .col(MediaItemExternalIds::Source)
                    .col(MediaItemExternalIds::Value)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MediaItemExternalIds::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MediaItemClients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MediaItems::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum MediaItems {
    Table,
    Id,
    Uuid,
    MediaType,
    Title,
    ReleaseYear,
    OwnerId,
    Data,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum MediaItemClients {
    Table,
    Id,
    MediaItemId,
    ClientId,
    ClientType,
    ClientItemId,
}

#[derive(Iden)]
enum MediaItemExternalIds {
    Table,
    Id,
    MediaItemId,
    Source,
    Value,
}
