pub mod media_item_clients;
pub mod media_item_external_ids;
pub mod media_items;

pub use media_item_clients::{
    ActiveModel as MediaItemClientActiveModel, Entity as MediaItemClient,
    Model as MediaItemClientModel,
};
pub use media_item_external_ids::{
    ActiveModel as MediaItemExternalIdActiveModel, Entity as MediaItemExternalId,
    Model as MediaItemExternalIdModel,
};
pub use media_items::{
    ActiveModel as MediaItemActiveModel, Entity as MediaItemEntity, Model as MediaItemModel,
};
