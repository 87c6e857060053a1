pub mod media_repository;

use anyhow::Result;
use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Base repository trait that all repositories implement
#[async_trait]
pub trait Repository<T: Send + 'static>: Send + Sync {
    type Id: Copy + Send + Sync + 'static;

    async fn find_by_id(&self, id: Self::Id) -> Result<Option<T>>;

    async fn find_all(&self) -> Result<Vec<T>>;

    /// Store a new entity and return it with its assigned id
    async fn insert(&self, entity: T) -> Result<T>;

    async fn update(&self, entity: T) -> Result<T>;

    async fn delete(&self, id: Self::Id) -> Result<()>;

    async fn count(&self) -> Result<u64>;
}

/// Base repository implementation holder
#[derive(Debug)]
pub struct BaseRepository {
    pub db: Arc<DatabaseConnection>,
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

pub use media_repository::{MediaRepository, MediaRepositoryImpl};
