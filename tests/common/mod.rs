pub mod builders;
pub mod mocks;

use reelhub::db::Database;
use reelhub::db::repository::MediaRepositoryImpl;
use reelhub::mapper::ConverterRegistry;
use reelhub::services::{LibraryFetcher, Reconciler};
use std::sync::Arc;
use tempfile::TempDir;

/// Migrated database plus the services wired on top of it.
pub struct TestContext {
    pub db: Database,
    pub repo: Arc<MediaRepositoryImpl>,
    pub fetcher: LibraryFetcher,
    pub reconciler: Reconciler<MediaRepositoryImpl>,
    _temp_dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_page_size(2).await
    }

    pub async fn with_page_size(page_size: usize) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db = Database::connect(&temp_dir.path().join("test.db"))
            .await
            .expect("Failed to connect to test database");
        db.migrate().await.expect("Failed to run migrations");

        let repo = Arc::new(MediaRepositoryImpl::new(db.get_connection()));
        let registry = Arc::new(ConverterRegistry::with_defaults());

        Self {
            db,
            fetcher: LibraryFetcher::new(registry, page_size),
            reconciler: Reconciler::new(repo.clone()),
            repo,
            _temp_dir: temp_dir,
        }
    }
}
