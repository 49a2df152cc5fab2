use async_trait::async_trait;
use relief_core::db::{DbConfig, ReliefRepository, RepositoryError, RepositoryFactory};

use crate::repository::SqliteRepository;

/// The `"sqlite"` backend.
///
/// ```rust,no_run
/// use relief_core::db::RepositoryRegistry;
/// use relief_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Opens `config.connection_string` (a file path, `sqlite:` URL or
    /// `:memory:`) and brings the schema up to date.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn ReliefRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&config.connection_string).await?;
        repo.run_migrations().await?;
        Ok(Box::new(repo))
    }
}
