use std::collections::BTreeMap;

use async_trait::async_trait;

use super::repository::{ReliefRepository, RepositoryError};

/// Which storage backend to open and how to reach it.
///
/// `connection_string` is handed to the matching factory untouched.
///
/// | backend  | connection_string examples            |
/// |----------|---------------------------------------|
/// | `sqlite` | `relief.db`, `sqlite://relief.db`, `:memory:` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub backend: String,
    pub connection_string: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        }
    }
}

/// Opens repositories for one backend. Each backend crate exports one of
/// these for registration at startup.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// Connects and returns a repository ready for use, migrations applied.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn ReliefRepository>, RepositoryError>;
}

/// Backend factories keyed by name.
#[derive(Default)]
pub struct RepositoryRegistry {
    factories: BTreeMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `factory`, replacing any factory with the same name.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Registered backend names, alphabetical.
    pub fn available_backends(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    /// Opens a repository with the factory named by `config.backend`.
    ///
    /// # Errors
    /// [`RepositoryError::Configuration`] when no such backend is registered;
    /// otherwise whatever the factory returns.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn ReliefRepository>, RepositoryError> {
        let Some(factory) = self.factories.get(config.backend.as_str()) else {
            return Err(RepositoryError::Configuration(format!(
                "unknown backend '{}'; available: {}",
                config.backend,
                self.available_backends().join(", ")
            )));
        };

        factory.create(config).await
    }
}
