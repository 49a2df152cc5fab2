//! SQLite storage backend for receipts, the taxpayer profile and yearly
//! income.

mod decimal;
mod factory;
mod repository;

pub use factory::SqliteRepositoryFactory;
pub use repository::SqliteRepository;
