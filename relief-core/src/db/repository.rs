use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewReceipt, Receipt, UserProfile, YearIncome};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage for everything the engine consumes.
///
/// The engine never calls this directly: callers fetch a snapshot, compute
/// and discard.
#[async_trait]
pub trait ReliefRepository: Send + Sync {
    // Receipts
    async fn create_receipt(
        &self,
        receipt: NewReceipt,
    ) -> Result<Receipt, RepositoryError>;

    /// Creates every receipt or, on any failure, none of them.
    async fn create_receipts(
        &self,
        receipts: Vec<NewReceipt>,
    ) -> Result<Vec<Receipt>, RepositoryError>;

    async fn get_receipt(
        &self,
        id: i64,
    ) -> Result<Receipt, RepositoryError>;

    /// Overwrites the stored receipt and bumps `updated_at`.
    async fn update_receipt(
        &self,
        receipt: &Receipt,
    ) -> Result<(), RepositoryError>;

    async fn delete_receipt(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError>;

    /// Receipts ordered by date then id, limited to one assessment year when
    /// `year` is given.
    async fn list_receipts(
        &self,
        year: Option<i32>,
    ) -> Result<Vec<Receipt>, RepositoryError>;

    // Profile (single record; defaults until first saved)
    async fn get_profile(&self) -> Result<UserProfile, RepositoryError>;

    async fn save_profile(
        &self,
        profile: &UserProfile,
    ) -> Result<(), RepositoryError>;

    // Yearly income
    async fn get_year_income(
        &self,
        year: i32,
    ) -> Result<YearIncome, RepositoryError>;

    async fn save_year_income(
        &self,
        income: &YearIncome,
    ) -> Result<(), RepositoryError>;

    async fn list_income_years(&self) -> Result<Vec<i32>, RepositoryError>;
}
