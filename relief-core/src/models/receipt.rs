use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use thiserror::Error;

use super::{CategoryId, ItemId};
use crate::config::catalog;

/// Where a receipt is in its capture lifecycle.
///
/// Only [`ReceiptStatus::Verified`] receipts count toward relief.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReceiptStatus {
    #[default]
    Pending,
    Analyzing,
    NeedsReview,
    Verified,
}

impl ReceiptStatus {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Whether a receipt may move from `self` to `next`.
    ///
    /// Staying in the same state is always allowed.
    pub fn can_transition_to(
        &self,
        next: ReceiptStatus,
    ) -> bool {
        use ReceiptStatus::*;

        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (Pending, Analyzing)
                | (Pending, Verified)
                | (Analyzing, NeedsReview)
                | (Analyzing, Verified)
                | (Analyzing, Pending)
                | (NeedsReview, Verified)
                | (Verified, NeedsReview)
        )
    }
}

/// Errors raised when creating or mutating receipts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReceiptError {
    #[error("cannot move receipt from {from} to {to}")]
    InvalidTransition {
        from: ReceiptStatus,
        to: ReceiptStatus,
    },

    #[error("receipt amount must not be negative, got {0}")]
    NegativeAmount(Decimal),

    #[error("receipt description must not be empty")]
    EmptyDescription,

    #[error("item '{item}' does not belong to category '{category}'")]
    ItemNotInCategory { item: ItemId, category: CategoryId },
}

/// A stored expense record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: i64,
    pub status: ReceiptStatus,
    pub amount: Decimal,
    pub description: String,
    pub category: CategoryId,
    pub sub_category: ItemId,
    pub date: NaiveDate,
    pub attachment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Receipt {
    pub fn is_verified(&self) -> bool {
        self.status == ReceiptStatus::Verified
    }

    pub fn assessment_year(&self) -> i32 {
        self.date.year()
    }

    /// Moves the receipt to `next`, rejecting transitions the lifecycle
    /// does not allow.
    pub fn transition_to(
        &mut self,
        next: ReceiptStatus,
    ) -> Result<(), ReceiptError> {
        if !self.status.can_transition_to(next) {
            return Err(ReceiptError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// For creating new receipts (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReceipt {
    pub status: ReceiptStatus,
    pub amount: Decimal,
    pub description: String,
    pub category: CategoryId,
    pub sub_category: ItemId,
    pub date: NaiveDate,
    pub attachment: Option<String>,
}

impl NewReceipt {
    pub fn validate(&self) -> Result<(), ReceiptError> {
        if self.amount < Decimal::ZERO {
            return Err(ReceiptError::NegativeAmount(self.amount));
        }
        if self.description.trim().is_empty() {
            return Err(ReceiptError::EmptyDescription);
        }
        if !catalog::belongs_to(self.sub_category, self.category) {
            return Err(ReceiptError::ItemNotInCategory {
                item: self.sub_category,
                category: self.category,
            });
        }
        Ok(())
    }
}

/// Receipts dated inside assessment year `year`.
pub fn receipts_for_year(
    receipts: &[Receipt],
    year: i32,
) -> Vec<Receipt> {
    receipts
        .iter()
        .filter(|receipt| receipt.assessment_year() == year)
        .cloned()
        .collect()
}
