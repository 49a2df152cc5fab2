use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CategoryId, ItemId};

/// A leaf expense type, resolved for a particular year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductibleItem {
    pub id: ItemId,
    pub label: String,
    pub category: CategoryId,
    /// Item-level cap, applied before any pool or category cap.
    pub sub_limit: Option<Decimal>,
}

/// Items that jointly share one cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedPool {
    pub label: String,
    pub limit: Decimal,
    pub members: BTreeSet<ItemId>,
}

/// A relief category as it applies to one year and one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub id: CategoryId,
    pub title: String,
    pub limit: Decimal,
    pub items: Vec<DeductibleItem>,
    pub shared_pools: Vec<SharedPool>,
    /// Profile-derived entitlement; always claimed in full.
    pub is_automatic: bool,
}

impl CategoryConfig {
    pub fn item(&self, id: ItemId) -> Option<&DeductibleItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn pool_for(&self, id: ItemId) -> Option<&SharedPool> {
        self.shared_pools.iter().find(|pool| pool.members.contains(&id))
    }
}

/// Computed totals for one category. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: CategoryId,
    pub title: String,
    pub limit: Decimal,
    /// Amount counted toward relief after every cap.
    pub claimable: Decimal,
    pub remaining: Decimal,
    /// `claimable / limit` as a percentage, two decimal places.
    pub percent_used: Decimal,
    /// Raw spend before any cap; display only.
    pub total_spent: Decimal,
    pub is_automatic: bool,
}
