//! Turns verified receipts into the claimable amount for one category.
//!
//! Caps are applied in a fixed order: each item's sub-limit, then the limit
//! of any shared pool the item belongs to, then the category limit. Applying
//! them in another order changes the result whenever a pool or category is
//! oversubscribed.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{non_negative, percent_of};
use crate::config::catalog;
use crate::models::{CategoryConfig, CategoryStats, ItemId, Receipt};

/// Claimable amount for `category` given raw per-item totals.
///
/// Items the category does not list are ignored. Negative totals count as
/// zero.
pub fn apply_relief_caps(
    item_totals: &BTreeMap<ItemId, Decimal>,
    category: &CategoryConfig,
) -> Decimal {
    let mut pool_sums = vec![Decimal::ZERO; category.shared_pools.len()];
    let mut unpooled = Decimal::ZERO;

    for (&id, &raw) in item_totals {
        let Some(item) = category.item(id) else {
            continue;
        };

        let mut clamped = non_negative(raw);
        if let Some(sub_limit) = item.sub_limit {
            clamped = clamped.min(sub_limit);
        }

        match category
            .shared_pools
            .iter()
            .position(|pool| pool.members.contains(&id))
        {
            Some(index) => pool_sums[index] += clamped,
            None => unpooled += clamped,
        }
    }

    let pooled: Decimal = category
        .shared_pools
        .iter()
        .zip(pool_sums)
        .map(|(pool, sum)| sum.min(pool.limit))
        .sum();

    (pooled + unpooled).min(category.limit)
}

/// Computes the stats for `category` from the full receipt list.
///
/// Automatic categories are always fully claimed. For the rest only verified
/// receipts for items the category offers count. A sports receipt filed under
/// lifestyle, or the reverse, lands in whichever of the two offers the item.
pub fn compute_category_stats(
    category: &CategoryConfig,
    receipts: &[Receipt],
) -> CategoryStats {
    if category.is_automatic {
        return CategoryStats {
            category: category.id,
            title: category.title.clone(),
            limit: category.limit,
            claimable: category.limit,
            remaining: Decimal::ZERO,
            percent_used: Decimal::ONE_HUNDRED,
            total_spent: Decimal::ZERO,
            is_automatic: true,
        };
    }

    let item_totals = item_totals(category, receipts);
    let total_spent: Decimal = item_totals.values().copied().sum();
    let claimable = apply_relief_caps(&item_totals, category);

    CategoryStats {
        category: category.id,
        title: category.title.clone(),
        limit: category.limit,
        claimable,
        remaining: non_negative(category.limit - claimable),
        percent_used: percent_of(claimable, category.limit),
        total_spent,
        is_automatic: false,
    }
}

fn item_totals(
    category: &CategoryConfig,
    receipts: &[Receipt],
) -> BTreeMap<ItemId, Decimal> {
    let mut totals = BTreeMap::new();

    for receipt in receipts.iter().filter(|r| r.is_verified()) {
        let item = receipt.sub_category;
        let offered = category.item(item).is_some();

        // A receipt follows its item into whichever category offers it this
        // year, as long as it was filed under one of the item's categories.
        if !offered || !catalog::belongs_to(item, receipt.category) {
            if receipt.category == category.id {
                debug!(
                    receipt_id = receipt.id,
                    category = %category.id,
                    item = %item,
                    "item not offered in category for this year; receipt excluded"
                );
            }
            continue;
        }
        *totals.entry(item).or_insert(Decimal::ZERO) += non_negative(receipt.amount);
    }

    totals
}
