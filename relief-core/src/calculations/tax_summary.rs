//! Whole-year tax position for one taxpayer.
//!
//! # Computation
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Aggregate income (employment + other) |
//! | 2    | Donation deduction (up to 10% of aggregate income) |
//! | 3    | Total relief (claimable over every category) |
//! | 4    | Chargeable income (1 - 2 - 3, minimum 0) |
//! | 5    | Bracket tax on chargeable income |
//! | 6    | Personal rebate when chargeable income is under the ceiling |
//! | 7    | Zakat rebate (up to the tax left after step 6) |
//! | 8    | Dividend surcharge |
//! | 9    | Tax payable (5 - 6 - 7 + 8, minimum 0) |

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calculations::category_builder::build_categories_for_year;
use crate::calculations::category_claims::compute_category_stats;
use crate::calculations::common::{non_negative, percent_of, round_half_up};
use crate::calculations::progressive_tax::{compute_tax, dividend_surcharge};
use crate::config::resolve_config;
use crate::models::{CategoryStats, Receipt, UserProfile, YearIncome, receipts_for_year};

const DONATION_CAP_RATE: Decimal = dec!(0.10);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSummary {
    pub year: i32,
    pub filing_deadline: NaiveDate,
    pub aggregate_income: Decimal,
    pub dividend_income: Decimal,
    pub donation_deduction: Decimal,
    pub total_relief: Decimal,
    pub chargeable_income: Decimal,
    pub bracket_tax: Decimal,
    pub personal_rebate: Decimal,
    pub zakat_rebate: Decimal,
    pub dividend_surcharge: Decimal,
    pub tax_payable: Decimal,
    /// Tax payable as a percentage of aggregate income plus dividends.
    pub effective_rate: Decimal,
    pub categories: Vec<CategoryStats>,
}

impl TaxSummary {
    /// Computes the summary for `year` from a snapshot of the taxpayer's
    /// data. `receipts` may span several years; only those dated in `year`
    /// are used.
    pub fn compute(
        year: i32,
        income: &YearIncome,
        profile: &UserProfile,
        receipts: &[Receipt],
    ) -> Self {
        let config = resolve_config(year);
        let receipts = receipts_for_year(receipts, year);

        let categories: Vec<CategoryStats> = build_categories_for_year(year, profile)
            .iter()
            .map(|category| compute_category_stats(category, &receipts))
            .collect();
        let total_relief: Decimal = categories.iter().map(|stats| stats.claimable).sum();

        let aggregate_income = income.aggregate();
        let dividend_income = non_negative(income.dividend);
        let donation_deduction = non_negative(profile.donations)
            .min(round_half_up(aggregate_income * DONATION_CAP_RATE));

        let chargeable_income =
            non_negative(aggregate_income - donation_deduction - total_relief);
        let bracket_tax = compute_tax(chargeable_income, year);

        let personal_rebate = if chargeable_income <= config.personal_rebate.income_ceiling {
            config.personal_rebate.amount.min(bracket_tax)
        } else {
            Decimal::ZERO
        };
        let zakat_rebate = non_negative(profile.zakat).min(bracket_tax - personal_rebate);
        let surcharge = dividend_surcharge(dividend_income, year);

        let tax_payable = non_negative(bracket_tax - personal_rebate - zakat_rebate + surcharge);

        Self {
            year,
            filing_deadline: config.filing_deadline,
            aggregate_income,
            dividend_income,
            donation_deduction,
            total_relief,
            chargeable_income,
            bracket_tax,
            personal_rebate,
            zakat_rebate,
            dividend_surcharge: surcharge,
            tax_payable,
            effective_rate: percent_of(tax_payable, aggregate_income + dividend_income),
            categories,
        }
    }
}
