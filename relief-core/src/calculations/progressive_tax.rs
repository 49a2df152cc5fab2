//! Progressive bracket tax and the dividend surcharge.
//!
//! The bracket table is walked from the lowest band upward. Each band taxes
//! the slice of income between the previous band's upper bound and its own,
//! so an income sitting exactly on a bound is taxed entirely at the lower
//! rate.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use relief_core::calculations::{TaxSchedule, compute_tax};
//! use relief_core::config::resolve_config;
//!
//! let schedule = TaxSchedule::new(&resolve_config(2025).brackets);
//!
//! assert_eq!(schedule.tax_on(dec!(100000)), dec!(9400.00));
//! assert_eq!(compute_tax(dec!(5000), 2025), dec!(0.00));
//! ```

use rust_decimal::Decimal;

use crate::calculations::common::{non_negative, round_half_up};
use crate::config::resolve_config;
use crate::models::TaxBracket;

/// Bracket walker over one year's schedule.
#[derive(Debug, Clone, Copy)]
pub struct TaxSchedule<'a> {
    brackets: &'a [TaxBracket],
}

impl<'a> TaxSchedule<'a> {
    /// Brackets must be ordered by increasing upper bound, the last one
    /// unbounded. [`crate::models::TaxYearConfig::validate`] checks this for
    /// configured years.
    pub fn new(brackets: &'a [TaxBracket]) -> Self {
        Self { brackets }
    }

    /// Tax on `income`, rounded half-up to two places. Zero for incomes at
    /// or below zero.
    pub fn tax_on(
        &self,
        income: Decimal,
    ) -> Decimal {
        if income <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let mut total = Decimal::ZERO;
        let mut previous_bound = Decimal::ZERO;

        for bracket in self.brackets {
            let ceiling = match bracket.upper_bound {
                Some(bound) => income.min(bound),
                None => income,
            };
            total += non_negative(ceiling - previous_bound) * bracket.rate;

            match bracket.upper_bound {
                Some(bound) if income > bound => previous_bound = bound,
                _ => break,
            }
        }

        round_half_up(total)
    }
}

/// Bracket tax on chargeable income using the rules resolved for `year`.
pub fn compute_tax(
    chargeable_income: Decimal,
    year: i32,
) -> Decimal {
    TaxSchedule::new(&resolve_config(year).brackets).tax_on(chargeable_income)
}

/// Flat surcharge on dividend income above the year's threshold.
///
/// Only the excess is charged. Years without a configured surcharge return
/// zero regardless of the amount.
pub fn dividend_surcharge(
    dividend_income: Decimal,
    year: i32,
) -> Decimal {
    match resolve_config(year).dividend_surcharge {
        Some(surcharge) => {
            round_half_up(non_negative(dividend_income - surcharge.threshold) * surcharge.rate)
        }
        None => Decimal::ZERO,
    }
}
