use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{CategoryId, ItemId, TaxBracket};

/// Year-gated rule switches consulted by the category builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Dental examination/treatment joins the medical preventive pool.
    DentalTreatment,
    /// Sports expenses get their own category instead of sitting in lifestyle.
    SeparateSportsRelief,
    /// EV charging facility installation, rental or subscription.
    EvChargingFacility,
    /// Household food waste composting machine (shares the EV category).
    FoodWasteComposter,
    /// Interest on a first residential home loan.
    FirstHomeLoanInterest,
}

/// Per-child relief amounts; child relief is the sum of count × rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildReliefRates {
    pub under_18: Decimal,
    pub pre_university: Decimal,
    pub degree_level: Decimal,
    pub disabled: Decimal,
    /// Additional amount on top of `disabled` for a disabled child in
    /// higher education.
    pub disabled_higher_education: Decimal,
}

/// Extra flat tax on dividend income above a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DividendSurcharge {
    pub threshold: Decimal,
    pub rate: Decimal,
}

/// Rebate granted when chargeable income does not exceed `income_ceiling`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalRebate {
    pub income_ceiling: Decimal,
    pub amount: Decimal,
}

/// Errors reported by [`TaxYearConfig::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxYearConfigError {
    #[error("year {0} has no tax brackets")]
    NoBrackets(i32),

    #[error("year {year}: bracket bound {bound} does not exceed the previous bound")]
    BoundsNotIncreasing { year: i32, bound: Decimal },

    #[error("year {0}: only the final bracket may be unbounded")]
    UnboundedBeforeLast(i32),

    #[error("year {0}: final bracket must be unbounded")]
    FinalBracketBounded(i32),

    #[error("year {year}: rate {rate} is lower than the bracket below it")]
    RatesDecreasing { year: i32, rate: Decimal },

    #[error("year {year}: rate {rate} is outside 0..=1")]
    RateOutOfRange { year: i32, rate: Decimal },
}

/// Rules for one assessment year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearConfig {
    pub year: i32,
    pub filing_deadline: NaiveDate,
    pub brackets: Vec<TaxBracket>,
    pub category_limits: BTreeMap<CategoryId, Decimal>,
    /// Sub-limit overrides for this year; items not listed keep the catalog
    /// sub-limit.
    pub item_limits: BTreeMap<ItemId, Decimal>,
    pub child_rates: ChildReliefRates,
    pub features: BTreeSet<Feature>,
    pub dividend_surcharge: Option<DividendSurcharge>,
    pub personal_rebate: PersonalRebate,
}

impl TaxYearConfig {
    pub fn has(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    /// Cap for `category`, or zero when the category has no limit this year.
    pub fn limit(&self, category: CategoryId) -> Decimal {
        self.category_limits
            .get(&category)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Checks the schedule is a well-formed progressive table.
    pub fn validate(&self) -> Result<(), TaxYearConfigError> {
        let Some((last, rest)) = self.brackets.split_last() else {
            return Err(TaxYearConfigError::NoBrackets(self.year));
        };

        let mut previous_bound = Decimal::ZERO;
        let mut previous_rate = Decimal::ZERO;
        for bracket in self.brackets.iter() {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(TaxYearConfigError::RateOutOfRange {
                    year: self.year,
                    rate: bracket.rate,
                });
            }
            if bracket.rate < previous_rate {
                return Err(TaxYearConfigError::RatesDecreasing {
                    year: self.year,
                    rate: bracket.rate,
                });
            }
            previous_rate = bracket.rate;
        }

        for bracket in rest {
            let Some(bound) = bracket.upper_bound else {
                return Err(TaxYearConfigError::UnboundedBeforeLast(self.year));
            };
            if bound <= previous_bound {
                return Err(TaxYearConfigError::BoundsNotIncreasing {
                    year: self.year,
                    bound,
                });
            }
            previous_bound = bound;
        }

        if last.upper_bound.is_some() {
            return Err(TaxYearConfigError::FinalBracketBounded(self.year));
        }

        Ok(())
    }
}
