//! Rule tables for each configured assessment year.
//!
//! Amounts follow the LHDN resident individual relief schedule (Form BE)
//! for each year. A new year is added by writing one more constructor here,
//! returning it from [`newest`] and moving the previous one into
//! [`earlier`].

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{
    CategoryId, ChildReliefRates, DividendSurcharge, Feature, ItemId, PersonalRebate, TaxBracket,
    TaxYearConfig,
};

/// Every configured year before [`newest`].
pub(crate) fn earlier() -> Vec<TaxYearConfig> {
    vec![ya2022(), ya2023(), ya2024()]
}

pub(crate) fn newest() -> TaxYearConfig {
    ya2025()
}

/// Returns are due 30 April of the year after the assessment year.
fn filing_deadline(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year + 1, 4, 30).unwrap_or(NaiveDate::MAX)
}

/// Schedule in force up to YA2022.
fn brackets_before_2023() -> Vec<TaxBracket> {
    vec![
        TaxBracket::capped(dec!(5000), dec!(0)),
        TaxBracket::capped(dec!(20000), dec!(0.01)),
        TaxBracket::capped(dec!(35000), dec!(0.03)),
        TaxBracket::capped(dec!(50000), dec!(0.08)),
        TaxBracket::capped(dec!(70000), dec!(0.13)),
        TaxBracket::capped(dec!(100000), dec!(0.21)),
        TaxBracket::capped(dec!(250000), dec!(0.24)),
        TaxBracket::capped(dec!(400000), dec!(0.245)),
        TaxBracket::capped(dec!(600000), dec!(0.25)),
        TaxBracket::capped(dec!(1000000), dec!(0.26)),
        TaxBracket::capped(dec!(2000000), dec!(0.28)),
        TaxBracket::unbounded(dec!(0.30)),
    ]
}

/// Schedule from YA2023 (Budget 2023 cut the 35k–100k rates by 2 points).
fn brackets_from_2023() -> Vec<TaxBracket> {
    vec![
        TaxBracket::capped(dec!(5000), dec!(0)),
        TaxBracket::capped(dec!(20000), dec!(0.01)),
        TaxBracket::capped(dec!(35000), dec!(0.03)),
        TaxBracket::capped(dec!(50000), dec!(0.06)),
        TaxBracket::capped(dec!(70000), dec!(0.11)),
        TaxBracket::capped(dec!(100000), dec!(0.19)),
        TaxBracket::capped(dec!(400000), dec!(0.25)),
        TaxBracket::capped(dec!(600000), dec!(0.26)),
        TaxBracket::capped(dec!(2000000), dec!(0.28)),
        TaxBracket::unbounded(dec!(0.30)),
    ]
}

fn base_limits() -> BTreeMap<CategoryId, Decimal> {
    use CategoryId::*;

    BTreeMap::from([
        (Individual, dec!(9000)),
        (DisabledIndividual, dec!(6000)),
        (Spouse, dec!(4000)),
        (DisabledSpouse, dec!(5000)),
        (ParentCare, dec!(8000)),
        (DisabledEquipment, dec!(6000)),
        (Education, dec!(7000)),
        (Medical, dec!(10000)),
        (Lifestyle, dec!(2500)),
        (Breastfeeding, dec!(1000)),
        (Childcare, dec!(3000)),
        (Sspn, dec!(8000)),
        (LifeInsuranceEpf, dec!(7000)),
        (PrsAnnuity, dec!(3000)),
        (EducationMedicalInsurance, dec!(3000)),
        (Socso, dec!(350)),
        (EvCharging, dec!(2500)),
    ])
}

fn base_child_rates() -> ChildReliefRates {
    ChildReliefRates {
        under_18: dec!(2000),
        pre_university: dec!(2000),
        degree_level: dec!(8000),
        disabled: dec!(6000),
        disabled_higher_education: dec!(8000),
    }
}

fn personal_rebate() -> PersonalRebate {
    PersonalRebate {
        income_ceiling: dec!(35000),
        amount: dec!(400),
    }
}

fn ya2022() -> TaxYearConfig {
    let mut category_limits = base_limits();
    category_limits.insert(CategoryId::Medical, dec!(8000));

    TaxYearConfig {
        year: 2022,
        filing_deadline: filing_deadline(2022),
        brackets: brackets_before_2023(),
        category_limits,
        item_limits: BTreeMap::new(),
        child_rates: base_child_rates(),
        features: BTreeSet::from([Feature::EvChargingFacility]),
        dividend_surcharge: None,
        personal_rebate: personal_rebate(),
    }
}

fn ya2023() -> TaxYearConfig {
    TaxYearConfig {
        year: 2023,
        filing_deadline: filing_deadline(2023),
        brackets: brackets_from_2023(),
        category_limits: base_limits(),
        item_limits: BTreeMap::new(),
        child_rates: base_child_rates(),
        features: BTreeSet::from([Feature::EvChargingFacility]),
        dividend_surcharge: None,
        personal_rebate: personal_rebate(),
    }
}

fn ya2024() -> TaxYearConfig {
    let mut category_limits = base_limits();
    category_limits.insert(CategoryId::Sports, dec!(1000));

    TaxYearConfig {
        year: 2024,
        filing_deadline: filing_deadline(2024),
        brackets: brackets_from_2023(),
        category_limits,
        item_limits: BTreeMap::new(),
        child_rates: base_child_rates(),
        features: BTreeSet::from([
            Feature::DentalTreatment,
            Feature::SeparateSportsRelief,
            Feature::EvChargingFacility,
        ]),
        dividend_surcharge: None,
        personal_rebate: personal_rebate(),
    }
}

fn ya2025() -> TaxYearConfig {
    let mut category_limits = base_limits();
    category_limits.insert(CategoryId::Sports, dec!(1000));
    category_limits.insert(CategoryId::DisabledIndividual, dec!(7000));
    category_limits.insert(CategoryId::DisabledSpouse, dec!(6000));
    category_limits.insert(CategoryId::EducationMedicalInsurance, dec!(4000));
    category_limits.insert(CategoryId::HousingLoanInterest, dec!(7000));

    TaxYearConfig {
        year: 2025,
        filing_deadline: filing_deadline(2025),
        brackets: brackets_from_2023(),
        category_limits,
        item_limits: BTreeMap::from([(ItemId::LearningDisability, dec!(6000))]),
        child_rates: ChildReliefRates {
            disabled: dec!(8000),
            ..base_child_rates()
        },
        features: BTreeSet::from([
            Feature::DentalTreatment,
            Feature::SeparateSportsRelief,
            Feature::EvChargingFacility,
            Feature::FoodWasteComposter,
            Feature::FirstHomeLoanInterest,
        ]),
        dividend_surcharge: Some(DividendSurcharge {
            threshold: dec!(100000),
            rate: dec!(0.02),
        }),
        personal_rebate: personal_rebate(),
    }
}
