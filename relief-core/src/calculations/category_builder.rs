//! Builds the ordered list of relief categories a profile qualifies for.
//!
//! Everything that varies by year comes from the resolved
//! [`TaxYearConfig`]: limits from `category_limits`, item overrides from
//! `item_limits` and item availability from `features`. Nothing here
//! branches on the year number itself.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::{catalog, resolve_config};
use crate::models::{
    CategoryConfig, CategoryId, ChildCounts, ChildReliefRates, DeductibleItem, Feature, ItemId,
    SharedPool, TaxYearConfig, UserProfile,
};

/// Combined cap on vaccination, medical examination and dental treatment.
const MEDICAL_SCREENING_POOL_LIMIT: Decimal = dec!(1000);

/// Receipt-driven categories in display order.
const MANUAL_CATEGORIES: [CategoryId; 15] = [
    CategoryId::ParentCare,
    CategoryId::DisabledEquipment,
    CategoryId::Education,
    CategoryId::Medical,
    CategoryId::Lifestyle,
    CategoryId::Sports,
    CategoryId::Breastfeeding,
    CategoryId::Childcare,
    CategoryId::Sspn,
    CategoryId::LifeInsuranceEpf,
    CategoryId::PrsAnnuity,
    CategoryId::EducationMedicalInsurance,
    CategoryId::Socso,
    CategoryId::EvCharging,
    CategoryId::HousingLoanInterest,
];

/// Feature an item needs before it is offered.
fn required_feature(id: ItemId) -> Option<Feature> {
    match id {
        ItemId::DentalTreatment => Some(Feature::DentalTreatment),
        ItemId::EvChargingFacility => Some(Feature::EvChargingFacility),
        ItemId::FoodWasteComposter => Some(Feature::FoodWasteComposter),
        ItemId::FirstHomeLoanLowerTier | ItemId::FirstHomeLoanUpperTier => {
            Some(Feature::FirstHomeLoanInterest)
        }
        _ => None,
    }
}

/// Categories `profile` can claim in `year`: automatic reliefs first, then
/// receipt-driven ones.
pub fn build_categories_for_year(
    year: i32,
    profile: &UserProfile,
) -> Vec<CategoryConfig> {
    let config = resolve_config(year);

    let mut categories = automatic_categories(config, profile);
    categories.extend(
        MANUAL_CATEGORIES
            .iter()
            .filter_map(|&id| manual_category(config, profile, id)),
    );
    categories
}

/// Total child relief: each count times its per-child rate. A disabled child
/// in higher education earns the disabled rate plus the higher-education
/// rate.
pub fn child_relief(
    children: &ChildCounts,
    rates: &ChildReliefRates,
) -> Decimal {
    Decimal::from(children.under_18) * rates.under_18
        + Decimal::from(children.pre_university) * rates.pre_university
        + Decimal::from(children.degree_level) * rates.degree_level
        + Decimal::from(children.disabled) * rates.disabled
        + Decimal::from(children.disabled_higher_education)
            * (rates.disabled + rates.disabled_higher_education)
}

fn automatic_categories(
    config: &TaxYearConfig,
    profile: &UserProfile,
) -> Vec<CategoryConfig> {
    let mut categories = vec![automatic(CategoryId::Individual, config.limit(CategoryId::Individual))];

    if profile.self_disabled {
        categories.push(automatic(
            CategoryId::DisabledIndividual,
            config.limit(CategoryId::DisabledIndividual),
        ));
    }
    if profile.is_married() && !profile.spouse_working {
        categories.push(automatic(CategoryId::Spouse, config.limit(CategoryId::Spouse)));
    }
    if profile.is_married() && profile.spouse_disabled {
        categories.push(automatic(
            CategoryId::DisabledSpouse,
            config.limit(CategoryId::DisabledSpouse),
        ));
    }

    let child_total = child_relief(&profile.children, &config.child_rates);
    if child_total > Decimal::ZERO {
        categories.push(automatic(CategoryId::Child, child_total));
    }

    categories
}

fn automatic(
    id: CategoryId,
    limit: Decimal,
) -> CategoryConfig {
    CategoryConfig {
        id,
        title: id.title().to_string(),
        limit,
        items: Vec::new(),
        shared_pools: Vec::new(),
        is_automatic: true,
    }
}

fn manual_category(
    config: &TaxYearConfig,
    profile: &UserProfile,
    id: CategoryId,
) -> Option<CategoryConfig> {
    match id {
        CategoryId::DisabledEquipment if !profile.has_disabled_dependant() => return None,
        CategoryId::Sports if !config.has(Feature::SeparateSportsRelief) => return None,
        _ => {}
    }

    let limit = config.limit(id);
    let items = items_for(config, id);
    if limit <= Decimal::ZERO || items.is_empty() {
        return None;
    }

    let shared_pools = pools_for(id, &items);
    Some(CategoryConfig {
        id,
        title: id.title().to_string(),
        limit,
        items,
        shared_pools,
        is_automatic: false,
    })
}

fn items_for(
    config: &TaxYearConfig,
    category: CategoryId,
) -> Vec<DeductibleItem> {
    let folded = if category == CategoryId::Lifestyle && !config.has(Feature::SeparateSportsRelief) {
        Some(CategoryId::Sports)
    } else {
        None
    };

    catalog::items_in(category)
        .chain(folded.into_iter().flat_map(catalog::items_in))
        .filter(|entry| required_feature(entry.id).is_none_or(|feature| config.has(feature)))
        .map(|entry| DeductibleItem {
            id: entry.id,
            label: entry.label.to_string(),
            category,
            sub_limit: config.item_limits.get(&entry.id).copied().or(entry.sub_limit),
        })
        .collect()
}

fn pools_for(
    category: CategoryId,
    items: &[DeductibleItem],
) -> Vec<SharedPool> {
    if category != CategoryId::Medical {
        return Vec::new();
    }

    let members: BTreeSet<ItemId> = items
        .iter()
        .map(|item| item.id)
        .filter(|id| {
            matches!(
                id,
                ItemId::Vaccination | ItemId::MedicalCheckup | ItemId::DentalTreatment
            )
        })
        .collect();

    if members.is_empty() {
        return Vec::new();
    }
    vec![SharedPool {
        label: "Vaccination, examination & dental".to_string(),
        limit: MEDICAL_SCREENING_POOL_LIMIT,
        members,
    }]
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::calculations::compute_category_stats;
    use crate::models::{MaritalStatus, Receipt, ReceiptStatus};

    fn ids(categories: &[CategoryConfig]) -> Vec<CategoryId> {
        categories.iter().map(|c| c.id).collect()
    }

    fn find(
        categories: &[CategoryConfig],
        id: CategoryId,
    ) -> Option<&CategoryConfig> {
        categories.iter().find(|c| c.id == id)
    }

    fn married(spouse_working: bool) -> UserProfile {
        UserProfile {
            marital_status: MaritalStatus::Married,
            spouse_working,
            ..UserProfile::default()
        }
    }

    // =========================================================================
    // Automatic categories
    // =========================================================================

    #[test]
    fn single_profile_gets_individual_relief_only() {
        let categories = build_categories_for_year(2025, &UserProfile::default());
        let automatic: Vec<_> = categories.iter().filter(|c| c.is_automatic).collect();

        assert_eq!(automatic.len(), 1);
        assert_eq!(automatic[0].id, CategoryId::Individual);
        assert_eq!(automatic[0].limit, dec!(9000));
    }

    #[test]
    fn automatic_categories_come_first() {
        let categories = build_categories_for_year(2025, &married(false));

        assert_eq!(&ids(&categories)[..2], &[CategoryId::Individual, CategoryId::Spouse]);
    }

    #[test]
    fn working_spouse_gets_no_spouse_relief() {
        let categories = build_categories_for_year(2025, &married(true));

        assert!(find(&categories, CategoryId::Spouse).is_none());
    }

    #[test]
    fn disabled_spouse_relief_requires_marriage() {
        let single = UserProfile {
            spouse_disabled: true,
            ..UserProfile::default()
        };
        let mut wed = married(true);
        wed.spouse_disabled = true;

        assert!(find(&build_categories_for_year(2025, &single), CategoryId::DisabledSpouse).is_none());
        assert_eq!(
            find(&build_categories_for_year(2025, &wed), CategoryId::DisabledSpouse).map(|c| c.limit),
            Some(dec!(6000))
        );
    }

    #[test]
    fn self_disabled_limit_follows_year() {
        let profile = UserProfile {
            self_disabled: true,
            ..UserProfile::default()
        };

        let limit_for = |year| {
            find(&build_categories_for_year(year, &profile), CategoryId::DisabledIndividual)
                .map(|c| c.limit)
        };

        assert_eq!(limit_for(2024), Some(dec!(6000)));
        assert_eq!(limit_for(2025), Some(dec!(7000)));
    }

    #[test]
    fn child_relief_is_derived_from_counts() {
        let profile = UserProfile {
            children: ChildCounts {
                under_18: 2,
                degree_level: 1,
                disabled: 1,
                disabled_higher_education: 1,
                ..ChildCounts::default()
            },
            ..married(true)
        };

        let categories = build_categories_for_year(2025, &profile);

        // 2 * 2000 + 8000 + 8000 + (8000 + 8000)
        assert_eq!(
            find(&categories, CategoryId::Child).map(|c| c.limit),
            Some(dec!(36000))
        );
    }

    #[test]
    fn disabled_child_in_higher_education_earns_both_rates() {
        let profile = UserProfile {
            children: ChildCounts {
                disabled_higher_education: 1,
                ..ChildCounts::default()
            },
            ..UserProfile::default()
        };

        let categories = build_categories_for_year(2024, &profile);

        // 6000 disabled + 8000 higher education
        assert_eq!(
            find(&categories, CategoryId::Child).map(|c| c.limit),
            Some(dec!(14000))
        );
        assert!(find(&categories, CategoryId::DisabledEquipment).is_some());
    }

    #[test]
    fn no_children_means_no_child_category() {
        let categories = build_categories_for_year(2025, &UserProfile::default());

        assert!(find(&categories, CategoryId::Child).is_none());
    }

    // =========================================================================
    // Manual categories
    // =========================================================================

    #[test]
    fn disabled_equipment_requires_a_disability() {
        let plain = build_categories_for_year(2025, &UserProfile::default());
        let with_child = build_categories_for_year(
            2025,
            &UserProfile {
                children: ChildCounts {
                    disabled: 1,
                    ..ChildCounts::default()
                },
                ..UserProfile::default()
            },
        );

        assert!(find(&plain, CategoryId::DisabledEquipment).is_none());
        assert!(find(&with_child, CategoryId::DisabledEquipment).is_some());
    }

    #[test]
    fn dental_is_offered_from_2024() {
        let has_dental = |year| {
            find(&build_categories_for_year(year, &UserProfile::default()), CategoryId::Medical)
                .and_then(|c| c.item(ItemId::DentalTreatment))
                .is_some()
        };

        assert!(!has_dental(2023));
        assert!(has_dental(2024));
    }

    #[test]
    fn sports_folds_into_lifestyle_before_2024() {
        let categories = build_categories_for_year(2023, &UserProfile::default());
        let lifestyle = find(&categories, CategoryId::Lifestyle).unwrap();

        assert!(find(&categories, CategoryId::Sports).is_none());
        assert_eq!(
            lifestyle.item(ItemId::GymMembership).map(|i| i.category),
            Some(CategoryId::Lifestyle)
        );
    }

    #[test]
    fn sports_is_separate_from_2024() {
        let categories = build_categories_for_year(2024, &UserProfile::default());
        let lifestyle = find(&categories, CategoryId::Lifestyle).unwrap();

        assert_eq!(
            find(&categories, CategoryId::Sports).map(|c| c.limit),
            Some(dec!(1000))
        );
        assert!(lifestyle.item(ItemId::GymMembership).is_none());
    }

    #[test]
    fn medical_pool_members_follow_features() {
        let pool_members = |year| {
            find(&build_categories_for_year(year, &UserProfile::default()), CategoryId::Medical)
                .map(|c| c.shared_pools[0].members.clone())
                .unwrap_or_default()
        };

        assert_eq!(
            pool_members(2023),
            BTreeSet::from([ItemId::Vaccination, ItemId::MedicalCheckup])
        );
        assert_eq!(
            pool_members(2025),
            BTreeSet::from([ItemId::Vaccination, ItemId::MedicalCheckup, ItemId::DentalTreatment])
        );
    }

    #[test]
    fn item_limit_override_replaces_catalog_sub_limit() {
        let sub_limit = |year| {
            find(&build_categories_for_year(year, &UserProfile::default()), CategoryId::Medical)
                .and_then(|c| c.item(ItemId::LearningDisability))
                .and_then(|i| i.sub_limit)
        };

        assert_eq!(sub_limit(2024), Some(dec!(4000)));
        assert_eq!(sub_limit(2025), Some(dec!(6000)));
    }

    #[test]
    fn housing_loan_interest_only_when_enabled() {
        let has_housing = |year| {
            find(&build_categories_for_year(year, &UserProfile::default()), CategoryId::HousingLoanInterest)
                .is_some()
        };

        assert!(!has_housing(2024));
        assert!(has_housing(2025));
    }

    #[test]
    fn food_waste_composter_joins_ev_charging_in_2025() {
        let categories = build_categories_for_year(2025, &UserProfile::default());
        let ev = find(&categories, CategoryId::EvCharging).unwrap();

        assert!(ev.item(ItemId::FoodWasteComposter).is_some());
        assert!(
            find(&build_categories_for_year(2024, &UserProfile::default()), CategoryId::EvCharging)
                .and_then(|c| c.item(ItemId::FoodWasteComposter))
                .is_none()
        );
    }

    #[test]
    fn building_twice_gives_same_list() {
        let profile = married(false);

        assert_eq!(
            build_categories_for_year(2024, &profile),
            build_categories_for_year(2024, &profile)
        );
    }

    // =========================================================================
    // End to end
    // =========================================================================

    #[test]
    fn vaccination_over_sub_limit_claims_one_thousand() {
        let stamp = Utc.with_ymd_and_hms(2025, 2, 3, 10, 0, 0).unwrap();
        let receipt = Receipt {
            id: 1,
            status: ReceiptStatus::Verified,
            amount: dec!(1200),
            description: "Flu vaccination".to_string(),
            category: CategoryId::Medical,
            sub_category: ItemId::Vaccination,
            date: NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(),
            attachment: None,
            created_at: stamp,
            updated_at: stamp,
        };

        let categories = build_categories_for_year(2025, &UserProfile::default());
        let medical = find(&categories, CategoryId::Medical).unwrap();
        let stats = compute_category_stats(medical, &[receipt]);

        assert_eq!(medical.limit, dec!(10000));
        assert_eq!(stats.claimable, dec!(1000));
        assert_eq!(stats.total_spent, dec!(1200));
        assert_eq!(stats.remaining, dec!(9000));
    }
}
