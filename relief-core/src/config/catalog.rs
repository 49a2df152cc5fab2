//! Static catalog of deductible items.
//!
//! Each [`ItemId`] maps to exactly one home category. Sports items also fold
//! into lifestyle for years without a separate sports relief.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use strum::IntoEnumIterator;

use crate::models::{CategoryId, ItemId};

/// Year-independent facts about an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: ItemId,
    pub label: &'static str,
    pub category: CategoryId,
    /// Category the item is filed under when its home category is not
    /// offered for the year.
    pub folds_into: Option<CategoryId>,
    pub sub_limit: Option<Decimal>,
}

const fn item(
    id: ItemId,
    label: &'static str,
    category: CategoryId,
) -> CatalogEntry {
    CatalogEntry {
        id,
        label,
        category,
        folds_into: None,
        sub_limit: None,
    }
}

const fn capped(
    id: ItemId,
    label: &'static str,
    category: CategoryId,
    sub_limit: Decimal,
) -> CatalogEntry {
    CatalogEntry {
        id,
        label,
        category,
        folds_into: None,
        sub_limit: Some(sub_limit),
    }
}

const fn sports(
    id: ItemId,
    label: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        id,
        label,
        category: CategoryId::Sports,
        folds_into: Some(CategoryId::Lifestyle),
        sub_limit: None,
    }
}

pub const fn entry(id: ItemId) -> CatalogEntry {
    use CategoryId as C;
    use ItemId::*;

    match id {
        ParentMedical => item(id, "Parents' medical treatment", C::ParentCare),
        ParentCarer => item(id, "Parents' carer / care centre", C::ParentCare),
        ParentCheckup => capped(id, "Parents' medical examination", C::ParentCare, dec!(1000)),
        SupportingEquipment => item(id, "Basic supporting equipment", C::DisabledEquipment),
        TertiaryFees => item(id, "Tertiary / postgraduate course fees", C::Education),
        UpskillingCourse => capped(id, "Upskilling & self-enhancement course", C::Education, dec!(2000)),
        SeriousDisease => item(id, "Serious disease treatment", C::Medical),
        FertilityTreatment => item(id, "Fertility treatment", C::Medical),
        Vaccination => capped(id, "Vaccination", C::Medical, dec!(1000)),
        MedicalCheckup => capped(id, "Medical examination & screening", C::Medical, dec!(1000)),
        DentalTreatment => capped(id, "Dental examination & treatment", C::Medical, dec!(1000)),
        LearningDisability => capped(id, "Child learning disability intervention", C::Medical, dec!(4000)),
        Books => item(id, "Books, journals & newspapers", C::Lifestyle),
        PersonalComputer => item(id, "Computer, smartphone or tablet", C::Lifestyle),
        Internet => item(id, "Internet subscription", C::Lifestyle),
        SkillCourse => item(id, "Skill improvement course", C::Lifestyle),
        SportsEquipment => sports(id, "Sports equipment"),
        SportsFacility => sports(id, "Sports facility rental & entry"),
        SportsCompetition => sports(id, "Sports competition registration"),
        GymMembership => sports(id, "Gym membership & sports training"),
        BreastfeedingEquipment => item(id, "Breastfeeding equipment", C::Breastfeeding),
        ChildcareFees => item(id, "Registered childcare / kindergarten fees", C::Childcare),
        SspnDeposit => item(id, "SSPN net deposit", C::Sspn),
        EpfContribution => capped(id, "EPF contribution", C::LifeInsuranceEpf, dec!(4000)),
        LifeInsurance => capped(id, "Life insurance / family takaful", C::LifeInsuranceEpf, dec!(3000)),
        PrsContribution => item(id, "Private retirement scheme", C::PrsAnnuity),
        DeferredAnnuity => item(id, "Deferred annuity", C::PrsAnnuity),
        EducationInsurance => item(id, "Education insurance", C::EducationMedicalInsurance),
        MedicalInsurance => item(id, "Medical insurance", C::EducationMedicalInsurance),
        SocsoContribution => item(id, "SOCSO / EIS contribution", C::Socso),
        EvChargingFacility => item(id, "EV charging facility", C::EvCharging),
        FoodWasteComposter => item(id, "Food waste composting machine", C::EvCharging),
        FirstHomeLoanLowerTier => capped(
            id,
            "First home loan interest (price up to RM500,000)",
            C::HousingLoanInterest,
            dec!(7000),
        ),
        FirstHomeLoanUpperTier => capped(
            id,
            "First home loan interest (RM500,001 to RM750,000)",
            C::HousingLoanInterest,
            dec!(5000),
        ),
    }
}

pub fn category_of(id: ItemId) -> CategoryId {
    entry(id).category
}

/// Whether a receipt for `item` may be filed under `category` in some year.
pub fn belongs_to(
    item: ItemId,
    category: CategoryId,
) -> bool {
    let entry = entry(item);
    entry.category == category || entry.folds_into == Some(category)
}

/// Catalog entries whose home category is `category`, in declaration order.
pub fn items_in(category: CategoryId) -> impl Iterator<Item = CatalogEntry> {
    ItemId::iter()
        .map(entry)
        .filter(move |entry| entry.category == category)
}
