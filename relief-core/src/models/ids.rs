use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Relief categories recognised by LHDN for resident individuals.
///
/// The string form (`"medical"`, `"life_insurance_epf"`, ...) is what gets
/// stored in the database and accepted in CSV imports.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CategoryId {
    Individual,
    DisabledIndividual,
    Spouse,
    DisabledSpouse,
    Child,
    ParentCare,
    DisabledEquipment,
    Education,
    Medical,
    Lifestyle,
    Sports,
    Breastfeeding,
    Childcare,
    Sspn,
    LifeInsuranceEpf,
    PrsAnnuity,
    EducationMedicalInsurance,
    Socso,
    EvCharging,
    HousingLoanInterest,
}

impl CategoryId {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Human-readable title shown next to the category totals.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Individual => "Individual & dependent relatives",
            Self::DisabledIndividual => "Disabled individual",
            Self::Spouse => "Spouse / alimony",
            Self::DisabledSpouse => "Disabled spouse",
            Self::Child => "Child relief",
            Self::ParentCare => "Medical treatment & care for parents",
            Self::DisabledEquipment => "Basic supporting equipment (disabled)",
            Self::Education => "Education fees (self)",
            Self::Medical => "Medical expenses",
            Self::Lifestyle => "Lifestyle",
            Self::Sports => "Sports activities",
            Self::Breastfeeding => "Breastfeeding equipment",
            Self::Childcare => "Childcare & kindergarten fees",
            Self::Sspn => "SSPN net deposit",
            Self::LifeInsuranceEpf => "Life insurance & EPF",
            Self::PrsAnnuity => "PRS & deferred annuity",
            Self::EducationMedicalInsurance => "Education & medical insurance",
            Self::Socso => "SOCSO & EIS contributions",
            Self::EvCharging => "EV charging & composting",
            Self::HousingLoanInterest => "First home loan interest",
        }
    }
}

/// Leaf expense types a receipt can be filed under.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ItemId {
    // parent care
    ParentMedical,
    ParentCarer,
    ParentCheckup,
    // disabled equipment
    SupportingEquipment,
    // education
    TertiaryFees,
    UpskillingCourse,
    // medical
    SeriousDisease,
    FertilityTreatment,
    Vaccination,
    MedicalCheckup,
    DentalTreatment,
    LearningDisability,
    // lifestyle
    Books,
    PersonalComputer,
    Internet,
    SkillCourse,
    // sports
    SportsEquipment,
    SportsFacility,
    SportsCompetition,
    GymMembership,
    // single-item categories
    BreastfeedingEquipment,
    ChildcareFees,
    SspnDeposit,
    // life insurance & EPF
    EpfContribution,
    LifeInsurance,
    // PRS
    PrsContribution,
    DeferredAnnuity,
    // insurance
    EducationInsurance,
    MedicalInsurance,
    SocsoContribution,
    // EV
    EvChargingFacility,
    FoodWasteComposter,
    // housing
    FirstHomeLoanLowerTier,
    FirstHomeLoanUpperTier,
}

impl ItemId {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn category_id_string_form_is_snake_case() {
        assert_eq!(CategoryId::LifeInsuranceEpf.as_str(), "life_insurance_epf");
        assert_eq!(CategoryId::Medical.to_string(), "medical");
    }

    #[test]
    fn category_id_parses_its_own_string_form() {
        assert_eq!(
            CategoryId::from_str("education_medical_insurance"),
            Ok(CategoryId::EducationMedicalInsurance)
        );
    }

    #[test]
    fn unknown_category_string_is_rejected() {
        assert!(CategoryId::from_str("groceries").is_err());
    }

    #[test]
    fn item_id_string_form_is_snake_case() {
        assert_eq!(ItemId::FirstHomeLoanLowerTier.as_str(), "first_home_loan_lower_tier");
        assert_eq!(ItemId::from_str("vaccination"), Ok(ItemId::Vaccination));
    }
}
