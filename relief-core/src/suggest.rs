//! Best-effort category guess from a free-text receipt description.
//!
//! Used to pre-fill the category and item of imported receipts. The engine
//! never relies on it; a wrong guess is corrected when the receipt is
//! reviewed.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::models::{CategoryId, ItemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub category: CategoryId,
    pub item: ItemId,
}

/// Checked top to bottom; more specific phrases sit above general ones.
const KEYWORD_RULES: &[(&str, ItemId)] = &[
    (r"\b(vaccin\w*|vaksin|immuni[sz]ation|flu shot)\b", ItemId::Vaccination),
    (r"\b(dental|dentist|klinik pergigian|scaling|braces)\b", ItemId::DentalTreatment),
    (r"\b(health screening|medical check-?up|full body check|blood test|mammogram)\b", ItemId::MedicalCheckup),
    (r"\b(ivf|fertility)\b", ItemId::FertilityTreatment),
    (r"\b(dialysis|chemotherapy|cancer|heart surgery|serious disease)\b", ItemId::SeriousDisease),
    (r"\b(speech therapy|occupational therapy|autism|adhd|early intervention)\b", ItemId::LearningDisability),
    (r"\b(parent|mother|father|ibu|bapa)\b.*\b(hospital|clinic|klinik|treatment)\b", ItemId::ParentMedical),
    (r"\b(care centre|care center|nursing home|caregiver)\b", ItemId::ParentCarer),
    (r"\b(wheelchair|hearing aid|prosthe\w*|dialysis machine)\b", ItemId::SupportingEquipment),
    (r"\b(tuition fee|university|master'?s|phd|degree)\b", ItemId::TertiaryFees),
    (r"\b(upskill\w*|certification|professional course)\b", ItemId::UpskillingCourse),
    (r"\b(book|books|kinokuniya|popular bookstore|mph|newspaper|magazine|journal)\b", ItemId::Books),
    (r"\b(laptop|computer|smartphone|iphone|ipad|tablet|macbook)\b", ItemId::PersonalComputer),
    (r"\b(internet|broadband|unifi|fibre|fiber|maxis|celcom|digi|time dotcom)\b", ItemId::Internet),
    (r"\b(gym|fitness|yoga|pilates|personal trainer)\b", ItemId::GymMembership),
    (r"\b(decathlon|racket|racquet|badminton|bicycle|jersey|sports equipment)\b", ItemId::SportsEquipment),
    (r"\b(marathon|race entry|tournament|competition)\b", ItemId::SportsCompetition),
    (r"\b(court rental|futsal|swimming pool|golf)\b", ItemId::SportsFacility),
    (r"\b(breast ?pump|breastfeeding|nursing bra)\b", ItemId::BreastfeedingEquipment),
    (r"\b(kindergarten|tadika|taska|childcare|nursery)\b", ItemId::ChildcareFees),
    (r"\bsspn\b", ItemId::SspnDeposit),
    (r"\b(epf|kwsp)\b", ItemId::EpfContribution),
    (r"\b(prs|private retirement)\b", ItemId::PrsContribution),
    (r"\b(annuity)\b", ItemId::DeferredAnnuity),
    (r"\b(medical insurance|medical card|health insurance)\b", ItemId::MedicalInsurance),
    (r"\b(education insurance|education policy)\b", ItemId::EducationInsurance),
    (r"\b(life insurance|takaful|great eastern|prudential|aia)\b", ItemId::LifeInsurance),
    (r"\b(socso|perkeso|eis)\b", ItemId::SocsoContribution),
    (r"\b(ev charger|charging station|wallbox)\b", ItemId::EvChargingFacility),
    (r"\b(composter|food waste)\b", ItemId::FoodWasteComposter),
    (r"\b(clinic|klinik|hospital|pharmacy|farmasi|medical)\b", ItemId::SeriousDisease),
];

static RULES: Lazy<Vec<(Regex, ItemId)>> = Lazy::new(|| {
    KEYWORD_RULES
        .iter()
        .filter_map(|&(pattern, item)| {
            match Regex::new(&format!("(?i){pattern}")) {
                Ok(regex) => Some((regex, item)),
                Err(e) => {
                    error!(pattern, error = %e, "invalid suggestion pattern skipped");
                    None
                }
            }
        })
        .collect()
});

/// Guesses the category and item for `description`; the first matching
/// rule wins.
///
/// ```
/// use relief_core::models::{CategoryId, ItemId};
/// use relief_core::suggest::suggest_category;
///
/// let suggestion = suggest_category("Flu vaccination at Klinik Medijaya").unwrap();
/// assert_eq!(suggestion.category, CategoryId::Medical);
/// assert_eq!(suggestion.item, ItemId::Vaccination);
/// ```
pub fn suggest_category(description: &str) -> Option<Suggestion> {
    RULES
        .iter()
        .find(|(regex, _)| regex.is_match(description))
        .map(|&(_, item)| Suggestion {
            category: crate::config::catalog::category_of(item),
            item,
        })
}
