use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MaritalStatus {
    #[default]
    Single,
    Married,
    Divorced,
    Widowed,
}

impl MaritalStatus {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

/// Number of children in each relief bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChildCounts {
    pub under_18: u32,
    /// 18 and above, in A-level, matriculation or similar.
    pub pre_university: u32,
    /// 18 and above, in diploma or degree-level education.
    pub degree_level: u32,
    /// Disabled children not in higher education.
    pub disabled: u32,
    /// Disabled children in diploma or degree-level education. Not counted
    /// again in `disabled`.
    pub disabled_higher_education: u32,
}

impl ChildCounts {
    pub fn total(&self) -> u32 {
        self.under_18
            + self.pre_university
            + self.degree_level
            + self.disabled
            + self.disabled_higher_education
    }
}

/// Taxpayer facts that drive automatic reliefs and category eligibility.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub marital_status: MaritalStatus,
    pub spouse_working: bool,
    pub spouse_disabled: bool,
    pub children: ChildCounts,
    pub self_disabled: bool,
    /// Zakat / fitrah paid during the year.
    pub zakat: Decimal,
    /// Approved donations and gifts made during the year.
    pub donations: Decimal,
}

impl UserProfile {
    pub fn is_married(&self) -> bool {
        self.marital_status == MaritalStatus::Married
    }

    /// True when anyone the taxpayer can claim disabled-equipment relief for
    /// is flagged as disabled.
    pub fn has_disabled_dependant(&self) -> bool {
        self.self_disabled
            || (self.is_married() && self.spouse_disabled)
            || self.children.disabled > 0
            || self.children.disabled_higher_education > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_single_without_dependants() {
        let profile = UserProfile::default();

        assert!(!profile.is_married());
        assert_eq!(profile.children.total(), 0);
        assert!(!profile.has_disabled_dependant());
    }

    #[test]
    fn disabled_child_counts_as_disabled_dependant() {
        let profile = UserProfile {
            children: ChildCounts {
                disabled: 1,
                ..ChildCounts::default()
            },
            ..UserProfile::default()
        };

        assert!(profile.has_disabled_dependant());
    }

    #[test]
    fn disabled_child_in_higher_education_counts_as_disabled_dependant() {
        let profile = UserProfile {
            children: ChildCounts {
                disabled_higher_education: 1,
                ..ChildCounts::default()
            },
            ..UserProfile::default()
        };

        assert!(profile.has_disabled_dependant());
        assert_eq!(profile.children.total(), 1);
    }

    #[test]
    fn spouse_disability_ignored_when_not_married() {
        let profile = UserProfile {
            marital_status: MaritalStatus::Divorced,
            spouse_disabled: true,
            ..UserProfile::default()
        };

        assert!(!profile.has_disabled_dependant());
    }
}
