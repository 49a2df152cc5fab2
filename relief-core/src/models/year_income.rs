use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Income facts for one assessment year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearIncome {
    pub year: i32,
    pub employment: Decimal,
    pub dividend: Decimal,
    pub other: Decimal,
}

impl YearIncome {
    pub fn empty(year: i32) -> Self {
        Self {
            year,
            employment: Decimal::ZERO,
            dividend: Decimal::ZERO,
            other: Decimal::ZERO,
        }
    }

    /// Income that enters the bracket computation. Dividends are single-tier
    /// and only reach the dividend surcharge.
    pub fn aggregate(&self) -> Decimal {
        self.employment.max(Decimal::ZERO) + self.other.max(Decimal::ZERO)
    }

    pub fn gross(&self) -> Decimal {
        self.aggregate() + self.dividend.max(Decimal::ZERO)
    }
}
