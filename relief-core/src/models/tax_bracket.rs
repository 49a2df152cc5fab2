use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One step of a progressive schedule.
///
/// Income up to `upper_bound` (inclusive) that was not already consumed by a
/// lower bracket is taxed at `rate`. `None` marks the open-ended top bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxBracket {
    pub const fn capped(upper_bound: Decimal, rate: Decimal) -> Self {
        Self {
            upper_bound: Some(upper_bound),
            rate,
        }
    }

    pub const fn unbounded(rate: Decimal) -> Self {
        Self {
            upper_bound: None,
            rate,
        }
    }
}
