mod category;
mod ids;
mod receipt;
mod tax_bracket;
mod tax_year_config;
mod user_profile;
mod year_income;

pub use category::{CategoryConfig, CategoryStats, DeductibleItem, SharedPool};
pub use ids::{CategoryId, ItemId};
pub use receipt::{NewReceipt, Receipt, ReceiptError, ReceiptStatus, receipts_for_year};
pub use tax_bracket::TaxBracket;
pub use tax_year_config::{
    ChildReliefRates, DividendSurcharge, Feature, PersonalRebate, TaxYearConfig,
    TaxYearConfigError,
};
pub use user_profile::{ChildCounts, MaritalStatus, UserProfile};
pub use year_income::YearIncome;
