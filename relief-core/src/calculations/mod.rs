//! The relief and tax engine.
//!
//! All functions here are pure: they take a snapshot of the taxpayer's data
//! and return a fresh result. Callers recompute whenever inputs change.

pub mod category_builder;
pub mod category_claims;
pub mod common;
pub mod progressive_tax;
pub mod tax_summary;

pub use category_builder::{build_categories_for_year, child_relief};
pub use category_claims::{apply_relief_caps, compute_category_stats};
pub use progressive_tax::{TaxSchedule, compute_tax, dividend_surcharge};
pub use tax_summary::TaxSummary;
