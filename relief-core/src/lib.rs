pub mod calculations;
pub mod config;
pub mod db;
pub mod format;
pub mod models;
pub mod suggest;

pub use calculations::{
    TaxSummary, build_categories_for_year, compute_category_stats, compute_tax, dividend_surcharge,
};
pub use config::resolve_config;
pub use db::repository::{ReliefRepository, RepositoryError};
pub use models::*;
