//! Static per-year tax rules and the resolver that picks one for any year.

pub mod catalog;
mod years;

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use tracing::warn;

use crate::models::TaxYearConfig;

static TAX_YEAR_CONFIGS: Lazy<YearTables> =
    Lazy::new(|| YearTables::new(years::newest(), years::earlier()));

/// Rule tables keyed by assessment year. Always holds at least the newest
/// year, so a nearest match always exists.
struct YearTables {
    newest: TaxYearConfig,
    earlier: BTreeMap<i32, TaxYearConfig>,
}

impl YearTables {
    /// Tables in `earlier` that are not older than `newest` are dropped.
    fn new(
        newest: TaxYearConfig,
        earlier: impl IntoIterator<Item = TaxYearConfig>,
    ) -> Self {
        let earlier = earlier
            .into_iter()
            .filter(|config| config.year < newest.year)
            .map(|config| (config.year, config))
            .collect();
        Self { newest, earlier }
    }

    fn years(&self) -> Vec<i32> {
        self.earlier
            .keys()
            .copied()
            .chain([self.newest.year])
            .collect()
    }

    fn get(
        &self,
        year: i32,
    ) -> Option<&TaxYearConfig> {
        if year == self.newest.year {
            Some(&self.newest)
        } else {
            self.earlier.get(&year)
        }
    }

    /// Closest table to `year`; on a tie the earlier year wins.
    fn nearest(
        &self,
        year: i32,
    ) -> &TaxYearConfig {
        let distance = |config: &TaxYearConfig| (i64::from(config.year) - i64::from(year)).abs();

        let below = self.earlier.range(..=year).next_back();
        let above = self.earlier.range(year..).next();

        below
            .into_iter()
            .chain(above)
            .map(|(_, config)| config)
            .fold(&self.newest, |best, candidate| {
                let closer = distance(candidate) < distance(best);
                let tied_earlier = distance(candidate) == distance(best) && candidate.year < best.year;
                if closer || tied_earlier { candidate } else { best }
            })
    }
}

/// Assessment years with their own rule table, oldest first.
pub fn configured_years() -> Vec<i32> {
    TAX_YEAR_CONFIGS.years()
}

/// Returns the rules for `year`.
///
/// Years without a table use the nearest configured year: the newest table
/// for future years, the oldest for years before it. A fallback is logged
/// at warn level and never fails.
///
/// ```
/// use relief_core::config::resolve_config;
///
/// assert_eq!(resolve_config(2024).year, 2024);
/// assert_eq!(resolve_config(9999).year, 2025);
/// assert_eq!(resolve_config(1990).year, 2022);
/// ```
pub fn resolve_config(year: i32) -> &'static TaxYearConfig {
    if let Some(config) = TAX_YEAR_CONFIGS.get(year) {
        return config;
    }

    let config = TAX_YEAR_CONFIGS.nearest(year);
    warn!(
        requested = year,
        resolved = config.year,
        "no tax rules configured for year; using nearest configured year"
    );
    config
}
