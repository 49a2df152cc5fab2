//! Command handlers shared by the `relief` binary and its tests.
//!
//! Everything here is plain data in, plain data out. The binary owns the
//! runtime, argument parsing and printing.

use std::fmt;

use relief_core::calculations::TaxSummary;
use relief_core::db::{ReliefRepository, RepositoryError, RepositoryRegistry};
use relief_core::format::{format_currency, format_percent};
use relief_core::suggest::{Suggestion, suggest_category};
use relief_core::{CategoryStats, Receipt, UserProfile, YearIncome, compute_tax, dividend_surcharge};
use relief_db_sqlite::SqliteRepositoryFactory;
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Registry with every backend compiled into the binary.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

/// Everything the engine needs for one year of assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub profile: UserProfile,
    pub income: YearIncome,
    pub receipts: Vec<Receipt>,
}

/// Reads the profile, that year's income and that year's receipts.
/// A year with no recorded income is treated as all zeros.
pub async fn load_snapshot(
    repo: &dyn ReliefRepository,
    year: i32,
) -> Result<Snapshot, RepositoryError> {
    let profile = repo.get_profile().await?;
    let income = match repo.get_year_income(year).await {
        Ok(income) => income,
        Err(RepositoryError::NotFound) => {
            info!(year, "No income recorded for year, assuming zero");
            YearIncome::empty(year)
        }
        Err(e) => return Err(e),
    };
    let receipts = repo.list_receipts(Some(year)).await?;
    debug!(year, receipts = receipts.len(), "Loaded snapshot");

    Ok(Snapshot {
        profile,
        income,
        receipts,
    })
}

pub fn summarize(year: i32, snapshot: &Snapshot) -> TaxSummary {
    TaxSummary::compute(
        year,
        &snapshot.income,
        &snapshot.profile,
        &snapshot.receipts,
    )
}

// ─── reports ─────────────────────────────────────────────────────────────────

/// Text rendering of a [`TaxSummary`], category table included.
pub struct SummaryReport<'a>(pub &'a TaxSummary);

impl fmt::Display for SummaryReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = self.0;
        writeln!(f, "Year of assessment:  {}", s.year)?;
        writeln!(
            f,
            "Filing deadline:     {}",
            s.filing_deadline.format("%-d %B %Y")
        )?;
        writeln!(f, "Aggregate income:    {}", format_currency(s.aggregate_income))?;
        writeln!(f, "Dividend income:     {}", format_currency(s.dividend_income))?;
        writeln!(f, "Approved donations:  {}", format_currency(s.donation_deduction))?;
        writeln!(f, "Total relief:        {}", format_currency(s.total_relief))?;
        writeln!(f, "Chargeable income:   {}", format_currency(s.chargeable_income))?;
        writeln!(f, "Tax on brackets:     {}", format_currency(s.bracket_tax))?;
        writeln!(f, "Personal rebate:     {}", format_currency(s.personal_rebate))?;
        writeln!(f, "Zakat rebate:        {}", format_currency(s.zakat_rebate))?;
        writeln!(f, "Dividend surcharge:  {}", format_currency(s.dividend_surcharge))?;
        writeln!(f, "Tax payable:         {}", format_currency(s.tax_payable))?;
        writeln!(f, "Effective rate:      {}", format_percent(s.effective_rate))?;
        writeln!(f)?;
        write!(f, "{}", CategoryReport(&s.categories))
    }
}

/// One row per category: claimable, limit, share used and raw spend.
pub struct CategoryReport<'a>(pub &'a [CategoryStats]);

impl fmt::Display for CategoryReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(
            f,
            "{:<44} {:>15} {:>15} {:>8} {:>15}",
            "Category", "Claimable", "Limit", "Used", "Spent"
        )?;
        for stats in self.0 {
            let title = if stats.is_automatic {
                format!("{} (automatic)", stats.title)
            } else {
                stats.title.clone()
            };
            writeln!(
                f,
                "{:<44} {:>15} {:>15} {:>8} {:>15}",
                title,
                format_currency(stats.claimable),
                format_currency(stats.limit),
                format_percent(stats.percent_used),
                format_currency(stats.total_spent),
            )?;
        }
        let total: Decimal = self.0.iter().map(|s| s.claimable).sum();
        write!(f, "{:<44} {:>15}", "Total", format_currency(total))
    }
}

/// Bracket tax and dividend surcharge for an ad-hoc income figure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxQuote {
    pub year: i32,
    pub chargeable_income: Decimal,
    pub dividend_income: Decimal,
    pub bracket_tax: Decimal,
    pub dividend_surcharge: Decimal,
}

impl TaxQuote {
    pub fn total(&self) -> Decimal {
        self.bracket_tax + self.dividend_surcharge
    }
}

pub fn quote_tax(
    chargeable_income: Decimal,
    dividend_income: Decimal,
    year: i32,
) -> TaxQuote {
    TaxQuote {
        year,
        chargeable_income,
        dividend_income,
        bracket_tax: compute_tax(chargeable_income, year),
        dividend_surcharge: dividend_surcharge(dividend_income, year),
    }
}

impl fmt::Display for TaxQuote {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "Year of assessment:  {}", self.year)?;
        writeln!(f, "Chargeable income:   {}", format_currency(self.chargeable_income))?;
        writeln!(f, "Tax on brackets:     {}", format_currency(self.bracket_tax))?;
        writeln!(f, "Dividend income:     {}", format_currency(self.dividend_income))?;
        writeln!(f, "Dividend surcharge:  {}", format_currency(self.dividend_surcharge))?;
        write!(f, "Total tax:           {}", format_currency(self.total()))
    }
}

/// Suggestion line for a receipt description.
pub fn describe_suggestion(description: &str) -> String {
    match suggest_category(description) {
        Some(Suggestion { category, item }) => {
            format!("{} / {} ({category}/{item})", category.title(), item_label(item))
        }
        None => "No suggestion".to_string(),
    }
}

fn item_label(item: relief_core::ItemId) -> &'static str {
    relief_core::config::catalog::entry(item).label
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use relief_core::db::DbConfig;
    use relief_core::{CategoryId, ItemId, NewReceipt, ReceiptStatus};
    use rust_decimal_macros::dec;

    use super::*;

    async fn memory_repo() -> Box<dyn ReliefRepository> {
        build_registry()
            .create(&DbConfig::default())
            .await
            .expect("in-memory sqlite should open")
    }

    fn receipt(
        date: (i32, u32, u32),
        amount: Decimal,
        category: CategoryId,
        item: ItemId,
    ) -> NewReceipt {
        NewReceipt {
            status: ReceiptStatus::Verified,
            amount,
            description: format!("{item}"),
            category,
            sub_category: item,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            attachment: None,
        }
    }

    // =========================================================================
    // Registry and snapshot
    // =========================================================================

    #[test]
    fn registry_offers_sqlite() {
        assert_eq!(build_registry().available_backends(), vec!["sqlite"]);
    }

    #[tokio::test]
    async fn snapshot_of_empty_database_uses_defaults() {
        let repo = memory_repo().await;

        let snapshot = load_snapshot(&*repo, 2025).await.unwrap();

        assert_eq!(
            snapshot,
            Snapshot {
                profile: UserProfile::default(),
                income: YearIncome::empty(2025),
                receipts: vec![],
            }
        );
    }

    #[tokio::test]
    async fn snapshot_only_holds_requested_year() {
        let repo = memory_repo().await;
        repo.create_receipt(receipt(
            (2025, 3, 1),
            dec!(300),
            CategoryId::Lifestyle,
            ItemId::Books,
        ))
        .await
        .unwrap();
        repo.create_receipt(receipt(
            (2024, 12, 31),
            dec!(900),
            CategoryId::Lifestyle,
            ItemId::Books,
        ))
        .await
        .unwrap();
        repo.save_year_income(&YearIncome {
            year: 2025,
            employment: dec!(60000),
            dividend: dec!(0),
            other: dec!(0),
        })
        .await
        .unwrap();

        let snapshot = load_snapshot(&*repo, 2025).await.unwrap();

        assert_eq!(snapshot.receipts.len(), 1);
        assert_eq!(snapshot.receipts[0].amount, dec!(300));
        assert_eq!(snapshot.income.employment, dec!(60000));
    }

    #[tokio::test]
    async fn summary_from_snapshot_applies_receipts() {
        let repo = memory_repo().await;
        repo.create_receipt(receipt(
            (2025, 5, 5),
            dec!(3000),
            CategoryId::Lifestyle,
            ItemId::Books,
        ))
        .await
        .unwrap();
        repo.save_year_income(&YearIncome {
            year: 2025,
            employment: dec!(109000),
            dividend: dec!(0),
            other: dec!(0),
        })
        .await
        .unwrap();

        let snapshot = load_snapshot(&*repo, 2025).await.unwrap();
        let summary = summarize(2025, &snapshot);

        // individual 9000 plus lifestyle capped at 2500
        assert_eq!(summary.total_relief, dec!(11500));
        assert_eq!(summary.chargeable_income, dec!(97500));
    }

    // =========================================================================
    // Reports
    // =========================================================================

    #[test]
    fn tax_quote_report() {
        let quote = quote_tax(dec!(100000), dec!(0), 2025);

        assert_eq!(quote.bracket_tax, dec!(9400.00));
        assert_eq!(
            quote.to_string(),
            "Year of assessment:  2025\n\
             Chargeable income:   RM 100,000.00\n\
             Tax on brackets:     RM 9,400.00\n\
             Dividend income:     RM 0.00\n\
             Dividend surcharge:  RM 0.00\n\
             Total tax:           RM 9,400.00"
        );
    }

    #[test]
    fn tax_quote_adds_dividend_surcharge() {
        let quote = quote_tax(dec!(0), dec!(150000), 2025);

        assert_eq!(quote.bracket_tax, dec!(0));
        assert_eq!(quote.dividend_surcharge, dec!(1000.00));
        assert_eq!(quote.total(), dec!(1000.00));
    }

    #[test]
    fn category_report_marks_automatic_rows_and_totals() {
        let stats = vec![
            CategoryStats {
                category: CategoryId::Individual,
                title: "Individual".to_string(),
                limit: dec!(9000),
                claimable: dec!(9000),
                remaining: dec!(0),
                percent_used: dec!(100),
                total_spent: dec!(0),
                is_automatic: true,
            },
            CategoryStats {
                category: CategoryId::Lifestyle,
                title: "Lifestyle".to_string(),
                limit: dec!(2500),
                claimable: dec!(1250),
                remaining: dec!(1250),
                percent_used: dec!(50),
                total_spent: dec!(1250),
                is_automatic: false,
            },
        ];

        let report = CategoryReport(&stats).to_string();
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("Individual (automatic)"));
        assert!(lines[2].starts_with("Lifestyle "));
        assert!(lines[2].contains("50.00%"));
        assert!(lines[3].starts_with("Total"));
        assert!(lines[3].ends_with("RM 10,250.00"));
    }

    #[test]
    fn summary_report_lists_headline_figures() {
        let income = YearIncome {
            year: 2025,
            employment: dec!(109000),
            dividend: dec!(0),
            other: dec!(0),
        };
        let summary = TaxSummary::compute(2025, &income, &UserProfile::default(), &[]);

        let report = SummaryReport(&summary).to_string();

        assert!(report.contains("Chargeable income:   RM 100,000.00"));
        assert!(report.contains("Tax payable:         RM 9,400.00"));
        assert!(report.contains("Effective rate:      8.62%"));
        assert!(report.contains(&format!(
            "{} (automatic)",
            CategoryId::Individual.title()
        )));
    }

    #[test]
    fn suggestion_names_category_and_item() {
        assert_eq!(
            describe_suggestion("Kinokuniya books"),
            format!(
                "{} / {} (lifestyle/books)",
                CategoryId::Lifestyle.title(),
                item_label(ItemId::Books)
            )
        );
        assert_eq!(describe_suggestion("groceries"), "No suggestion");
    }
}
