use std::io::Read;

use chrono::NaiveDate;
use relief_core::config::catalog;
use relief_core::format::parse_amount;
use relief_core::suggest::suggest_category;
use relief_core::{
    CategoryId, ItemId, NewReceipt, ReceiptError, ReceiptStatus, ReliefRepository,
    RepositoryError, YearIncome,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when importing receipts.
///
/// `row` is the 1-based data row, not counting the header line.
#[derive(Debug, Error)]
pub enum ReceiptLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("row {row}: unknown category '{value}'")]
    UnknownCategory { row: usize, value: String },

    #[error("row {row}: unknown sub-category '{value}'")]
    UnknownItem { row: usize, value: String },

    #[error("row {row}: unknown status '{value}'")]
    UnknownStatus { row: usize, value: String },

    #[error("row {row}: no category given and none could be suggested from the description")]
    UnclassifiedReceipt { row: usize },

    #[error("row {row}: {source}")]
    InvalidReceipt {
        row: usize,
        #[source]
        source: ReceiptError,
    },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for ReceiptLoaderError {
    fn from(err: csv::Error) -> Self {
        ReceiptLoaderError::CsvParse(err.to_string())
    }
}

/// Errors that can occur when importing yearly income.
#[derive(Debug, Error)]
pub enum IncomeLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for IncomeLoaderError {
    fn from(err: csv::Error) -> Self {
        IncomeLoaderError::CsvParse(err.to_string())
    }
}

/// Amounts may be written the way they appear on receipts, e.g.
/// `RM 1,234.50`.
fn deserialize_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_amount(&s).map_err(serde::de::Error::custom)
}

/// Like [`deserialize_amount`], but a blank cell reads as zero.
fn deserialize_amount_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if !s.trim().is_empty() => parse_amount(&s).map_err(serde::de::Error::custom),
        _ => Ok(Decimal::ZERO),
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// One line of a receipts CSV.
///
/// Columns: `date,description,amount,category,sub_category,status`. The last
/// three may be blank or absent.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ReceiptRecord {
    pub date: NaiveDate,
    pub description: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: Decimal,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Imports receipts exported from a bank statement or spreadsheet.
pub struct ReceiptLoader;

impl ReceiptLoader {
    pub fn parse<R: Read>(reader: R) -> Result<Vec<ReceiptRecord>, ReceiptLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: ReceiptRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Turns parsed records into validated receipts.
    ///
    /// A record with neither category nor sub-category is classified from
    /// its description. A sub-category on its own implies its home
    /// category. Blank status means the receipt still needs review.
    pub fn to_new_receipts(records: &[ReceiptRecord]) -> Result<Vec<NewReceipt>, ReceiptLoaderError> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| Self::to_new_receipt(index + 1, record))
            .collect()
    }

    fn to_new_receipt(
        row: usize,
        record: &ReceiptRecord,
    ) -> Result<NewReceipt, ReceiptLoaderError> {
        let (category, sub_category) = Self::classify(row, record)?;

        let status = match non_blank(&record.status) {
            Some(value) => value
                .parse::<ReceiptStatus>()
                .map_err(|_| ReceiptLoaderError::UnknownStatus {
                    row,
                    value: value.to_string(),
                })?,
            None => ReceiptStatus::Pending,
        };

        let receipt = NewReceipt {
            status,
            amount: record.amount,
            description: record.description.trim().to_string(),
            category,
            sub_category,
            date: record.date,
            attachment: None,
        };
        receipt
            .validate()
            .map_err(|source| ReceiptLoaderError::InvalidReceipt { row, source })?;

        Ok(receipt)
    }

    fn classify(
        row: usize,
        record: &ReceiptRecord,
    ) -> Result<(CategoryId, ItemId), ReceiptLoaderError> {
        let category = non_blank(&record.category)
            .map(|value| {
                value
                    .parse::<CategoryId>()
                    .map_err(|_| ReceiptLoaderError::UnknownCategory {
                        row,
                        value: value.to_string(),
                    })
            })
            .transpose()?;
        let item = non_blank(&record.sub_category)
            .map(|value| {
                value
                    .parse::<ItemId>()
                    .map_err(|_| ReceiptLoaderError::UnknownItem {
                        row,
                        value: value.to_string(),
                    })
            })
            .transpose()?;

        match (category, item) {
            (Some(category), Some(item)) => Ok((category, item)),
            (None, Some(item)) => Ok((catalog::category_of(item), item)),
            (Some(_), None) => Err(ReceiptLoaderError::UnclassifiedReceipt { row }),
            (None, None) => {
                let suggestion = suggest_category(&record.description)
                    .ok_or(ReceiptLoaderError::UnclassifiedReceipt { row })?;
                debug!(
                    row,
                    description = %record.description,
                    category = %suggestion.category,
                    item = %suggestion.item,
                    "classified receipt from description"
                );
                Ok((suggestion.category, suggestion.item))
            }
        }
    }

    /// Stores every receipt and returns how many were created. A failure
    /// stores nothing, so a failed import can simply be re-run.
    pub async fn load<R: ReliefRepository + ?Sized>(
        repo: &R,
        receipts: &[NewReceipt],
    ) -> Result<usize, ReceiptLoaderError> {
        let created = repo.create_receipts(receipts.to_vec()).await?;
        Ok(created.len())
    }
}

/// One line of an income CSV: `year,employment,dividend,other`. Blank
/// amounts read as zero.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IncomeRecord {
    pub year: i32,
    #[serde(default, deserialize_with = "deserialize_amount_or_zero")]
    pub employment: Decimal,
    #[serde(default, deserialize_with = "deserialize_amount_or_zero")]
    pub dividend: Decimal,
    #[serde(default, deserialize_with = "deserialize_amount_or_zero")]
    pub other: Decimal,
}

impl From<&IncomeRecord> for YearIncome {
    fn from(record: &IncomeRecord) -> Self {
        YearIncome {
            year: record.year,
            employment: record.employment,
            dividend: record.dividend,
            other: record.other,
        }
    }
}

pub struct IncomeLoader;

impl IncomeLoader {
    pub fn parse<R: Read>(reader: R) -> Result<Vec<IncomeRecord>, IncomeLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: IncomeRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Upserts one income record per year. A later row for the same year
    /// replaces an earlier one, so loading is idempotent.
    pub async fn load<R: ReliefRepository + ?Sized>(
        repo: &R,
        records: &[IncomeRecord],
    ) -> Result<usize, IncomeLoaderError> {
        for record in records {
            repo.save_year_income(&YearIncome::from(record)).await?;
        }
        Ok(records.len())
    }
}
