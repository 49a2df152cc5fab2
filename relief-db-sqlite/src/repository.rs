use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use relief_core::{
    CategoryId, ChildCounts, ItemId, MaritalStatus, NewReceipt, Receipt, ReceiptStatus,
    ReliefRepository, RepositoryError, UserProfile, YearIncome,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;

use crate::decimal::{decimal_to_text, get_decimal};

const RECEIPT_COLUMNS: &str = "id, status, amount, description, category, sub_category, date, \
                               attachment, created_at, updated_at";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connects to `database_url`, creating the database file if it does not
    /// exist. Accepts bare paths, `sqlite:` URLs and `:memory:`.
    pub async fn new(database_url: &str) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| RepositoryError::Connection(format!("{database_url}: {e}")))?
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{database_url}: {e}")))?;
        Ok(Self { pool })
    }

    pub fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to run migrations: {e}")))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn get<'r, T>(
    row: &'r SqliteRow,
    column: &str,
) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column)
        .map_err(|e| RepositoryError::Database(format!("Failed to get {column}: {e}")))
}

/// Reads a snake_case enum column.
fn get_enum<T>(
    row: &SqliteRow,
    column: &str,
) -> Result<T, RepositoryError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let text: String = get(row, column)?;
    text.parse().map_err(|e| {
        RepositoryError::Database(format!("Unknown value '{text}' in column '{column}': {e}"))
    })
}

fn get_count(
    row: &SqliteRow,
    column: &str,
) -> Result<u32, RepositoryError> {
    let value: i64 = get(row, column)?;
    u32::try_from(value)
        .map_err(|_| RepositoryError::Database(format!("Invalid count {value} in column '{column}'")))
}

fn row_to_receipt(row: &SqliteRow) -> Result<Receipt, RepositoryError> {
    Ok(Receipt {
        id: get(row, "id")?,
        status: get_enum::<ReceiptStatus>(row, "status")?,
        amount: get_decimal(row, "amount")?,
        description: get(row, "description")?,
        category: get_enum::<CategoryId>(row, "category")?,
        sub_category: get_enum::<ItemId>(row, "sub_category")?,
        date: get::<NaiveDate>(row, "date")?,
        attachment: get(row, "attachment")?,
        created_at: get::<DateTime<Utc>>(row, "created_at")?,
        updated_at: get::<DateTime<Utc>>(row, "updated_at")?,
    })
}

fn row_to_profile(row: &SqliteRow) -> Result<UserProfile, RepositoryError> {
    Ok(UserProfile {
        marital_status: get_enum::<MaritalStatus>(row, "marital_status")?,
        spouse_working: get(row, "spouse_working")?,
        spouse_disabled: get(row, "spouse_disabled")?,
        children: ChildCounts {
            under_18: get_count(row, "children_under_18")?,
            pre_university: get_count(row, "children_pre_university")?,
            degree_level: get_count(row, "children_degree_level")?,
            disabled: get_count(row, "children_disabled")?,
            disabled_higher_education: get_count(row, "children_disabled_higher_education")?,
        },
        self_disabled: get(row, "self_disabled")?,
        zakat: get_decimal(row, "zakat")?,
        donations: get_decimal(row, "donations")?,
    })
}

fn row_to_income(row: &SqliteRow) -> Result<YearIncome, RepositoryError> {
    Ok(YearIncome {
        year: get(row, "year")?,
        employment: get_decimal(row, "employment")?,
        dividend: get_decimal(row, "dividend")?,
        other: get_decimal(row, "other")?,
    })
}

/// Inserts one receipt and returns its new id.
async fn insert_receipt<'e, E>(
    executor: E,
    receipt: &NewReceipt,
    now: DateTime<Utc>,
) -> Result<i64, RepositoryError>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query(
        "INSERT INTO receipts (
            status, amount, description, category, sub_category, date, attachment,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(receipt.status.as_str())
    .bind(decimal_to_text(receipt.amount))
    .bind(receipt.description.clone())
    .bind(receipt.category.as_str())
    .bind(receipt.sub_category.as_str())
    .bind(receipt.date)
    .bind(receipt.attachment.clone())
    .bind(now)
    .bind(now)
    .execute(executor)
    .await
    .map_err(db_err)?;

    Ok(result.last_insert_rowid())
}

#[async_trait]
impl ReliefRepository for SqliteRepository {
    async fn create_receipt(
        &self,
        receipt: NewReceipt,
    ) -> Result<Receipt, RepositoryError> {
        let id = insert_receipt(&self.pool, &receipt, Utc::now()).await?;
        self.get_receipt(id).await
    }

    async fn create_receipts(
        &self,
        receipts: Vec<NewReceipt>,
    ) -> Result<Vec<Receipt>, RepositoryError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let mut ids = Vec::with_capacity(receipts.len());
        for receipt in &receipts {
            // Dropping `tx` on error rolls back the rows already inserted.
            ids.push(insert_receipt(&mut *tx, receipt, now).await?);
        }
        tx.commit().await.map_err(db_err)?;

        let mut created = Vec::with_capacity(ids.len());
        for id in ids {
            created.push(self.get_receipt(id).await?);
        }
        Ok(created)
    }

    async fn get_receipt(
        &self,
        id: i64,
    ) -> Result<Receipt, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {RECEIPT_COLUMNS} FROM receipts WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or(RepositoryError::NotFound)?;

        row_to_receipt(&row)
    }

    async fn update_receipt(
        &self,
        receipt: &Receipt,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE receipts SET
                status = ?, amount = ?, description = ?, category = ?, sub_category = ?,
                date = ?, attachment = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(receipt.status.as_str())
        .bind(decimal_to_text(receipt.amount))
        .bind(&receipt.description)
        .bind(receipt.category.as_str())
        .bind(receipt.sub_category.as_str())
        .bind(receipt.date)
        .bind(&receipt.attachment)
        .bind(Utc::now())
        .bind(receipt.id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete_receipt(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM receipts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_receipts(
        &self,
        year: Option<i32>,
    ) -> Result<Vec<Receipt>, RepositoryError> {
        let rows = match year {
            Some(year) => {
                sqlx::query(&format!(
                    "SELECT {RECEIPT_COLUMNS} FROM receipts
                     WHERE CAST(strftime('%Y', date) AS INTEGER) = ?
                     ORDER BY date, id"
                ))
                .bind(year)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!("SELECT {RECEIPT_COLUMNS} FROM receipts ORDER BY date, id"))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(db_err)?;

        rows.iter().map(row_to_receipt).collect()
    }

    async fn get_profile(&self) -> Result<UserProfile, RepositoryError> {
        let row = sqlx::query("SELECT * FROM user_profile WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        match row {
            Some(row) => row_to_profile(&row),
            None => Ok(UserProfile::default()),
        }
    }

    async fn save_profile(
        &self,
        profile: &UserProfile,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO user_profile (
                id, marital_status, spouse_working, spouse_disabled,
                children_under_18, children_pre_university, children_degree_level,
                children_disabled, children_disabled_higher_education,
                self_disabled, zakat, donations, updated_at
            ) VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                marital_status = excluded.marital_status,
                spouse_working = excluded.spouse_working,
                spouse_disabled = excluded.spouse_disabled,
                children_under_18 = excluded.children_under_18,
                children_pre_university = excluded.children_pre_university,
                children_degree_level = excluded.children_degree_level,
                children_disabled = excluded.children_disabled,
                children_disabled_higher_education = excluded.children_disabled_higher_education,
                self_disabled = excluded.self_disabled,
                zakat = excluded.zakat,
                donations = excluded.donations,
                updated_at = excluded.updated_at",
        )
        .bind(profile.marital_status.as_str())
        .bind(profile.spouse_working)
        .bind(profile.spouse_disabled)
        .bind(i64::from(profile.children.under_18))
        .bind(i64::from(profile.children.pre_university))
        .bind(i64::from(profile.children.degree_level))
        .bind(i64::from(profile.children.disabled))
        .bind(i64::from(profile.children.disabled_higher_education))
        .bind(profile.self_disabled)
        .bind(decimal_to_text(profile.zakat))
        .bind(decimal_to_text(profile.donations))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn get_year_income(
        &self,
        year: i32,
    ) -> Result<YearIncome, RepositoryError> {
        let row = sqlx::query(
            "SELECT year, employment, dividend, other FROM year_income WHERE year = ?",
        )
        .bind(year)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_income(&row)
    }

    async fn save_year_income(
        &self,
        income: &YearIncome,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO year_income (year, employment, dividend, other, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (year) DO UPDATE SET
                employment = excluded.employment,
                dividend = excluded.dividend,
                other = excluded.other,
                updated_at = excluded.updated_at",
        )
        .bind(income.year)
        .bind(decimal_to_text(income.employment))
        .bind(decimal_to_text(income.dividend))
        .bind(decimal_to_text(income.other))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn list_income_years(&self) -> Result<Vec<i32>, RepositoryError> {
        let rows = sqlx::query("SELECT year FROM year_income ORDER BY year")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.iter().map(|row| get(row, "year")).collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    async fn setup_test_db() -> SqliteRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        let repo = SqliteRepository::new_with_pool(pool);
        repo.run_migrations()
            .await
            .expect("Failed to run migrations");
        repo
    }

    fn date(
        year: i32,
        month: u32,
        day: u32,
    ) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn new_receipt(
        on: NaiveDate,
        amount: rust_decimal::Decimal,
    ) -> NewReceipt {
        NewReceipt {
            status: ReceiptStatus::Verified,
            amount,
            description: "Klinik Kesihatan vaccination".to_string(),
            category: CategoryId::Medical,
            sub_category: ItemId::Vaccination,
            date: on,
            attachment: None,
        }
    }

    // =========================================================================
    // Receipts
    // =========================================================================

    #[tokio::test]
    async fn create_and_get_receipt() {
        let repo = setup_test_db().await;

        let created = repo
            .create_receipt(new_receipt(date(2025, 3, 14), dec!(150.50)))
            .await
            .expect("create failed");
        let fetched = repo.get_receipt(created.id).await.expect("get failed");

        assert_eq!(fetched, created);
        assert_eq!(fetched.amount, dec!(150.50));
        assert_eq!(fetched.category, CategoryId::Medical);
        assert_eq!(fetched.sub_category, ItemId::Vaccination);
        assert_eq!(fetched.status, ReceiptStatus::Verified);
        assert_eq!(fetched.date, date(2025, 3, 14));
    }

    #[tokio::test]
    async fn create_receipts_stores_whole_batch() {
        let repo = setup_test_db().await;

        let created = repo
            .create_receipts(vec![
                new_receipt(date(2025, 1, 5), dec!(100)),
                new_receipt(date(2025, 2, 5), dec!(200)),
            ])
            .await
            .expect("batch create failed");

        assert_eq!(created.len(), 2);
        assert_eq!(repo.list_receipts(None).await.unwrap(), created);
    }

    #[tokio::test]
    async fn failed_batch_leaves_no_receipts_behind() {
        let repo = setup_test_db().await;
        sqlx::query(
            "CREATE TRIGGER reject_marked BEFORE INSERT ON receipts
             WHEN NEW.description = 'reject me'
             BEGIN SELECT RAISE(ABORT, 'rejected'); END",
        )
        .execute(repo.pool())
        .await
        .unwrap();

        let mut rejected = new_receipt(date(2025, 3, 5), dec!(300));
        rejected.description = "reject me".to_string();
        let result = repo
            .create_receipts(vec![
                new_receipt(date(2025, 1, 5), dec!(100)),
                new_receipt(date(2025, 2, 5), dec!(200)),
                rejected,
            ])
            .await;

        assert!(matches!(result, Err(RepositoryError::Database(msg)) if msg.contains("rejected")));
        assert_eq!(repo.list_receipts(None).await, Ok(vec![]));
    }

    #[tokio::test]
    async fn get_missing_receipt_is_not_found() {
        let repo = setup_test_db().await;

        assert_eq!(repo.get_receipt(42).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn update_receipt_persists_changes() {
        let repo = setup_test_db().await;
        let mut receipt = repo
            .create_receipt(new_receipt(date(2025, 3, 14), dec!(150)))
            .await
            .unwrap();

        receipt.amount = dec!(175.25);
        receipt.status = ReceiptStatus::NeedsReview;
        receipt.attachment = Some("scans/0001.jpg".to_string());
        repo.update_receipt(&receipt).await.unwrap();

        let fetched = repo.get_receipt(receipt.id).await.unwrap();
        assert_eq!(fetched.amount, dec!(175.25));
        assert_eq!(fetched.status, ReceiptStatus::NeedsReview);
        assert_eq!(fetched.attachment.as_deref(), Some("scans/0001.jpg"));
        assert!(fetched.updated_at >= fetched.created_at);
    }

    #[tokio::test]
    async fn update_missing_receipt_is_not_found() {
        let repo = setup_test_db().await;
        let mut receipt = repo
            .create_receipt(new_receipt(date(2025, 1, 1), dec!(10)))
            .await
            .unwrap();
        receipt.id += 100;

        assert_eq!(repo.update_receipt(&receipt).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn delete_receipt_removes_it() {
        let repo = setup_test_db().await;
        let receipt = repo
            .create_receipt(new_receipt(date(2025, 1, 1), dec!(10)))
            .await
            .unwrap();

        repo.delete_receipt(receipt.id).await.unwrap();

        assert_eq!(repo.get_receipt(receipt.id).await, Err(RepositoryError::NotFound));
        assert_eq!(repo.delete_receipt(receipt.id).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn list_receipts_orders_by_date_then_id() {
        let repo = setup_test_db().await;
        let late = repo.create_receipt(new_receipt(date(2025, 6, 1), dec!(1))).await.unwrap();
        let early = repo.create_receipt(new_receipt(date(2025, 2, 1), dec!(2))).await.unwrap();
        let early_too = repo.create_receipt(new_receipt(date(2025, 2, 1), dec!(3))).await.unwrap();

        let ids: Vec<i64> = repo.list_receipts(None).await.unwrap().iter().map(|r| r.id).collect();

        assert_eq!(ids, vec![early.id, early_too.id, late.id]);
    }

    #[tokio::test]
    async fn list_receipts_filters_by_year() {
        let repo = setup_test_db().await;
        repo.create_receipt(new_receipt(date(2024, 12, 31), dec!(1))).await.unwrap();
        let in_year = repo.create_receipt(new_receipt(date(2025, 1, 1), dec!(2))).await.unwrap();
        repo.create_receipt(new_receipt(date(2026, 1, 1), dec!(3))).await.unwrap();

        let listed = repo.list_receipts(Some(2025)).await.unwrap();

        assert_eq!(listed, vec![in_year]);
    }

    // =========================================================================
    // Profile
    // =========================================================================

    #[tokio::test]
    async fn profile_defaults_before_first_save() {
        let repo = setup_test_db().await;

        assert_eq!(repo.get_profile().await, Ok(UserProfile::default()));
    }

    #[tokio::test]
    async fn save_profile_upserts_single_row() {
        let repo = setup_test_db().await;
        let mut profile = UserProfile {
            marital_status: MaritalStatus::Married,
            spouse_disabled: true,
            children: ChildCounts {
                under_18: 2,
                disabled: 1,
                ..ChildCounts::default()
            },
            zakat: dec!(1200.50),
            ..UserProfile::default()
        };

        repo.save_profile(&profile).await.unwrap();
        assert_eq!(repo.get_profile().await, Ok(profile.clone()));

        profile.children.under_18 = 3;
        profile.donations = dec!(500);
        repo.save_profile(&profile).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_profile")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(repo.get_profile().await, Ok(profile));
    }

    // =========================================================================
    // Year income
    // =========================================================================

    #[tokio::test]
    async fn missing_year_income_is_not_found() {
        let repo = setup_test_db().await;

        assert_eq!(repo.get_year_income(2025).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn save_year_income_upserts_per_year() {
        let repo = setup_test_db().await;
        let mut income = YearIncome {
            year: 2025,
            employment: dec!(96000),
            dividend: dec!(120000),
            other: dec!(0),
        };

        repo.save_year_income(&income).await.unwrap();
        income.other = dec!(4500.75);
        repo.save_year_income(&income).await.unwrap();
        repo.save_year_income(&YearIncome::empty(2023)).await.unwrap();

        assert_eq!(repo.get_year_income(2025).await, Ok(income));
        assert_eq!(repo.list_income_years().await, Ok(vec![2023, 2025]));
    }
}
