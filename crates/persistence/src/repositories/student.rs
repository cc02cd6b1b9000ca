//! Student repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::{Account, AccountStatus, LifecycleChange, NewPopup, Popup, RegisterStudentRequest};
use domain::services::{AccountStore, StoreError};
use sqlx::PgPool;
use uuid::Uuid;

use super::popup::PopupRepository;
use super::store_error;
use crate::entities::{AccountEntity, AccountStatusDb, PopupEntity, StudentEntity};
use crate::metrics::QueryTimer;

const STUDENT_COLUMNS: &str = "id, username, first_name, last_name, birthday, address, \
    contact_num, email, program_and_year, scholarship, password_hash, status, approved_at, \
    warning_sent_at, created_at, updated_at";

const ACCOUNT_COLUMNS: &str = "id, username, email, first_name, status, approved_at, warning_sent_at";

/// Repository for student-related database operations.
#[derive(Clone)]
pub struct StudentRepository {
    pool: PgPool,
}

impl StudentRepository {
    /// Creates a new StudentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert a newly registered student with status `pending`.
    pub async fn create(
        &self,
        request: &RegisterStudentRequest,
        password_hash: &str,
    ) -> Result<StudentEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_student");
        let query = format!(
            r#"
            INSERT INTO students (username, first_name, last_name, birthday, address,
                                  contact_num, email, program_and_year, scholarship,
                                  password_hash, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'pending')
            RETURNING {}
            "#,
            STUDENT_COLUMNS
        );
        let result = sqlx::query_as::<_, StudentEntity>(&query)
            .bind(&request.username)
            .bind(request.first_name.trim())
            .bind(request.last_name.trim())
            .bind(request.birthday)
            .bind(request.address.trim())
            .bind(&request.contact_num)
            .bind(request.email.trim())
            .bind(request.program_and_year.trim())
            .bind(request.scholarship.as_deref())
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await;
        timer.finish(result)
    }

    /// Find a student by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<StudentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_student_by_id");
        let query = format!("SELECT {} FROM students WHERE id = $1", STUDENT_COLUMNS);
        let result = sqlx::query_as::<_, StudentEntity>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.finish(result)
    }

    /// Find a student by username, case-insensitively.
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StudentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_student_by_username");
        let query = format!(
            "SELECT {} FROM students WHERE LOWER(username) = LOWER($1)",
            STUDENT_COLUMNS
        );
        let result = sqlx::query_as::<_, StudentEntity>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await;
        timer.finish(result)
    }

    /// List students newest-first, optionally filtered by status.
    pub async fn list(
        &self,
        status: Option<AccountStatusDb>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StudentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_students");
        let query = format!(
            r#"
            SELECT {}
            FROM students
            WHERE ($1::account_status IS NULL OR status = $1)
            ORDER BY created_at DESC, id
            LIMIT $2 OFFSET $3
            "#,
            STUDENT_COLUMNS
        );
        let result = sqlx::query_as::<_, StudentEntity>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await;
        timer.finish(result)
    }

    /// Count students, optionally filtered by status.
    pub async fn count(&self, status: Option<AccountStatusDb>) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_students");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM students WHERE ($1::account_status IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Claims the warning slot and inserts the popup in one transaction.
    /// Returns `None`, writing nothing, when the student is gone or already
    /// warned.
    async fn record_warning_tx(
        &self,
        id: Uuid,
        popup: &NewPopup,
        at: DateTime<Utc>,
    ) -> Result<Option<PopupEntity>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query(
            "UPDATE students SET warning_sent_at = $2 WHERE id = $1 AND warning_sent_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if claimed == 0 {
            return Ok(None);
        }

        let stored = PopupRepository::insert(&mut *tx, popup).await?;
        tx.commit().await?;
        Ok(Some(stored))
    }

    async fn execute_update(
        &self,
        query_name: &'static str,
        query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
        id: Uuid,
    ) -> Result<(), StoreError> {
        let timer = QueryTimer::new(query_name);
        let result = query.execute(&self.pool).await;
        match timer.finish(result).map_err(store_error)?.rows_affected() {
            0 => Err(StoreError::NotFound(format!("student {}", id))),
            _ => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl AccountStore for StudentRepository {
    async fn list_approved(&self) -> Result<Vec<Account>, StoreError> {
        let timer = QueryTimer::new("list_approved_students");
        let query = format!(
            "SELECT {} FROM students WHERE approved_at IS NOT NULL ORDER BY approved_at",
            ACCOUNT_COLUMNS
        );
        let result = sqlx::query_as::<_, AccountEntity>(&query)
            .fetch_all(&self.pool)
            .await;
        Ok(timer
            .finish(result)
            .map_err(store_error)?
            .into_iter()
            .map(Account::from)
            .collect())
    }

    async fn find_account(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let timer = QueryTimer::new("find_student_account");
        let query = format!("SELECT {} FROM students WHERE id = $1", ACCOUNT_COLUMNS);
        let result = sqlx::query_as::<_, AccountEntity>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        Ok(timer.finish(result).map_err(store_error)?.map(Account::from))
    }

    async fn update_status(&self, id: Uuid, status: AccountStatus) -> Result<(), StoreError> {
        let query = sqlx::query("UPDATE students SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(AccountStatusDb::from(status));
        self.execute_update("update_student_status", query, id).await
    }

    async fn record_warning(
        &self,
        id: Uuid,
        popup: NewPopup,
        at: DateTime<Utc>,
    ) -> Result<Popup, StoreError> {
        let timer = QueryTimer::new("record_student_warning");
        let result = self.record_warning_tx(id, &popup, at).await;
        match timer.finish(result).map_err(store_error)? {
            Some(entity) => Ok(Popup::from(entity)),
            None => Err(StoreError::NotFound(format!("unwarned student {}", id))),
        }
    }

    async fn apply_change(&self, id: Uuid, change: &LifecycleChange) -> Result<(), StoreError> {
        let query = sqlx::query(
            r#"
            UPDATE students
            SET status = $2, approved_at = $3, warning_sent_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(AccountStatusDb::from(change.status))
        .bind(change.approved_at)
        .bind(change.warning_sent_at);
        self.execute_update("apply_student_lifecycle_change", query, id).await
    }

    async fn delete_account(&self, id: Uuid) -> Result<bool, StoreError> {
        let timer = QueryTimer::new("delete_student");
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        Ok(timer.finish(result).map_err(store_error)?.rows_affected() > 0)
    }
}
