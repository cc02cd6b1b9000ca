//! Popup repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::{NewPopup, Popup, PopupCandidate};
use domain::services::{PopupStore, StoreError};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::store_error;
use crate::entities::{PopupEntity, PopupTypeDb, PopupWithSeenCountEntity, PopupWithSeenEntity};
use crate::metrics::QueryTimer;

const POPUP_COLUMNS: &str = "p.id, p.title, p.message, p.popup_type, p.is_active, p.expires_at, \
    p.target_student_id, p.created_at, p.updated_at";

/// Repository for popup-related database operations.
#[derive(Clone)]
pub struct PopupRepository {
    pool: PgPool,
}

impl PopupRepository {
    /// Creates a new PopupRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a popup.
    pub async fn create(&self, popup: &NewPopup) -> Result<PopupEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_popup");
        let result = Self::insert(&self.pool, popup).await;
        timer.finish(result)
    }

    /// The popup INSERT on any executor, so callers can run it inside their
    /// own transaction.
    pub(crate) async fn insert<'e, E>(executor: E, popup: &NewPopup) -> Result<PopupEntity, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            r#"
            INSERT INTO popups AS p (title, message, popup_type, is_active, expires_at, target_student_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            POPUP_COLUMNS
        );
        sqlx::query_as::<_, PopupEntity>(&query)
            .bind(&popup.title)
            .bind(&popup.message)
            .bind(PopupTypeDb::from(popup.popup_type))
            .bind(popup.is_active)
            .bind(popup.expires_at)
            .bind(popup.target_student_id)
            .fetch_one(executor)
            .await
    }

    /// Find a popup by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PopupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_popup_by_id");
        let query = format!("SELECT {} FROM popups p WHERE p.id = $1", POPUP_COLUMNS);
        let result = sqlx::query_as::<_, PopupEntity>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.finish(result)
    }

    /// List every popup newest-first with the size of its seen set.
    pub async fn list_with_seen_counts(&self) -> Result<Vec<PopupWithSeenCountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_popups_with_seen_counts");
        let query = format!(
            r#"
            SELECT {}, COUNT(s.student_id) AS seen_count
            FROM popups p
            LEFT JOIN popup_seen_by s ON s.popup_id = p.id
            GROUP BY p.id
            ORDER BY p.created_at DESC, p.id
            "#,
            POPUP_COLUMNS
        );
        let result = sqlx::query_as::<_, PopupWithSeenCountEntity>(&query)
            .fetch_all(&self.pool)
            .await;
        timer.finish(result)
    }

    /// Seen count for one popup.
    pub async fn seen_count(&self, id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_popup_seen_by");
        let result =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM popup_seen_by WHERE popup_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await;
        timer.finish(result)
    }

    /// Overwrite the editable fields of a popup.
    pub async fn update(&self, popup: &Popup) -> Result<Option<PopupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_popup");
        let query = format!(
            r#"
            UPDATE popups AS p
            SET title = $2, message = $3, popup_type = $4, is_active = $5, expires_at = $6
            WHERE p.id = $1
            RETURNING {}
            "#,
            POPUP_COLUMNS
        );
        let result = sqlx::query_as::<_, PopupEntity>(&query)
            .bind(popup.id)
            .bind(&popup.title)
            .bind(&popup.message)
            .bind(PopupTypeDb::from(popup.popup_type))
            .bind(popup.is_active)
            .bind(popup.expires_at)
            .fetch_optional(&self.pool)
            .await;
        timer.finish(result)
    }

    /// Flip `is_active`.
    pub async fn toggle_active(&self, id: Uuid) -> Result<Option<PopupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("toggle_popup_active");
        let query = format!(
            "UPDATE popups AS p SET is_active = NOT p.is_active WHERE p.id = $1 RETURNING {}",
            POPUP_COLUMNS
        );
        let result = sqlx::query_as::<_, PopupEntity>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.finish(result)
    }

    /// Delete a popup and its seen set. Returns false if it did not exist.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_popup");
        let result = sqlx::query("DELETE FROM popups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        Ok(timer.finish(result)?.rows_affected() > 0)
    }

    /// Active, unexpired popups addressed to the student, flagged as seen or not.
    pub async fn list_candidates(
        &self,
        student_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<PopupWithSeenEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_popup_candidates");
        let query = format!(
            r#"
            SELECT {},
                   EXISTS (
                       SELECT 1 FROM popup_seen_by s
                       WHERE s.popup_id = p.id AND s.student_id = $1
                   ) AS seen
            FROM popups p
            WHERE p.is_active
              AND (p.expires_at IS NULL OR p.expires_at > $2)
              AND (p.target_student_id IS NULL OR p.target_student_id = $1)
            ORDER BY p.created_at DESC
            "#,
            POPUP_COLUMNS
        );
        let result = sqlx::query_as::<_, PopupWithSeenEntity>(&query)
            .bind(student_id)
            .bind(now)
            .fetch_all(&self.pool)
            .await;
        timer.finish(result)
    }
}

#[async_trait::async_trait]
impl PopupStore for PopupRepository {
    async fn create_popup(&self, popup: NewPopup) -> Result<Popup, StoreError> {
        self.create(&popup)
            .await
            .map(Popup::from)
            .map_err(store_error)
    }

    async fn candidates_for(
        &self,
        student_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<PopupCandidate>, StoreError> {
        Ok(self
            .list_candidates(student_id, now)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(PopupCandidate::from)
            .collect())
    }

    async fn mark_seen(&self, popup_id: Uuid, student_id: Uuid) -> Result<bool, StoreError> {
        let timer = QueryTimer::new("mark_popup_seen");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            WITH target AS (SELECT id FROM popups WHERE id = $1),
            inserted AS (
                INSERT INTO popup_seen_by (popup_id, student_id)
                SELECT id, $2 FROM target
                ON CONFLICT (popup_id, student_id) DO NOTHING
            )
            SELECT EXISTS (SELECT 1 FROM target)
            "#,
        )
        .bind(popup_id)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await;
        timer.finish(result).map_err(store_error)
    }
}
