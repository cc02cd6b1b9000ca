//! Application repository for database operations.

use domain::models::DocumentReference;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{
    AdminApplicationEntity, ApplicationDocumentEntity, ApplicationEntity,
    ApplicationWithProgramEntity, RequirementStatusDb,
};
use crate::metrics::QueryTimer;

const APPLICATION_COLUMNS: &str = "a.id, a.student_id, a.program_id, a.requirement_status, \
    a.remarks, a.notification, a.remarks_viewed, a.created_at, a.updated_at";

/// Values for a new application and its documents.
#[derive(Debug, Clone)]
pub struct NewApplication<'a> {
    pub student_id: Uuid,
    pub program_id: Uuid,
    pub notification: String,
    pub documents: &'a [DocumentReference],
}

/// Repository for application-related database operations.
#[derive(Clone)]
pub struct ApplicationRepository {
    pool: PgPool,
}

impl ApplicationRepository {
    /// Creates a new ApplicationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an application and its documents in one transaction.
    pub async fn create(&self, new: NewApplication<'_>) -> Result<ApplicationEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_application");
        let mut tx = self.pool.begin().await?;

        let query = format!(
            r#"
            INSERT INTO applications AS a (student_id, program_id, requirement_status, notification)
            VALUES ($1, $2, 'submitted', $3)
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        );
        let application = sqlx::query_as::<_, ApplicationEntity>(&query)
            .bind(new.student_id)
            .bind(new.program_id)
            .bind(&new.notification)
            .fetch_one(&mut *tx)
            .await?;

        for doc in new.documents {
            sqlx::query(
                r#"
                INSERT INTO application_documents (application_id, doc_name, file_path, file_type)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(application.id)
            .bind(doc.doc_name.trim())
            .bind(&doc.file_path)
            .bind(&doc.file_type)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(application)
    }

    /// True if the student already has a submitted application for the program.
    pub async fn has_open_application(
        &self,
        student_id: Uuid,
        program_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("has_open_application");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM applications
                WHERE student_id = $1 AND program_id = $2 AND requirement_status = 'submitted'
            )
            "#,
        )
        .bind(student_id)
        .bind(program_id)
        .fetch_one(&self.pool)
        .await;
        timer.finish(result)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ApplicationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_application_by_id");
        let query = format!("SELECT {} FROM applications a WHERE a.id = $1", APPLICATION_COLUMNS);
        let result = sqlx::query_as::<_, ApplicationEntity>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.finish(result)
    }

    /// A student's applications with program names, newest first.
    pub async fn list_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<ApplicationWithProgramEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_applications_for_student");
        let query = format!(
            r#"
            SELECT {}, p.program_name
            FROM applications a
            JOIN programs p ON p.id = a.program_id
            WHERE a.student_id = $1
            ORDER BY a.created_at DESC, a.id
            "#,
            APPLICATION_COLUMNS
        );
        let result = sqlx::query_as::<_, ApplicationWithProgramEntity>(&query)
            .bind(student_id)
            .fetch_all(&self.pool)
            .await;
        timer.finish(result)
    }

    /// Every document attached to the student's applications.
    pub async fn list_documents_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<ApplicationDocumentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_documents_for_student");
        let result = sqlx::query_as::<_, ApplicationDocumentEntity>(
            r#"
            SELECT d.id, d.application_id, d.doc_name, d.file_path, d.file_type, d.uploaded_at
            FROM application_documents d
            JOIN applications a ON a.id = d.application_id
            WHERE a.student_id = $1
            ORDER BY d.uploaded_at
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Admin listing, newest first, optionally filtered by status.
    pub async fn list_admin(
        &self,
        status: Option<RequirementStatusDb>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AdminApplicationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_admin_applications");
        let result = sqlx::query_as::<_, AdminApplicationEntity>(
            r#"
            SELECT a.id, a.student_id, s.username, a.program_id, p.program_name,
                   a.requirement_status, a.remarks, a.created_at,
                   (SELECT COUNT(*) FROM application_documents d
                    WHERE d.application_id = a.id) AS document_count
            FROM applications a
            JOIN students s ON s.id = a.student_id
            JOIN programs p ON p.id = a.program_id
            WHERE ($1::requirement_status IS NULL OR a.requirement_status = $1)
            ORDER BY a.created_at DESC, a.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result)
    }

    pub async fn count_admin(&self, status: Option<RequirementStatusDb>) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_admin_applications");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM applications
            WHERE ($1::requirement_status IS NULL OR requirement_status = $1)
            "#,
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Record an admin decision. Resets `remarks_viewed` so the student sees
    /// the new remarks.
    pub async fn review(
        &self,
        id: Uuid,
        status: RequirementStatusDb,
        remarks: Option<&str>,
        notification: &str,
    ) -> Result<Option<ApplicationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("review_application");
        let query = format!(
            r#"
            UPDATE applications AS a
            SET requirement_status = $2, remarks = $3, notification = $4, remarks_viewed = FALSE
            WHERE a.id = $1
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        );
        let result = sqlx::query_as::<_, ApplicationEntity>(&query)
            .bind(id)
            .bind(status)
            .bind(remarks)
            .bind(notification)
            .fetch_optional(&self.pool)
            .await;
        timer.finish(result)
    }

    /// Flag remarks as read. Returns false if the application is not the student's.
    pub async fn mark_remarks_viewed(&self, id: Uuid, student_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("mark_application_remarks_viewed");
        let result = sqlx::query(
            "UPDATE applications SET remarks_viewed = TRUE WHERE id = $1 AND student_id = $2",
        )
        .bind(id)
        .bind(student_id)
        .execute(&self.pool)
        .await;
        Ok(timer.finish(result)?.rows_affected() > 0)
    }
}
