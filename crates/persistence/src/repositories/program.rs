//! Program repository for database operations.

use domain::models::{CreateProgramRequest, Program};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ProgramEntity;
use crate::metrics::QueryTimer;

const PROGRAM_COLUMNS: &str =
    "id, program_name, program_type, requirements, created_at, updated_at";

/// Repository for scholarship program database operations.
#[derive(Clone)]
pub struct ProgramRepository {
    pool: PgPool,
}

impl ProgramRepository {
    /// Creates a new ProgramRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: &CreateProgramRequest) -> Result<ProgramEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_program");
        let query = format!(
            r#"
            INSERT INTO programs (program_name, program_type, requirements)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            PROGRAM_COLUMNS
        );
        let result = sqlx::query_as::<_, ProgramEntity>(&query)
            .bind(request.program_name.trim())
            .bind(request.program_type.as_deref())
            .bind(request.requirements.as_deref())
            .fetch_one(&self.pool)
            .await;
        timer.finish(result)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ProgramEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_program_by_id");
        let query = format!("SELECT {} FROM programs WHERE id = $1", PROGRAM_COLUMNS);
        let result = sqlx::query_as::<_, ProgramEntity>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.finish(result)
    }

    /// All programs, newest first.
    pub async fn list(&self) -> Result<Vec<ProgramEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_programs");
        let query = format!(
            "SELECT {} FROM programs ORDER BY created_at DESC, id",
            PROGRAM_COLUMNS
        );
        let result = sqlx::query_as::<_, ProgramEntity>(&query)
            .fetch_all(&self.pool)
            .await;
        timer.finish(result)
    }

    pub async fn update(&self, program: &Program) -> Result<Option<ProgramEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_program");
        let query = format!(
            r#"
            UPDATE programs
            SET program_name = $2, program_type = $3, requirements = $4
            WHERE id = $1
            RETURNING {}
            "#,
            PROGRAM_COLUMNS
        );
        let result = sqlx::query_as::<_, ProgramEntity>(&query)
            .bind(program.id)
            .bind(&program.program_name)
            .bind(program.program_type.as_deref())
            .bind(program.requirements.as_deref())
            .fetch_optional(&self.pool)
            .await;
        timer.finish(result)
    }

    /// Delete a program and, by cascade, its applications.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_program");
        let result = sqlx::query("DELETE FROM programs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        Ok(timer.finish(result)?.rows_affected() > 0)
    }
}
