//! Program entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Program;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the programs table.
#[derive(Debug, Clone, FromRow)]
pub struct ProgramEntity {
    pub id: Uuid,
    pub program_name: String,
    pub program_type: Option<String>,
    pub requirements: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProgramEntity> for Program {
    fn from(entity: ProgramEntity) -> Self {
        Self {
            id: entity.id,
            program_name: entity.program_name,
            program_type: entity.program_type,
            requirements: entity.requirements,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
