//! Application and application document entities.

use chrono::{DateTime, Utc};
use domain::models::{
    AdminApplicationItem, Application, ApplicationDocument, ApplicationWithProgram,
    RequirementStatus,
};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for application requirement status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "requirement_status", rename_all = "lowercase")]
pub enum RequirementStatusDb {
    Submitted,
    Approved,
    Rejected,
}

impl From<RequirementStatusDb> for RequirementStatus {
    fn from(status: RequirementStatusDb) -> Self {
        match status {
            RequirementStatusDb::Submitted => RequirementStatus::Submitted,
            RequirementStatusDb::Approved => RequirementStatus::Approved,
            RequirementStatusDb::Rejected => RequirementStatus::Rejected,
        }
    }
}

impl From<RequirementStatus> for RequirementStatusDb {
    fn from(status: RequirementStatus) -> Self {
        match status {
            RequirementStatus::Submitted => RequirementStatusDb::Submitted,
            RequirementStatus::Approved => RequirementStatusDb::Approved,
            RequirementStatus::Rejected => RequirementStatusDb::Rejected,
        }
    }
}

/// Database row mapping for the applications table.
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationEntity {
    pub id: Uuid,
    pub student_id: Uuid,
    pub program_id: Uuid,
    pub requirement_status: RequirementStatusDb,
    pub remarks: Option<String>,
    pub notification: Option<String>,
    pub remarks_viewed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ApplicationEntity> for Application {
    fn from(entity: ApplicationEntity) -> Self {
        Self {
            id: entity.id,
            student_id: entity.student_id,
            program_id: entity.program_id,
            requirement_status: entity.requirement_status.into(),
            remarks: entity.remarks,
            notification: entity.notification,
            remarks_viewed: entity.remarks_viewed,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Application joined with its program name.
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationWithProgramEntity {
    #[sqlx(flatten)]
    pub application: ApplicationEntity,
    pub program_name: String,
}

impl From<ApplicationWithProgramEntity> for ApplicationWithProgram {
    fn from(entity: ApplicationWithProgramEntity) -> Self {
        Self {
            application: entity.application.into(),
            program_name: entity.program_name,
        }
    }
}

/// Row of the admin application listing.
#[derive(Debug, Clone, FromRow)]
pub struct AdminApplicationEntity {
    pub id: Uuid,
    pub student_id: Uuid,
    pub username: String,
    pub program_id: Uuid,
    pub program_name: String,
    pub requirement_status: RequirementStatusDb,
    pub remarks: Option<String>,
    pub document_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<AdminApplicationEntity> for AdminApplicationItem {
    fn from(entity: AdminApplicationEntity) -> Self {
        Self {
            id: entity.id,
            student_id: entity.student_id,
            username: entity.username,
            program_id: entity.program_id,
            program_name: entity.program_name,
            requirement_status: entity.requirement_status.into(),
            remarks: entity.remarks,
            document_count: entity.document_count,
            created_at: entity.created_at,
        }
    }
}

/// Database row mapping for the application_documents table.
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationDocumentEntity {
    pub id: Uuid,
    pub application_id: Uuid,
    pub doc_name: String,
    pub file_path: String,
    pub file_type: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<ApplicationDocumentEntity> for ApplicationDocument {
    fn from(entity: ApplicationDocumentEntity) -> Self {
        Self {
            id: entity.id,
            application_id: entity.application_id,
            doc_name: entity.doc_name,
            file_path: entity.file_path,
            file_type: entity.file_type,
            uploaded_at: entity.uploaded_at,
        }
    }
}
