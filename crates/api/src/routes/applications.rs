//! Student application endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    aggregate_documents, Application, ApplicationDocument, ApplicationWithProgram,
    CreateApplicationRequest, ListMyApplicationsResponse, RequirementStatus,
};
use persistence::repositories::{ApplicationRepository, NewApplication, ProgramRepository};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::StudentAuth;

#[derive(Debug, Serialize)]
pub struct MarkRemarksViewedResponse {
    pub success: bool,
}

/// Apply to a program with references to already-uploaded documents.
///
/// POST /api/v1/student/applications
pub async fn create_application(
    State(state): State<AppState>,
    student: StudentAuth,
    Json(request): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<Application>), ApiError> {
    student.require_active()?;
    request.validate()?;

    let program = ProgramRepository::new(state.pool.clone())
        .find_by_id(request.program_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Program not found".to_string()))?;

    let repo = ApplicationRepository::new(state.pool.clone());
    if repo
        .has_open_application(student.student_id, program.id)
        .await?
    {
        return Err(ApiError::Conflict(
            "You already have a submitted application for this program".to_string(),
        ));
    }

    let application = repo
        .create(NewApplication {
            student_id: student.student_id,
            program_id: program.id,
            notification: RequirementStatus::Submitted.notification_text(&program.program_name),
            documents: &request.documents,
        })
        .await?;

    info!(
        student_id = %student.student_id,
        program_id = %program.id,
        application_id = %application.id,
        documents = request.documents.len(),
        "Application submitted"
    );

    Ok((StatusCode::CREATED, Json(Application::from(application))))
}

/// The student's applications with program names and documents, newest first.
///
/// GET /api/v1/student/applications
pub async fn list_my_applications(
    State(state): State<AppState>,
    student: StudentAuth,
) -> Result<Json<ListMyApplicationsResponse>, ApiError> {
    let repo = ApplicationRepository::new(state.pool.clone());

    let apps = repo
        .list_for_student(student.student_id)
        .await?
        .into_iter()
        .map(ApplicationWithProgram::from)
        .collect();
    let docs = repo
        .list_documents_for_student(student.student_id)
        .await?
        .into_iter()
        .map(ApplicationDocument::from)
        .collect();

    Ok(Json(ListMyApplicationsResponse {
        data: aggregate_documents(apps, docs),
    }))
}

/// POST /api/v1/student/applications/:id/mark-remarks-viewed
pub async fn mark_remarks_viewed(
    State(state): State<AppState>,
    student: StudentAuth,
    Path(application_id): Path<Uuid>,
) -> Result<Json<MarkRemarksViewedResponse>, ApiError> {
    let updated = ApplicationRepository::new(state.pool.clone())
        .mark_remarks_viewed(application_id, student.student_id)
        .await?;

    if !updated {
        return Err(ApiError::NotFound("Application not found".to_string()));
    }

    Ok(Json(MarkRemarksViewedResponse { success: true }))
}
