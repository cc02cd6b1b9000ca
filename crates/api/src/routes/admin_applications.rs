//! Admin review of student applications.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use domain::models::{
    AdminApplicationItem, Application, ListApplicationsQuery, ListApplicationsResponse,
    RequirementStatus, ReviewApplicationRequest, ReviewApplicationResponse, Student,
};
use domain::services::{AccountNotice, NoticeKind};
use persistence::entities::RequirementStatusDb;
use persistence::repositories::{ApplicationRepository, ProgramRepository, StudentRepository};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::AdminAuth;

/// Applications newest first, optionally filtered by `?status=`.
///
/// GET /api/v1/admin/applications
pub async fn list_applications(
    State(state): State<AppState>,
    Query(query): Query<ListApplicationsQuery>,
) -> Result<Json<ListApplicationsResponse>, ApiError> {
    let repo = ApplicationRepository::new(state.pool.clone());
    let page = query.page_params();
    let status: Option<RequirementStatusDb> = query.status.map(Into::into);

    let rows = repo.list_admin(status, page.limit(), page.offset()).await?;
    let total = repo.count_admin(status).await?;

    Ok(Json(ListApplicationsResponse {
        data: rows.into_iter().map(AdminApplicationItem::from).collect(),
        pagination: page.paginate(total),
    }))
}

/// POST /api/v1/admin/applications/:id/approve
pub async fn approve_application(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminAuth>,
    Path(application_id): Path<Uuid>,
    body: Option<Json<ReviewApplicationRequest>>,
) -> Result<Json<ReviewApplicationResponse>, ApiError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    review(state, admin, application_id, RequirementStatus::Approved, request).await
}

/// POST /api/v1/admin/applications/:id/reject
pub async fn reject_application(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminAuth>,
    Path(application_id): Path<Uuid>,
    body: Option<Json<ReviewApplicationRequest>>,
) -> Result<Json<ReviewApplicationResponse>, ApiError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    review(state, admin, application_id, RequirementStatus::Rejected, request).await
}

async fn review(
    state: AppState,
    admin: AdminAuth,
    application_id: Uuid,
    decision: RequirementStatus,
    request: ReviewApplicationRequest,
) -> Result<Json<ReviewApplicationResponse>, ApiError> {
    request.validate()?;

    let repo = ApplicationRepository::new(state.pool.clone());
    let current = repo
        .find_by_id(application_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Application not found".to_string()))?;

    let program = ProgramRepository::new(state.pool.clone())
        .find_by_id(current.program_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Program not found".to_string()))?;

    let remarks = request
        .remarks
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());
    let notification = decision.notification_text(&program.program_name);

    let application = repo
        .review(application_id, decision.into(), remarks, &notification)
        .await?
        .map(Application::from)
        .ok_or_else(|| ApiError::NotFound("Application not found".to_string()))?;

    info!(
        admin = %admin.key_fingerprint,
        application_id = %application_id,
        status = %decision,
        "Application reviewed"
    );

    notify_student(&state, &application, decision, &program.program_name).await;

    Ok(Json(ReviewApplicationResponse {
        success: true,
        message: format!("Application {}", decision),
        application,
    }))
}

/// Queue the decision email. A missing student only gets logged.
async fn notify_student(
    state: &AppState,
    application: &Application,
    decision: RequirementStatus,
    program_name: &str,
) {
    let kind = match decision {
        RequirementStatus::Approved => NoticeKind::ApplicationApproved,
        RequirementStatus::Rejected => NoticeKind::ApplicationRejected,
        RequirementStatus::Submitted => return,
    };

    match StudentRepository::new(state.pool.clone())
        .find_by_id(application.student_id)
        .await
    {
        Ok(Some(student)) => {
            let account = Student::from(student).account();
            state
                .mailer
                .dispatch(AccountNotice::for_account(kind, &account).with_detail(program_name));
        }
        Ok(None) => warn!(student_id = %application.student_id, "Applicant no longer exists"),
        Err(e) => warn!(
            student_id = %application.student_id,
            error = %e,
            "Could not load applicant for notification"
        ),
    }
}
