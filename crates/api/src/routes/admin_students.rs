//! Admin student management: the approval queue and manual status changes.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use domain::models::{
    ListStudentsQuery, ListStudentsResponse, SetStatusRequest, Student, StudentDecisionResponse,
    StudentResponse,
};
use domain::services::{ApprovalAction, ApprovalOutcome};
use persistence::entities::AccountStatusDb;
use persistence::repositories::StudentRepository;
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_account_decision;
use crate::middleware::AdminAuth;

/// List students, newest first. `?status=pending` is the approval queue.
///
/// GET /api/v1/admin/students
pub async fn list_students(
    State(state): State<AppState>,
    Query(query): Query<ListStudentsQuery>,
) -> Result<Json<ListStudentsResponse>, ApiError> {
    let repo = StudentRepository::new(state.pool.clone());
    let page = query.page_params();
    let status: Option<AccountStatusDb> = query.status.map(Into::into);

    let students = repo.list(status, page.limit(), page.offset()).await?;
    let total = repo.count(status).await?;

    Ok(Json(ListStudentsResponse {
        data: students
            .into_iter()
            .map(|s| StudentResponse::from(Student::from(s)))
            .collect(),
        pagination: page.paginate(total),
    }))
}

/// POST /api/v1/admin/students/:id/approve
pub async fn approve_student(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminAuth>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<StudentDecisionResponse>, ApiError> {
    decide(state, admin, student_id, ApprovalAction::Approve).await
}

/// POST /api/v1/admin/students/:id/reject
pub async fn reject_student(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminAuth>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<StudentDecisionResponse>, ApiError> {
    decide(state, admin, student_id, ApprovalAction::Reject).await
}

/// Set any status directly. No email is sent.
///
/// POST /api/v1/admin/students/:id/status
pub async fn set_student_status(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminAuth>,
    Path(student_id): Path<Uuid>,
    Json(request): Json<SetStatusRequest>,
) -> Result<Json<StudentDecisionResponse>, ApiError> {
    let outcome = state
        .approval_gate()
        .set_status(student_id, request.status, Utc::now())
        .await?;

    info!(
        admin = %admin.key_fingerprint,
        student_id = %student_id,
        status = %request.status,
        changed = outcome.changed,
        "Admin set student status"
    );

    let message = if outcome.changed {
        format!("Student status set to {}", request.status)
    } else {
        format!("Student is already {}", request.status)
    };
    respond(&state, outcome, message).await
}

async fn decide(
    state: AppState,
    admin: AdminAuth,
    student_id: Uuid,
    action: ApprovalAction,
) -> Result<Json<StudentDecisionResponse>, ApiError> {
    let outcome = state
        .approval_gate()
        .decide(student_id, action, Utc::now())
        .await?;

    let status = action.target_status();
    if outcome.changed {
        record_account_decision(status.as_str());
    }

    info!(
        admin = %admin.key_fingerprint,
        student_id = %student_id,
        action = ?action,
        changed = outcome.changed,
        "Admin decided on student"
    );

    let message = match (action, outcome.changed) {
        (ApprovalAction::Approve, true) => "Student approved",
        (ApprovalAction::Approve, false) => "Student is already active",
        (ApprovalAction::Reject, true) => "Student rejected",
        (ApprovalAction::Reject, false) => "Student is already rejected",
    };
    respond(&state, outcome, message.to_string()).await
}

async fn respond(
    state: &AppState,
    outcome: ApprovalOutcome,
    message: String,
) -> Result<Json<StudentDecisionResponse>, ApiError> {
    let student = StudentRepository::new(state.pool.clone())
        .find_by_id(outcome.account.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))?;

    Ok(Json(StudentDecisionResponse {
        success: true,
        message,
        student: StudentResponse::from(Student::from(student)),
    }))
}
