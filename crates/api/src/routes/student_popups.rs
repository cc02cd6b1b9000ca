//! Popups shown to the logged-in student.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use domain::models::{MarkPopupViewedResponse, StudentPopupsResponse};
use domain::services::{popups_for_student, PopupStore};
use persistence::repositories::PopupRepository;
use tracing::debug;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::StudentAuth;

/// Active, unexpired, unseen popups for the student, newest first.
///
/// GET /api/v1/student/popups
pub async fn list_popups(
    State(state): State<AppState>,
    student: StudentAuth,
) -> Result<Json<StudentPopupsResponse>, ApiError> {
    let repo = PopupRepository::new(state.pool.clone());
    let data = popups_for_student(&repo, student.student_id, Utc::now()).await?;

    debug!(student_id = %student.student_id, count = data.len(), "Listed student popups");
    Ok(Json(StudentPopupsResponse { data }))
}

/// Add the popup to the student's seen set. Repeating the call is a no-op.
///
/// POST /api/v1/student/popups/:popup_id/mark-viewed
pub async fn mark_viewed(
    State(state): State<AppState>,
    student: StudentAuth,
    Path(popup_id): Path<Uuid>,
) -> Result<Json<MarkPopupViewedResponse>, ApiError> {
    let found = PopupRepository::new(state.pool.clone())
        .mark_seen(popup_id, student.student_id)
        .await?;

    if !found {
        return Err(ApiError::NotFound("Popup not found".to_string()));
    }

    Ok(Json(MarkPopupViewedResponse { success: true }))
}
