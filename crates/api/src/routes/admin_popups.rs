//! Admin popup management.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    AdminPopupItem, CreatePopupRequest, ListAdminPopupsResponse, NewPopup, Popup,
    UpdatePopupRequest,
};
use persistence::repositories::PopupRepository;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

fn not_found() -> ApiError {
    ApiError::NotFound("Popup not found".to_string())
}

async fn with_seen_count(repo: &PopupRepository, popup: Popup) -> Result<AdminPopupItem, ApiError> {
    let seen_count = repo.seen_count(popup.id).await?;
    Ok(AdminPopupItem { popup, seen_count })
}

/// Every popup, newest first, with how many students have seen it.
///
/// GET /api/v1/admin/popups
pub async fn list_popups(
    State(state): State<AppState>,
) -> Result<Json<ListAdminPopupsResponse>, ApiError> {
    let data = PopupRepository::new(state.pool.clone())
        .list_with_seen_counts()
        .await?
        .into_iter()
        .map(AdminPopupItem::from)
        .collect();

    Ok(Json(ListAdminPopupsResponse { data }))
}

/// GET /api/v1/admin/popups/:id
pub async fn get_popup(
    State(state): State<AppState>,
    Path(popup_id): Path<Uuid>,
) -> Result<Json<AdminPopupItem>, ApiError> {
    let repo = PopupRepository::new(state.pool.clone());
    let popup = repo
        .find_by_id(popup_id)
        .await?
        .map(Popup::from)
        .ok_or_else(not_found)?;

    Ok(Json(with_seen_count(&repo, popup).await?))
}

/// POST /api/v1/admin/popups
pub async fn create_popup(
    State(state): State<AppState>,
    Json(request): Json<CreatePopupRequest>,
) -> Result<(StatusCode, Json<AdminPopupItem>), ApiError> {
    request.validate()?;

    let popup = Popup::from(
        PopupRepository::new(state.pool.clone())
            .create(&NewPopup::from(request))
            .await?,
    );

    info!(
        popup_id = %popup.id,
        popup_type = %popup.popup_type.as_str(),
        targeted = popup.target_student_id.is_some(),
        "Popup created"
    );

    Ok((
        StatusCode::CREATED,
        Json(AdminPopupItem {
            popup,
            seen_count: 0,
        }),
    ))
}

/// PUT /api/v1/admin/popups/:id
pub async fn update_popup(
    State(state): State<AppState>,
    Path(popup_id): Path<Uuid>,
    Json(request): Json<UpdatePopupRequest>,
) -> Result<Json<AdminPopupItem>, ApiError> {
    request.validate()?;

    let repo = PopupRepository::new(state.pool.clone());
    let mut popup = repo
        .find_by_id(popup_id)
        .await?
        .map(Popup::from)
        .ok_or_else(not_found)?;

    request.apply_to(&mut popup);

    let updated = repo
        .update(&popup)
        .await?
        .map(Popup::from)
        .ok_or_else(not_found)?;

    Ok(Json(with_seen_count(&repo, updated).await?))
}

/// Flip `is_active`.
///
/// POST /api/v1/admin/popups/:id/toggle
pub async fn toggle_popup(
    State(state): State<AppState>,
    Path(popup_id): Path<Uuid>,
) -> Result<Json<AdminPopupItem>, ApiError> {
    let repo = PopupRepository::new(state.pool.clone());
    let popup = repo
        .toggle_active(popup_id)
        .await?
        .map(Popup::from)
        .ok_or_else(not_found)?;

    info!(popup_id = %popup.id, is_active = popup.is_active, "Popup toggled");
    Ok(Json(with_seen_count(&repo, popup).await?))
}

/// DELETE /api/v1/admin/popups/:id
pub async fn delete_popup(
    State(state): State<AppState>,
    Path(popup_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = PopupRepository::new(state.pool.clone())
        .delete(popup_id)
        .await?;

    if !deleted {
        return Err(not_found());
    }

    info!(popup_id = %popup_id, "Popup deleted");
    Ok(StatusCode::NO_CONTENT)
}
