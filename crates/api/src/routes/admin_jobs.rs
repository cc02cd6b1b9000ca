//! On-demand runs of background jobs.

use axum::{extract::State, Extension, Json};
use domain::services::SweepReport;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::jobs::run_account_expiry;
use crate::middleware::AdminAuth;

/// Run the account expiry sweep now and return its counters.
///
/// POST /api/v1/admin/account-expiry/run
pub async fn run_account_expiry_now(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminAuth>,
) -> Result<Json<SweepReport>, ApiError> {
    info!(admin = %admin.key_fingerprint, "Admin triggered account expiry sweep");

    let report = run_account_expiry(&state.expiry_sweep())
        .await
        .map_err(ApiError::Internal)?;

    Ok(Json(report))
}
