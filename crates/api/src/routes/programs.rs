//! Public program listing.

use axum::{extract::State, Json};
use domain::models::{ListProgramsResponse, Program};
use persistence::repositories::ProgramRepository;

use crate::app::AppState;
use crate::error::ApiError;

/// List every program, newest first.
///
/// GET /api/v1/programs
pub async fn list_programs(
    State(state): State<AppState>,
) -> Result<Json<ListProgramsResponse>, ApiError> {
    let data = ProgramRepository::new(state.pool.clone())
        .list()
        .await?
        .into_iter()
        .map(Program::from)
        .collect();

    Ok(Json(ListProgramsResponse { data }))
}
