//! Admin program management.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{CreateProgramRequest, Program, UpdateProgramRequest};
use persistence::repositories::ProgramRepository;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// POST /api/v1/admin/programs
pub async fn create_program(
    State(state): State<AppState>,
    Json(request): Json<CreateProgramRequest>,
) -> Result<(StatusCode, Json<Program>), ApiError> {
    request.validate()?;

    let program = Program::from(
        ProgramRepository::new(state.pool.clone())
            .create(&request)
            .await?,
    );

    info!(program_id = %program.id, name = %program.program_name, "Program created");
    Ok((StatusCode::CREATED, Json(program)))
}

/// PUT /api/v1/admin/programs/:id
pub async fn update_program(
    State(state): State<AppState>,
    Path(program_id): Path<Uuid>,
    Json(request): Json<UpdateProgramRequest>,
) -> Result<Json<Program>, ApiError> {
    request.validate()?;

    let repo = ProgramRepository::new(state.pool.clone());
    let mut program = repo
        .find_by_id(program_id)
        .await?
        .map(Program::from)
        .ok_or_else(|| ApiError::NotFound("Program not found".to_string()))?;

    request.apply_to(&mut program);

    let updated = repo
        .update(&program)
        .await?
        .ok_or_else(|| ApiError::NotFound("Program not found".to_string()))?;

    Ok(Json(Program::from(updated)))
}

/// Deletes the program and every application made to it.
///
/// DELETE /api/v1/admin/programs/:id
pub async fn delete_program(
    State(state): State<AppState>,
    Path(program_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = ProgramRepository::new(state.pool.clone())
        .delete(program_id)
        .await?;

    if !deleted {
        return Err(ApiError::NotFound("Program not found".to_string()));
    }

    info!(program_id = %program_id, "Program deleted");
    Ok(StatusCode::NO_CONTENT)
}
