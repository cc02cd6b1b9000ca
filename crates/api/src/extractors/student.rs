//! Student identity extractor.
//!
//! The session layer in front of this service resolves the logged-in
//! student and forwards the id in `X-Student-Id`.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::AccountStatus;
use persistence::repositories::StudentRepository;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

pub const STUDENT_ID_HEADER: &str = "X-Student-Id";

/// A student resolved against the account registry.
#[derive(Debug, Clone)]
pub struct StudentAuth {
    pub student_id: Uuid,
    pub username: String,
    pub email: String,
    pub status: AccountStatus,
}

impl StudentAuth {
    /// Fails with Forbidden unless the account is active.
    pub fn require_active(&self) -> Result<(), ApiError> {
        match self.status {
            AccountStatus::Active => Ok(()),
            other => Err(ApiError::Forbidden(format!("Account is {}", other))),
        }
    }
}

fn parse_student_id(parts: &Parts) -> Result<Uuid, ApiError> {
    let raw = parts
        .headers
        .get(STUDENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized(format!("Missing {} header", STUDENT_ID_HEADER)))?;

    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::Unauthorized(format!("Invalid {} header", STUDENT_ID_HEADER)))
}

#[async_trait]
impl FromRequestParts<AppState> for StudentAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth) = parts.extensions.get::<StudentAuth>() {
            return Ok(auth.clone());
        }

        let student_id = parse_student_id(parts)?;
        let student = StudentRepository::new(state.pool.clone())
            .find_by_id(student_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Unknown student".to_string()))?;

        let auth = StudentAuth {
            student_id: student.id,
            username: student.username,
            email: student.email,
            status: student.status.into(),
        };
        parts.extensions.insert(auth.clone());
        Ok(auth)
    }
}
