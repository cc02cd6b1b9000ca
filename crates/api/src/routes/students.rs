//! Student registration and credential check.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::{
    AccountStatus, LoginRequest, LoginResponse, RegisterStudentRequest, Student, StudentResponse,
};
use persistence::repositories::StudentRepository;
use shared::password::{hash_password, verify_password};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_student_registered;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Register a new student. The account starts out pending.
///
/// POST /api/v1/students/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterStudentRequest>,
) -> Result<(StatusCode, Json<StudentResponse>), ApiError> {
    request.validate()?;

    let password_hash = hash_password(&request.password)?;
    let entity = StudentRepository::new(state.pool.clone())
        .create(&request, &password_hash)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => {
                ApiError::Conflict("Username or email is already registered".to_string())
            }
            other => other,
        })?;

    let student = Student::from(entity);
    record_student_registered();
    info!(student_id = %student.id, username = %student.username, "Student registered");

    Ok((StatusCode::CREATED, Json(StudentResponse::from(student))))
}

/// Check a student's credentials. Only active accounts may log in.
///
/// POST /api/v1/students/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate()?;

    let student = StudentRepository::new(state.pool.clone())
        .find_by_username(request.username.trim())
        .await?
        .map(Student::from)
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !verify_password(&request.password, &student.password_hash)? {
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    login_gate(student.status)?;

    info!(student_id = %student.id, "Student logged in");
    Ok(Json(LoginResponse {
        student_id: student.id,
        username: student.username,
        status: student.status,
    }))
}

fn login_gate(status: AccountStatus) -> Result<(), ApiError> {
    let message = match status {
        AccountStatus::Active => return Ok(()),
        AccountStatus::Pending => "Your account is still awaiting approval",
        AccountStatus::Rejected => "Your registration was not approved",
        AccountStatus::Inactive => "Your account has been deactivated",
    };
    Err(ApiError::Forbidden(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_gate_accepts_only_active() {
        assert!(login_gate(AccountStatus::Active).is_ok());
        for status in [
            AccountStatus::Pending,
            AccountStatus::Rejected,
            AccountStatus::Inactive,
        ] {
            assert!(matches!(login_gate(status), Err(ApiError::Forbidden(_))));
        }
    }

    #[test]
    fn test_login_gate_messages_differ() {
        let pending = login_gate(AccountStatus::Pending).unwrap_err().to_string();
        let inactive = login_gate(AccountStatus::Inactive).unwrap_err().to_string();
        assert!(pending.contains("awaiting approval"));
        assert!(inactive.contains("deactivated"));
    }
}
