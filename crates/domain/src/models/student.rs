//! Student account models and the lifecycle status.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use shared::validation::{
    validate_birthday, CONTACT_NUMBER_REGEX, MIN_PASSWORD_LENGTH, USERNAME_REGEX,
};

use super::common::{PageParams, Pagination};

/// Account status of a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Pending,
    Active,
    Inactive,
    Rejected,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Pending => "pending",
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
            AccountStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(AccountStatus::Pending),
            "active" => Ok(AccountStatus::Active),
            "inactive" => Ok(AccountStatus::Inactive),
            "rejected" => Ok(AccountStatus::Rejected),
            _ => Err(format!("Invalid account status: {}", s)),
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered student.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Student {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub birthday: NaiveDate,
    pub address: String,
    pub contact_num: String,
    pub email: String,
    pub program_and_year: String,
    pub scholarship: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub status: AccountStatus,
    pub approved_at: Option<DateTime<Utc>>,
    pub warning_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// The lifecycle-relevant view of this student.
    pub fn account(&self) -> Account {
        Account {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            status: self.status,
            approved_at: self.approved_at,
            warning_sent_at: self.warning_sent_at,
        }
    }
}

/// Snapshot of the fields the approval gate and the expiry sweep work on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub status: AccountStatus,
    pub approved_at: Option<DateTime<Utc>>,
    pub warning_sent_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Applies a lifecycle change to this snapshot.
    pub fn with_change(mut self, change: &LifecycleChange) -> Self {
        self.status = change.status;
        self.approved_at = change.approved_at;
        self.warning_sent_at = change.warning_sent_at;
        self
    }
}

/// New values for the three lifecycle fields of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleChange {
    pub status: AccountStatus,
    pub approved_at: Option<DateTime<Utc>>,
    pub warning_sent_at: Option<DateTime<Utc>>,
}

impl LifecycleChange {
    /// True if applying this change to `account` would modify nothing.
    pub fn is_noop_for(&self, account: &Account) -> bool {
        self.status == account.status
            && self.approved_at == account.approved_at
            && self.warning_sent_at == account.warning_sent_at
    }
}

/// Student registration request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RegisterStudentRequest {
    #[validate(regex(
        path = *USERNAME_REGEX,
        message = "Username must be 3-50 letters, digits, '_', '.' or '-'"
    ))]
    pub username: String,
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
    #[validate(custom(function = "validate_birthday"))]
    pub birthday: NaiveDate,
    #[validate(length(min = 1, max = 255, message = "Address must be 1-255 characters"))]
    pub address: String,
    #[validate(regex(
        path = *CONTACT_NUMBER_REGEX,
        message = "Contact number must be 7-15 digits with an optional leading '+'"
    ))]
    pub contact_num: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "Program and year must be 1-100 characters"))]
    pub program_and_year: String,
    #[validate(length(max = 100, message = "Scholarship must be at most 100 characters"))]
    pub scholarship: Option<String>,
    #[validate(length(
        min = MIN_PASSWORD_LENGTH,
        max = 128,
        message = "Password must be 8-128 characters"
    ))]
    pub password: String,
}

/// Credential check request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Credential check result handed to the session layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LoginResponse {
    pub student_id: Uuid,
    pub username: String,
    pub status: AccountStatus,
}

/// Public view of a student.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StudentResponse {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub contact_num: String,
    pub program_and_year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scholarship: Option<String>,
    pub status: AccountStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Student> for StudentResponse {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            username: student.username,
            first_name: student.first_name,
            last_name: student.last_name,
            email: student.email,
            contact_num: student.contact_num,
            program_and_year: student.program_and_year,
            scholarship: student.scholarship,
            status: student.status,
            approved_at: student.approved_at,
            warning_sent_at: student.warning_sent_at,
            created_at: student.created_at,
        }
    }
}

/// Query parameters for the admin student list.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListStudentsQuery {
    pub status: Option<AccountStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ListStudentsQuery {
    pub fn page_params(&self) -> PageParams {
        let defaults = PageParams::default();
        PageParams {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Response for the admin student list.
#[derive(Debug, Clone, Serialize)]
pub struct ListStudentsResponse {
    pub data: Vec<StudentResponse>,
    pub pagination: Pagination,
}

/// Manual status change request.
#[derive(Debug, Clone, Deserialize)]
pub struct SetStatusRequest {
    pub status: AccountStatus,
}

/// Result of an approve/reject/status call.
#[derive(Debug, Clone, Serialize)]
pub struct StudentDecisionResponse {
    pub success: bool,
    pub message: String,
    pub student: StudentResponse,
}
