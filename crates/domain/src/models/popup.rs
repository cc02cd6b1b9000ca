//! Popup notification models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use shared::validation::validate_not_blank;

/// Kind of popup shown to students.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PopupType {
    #[default]
    Info,
    Warning,
    Announcement,
}

impl PopupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PopupType::Info => "info",
            PopupType::Warning => "warning",
            PopupType::Announcement => "announcement",
        }
    }
}

impl FromStr for PopupType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(PopupType::Info),
            "warning" => Ok(PopupType::Warning),
            "announcement" => Ok(PopupType::Announcement),
            _ => Err(format!("Invalid popup type: {}", s)),
        }
    }
}

impl fmt::Display for PopupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A popup notification.
///
/// `target_student_id` addresses the popup to a single student; popups
/// without a target are broadcast to everyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Popup {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub popup_type: PopupType,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_student_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Popup {
    /// Active and not yet expired at `now`.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.map_or(true, |expires| expires > now)
    }

    /// True if `student_id` is an intended recipient.
    pub fn is_addressed_to(&self, student_id: Uuid) -> bool {
        self.target_student_id.map_or(true, |target| target == student_id)
    }
}

/// Values for a popup about to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPopup {
    pub title: String,
    pub message: String,
    pub popup_type: PopupType,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub target_student_id: Option<Uuid>,
}

impl NewPopup {
    /// The warning popup raised by the expiry sweep for one student.
    pub fn expiry_warning(student_id: Uuid) -> Self {
        Self {
            title: "Account Expiration Warning".to_string(),
            message: "Your account will be archived and deleted in 2 months as part of our \
                      6-month data retention policy. Please download any documents you \
                      want to keep before then."
                .to_string(),
            popup_type: PopupType::Warning,
            is_active: true,
            expires_at: None,
            target_student_id: Some(student_id),
        }
    }
}

impl From<CreatePopupRequest> for NewPopup {
    fn from(request: CreatePopupRequest) -> Self {
        Self {
            title: request.title.trim().to_string(),
            message: request.message,
            popup_type: request.popup_type,
            is_active: request.is_active,
            expires_at: request.expires_at,
            target_student_id: request.target_student_id,
        }
    }
}

/// A stored popup together with whether the requesting student has seen it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupCandidate {
    pub popup: Popup,
    pub seen: bool,
}

fn default_true() -> bool {
    true
}

/// Request to create a popup.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreatePopupRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title must be 1-200 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,
    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub message: String,
    #[serde(default)]
    pub popup_type: PopupType,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub target_student_id: Option<Uuid>,
}

/// Request to edit a popup. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdatePopupRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title must be 1-200 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub message: Option<String>,
    pub popup_type: Option<PopupType>,
    pub is_active: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Removes the expiry date. Takes precedence over `expires_at`.
    #[serde(default)]
    pub clear_expiry: bool,
}

impl UpdatePopupRequest {
    /// Merges this request into an existing popup.
    pub fn apply_to(&self, popup: &mut Popup) {
        if let Some(title) = &self.title {
            popup.title = title.trim().to_string();
        }
        if let Some(message) = &self.message {
            popup.message = message.clone();
        }
        if let Some(popup_type) = self.popup_type {
            popup.popup_type = popup_type;
        }
        if let Some(is_active) = self.is_active {
            popup.is_active = is_active;
        }
        if self.clear_expiry {
            popup.expires_at = None;
        } else if let Some(expires_at) = self.expires_at {
            popup.expires_at = Some(expires_at);
        }
    }
}

/// Popups visible to the requesting student.
#[derive(Debug, Clone, Serialize)]
pub struct StudentPopupsResponse {
    pub data: Vec<Popup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkPopupViewedResponse {
    pub success: bool,
}

/// Admin view of a popup.
#[derive(Debug, Clone, Serialize)]
pub struct AdminPopupItem {
    #[serde(flatten)]
    pub popup: Popup,
    pub seen_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListAdminPopupsResponse {
    pub data: Vec<AdminPopupItem>,
}
