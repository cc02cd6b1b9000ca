//! Popup entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{AdminPopupItem, Popup, PopupCandidate, PopupType};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for popup type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "popup_type", rename_all = "lowercase")]
pub enum PopupTypeDb {
    Info,
    Warning,
    Announcement,
}

impl From<PopupTypeDb> for PopupType {
    fn from(popup_type: PopupTypeDb) -> Self {
        match popup_type {
            PopupTypeDb::Info => PopupType::Info,
            PopupTypeDb::Warning => PopupType::Warning,
            PopupTypeDb::Announcement => PopupType::Announcement,
        }
    }
}

impl From<PopupType> for PopupTypeDb {
    fn from(popup_type: PopupType) -> Self {
        match popup_type {
            PopupType::Info => PopupTypeDb::Info,
            PopupType::Warning => PopupTypeDb::Warning,
            PopupType::Announcement => PopupTypeDb::Announcement,
        }
    }
}

/// Database row mapping for the popups table.
#[derive(Debug, Clone, FromRow)]
pub struct PopupEntity {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub popup_type: PopupTypeDb,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub target_student_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PopupEntity> for Popup {
    fn from(entity: PopupEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            message: entity.message,
            popup_type: entity.popup_type.into(),
            is_active: entity.is_active,
            expires_at: entity.expires_at,
            target_student_id: entity.target_student_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Popup row plus whether a given student has seen it.
#[derive(Debug, Clone, FromRow)]
pub struct PopupWithSeenEntity {
    #[sqlx(flatten)]
    pub popup: PopupEntity,
    pub seen: bool,
}

impl From<PopupWithSeenEntity> for PopupCandidate {
    fn from(entity: PopupWithSeenEntity) -> Self {
        Self {
            popup: entity.popup.into(),
            seen: entity.seen,
        }
    }
}

/// Popup row plus the size of its seen set.
#[derive(Debug, Clone, FromRow)]
pub struct PopupWithSeenCountEntity {
    #[sqlx(flatten)]
    pub popup: PopupEntity,
    pub seen_count: i64,
}

impl From<PopupWithSeenCountEntity> for AdminPopupItem {
    fn from(entity: PopupWithSeenCountEntity) -> Self {
        Self {
            popup: entity.popup.into(),
            seen_count: entity.seen_count,
        }
    }
}
