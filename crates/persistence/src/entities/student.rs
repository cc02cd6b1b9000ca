//! Student entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{Account, AccountStatus, Student};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "account_status", rename_all = "lowercase")]
pub enum AccountStatusDb {
    Pending,
    Active,
    Inactive,
    Rejected,
}

impl From<AccountStatusDb> for AccountStatus {
    fn from(status: AccountStatusDb) -> Self {
        match status {
            AccountStatusDb::Pending => AccountStatus::Pending,
            AccountStatusDb::Active => AccountStatus::Active,
            AccountStatusDb::Inactive => AccountStatus::Inactive,
            AccountStatusDb::Rejected => AccountStatus::Rejected,
        }
    }
}

impl From<AccountStatus> for AccountStatusDb {
    fn from(status: AccountStatus) -> Self {
        match status {
            AccountStatus::Pending => AccountStatusDb::Pending,
            AccountStatus::Active => AccountStatusDb::Active,
            AccountStatus::Inactive => AccountStatusDb::Inactive,
            AccountStatus::Rejected => AccountStatusDb::Rejected,
        }
    }
}

/// Database row mapping for the students table.
#[derive(Debug, Clone, FromRow)]
pub struct StudentEntity {
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
    pub password_hash: String,
    pub status: AccountStatusDb,
    pub approved_at: Option<DateTime<Utc>>,
    pub warning_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StudentEntity> for Student {
    fn from(entity: StudentEntity) -> Self {
        Self {
            id: entity.id,
            username: entity.username,
            first_name: entity.first_name,
            last_name: entity.last_name,
            birthday: entity.birthday,
            address: entity.address,
            contact_num: entity.contact_num,
            email: entity.email,
            program_and_year: entity.program_and_year,
            scholarship: entity.scholarship,
            password_hash: entity.password_hash,
            status: entity.status.into(),
            approved_at: entity.approved_at,
            warning_sent_at: entity.warning_sent_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Lifecycle columns of a student row.
#[derive(Debug, Clone, FromRow)]
pub struct AccountEntity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub status: AccountStatusDb,
    pub approved_at: Option<DateTime<Utc>>,
    pub warning_sent_at: Option<DateTime<Utc>>,
}

impl From<AccountEntity> for Account {
    fn from(entity: AccountEntity) -> Self {
        Self {
            id: entity.id,
            username: entity.username,
            email: entity.email,
            first_name: entity.first_name,
            status: entity.status.into(),
            approved_at: entity.approved_at,
            warning_sent_at: entity.warning_sent_at,
        }
    }
}
