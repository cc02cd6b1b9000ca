//! Repository implementations for database operations.

pub mod application;
pub mod popup;
pub mod program;
pub mod student;

pub use application::{ApplicationRepository, NewApplication};
pub use popup::PopupRepository;
pub use program::ProgramRepository;
pub use student::StudentRepository;

use domain::services::StoreError;

/// Maps a sqlx error onto the domain store error.
pub(crate) fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound("row".to_string()),
        other => StoreError::Database(other.to_string()),
    }
}
