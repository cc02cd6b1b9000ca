//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod application;
pub mod popup;
pub mod program;
pub mod student;

pub use application::{
    AdminApplicationEntity, ApplicationDocumentEntity, ApplicationEntity,
    ApplicationWithProgramEntity, RequirementStatusDb,
};
pub use popup::{PopupEntity, PopupTypeDb, PopupWithSeenCountEntity, PopupWithSeenEntity};
pub use program::ProgramEntity;
pub use student::{AccountEntity, AccountStatusDb, StudentEntity};
