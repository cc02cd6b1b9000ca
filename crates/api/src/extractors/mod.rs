//! Custom Axum extractors.

pub mod student;

pub use student::{StudentAuth, STUDENT_ID_HEADER};
