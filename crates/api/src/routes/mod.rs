//! HTTP route handlers.

pub mod admin_applications;
pub mod admin_jobs;
pub mod admin_popups;
pub mod admin_programs;
pub mod admin_students;
pub mod applications;
pub mod health;
pub mod programs;
pub mod student_popups;
pub mod students;
