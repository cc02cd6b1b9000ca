//! Domain layer for the ScholarSync backend.
//!
//! This crate contains:
//! - Domain models (students, popups, programs, applications)
//! - The account lifecycle rules: approval, expiry sweep, popup visibility
//! - Store and mailer traits implemented by the outer layers

pub mod models;
pub mod services;
