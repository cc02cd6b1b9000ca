//! Shared utilities for the ScholarSync backend.
//!
//! - Admin key hashing (SHA-256)
//! - Password hashing with Argon2id
//! - Field validators used by request models

pub mod crypto;
pub mod password;
pub mod validation;
