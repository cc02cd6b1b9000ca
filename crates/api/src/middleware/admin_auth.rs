//! Admin authentication middleware.
//!
//! Admin requests carry a shared key in `X-Admin-Key`. Only SHA-256 digests
//! of accepted keys live in configuration.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::crypto::{key_matches_any, sha256_hex};

use crate::app::AppState;
use crate::error::ApiError;

pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

/// Authenticated admin, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    /// Leading digest characters of the key used, for log correlation.
    pub key_fingerprint: String,
}

impl AdminAuth {
    fn from_key(key: &str) -> Self {
        let digest = sha256_hex(key);
        Self {
            key_fingerprint: digest[..8].to_string(),
        }
    }
}

/// Rejects requests without a configured admin key.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let key = match req
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        Some(key) => key.to_string(),
        None => return ApiError::Unauthorized("Missing admin key".into()).into_response(),
    };

    if !key_matches_any(&key, &state.config.security.admin_key_hashes) {
        tracing::warn!(path = %req.uri().path(), "Rejected request with invalid admin key");
        return ApiError::Unauthorized("Invalid admin key".into()).into_response();
    }

    let auth = AdminAuth::from_key(&key);
    tracing::debug!(key = %auth.key_fingerprint, "Admin request authenticated");
    req.extensions_mut().insert(auth);
    next.run(req).await
}
