//! Admin authentication for privileged commands
//!
//! The token is read from `Authorization: Bearer <token>` or `X-Admin-Token`.

use axum::{extract::FromRequestParts, http::HeaderMap, http::request::Parts};
use tracing::warn;

use crate::api::state::AppState;
use crate::api::types::ApiError;

/// Extractor that requires the configured admin token
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

fn presented_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    bearer.or_else(|| {
        headers
            .get("x-admin-token")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
    })
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !state.admin_enabled() {
            return Err(ApiError::forbidden(
                "Admin commands are disabled: no admin token is configured",
            ));
        }

        let Some(token) = presented_token(&parts.headers) else {
            return Err(ApiError::unauthorized(
                "Admin token required. Provide Authorization: Bearer <token> or X-Admin-Token",
            ));
        };

        if !state.verify_admin_token(token) {
            warn!(path = %parts.uri.path(), "Rejected admin command with invalid token");
            return Err(ApiError::unauthorized("Invalid admin token"));
        }

        Ok(RequireAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc"));

        assert_eq!(presented_token(&headers), Some("abc"));
    }

    #[test]
    fn test_admin_token_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-admin-token", HeaderValue::from_static("xyz"));

        assert_eq!(presented_token(&headers), Some("xyz"));
    }

    #[test]
    fn test_bearer_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc"));
        headers.insert("x-admin-token", HeaderValue::from_static("xyz"));

        assert_eq!(presented_token(&headers), Some("abc"));
    }

    #[test]
    fn test_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc"));

        assert_eq!(presented_token(&headers), None);
    }
}
