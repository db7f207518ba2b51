//! # Authentication Module
//!
//! Shared-secret authentication for the admin routes.
//!
//! ## Configuration
//!
//! The key comes from `[admin] api_key` or `EXPERIENCE_ADMIN_KEY`. Without a
//! key the admin routes answer 403 to everyone; public routes never require
//! a key.
//!
//! ## Usage
//!
//! Send the key in the Authorization header:
//! ```text
//! Authorization: Bearer <admin-key>
//! ```

use super::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

// =============================================================================
// ADMIN KEY AUTHENTICATION
// =============================================================================

/// Compare keys in constant time.
///
/// Both keys are padded to the same length so `ct_eq` always runs over the
/// same number of bytes and the length of the expected key does not leak.
pub fn keys_match(provided: &str, expected: &str) -> bool {
    let provided_bytes = provided.as_bytes();
    let expected_bytes = expected.as_bytes();

    let max_len = provided_bytes.len().max(expected_bytes.len());
    let mut padded_provided = vec![0u8; max_len];
    let mut padded_expected = vec![0u8; max_len];
    padded_provided[..provided_bytes.len()].copy_from_slice(provided_bytes);
    padded_expected[..expected_bytes.len()].copy_from_slice(expected_bytes);

    let bytes_match: bool = padded_provided.ct_eq(&padded_expected).into();
    bytes_match && provided_bytes.len() == expected_bytes.len()
}

/// Admin authentication middleware, applied with `route_layer` to the
/// `/admin` routes only.
///
/// - No key configured: 403
/// - Missing or wrong `Authorization` header: 401
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    let Some(expected) = state.admin_key.as_deref() else {
        tracing::warn!(
            event = "auth_failure",
            reason = "admin_disabled",
            path = %request.uri().path(),
            "Admin route requested but no admin key is configured"
        );
        return Err((StatusCode::FORBIDDEN, "Admin API disabled"));
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(header_value) => {
            let provided_key = header_value.strip_prefix("Bearer ").unwrap_or(header_value);
            if keys_match(provided_key, expected) {
                Ok(next.run(request).await)
            } else {
                tracing::warn!(
                    event = "auth_failure",
                    reason = "invalid_admin_key",
                    "Authentication failed: invalid admin key"
                );
                Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
            }
        }
        None => {
            tracing::warn!(
                event = "auth_failure",
                reason = "missing_authorization_header",
                "Missing Authorization header"
            );
            Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_match_requires_exact_key() {
        assert!(keys_match("s3cret", "s3cret"));
        assert!(!keys_match("s3cre", "s3cret"));
        assert!(!keys_match("s3cret\0", "s3cret"));
        assert!(!keys_match("", "s3cret"));
    }
}
