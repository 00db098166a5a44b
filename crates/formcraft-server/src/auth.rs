//! Bearer-token authentication for the authoring API.
//!
//! A token is an opaque, signed principal id issued by
//! [`TokenSigner`](formcraft_core::signing::TokenSigner). Handlers that take a
//! [`Principal`] argument reject requests without a valid token with
//! `401 {"error": "Not authenticated"}`.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use formcraft_core::FormcraftError;

use crate::error::ApiError;
use crate::state::AppState;

/// The message returned for missing or invalid credentials.
pub const NOT_AUTHENTICATED: &str = "Not authenticated";

/// The authenticated owner of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal(pub String);

impl Principal {
    /// Returns the principal id.
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<Arc<AppState>> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let not_authenticated = || ApiError(FormcraftError::Unauthorized(NOT_AUTHENTICATED.to_string()));

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(not_authenticated)?;

        state
            .signer
            .verify(token, Some(state.settings.token_max_age))
            .map(Principal)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejecting principal token");
                not_authenticated()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer  abc "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }
}
