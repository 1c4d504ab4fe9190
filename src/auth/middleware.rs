use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, header::AUTHORIZATION, header::WWW_AUTHENTICATE, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::Claims;
use super::helpers::extract_bearer_token;
use crate::server::AppState;
use crate::types::Role;

/// Extractor that requires an admin token
pub struct RequireAdmin(pub Claims);

/// Extractor that requires a store owner token
pub struct RequireOwner(pub Claims);

/// Extractor that requires a regular user token
pub struct RequireUser(pub Claims);

#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    Forbidden,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "no token"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid token"),
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
        };

        let mut response = (status, Json(json!({ "message": message }))).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"storerate\""),
            );
        }

        response
    }
}

impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = authenticate(parts, state)?;
        authorize(claims, &[Role::Admin]).map(RequireAdmin)
    }
}

impl FromRequestParts<Arc<AppState>> for RequireOwner {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = authenticate(parts, state)?;
        authorize(claims, &[Role::Owner]).map(RequireOwner)
    }
}

impl FromRequestParts<Arc<AppState>> for RequireUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = authenticate(parts, state)?;
        authorize(claims, &[Role::User]).map(RequireUser)
    }
}

/// Moves a request from "no credentials" to "valid token", or rejects it.
fn authenticate(parts: &Parts, state: &AppState) -> Result<Claims, AuthError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let raw_token = extract_bearer_token(auth_header).ok_or(AuthError::MissingToken)?;

    state.tokens.verify(raw_token).map_err(|e| {
        tracing::debug!("Rejected bearer token: {e}");
        AuthError::InvalidToken
    })
}

/// Checks that the token's role is one the route accepts.
pub fn authorize(claims: Claims, allowed: &[Role]) -> Result<Claims, AuthError> {
    if allowed.contains(&claims.role) {
        Ok(claims)
    } else {
        Err(AuthError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role) -> Claims {
        Claims {
            id: 1,
            role,
            iat: 0,
            exp: 0,
        }
    }

    #[test]
    fn test_authorize_accepts_listed_role() {
        let result = authorize(claims(Role::Owner), &[Role::Owner, Role::Admin]);
        assert_eq!(result.map(|c| c.role), Ok(Role::Owner));
    }

    #[test]
    fn test_authorize_rejects_unlisted_role() {
        assert_eq!(
            authorize(claims(Role::User), &[Role::Admin]).err(),
            Some(AuthError::Forbidden)
        );
    }

    #[test]
    fn test_unauthorized_response_has_challenge_header() {
        let response = AuthError::MissingToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(WWW_AUTHENTICATE));

        let response = AuthError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!response.headers().contains_key(WWW_AUTHENTICATE));
    }
}
