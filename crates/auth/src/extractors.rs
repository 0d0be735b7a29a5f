//! Axum extractors for authentication
//!
//! Generic over any state `S` where `TokenService: FromRef<S>`.
//! This is axum's idiomatic nested-state pattern.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::claims::Claims;
use crate::error::AuthError;
use crate::jwt::extract_bearer_token;
use crate::service::TokenService;

/// Role allowed through [`AdminUser`]
pub const ADMIN_ROLE: &str = "ADMIN";

/// Authenticated caller extractor (bearer access token)
#[derive(Debug)]
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    TokenService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let tokens = TokenService::from_ref(state);

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthorization)?;

        let token = extract_bearer_token(auth_header)?;
        let claims = tokens.validate_token(&token)?;

        tracing::debug!(user_id = %claims.user_id, role = %claims.role, "Request authenticated");

        Ok(AuthUser(claims))
    }
}

/// Admin-only extractor.
///
/// Like `AuthUser` but rejects callers whose role is not `ADMIN` with
/// 403 FORBIDDEN.
#[derive(Debug)]
pub struct AdminUser(pub Claims);

impl<S> FromRequestParts<S> for AdminUser
where
    TokenService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;

        if claims.role != ADMIN_ROLE {
            tracing::debug!(user_id = %claims.user_id, role = %claims.role, "Admin role required");
            return Err(AuthError::InsufficientRole);
        }

        Ok(AdminUser(claims))
    }
}
