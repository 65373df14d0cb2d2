//! Axum extractor implementing the access guard
//!
//! Generic over any state `S` where `IdentityGateway: FromRef<S>`.
//! Each successful extraction is one provider round-trip; nothing is
//! cached between requests.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderValue},
};

use userline_supabase::IdentityGateway;

use crate::context::AuthContext;
use crate::error::AuthError;

/// Authenticated caller extractor.
///
/// Protected handlers take `AuthUser(context)` as an argument; requests
/// without a valid bearer token never reach the handler body.
#[derive(Debug)]
pub struct AuthUser(pub AuthContext);

impl<S> FromRequestParts<S> for AuthUser
where
    IdentityGateway: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let gateway = IdentityGateway::from_ref(state);

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| AuthError::unauthorized("No authorization header"))?;

        let token = extract_bearer_token(auth_header)?;

        let identity = gateway.get_user(&token).await.map_err(|e| {
            tracing::debug!(error = %e, "Bearer token validation failed");
            AuthError::unauthorized("Invalid or expired token")
        })?;

        Ok(AuthUser(AuthContext::new(identity, token)))
    }
}

/// Extract a non-empty bearer token from an Authorization header
fn extract_bearer_token(header: &HeaderValue) -> Result<String, AuthError> {
    let header_str = header
        .to_str()
        .map_err(|_| AuthError::unauthorized("No token provided"))?;

    match header_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(AuthError::unauthorized("No token provided")),
    }
}
