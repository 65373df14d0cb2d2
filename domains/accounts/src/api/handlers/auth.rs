//! Authentication API handlers
//!
//! Every operation is a pass-through to the identity provider plus
//! response sanitization. The only local side effect is the best-effort
//! shadow profile insert during sign-up.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use userline_auth::AuthUser;
use userline_common::{Error, Result, ValidatedJson};
use userline_supabase::{Metadata, ProviderError, SanitizedIdentity};

use crate::api::middleware::AccountsState;
use crate::domain::entities::NewProfile;

/// Request for user registration
#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6))]
    pub password: String,

    pub metadata: Option<Metadata>,
}

/// Request for password sign-in
#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Request for token refresh
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub user: SanitizedIdentity,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: Option<SanitizedIdentity>,
}

/// Refresh response; `user` is omitted when the provider does not return
/// an identity alongside the new tokens.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SanitizedIdentity>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Provider failure on a credential-checking operation: rejections are
/// authentication failures (401), everything else is a server error.
fn authentication_error(error: ProviderError) -> Error {
    if error.is_rejection() {
        Error::Authentication(error.to_string())
    } else {
        Error::Internal(error.to_string())
    }
}

/// POST /auth/signup - Register a new user
pub async fn sign_up(
    State(state): State<AccountsState>,
    ValidatedJson(request): ValidatedJson<SignUpRequest>,
) -> Result<(StatusCode, Json<SignUpResponse>)> {
    let identity = state
        .identity
        .admin_create_user(&request.email, &request.password, request.metadata)
        .await
        .map_err(|e| {
            if e.is_rejection() {
                Error::Validation(e.to_string())
            } else {
                Error::Internal(e.to_string())
            }
        })?;

    // Best-effort shadow profile: identity-provider success always yields
    // an API success, so a local failure is logged and swallowed.
    match NewProfile::from_remote(&identity) {
        Ok(new_profile) => {
            if let Err(e) = state.repos.profiles.create(new_profile).await {
                tracing::error!(error = %e, supabase_user_id = %identity.id, "Failed to create local profile");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, supabase_user_id = %identity.id, "Failed to derive local profile from remote identity");
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            user: SanitizedIdentity::from(&identity),
            message: "User created successfully".to_string(),
        }),
    ))
}

/// POST /auth/signin - Password sign-in
pub async fn sign_in(
    State(state): State<AccountsState>,
    ValidatedJson(request): ValidatedJson<SignInRequest>,
) -> Result<Json<SignInResponse>> {
    let session = state
        .identity
        .sign_in_with_password(&request.email, &request.password)
        .await
        .map_err(authentication_error)?;

    Ok(Json(SignInResponse {
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        user: session.user.as_ref().map(SanitizedIdentity::from),
    }))
}

/// POST /auth/signout - Sign out the caller's session
pub async fn sign_out(
    State(state): State<AccountsState>,
    AuthUser(context): AuthUser,
) -> Result<Json<MessageResponse>> {
    state
        .identity
        .sign_out(&context.access_token)
        .await
        .map_err(authentication_error)?;

    Ok(Json(MessageResponse {
        message: "Signed out successfully".to_string(),
    }))
}

/// GET /auth/me - Current authenticated identity
pub async fn me(AuthUser(context): AuthUser) -> Json<SanitizedIdentity> {
    Json(SanitizedIdentity::from(&context.identity))
}

/// POST /auth/refresh - Exchange a refresh token for a new session
pub async fn refresh(
    State(state): State<AccountsState>,
    ValidatedJson(request): ValidatedJson<RefreshRequest>,
) -> Result<Json<RefreshResponse>> {
    let session = state
        .identity
        .refresh_session(&request.refresh_token)
        .await
        .map_err(authentication_error)?;

    Ok(Json(RefreshResponse {
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        user: session.user.as_ref().map(SanitizedIdentity::from),
    }))
}
