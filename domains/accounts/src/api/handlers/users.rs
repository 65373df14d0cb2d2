//! Shadow profile API handlers
//!
//! Implements profile CRUD over the local store, including the
//! reconciliation path that lazily creates the shadow row on first
//! authenticated access.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use userline_auth::AuthUser;
use userline_common::{Error, Result, ValidatedJson};

use crate::api::middleware::AccountsState;
use crate::domain::entities::{NewProfile, Profile, UpdateProfile};

/// Profile wire format (camelCase, matching the public API contract)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub supabase_user_id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub metadata: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            supabase_user_id: profile.supabase_user_id,
            email: profile.email,
            first_name: profile.first_name,
            last_name: profile.last_name,
            metadata: profile.metadata.0,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

/// Request for updating the caller's profile. Absent fields are left
/// untouched; a provided metadata bag replaces the stored one.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

impl From<UpdateProfileRequest> for UpdateProfile {
    fn from(request: UpdateProfileRequest) -> Self {
        Self {
            first_name: request.first_name,
            last_name: request.last_name,
            metadata: request.metadata,
        }
    }
}

/// GET /users/me - Get the caller's shadow profile, creating it from the
/// resolved remote identity on first access. Existing rows are returned
/// unchanged; there is no re-sync against the provider.
pub async fn get_me(
    State(state): State<AccountsState>,
    AuthUser(context): AuthUser,
) -> Result<Json<ProfileResponse>> {
    if let Some(profile) = state
        .repos
        .profiles
        .find_by_supabase_user_id(context.identity.id)
        .await?
    {
        return Ok(Json(profile.into()));
    }

    let new_profile = NewProfile::from_remote(&context.identity)?;
    let profile = state.repos.profiles.create(new_profile).await?;

    tracing::info!(supabase_user_id = %context.identity.id, profile_id = %profile.id, "Shadow profile created on first access");
    Ok(Json(profile.into()))
}

/// GET /users/:id - Get a profile by internal id
pub async fn get_user(
    State(state): State<AccountsState>,
    AuthUser(_context): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileResponse>> {
    let profile = state.repos.profiles.get_by_id(id).await?;
    Ok(Json(profile.into()))
}

/// PUT /users/me - Partially update the caller's shadow profile
pub async fn update_me(
    State(state): State<AccountsState>,
    AuthUser(context): AuthUser,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>> {
    let profile = state
        .repos
        .profiles
        .find_by_supabase_user_id(context.identity.id)
        .await?
        .ok_or_else(|| Error::NotFound("Local user not found".to_string()))?;

    let updated = state
        .repos
        .profiles
        .update(profile.id, request.into())
        .await?;

    Ok(Json(updated.into()))
}

/// GET /users - List every profile
pub async fn list_users(
    State(state): State<AccountsState>,
    AuthUser(_context): AuthUser,
) -> Result<Json<Vec<ProfileResponse>>> {
    let profiles = state.repos.profiles.find_all().await?;
    Ok(Json(
        profiles.into_iter().map(ProfileResponse::from).collect(),
    ))
}

/// DELETE /users/:id - Delete a profile by internal id.
///
/// Not guarded by ownership: any authenticated caller may delete any
/// profile.
pub async fn delete_user(
    State(state): State<AccountsState>,
    AuthUser(_context): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.repos.profiles.delete(id).await?;
    Ok(StatusCode::OK)
}
