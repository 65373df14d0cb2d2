//! Domain entities for the Accounts domain
//!
//! The shadow profile is the only locally-owned record: one row per remote
//! identity, created during sign-up or lazily on first authenticated
//! access, never re-synced from the provider afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use std::collections::HashMap;
use uuid::Uuid;

use userline_common::{Error, Result};
use userline_supabase::RemoteIdentity;
use validator::ValidateEmail;

/// Shadow profile entity, mirrored from the identity provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    /// Remote identity id. Immutable after creation; at most one profile
    /// exists per remote identity.
    pub supabase_user_id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub metadata: Json<HashMap<String, serde_json::Value>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Merge an update into this profile. Only the fields present in the
    /// request change; a provided metadata bag replaces the stored one
    /// wholesale.
    pub fn apply_update(&mut self, update: UpdateProfile) {
        if let Some(first_name) = update.first_name {
            self.first_name = Some(first_name);
        }
        if let Some(last_name) = update.last_name {
            self.last_name = Some(last_name);
        }
        if let Some(metadata) = update.metadata {
            self.metadata = Json(metadata);
        }
        self.updated_at = Utc::now();
    }
}

/// Fields for a profile about to be created
#[derive(Debug, Clone, PartialEq)]
pub struct NewProfile {
    pub supabase_user_id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl NewProfile {
    /// Create a new profile candidate with validation
    pub fn new(
        supabase_user_id: Uuid,
        email: String,
        first_name: Option<String>,
        last_name: Option<String>,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Result<Self> {
        if !email.validate_email() {
            return Err(Error::Validation("Invalid email format".to_string()));
        }

        Ok(NewProfile {
            supabase_user_id,
            email,
            first_name,
            last_name,
            metadata,
        })
    }

    /// Derive a shadow profile from a resolved remote identity.
    ///
    /// `firstName`/`lastName` are read from the identity's metadata bag
    /// when present; the bag itself is copied in full.
    pub fn from_remote(identity: &RemoteIdentity) -> Result<Self> {
        let email = identity
            .email
            .clone()
            .ok_or_else(|| Error::Internal("Remote identity has no email address".to_string()))?;

        let metadata = identity.user_metadata.clone().unwrap_or_default();
        let first_name = metadata
            .get("firstName")
            .and_then(|value| value.as_str())
            .map(String::from);
        let last_name = metadata
            .get("lastName")
            .and_then(|value| value.as_str())
            .map(String::from);

        Self::new(identity.id, email, first_name, last_name, metadata)
    }
}

/// Partial update of a profile; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}
