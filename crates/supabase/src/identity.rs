//! Identity wire types and the sanitized projection exposed to API callers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Open key-value bag attached to a remote identity.
pub type Metadata = HashMap<String, Value>;

/// Field names that must never reach an API caller, at any nesting level
/// the sanitizer inspects.
const CREDENTIAL_FIELDS: &[&str] = &["password", "encrypted_password", "password_hash"];

/// The provider's user record, read-only to this service.
///
/// Unknown fields in the provider payload (including any credential-shaped
/// field) are dropped at deserialization; only the fields below survive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteIdentity {
    pub id: Uuid,
    #[serde(default)]
    pub aud: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_metadata: Option<Metadata>,
    #[serde(default)]
    pub app_metadata: Option<Metadata>,
}

/// Tokens minted by the provider for a signed-in user.
///
/// `user` is optional: refresh responses are not guaranteed to carry the
/// identity, and callers must treat it as absent-able.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
    pub user: Option<RemoteIdentity>,
}

/// The subset of a remote identity that is safe to return to API callers.
///
/// `id`, `email` and `created_at` are always present in the schema; the
/// remaining fields are populated only when the source carries them and
/// are omitted from serialized output otherwise. Metadata bags are scrubbed
/// of credential-named fields before they are copied.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedIdentity {
    pub id: Uuid,
    pub email: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_metadata: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_metadata: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

impl From<&RemoteIdentity> for SanitizedIdentity {
    fn from(identity: &RemoteIdentity) -> Self {
        Self {
            id: identity.id,
            email: identity.email.clone(),
            created_at: identity.created_at,
            user_metadata: identity.user_metadata.as_ref().map(scrub_metadata),
            updated_at: identity.updated_at,
            app_metadata: identity.app_metadata.as_ref().map(scrub_metadata),
            aud: identity.aud.clone(),
            confirmed_at: identity.confirmed_at,
            last_sign_in_at: identity.last_sign_in_at,
        }
    }
}

fn is_credential_field(name: &str) -> bool {
    CREDENTIAL_FIELDS.contains(&name)
}

/// Remove credential-named fields from a metadata bag, recursing into
/// nested objects and arrays.
pub fn scrub_metadata(metadata: &Metadata) -> Metadata {
    metadata
        .iter()
        .filter(|(key, _)| !is_credential_field(key))
        .map(|(key, value)| (key.clone(), scrub_value(value)))
        .collect()
}

fn scrub_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !is_credential_field(key))
                .map(|(key, nested)| (key.clone(), scrub_value(nested)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(scrub_value).collect()),
        other => other.clone(),
    }
}
