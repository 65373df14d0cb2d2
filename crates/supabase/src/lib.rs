//! Identity provider gateway for Userline
//!
//! All identity management is delegated to a hosted provider (Supabase
//! GoTrue). This crate owns the provider-facing surface:
//! - `IdentityProvider` trait covering the five operations the service needs
//! - `SupabaseProvider`, the real HTTP client over the GoTrue REST API
//! - `MockIdentityProvider`, an in-memory implementation for tests and
//!   local development
//! - wire types (`RemoteIdentity`, `Session`) and the `SanitizedIdentity`
//!   projection returned to API callers

use std::sync::Arc;

pub mod client;
pub mod identity;
pub mod mock;

pub use client::{SupabaseConfig, SupabaseProvider};
pub use identity::{Metadata, RemoteIdentity, SanitizedIdentity, Session};
pub use mock::MockIdentityProvider;

/// Errors from the identity provider boundary.
///
/// `Rejected` means the provider answered and said no (bad credentials,
/// duplicate email, invalid token); callers map it to a 4xx. Everything
/// else is an infrastructure failure.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Identity provider configuration error: {0}")]
    Configuration(String),

    #[error("{message}")]
    Rejected { status: Option<u16>, message: String },

    #[error("Identity provider request failed: {0}")]
    Transport(String),

    #[error("Unexpected identity provider response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Rejection without an HTTP status (synthesized locally or by a mock).
    pub fn rejected(message: impl Into<String>) -> Self {
        ProviderError::Rejected {
            status: None,
            message: message.into(),
        }
    }

    /// True when the provider itself rejected the operation.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ProviderError::Rejected { .. })
    }
}

/// Operations the service delegates to the hosted identity provider.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Administrative user creation with the email pre-confirmed.
    async fn admin_create_user(
        &self,
        email: &str,
        password: &str,
        user_metadata: Option<Metadata>,
    ) -> Result<RemoteIdentity, ProviderError>;

    /// Password sign-in on behalf of an anonymous caller.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ProviderError>;

    /// Sign out the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError>;

    /// Resolve the identity behind `access_token`.
    async fn get_user(&self, access_token: &str) -> Result<RemoteIdentity, ProviderError>;

    /// Exchange a refresh token for a fresh session.
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ProviderError>;
}

/// Clonable handle to the configured identity provider.
///
/// Domain states expose this via `FromRef` so the access guard can reach
/// the provider from any router state.
#[derive(Clone)]
pub struct IdentityGateway {
    provider: Arc<dyn IdentityProvider>,
}

impl IdentityGateway {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    pub async fn admin_create_user(
        &self,
        email: &str,
        password: &str,
        user_metadata: Option<Metadata>,
    ) -> Result<RemoteIdentity, ProviderError> {
        self.provider
            .admin_create_user(email, password, user_metadata)
            .await
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ProviderError> {
        self.provider.sign_in_with_password(email, password).await
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        self.provider.sign_out(access_token).await
    }

    pub async fn get_user(&self, access_token: &str) -> Result<RemoteIdentity, ProviderError> {
        self.provider.get_user(access_token).await
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ProviderError> {
        self.provider.refresh_session(refresh_token).await
    }
}
