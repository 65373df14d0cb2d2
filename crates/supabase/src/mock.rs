//! In-memory identity provider for tests and local development
//!
//! Keeps registered users and live sessions behind a shared mutex and
//! reproduces the provider's observable behavior: duplicate-email
//! rejection, credential checks, opaque token minting, refresh rotation,
//! and the provider's error messages.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::identity::{Metadata, RemoteIdentity, Session};
use crate::{IdentityProvider, ProviderError};

#[derive(Debug, Clone)]
struct MockUser {
    identity: RemoteIdentity,
    password: String,
}

#[derive(Debug, Default)]
struct MockState {
    /// Registered users keyed by email
    users: HashMap<String, MockUser>,
    /// Live access tokens -> email
    sessions: HashMap<String, String>,
    /// Outstanding refresh tokens -> email
    refresh_tokens: HashMap<String, String>,
}

/// Mock identity provider for testing
#[derive(Debug, Clone, Default)]
pub struct MockIdentityProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockIdentityProvider {
    /// Create a new mock provider with no registered users
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user directly, bypassing the admin-create path.
    /// Returns the registered identity.
    pub fn register_user(
        &self,
        email: &str,
        password: &str,
        user_metadata: Option<Metadata>,
    ) -> RemoteIdentity {
        let identity = Self::build_identity(email, user_metadata);
        self.state.lock().unwrap().users.insert(
            email.to_string(),
            MockUser {
                identity: identity.clone(),
                password: password.to_string(),
            },
        );
        identity
    }

    /// Mint a session for an already-registered user without checking the
    /// password. Panics if the email is unknown (test setup error).
    pub fn issue_session(&self, email: &str) -> Session {
        let mut state = self.state.lock().unwrap();
        let identity = state
            .users
            .get(email)
            .map(|user| user.identity.clone())
            .expect("issue_session: user not registered");
        Self::mint_session(&mut state, email, identity)
    }

    /// Number of registered users
    pub fn user_count(&self) -> usize {
        self.state.lock().unwrap().users.len()
    }

    /// Number of live access tokens
    pub fn session_count(&self) -> usize {
        self.state.lock().unwrap().sessions.len()
    }

    fn build_identity(email: &str, user_metadata: Option<Metadata>) -> RemoteIdentity {
        let now = Utc::now();
        let app_metadata: Metadata = [
            ("provider".to_string(), json!("email")),
            ("providers".to_string(), json!(["email"])),
        ]
        .into_iter()
        .collect();

        RemoteIdentity {
            id: Uuid::new_v4(),
            aud: Some("authenticated".to_string()),
            role: Some("authenticated".to_string()),
            email: Some(email.to_string()),
            phone: None,
            created_at: Some(now),
            updated_at: Some(now),
            confirmed_at: Some(now),
            email_confirmed_at: Some(now),
            last_sign_in_at: None,
            user_metadata,
            app_metadata: Some(app_metadata),
        }
    }

    fn mint_session(state: &mut MockState, email: &str, identity: RemoteIdentity) -> Session {
        let access_token = format!("mock-access-{}", Uuid::new_v4());
        let refresh_token = format!("mock-refresh-{}", Uuid::new_v4());

        state
            .sessions
            .insert(access_token.clone(), email.to_string());
        state
            .refresh_tokens
            .insert(refresh_token.clone(), email.to_string());

        Session {
            access_token,
            refresh_token,
            token_type: Some("bearer".to_string()),
            expires_in: Some(3600),
            user: Some(identity),
        }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn admin_create_user(
        &self,
        email: &str,
        password: &str,
        user_metadata: Option<Metadata>,
    ) -> Result<RemoteIdentity, ProviderError> {
        let mut state = self.state.lock().unwrap();

        if state.users.contains_key(email) {
            return Err(ProviderError::rejected(
                "A user with this email address has already been registered",
            ));
        }

        let identity = Self::build_identity(email, user_metadata);
        state.users.insert(
            email.to_string(),
            MockUser {
                identity: identity.clone(),
                password: password.to_string(),
            },
        );

        tracing::debug!(email = %email, "Mock provider registered user");
        Ok(identity)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ProviderError> {
        let mut state = self.state.lock().unwrap();

        let identity = match state.users.get_mut(email) {
            Some(user) if user.password == password => {
                user.identity.last_sign_in_at = Some(Utc::now());
                user.identity.clone()
            }
            _ => return Err(ProviderError::rejected("Invalid login credentials")),
        };

        Ok(Self::mint_session(&mut state, email, identity))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let mut state = self.state.lock().unwrap();
        match state.sessions.remove(access_token) {
            Some(_) => Ok(()),
            None => Err(ProviderError::rejected("Invalid or expired token")),
        }
    }

    async fn get_user(&self, access_token: &str) -> Result<RemoteIdentity, ProviderError> {
        let state = self.state.lock().unwrap();
        state
            .sessions
            .get(access_token)
            .and_then(|email| state.users.get(email))
            .map(|user| user.identity.clone())
            .ok_or_else(|| ProviderError::rejected("Invalid or expired token"))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ProviderError> {
        let mut state = self.state.lock().unwrap();

        let email = state
            .refresh_tokens
            .remove(refresh_token)
            .ok_or_else(|| ProviderError::rejected("Invalid Refresh Token"))?;

        let identity = state
            .users
            .get(&email)
            .map(|user| user.identity.clone())
            .ok_or_else(|| ProviderError::rejected("Invalid Refresh Token"))?;

        Ok(Self::mint_session(&mut state, &email, identity))
    }
}
