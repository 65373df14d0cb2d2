//! Supabase GoTrue HTTP client
//!
//! Real provider implementation over the GoTrue REST API at
//! `{url}/auth/v1`. Three request modes cover every operation:
//! - privileged: service role key (admin user creation)
//! - public: anon key, falling back to the service role key when no anon
//!   key is configured (password sign-in, token refresh)
//! - scoped: caller-supplied bearer token (sign-out, get-user)

use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde_json::json;

use crate::identity::{Metadata, RemoteIdentity, Session};
use crate::{IdentityProvider, ProviderError};

/// Connection settings for the hosted provider.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_role_key: String,
    pub anon_key: Option<String>,
}

/// Provider client. Construction is cheap; one shared `reqwest::Client`,
/// headers assembled per call, no per-token client caching.
pub struct SupabaseProvider {
    http: reqwest::Client,
    auth_url: String,
    service_role_key: String,
    anon_key: String,
}

impl SupabaseProvider {
    /// Build a provider client, failing fast on missing configuration.
    pub fn new(config: SupabaseConfig) -> Result<Self, ProviderError> {
        if config.url.trim().is_empty() {
            return Err(ProviderError::Configuration(
                "Missing Supabase URL".to_string(),
            ));
        }
        if config.service_role_key.trim().is_empty() {
            return Err(ProviderError::Configuration(
                "Missing Supabase service role key".to_string(),
            ));
        }

        let anon_key = config
            .anon_key
            .filter(|key| !key.trim().is_empty())
            .unwrap_or_else(|| config.service_role_key.clone());

        Ok(Self {
            http: reqwest::Client::new(),
            auth_url: format!("{}/auth/v1", config.url.trim_end_matches('/')),
            service_role_key: config.service_role_key,
            anon_key,
        })
    }

    /// Request authorized for administrative identity operations.
    fn privileged(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.auth_url, path))
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
    }

    /// Request authorized only for anonymous-facing operations.
    fn public(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.auth_url, path))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    /// Request acting as the caller behind `access_token`.
    fn scoped(&self, method: Method, path: &str, access_token: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.auth_url, path))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
    }

    async fn send(request: RequestBuilder) -> Result<reqwest::Response, ProviderError> {
        request
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))
    }

    /// Turn a non-success response into a rejection carrying the provider's
    /// own message. GoTrue is inconsistent about its error body shape, so
    /// the known field names are tried in turn.
    async fn rejection(response: reqwest::Response) -> ProviderError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body
                .into_message()
                .unwrap_or_else(|| format!("Identity provider returned status {}", status)),
            Err(_) => format!("Identity provider returned status {}", status),
        };

        tracing::debug!(status, message = %message, "Identity provider rejected request");
        ProviderError::Rejected {
            status: Some(status),
            message,
        }
    }

    async fn parse_session(response: reqwest::Response) -> Result<Session, ProviderError> {
        let payload: SessionPayload = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        match (payload.access_token, payload.refresh_token) {
            (Some(access_token), Some(refresh_token)) if !access_token.is_empty() => Ok(Session {
                access_token,
                refresh_token,
                token_type: payload.token_type,
                expires_in: payload.expires_in,
                user: payload.user,
            }),
            _ => Err(ProviderError::rejected("No session returned")),
        }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for SupabaseProvider {
    async fn admin_create_user(
        &self,
        email: &str,
        password: &str,
        user_metadata: Option<Metadata>,
    ) -> Result<RemoteIdentity, ProviderError> {
        let body = json!({
            "email": email,
            "password": password,
            "email_confirm": true,
            "user_metadata": user_metadata.unwrap_or_default(),
        });

        let response = Self::send(
            self.privileged(Method::POST, "/admin/users").json(&body),
        )
        .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        response
            .json::<RemoteIdentity>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ProviderError> {
        let response = Self::send(
            self.public(Method::POST, "/token?grant_type=password")
                .json(&json!({"email": email, "password": password})),
        )
        .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        Self::parse_session(response).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let response = Self::send(self.scoped(Method::POST, "/logout", access_token)).await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<RemoteIdentity, ProviderError> {
        let response = Self::send(self.scoped(Method::GET, "/user", access_token)).await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        response
            .json::<RemoteIdentity>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ProviderError> {
        let response = Self::send(
            self.public(Method::POST, "/token?grant_type=refresh_token")
                .json(&json!({"refresh_token": refresh_token})),
        )
        .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        Self::parse_session(response).await
    }
}

#[derive(Deserialize)]
struct SessionPayload {
    access_token: Option<String>,
    refresh_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<i64>,
    user: Option<RemoteIdentity>,
}

/// Lenient view of GoTrue's error bodies: `{"msg": …}`, `{"message": …}`,
/// `{"error": …, "error_description": …}` all occur in the wild.
#[derive(Deserialize)]
struct ErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
    }
}
