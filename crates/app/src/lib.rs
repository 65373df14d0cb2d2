//! Userline application composition root
//!
//! Wires the identity provider, repositories, and domain routes into a
//! single application router.

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;

use userline_accounts::{AccountsRepositories, AccountsState};
use userline_common::Config;
use userline_supabase::{
    IdentityGateway, IdentityProvider, MockIdentityProvider, SupabaseConfig, SupabaseProvider,
};

/// Create the main application router with all routes and state
pub async fn create_app(config: Config, pool: PgPool) -> Result<Router, anyhow::Error> {
    let provider: Arc<dyn IdentityProvider> = match config.auth_provider.as_str() {
        "supabase" => {
            tracing::info!(url = %config.supabase_url, "Using Supabase identity provider");
            Arc::new(SupabaseProvider::new(SupabaseConfig {
                url: config.supabase_url.clone(),
                service_role_key: config.supabase_service_role_key.clone(),
                anon_key: config.supabase_anon_key.clone(),
            })?)
        }
        "mock" => {
            tracing::warn!("Using in-memory identity provider; data will not survive restarts");
            Arc::new(MockIdentityProvider::new())
        }
        provider => anyhow::bail!(
            "Unknown identity provider: {}. Supported providers: supabase, mock",
            provider
        ),
    };

    let accounts_state = AccountsState {
        repos: AccountsRepositories::new(pool),
        identity: IdentityGateway::new(provider),
    };

    // Build router: compose domain routes with shared infrastructure routes
    let app = Router::new()
        .route("/health", axum::routing::get(health_check))
        .route("/", axum::routing::get(|| async { "Userline API v0.1.0" }))
        .merge(userline_accounts::routes().with_state(accounts_state));

    Ok(app)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
