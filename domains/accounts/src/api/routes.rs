//! Route definitions for the Accounts domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{auth, users};
use super::middleware::AccountsState;

/// Create authentication routes
fn auth_routes() -> Router<AccountsState> {
    Router::new()
        .route("/auth/signup", post(auth::sign_up))
        .route("/auth/signin", post(auth::sign_in))
        .route("/auth/signout", post(auth::sign_out))
        .route("/auth/me", get(auth::me))
        .route("/auth/refresh", post(auth::refresh))
}

/// Create shadow profile routes
fn user_routes() -> Router<AccountsState> {
    Router::new()
        .route("/users/me", get(users::get_me).put(users::update_me))
        .route("/users", get(users::list_users))
        .route(
            "/users/{id}",
            get(users::get_user).delete(users::delete_user),
        )
}

/// Create all Accounts domain API routes
pub fn routes() -> Router<AccountsState> {
    Router::new().merge(auth_routes()).merge(user_routes())
}
