//! Access guard errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Guard rejection.
///
/// Deliberately a single kind: a missing header, a malformed header, an
/// empty token, a provider rejection, and a provider outage all surface to
/// the transport as the same 401. The message varies for operator logs and
/// debugging, the kind does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    Unauthorized(String),
}

impl AuthError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        AuthError::Unauthorized(message.into())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let AuthError::Unauthorized(message) = self;

        let body = Json(json!({
            "error": {
                "code": "UNAUTHORIZED",
                "message": message,
            }
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
