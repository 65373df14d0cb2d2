//! Authenticated request context

use userline_supabase::RemoteIdentity;

/// Identity resolved by the access guard, attached to the request for
/// downstream handlers together with the raw bearer token (needed for
/// act-as-caller provider operations such as sign-out).
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub identity: RemoteIdentity,
    pub access_token: String,
}

impl AuthContext {
    pub fn new(identity: RemoteIdentity, access_token: String) -> Self {
        Self {
            identity,
            access_token,
        }
    }
}
